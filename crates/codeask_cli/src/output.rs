//! Terminal output helpers: styled text for humans, structured JSON for machines.
//!
//! Uses:
//! - `console` for colors (respects NO_COLOR, auto-disables when piped)
//! - `comfy-table` for structured data
//! - `indicatif` for spinners
//!
//! Diagnostics (warnings, errors) go to stderr so stdout stays clean for answers.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::cli::OutputFormat;

// ── Global format flag ─────────────────────────────────────────────

static JSON_MODE: AtomicBool = AtomicBool::new(false);

pub fn init(format: OutputFormat) {
    if matches!(format, OutputFormat::Json) {
        JSON_MODE.store(true, Ordering::Relaxed);
    }
}

pub fn is_json() -> bool {
    JSON_MODE.load(Ordering::Relaxed)
}

// ── JSON envelope ──────────────────────────────────────────────────

#[derive(Serialize)]
struct Msg<'a> {
    level: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a JsonValue>,
}

fn to_json(level: &str, message: &str, data: Option<&JsonValue>) -> String {
    let msg = Msg {
        level,
        message,
        data,
    };
    serde_json::to_string(&msg).unwrap_or_else(|_| {
        serde_json::json!({ "level": level, "message": message }).to_string()
    })
}

fn emit_json(level: &str, message: &str, data: Option<&JsonValue>) {
    println!("{}", to_json(level, message, data));
}

// ── Public helpers ─────────────────────────────────────────────────

pub fn header(text: &str) {
    if is_json() {
        emit_json("info", text, None);
    } else {
        println!("{}", style(text).bold().cyan());
    }
}

pub fn success(text: &str) {
    if is_json() {
        emit_json("success", text, None);
    } else {
        println!("{} {}", style("✓").green(), style(text).bright());
    }
}

pub fn error(text: &str) {
    if is_json() {
        eprintln!("{}", to_json("error", text, None));
    } else {
        eprintln!("{} {}", style("✗").red(), style(text).bright());
    }
}

pub fn warning(text: &str) {
    if is_json() {
        eprintln!("{}", to_json("warning", text, None));
    } else {
        eprintln!("{} {}", style("!").yellow(), style(text).bright());
    }
}

pub fn dim(text: &str) {
    if is_json() {
        emit_json("info", text, None);
    } else {
        println!("{}", style(text).dim());
    }
}

/// Emit an arbitrary serializable value as structured output.
pub fn data<T: Serialize>(label: &str, value: &T) {
    if is_json() {
        let json_val = serde_json::to_value(value).unwrap_or(JsonValue::Null);
        emit_json("data", label, Some(&json_val));
    } else {
        let formatted =
            serde_json::to_string_pretty(value).unwrap_or_else(|_| format!("{label}: <?>"));
        println!("{formatted}");
    }
}

/// Append streamed answer text without a newline.
pub fn stream(text: &str) {
    let mut stdout = std::io::stdout();
    let _ = stdout.write_all(text.as_bytes());
    let _ = stdout.flush();
}

// ── Tables ─────────────────────────────────────────────────────────

/// Create a styled table for listing items.
pub fn table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Add a header row to the table.
pub fn table_header(table: &mut Table, col1: &str, col2: &str) {
    table.set_header(vec![
        Cell::new(col1).fg(Color::Cyan).add_attribute(Attribute::Bold),
        Cell::new(col2).fg(Color::Cyan).add_attribute(Attribute::Bold),
    ]);
}

/// Add a row to the table.
pub fn table_row(table: &mut Table, name: &str, desc: &str) {
    table.add_row(vec![Cell::new(name).fg(Color::Green), Cell::new(desc)]);
}

/// Print a table (JSON mode emits items array instead).
pub fn table_print(table: &Table, items: &[(&str, &str)]) {
    if is_json() {
        let items: Vec<_> = items
            .iter()
            .map(|(name, value)| serde_json::json!({ "name": name, "value": value }))
            .collect();
        let data = serde_json::json!({ "items": items });
        emit_json("list", "", Some(&data));
    } else {
        println!("{table}");
    }
}

// ── Spinners ───────────────────────────────────────────────────────

/// Create a spinner for async operations. Hidden in JSON mode.
pub fn spinner(message: &str) -> ProgressBar {
    if is_json() {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    let spinner_style = ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(spinner_style);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}
