//! `codeask config` subcommands.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Result};
use codeask_core::Preset;
use codeask_runtime::RuntimeConfig;

use crate::cli::ConfigAction;
use crate::output;

/// Variables `config set` accepts besides the `CODEASK_PROMPT_<PRESET>` family.
const KEYS: &[&str] = &[
    "CODEASK_MODE",
    "CODEASK_API_KEY",
    "OPENAI_API_KEY",
    "CODEASK_ACCESS_TOKEN",
    "CODEASK_API_BASE_URL",
    "CODEASK_PROXY_URL",
    "CODEASK_MODEL",
    "CODEASK_CONTEXT_MODE",
    "CODEASK_KEEP_CONVERSATION",
    "CODEASK_TIMEOUT_SECS",
    "CODEASK_CODEBLOCK_LANGUAGE_ID",
    "CODEASK_INDENT_ON_INSERTING",
    "CODEASK_PASTE_ON_CLICK",
];

pub async fn handle(action: Option<ConfigAction>) -> Result<()> {
    match action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => show(),
        ConfigAction::Set { key, value } => set(&key, &value),
    }
}

fn show() -> Result<()> {
    let config = RuntimeConfig::from_env();
    let settings = &config.settings;
    let unset = || "(default)".to_string();

    let rows: Vec<(&str, String)> = vec![
        ("mode", config.auth.mode.to_string()),
        ("credential", config.auth.masked_credential()),
        ("api base url", config.api_base_url.clone().unwrap_or_else(unset)),
        ("proxy url", config.proxy_url.clone().unwrap_or_else(unset)),
        ("model", config.model.clone().unwrap_or_else(unset)),
        ("context mode", settings.default_context_mode.to_string()),
        ("keep conversation", settings.keep_conversation.to_string()),
        ("timeout (s)", settings.timeout_seconds.to_string()),
        (
            "codeblock language id",
            settings.codeblock_with_language_id.to_string(),
        ),
        ("indent on inserting", settings.indent_on_inserting.to_string()),
        ("paste on click", settings.paste_on_click.to_string()),
    ];
    let items: Vec<(&str, &str)> = rows.iter().map(|(k, v)| (*k, v.as_str())).collect();

    output::header("Configuration");
    let mut table = output::table();
    output::table_header(&mut table, "Setting", "Value");
    for (key, value) in &items {
        output::table_row(&mut table, key, value);
    }
    output::table_print(&table, &items);

    if !config.auth.is_complete() {
        output::warning(&format!(
            "No credential for {} mode. Run 'codeask config set CODEASK_API_KEY <key>'.",
            config.auth.mode
        ));
    }
    if let Some(path) = global_env_path() {
        output::dim(&format!("Saved settings: {}", path.display()));
    }
    Ok(())
}

fn set(key: &str, value: &str) -> Result<()> {
    let key = key.trim().to_uppercase();
    if !is_known_key(&key) {
        bail!(
            "Unknown setting '{}'. Available: {}, CODEASK_PROMPT_<PRESET>",
            key,
            KEYS.join(", ")
        );
    }

    let path = global_env_path().ok_or_else(|| anyhow!("Could not find home directory"))?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    save_env_value(&path, &key, value)?;

    output::success(&format!("Saved {} to {}", key, path.display()));
    Ok(())
}

fn is_known_key(key: &str) -> bool {
    KEYS.contains(&key)
        || Preset::ALL
            .iter()
            .any(|p| key == format!("CODEASK_PROMPT_{}", p.as_str().to_uppercase()))
}

/// `~/.codeask/env`, loaded on every start.
pub fn global_env_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".codeask").join("env"))
}

/// Set `key` in an `export KEY="value"` env file, keeping the other entries.
fn save_env_value(path: &Path, key: &str, value: &str) -> Result<()> {
    let existing = if path.exists() {
        fs::read_to_string(path)?
    } else {
        String::new()
    };

    let mut config: BTreeMap<String, String> = existing
        .lines()
        .filter_map(|line| {
            let line = line.trim().strip_prefix("export ")?;
            let (key, value) = line.split_once('=')?;
            Some((key.trim().to_string(), value.trim().to_string()))
        })
        .collect();

    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    config.insert(key.to_string(), format!("\"{}\"", escaped));

    let mut content = String::new();
    content.push_str("# codeask configuration\n");
    content.push_str("# Loaded automatically by codeask; can also be sourced by a shell.\n\n");
    for (k, v) in &config {
        content.push_str(&format!("export {}={}\n", k, v));
    }

    fs::write(path, content)?;
    Ok(())
}
