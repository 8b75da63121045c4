//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Ask a chat model about your code
#[derive(Parser)]
#[command(name = "codeask", about, version, propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format: text (human-readable) or json (machine-readable)
    #[arg(short, long, global = true, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    /// Colored terminal output for humans
    #[default]
    Text,
    /// Structured JSON for machine consumption
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Ask one question and stream the answer
    Ask {
        /// Question or instruction placed ahead of the code
        #[arg(short, long, required_unless_present = "preset", conflicts_with = "preset")]
        task: Option<String>,
        /// Preset command (explain, refactor, optimize, find_problems, documentation, complete)
        #[arg(short, long)]
        preset: Option<String>,
        /// Context to attach: none, selection, whole_file, all_opened_files.
        /// Uses CODEASK_CONTEXT_MODE when not set.
        #[arg(short, long)]
        context: Option<String>,
        #[command(flatten)]
        editor: EditorArgs,
    },
    /// Bridge a panel over stdio: webview messages in, panel messages out (JSON lines)
    Panel {
        #[command(flatten)]
        editor: EditorArgs,
    },
    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
    /// List preset commands and their prompt prefixes
    Presets,
}

/// The files that stand in for the editor.
#[derive(Args, Debug, Default)]
pub struct EditorArgs {
    /// Active document
    #[arg(short, long)]
    pub file: Option<PathBuf>,
    /// Selected lines of the active document, 1-based and inclusive (e.g. 10:24)
    #[arg(short, long, requires = "file")]
    pub lines: Option<String>,
    /// Other opened documents
    #[arg(long, num_args = 1..)]
    pub open: Vec<PathBuf>,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration (default)
    Show,
    /// Save a setting to ~/.codeask/env
    Set {
        /// Variable name, e.g. CODEASK_MODEL or CODEASK_API_KEY
        key: String,
        value: String,
    },
}
