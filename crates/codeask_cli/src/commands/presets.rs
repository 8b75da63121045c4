//! `codeask presets` command.

use anyhow::Result;
use codeask_core::Preset;
use codeask_runtime::RuntimeConfig;

use crate::output;

pub async fn handle() -> Result<()> {
    let settings = RuntimeConfig::from_env().settings;

    output::header("Preset commands");

    let rows: Vec<(&str, &str)> = Preset::ALL
        .iter()
        .map(|preset| (preset.as_str(), settings.prompt_prefixes.get(*preset)))
        .collect();

    let mut table = output::table();
    output::table_header(&mut table, "Preset", "Prompt prefix");
    for (name, prefix) in &rows {
        output::table_row(&mut table, name, prefix);
    }
    output::table_print(&table, &rows);

    output::dim("Override a prefix with CODEASK_PROMPT_<PRESET>, e.g. CODEASK_PROMPT_EXPLAIN.");
    Ok(())
}
