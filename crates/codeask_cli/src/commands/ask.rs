//! `codeask ask` command.

use anyhow::{anyhow, bail, Result};
use codeask_core::{ContextMode, EventKind, PanelMessage, Preset};
use codeask_runtime::{ControllerHandle, RuntimeConfig};
use tokio::sync::mpsc;

use super::{start_session, Session};
use crate::cli::EditorArgs;
use crate::output;

pub async fn handle(
    task: Option<String>,
    preset: Option<String>,
    context: Option<String>,
    editor: EditorArgs,
) -> Result<()> {
    let mode = context.map(|c| c.parse::<ContextMode>()).transpose()?;
    let preset = preset.map(|p| p.parse::<Preset>()).transpose()?;

    let config = RuntimeConfig::from_env();
    let prefixes = config.settings.prompt_prefixes.clone();
    let Session {
        handle,
        mut ui_rx,
        runner,
    } = start_session(config, editor)?;

    let asked = match (preset, mode) {
        (Some(preset), None) => handle.ask_preset(preset).await,
        (Some(preset), Some(mode)) => {
            handle
                .ask(Some(prefixes.get(preset).to_string()), Some(mode))
                .await
        }
        (None, mode) => handle.ask(task, mode).await,
    };

    let outcome = match asked {
        Ok(sequence) => stream_answer(sequence, &mut ui_rx, &handle).await,
        Err(e) => Err(e.into()),
    };

    let _ = handle.shutdown();
    drop(handle);
    let _ = runner.await;
    outcome
}

/// Follow the panel messages of request `sequence` until it settles.
/// Ctrl-C aborts the request.
async fn stream_answer(
    sequence: u64,
    ui_rx: &mut mpsc::Receiver<PanelMessage>,
    handle: &ControllerHandle,
) -> Result<()> {
    let spinner = output::spinner("Asking...");
    let mut shown = String::new();

    loop {
        let message = tokio::select! {
            message = ui_rx.recv() => message,
            _ = tokio::signal::ctrl_c() => {
                handle.abort()?;
                continue;
            }
        };
        let Some(message) = message else {
            spinner.finish_and_clear();
            bail!("Session ended before an answer arrived");
        };

        match message {
            PanelMessage::AddResponse(view) if view.sequence == sequence => {
                spinner.finish_and_clear();
                if output::is_json() {
                    if view.done {
                        output::data("response", &view);
                        return Ok(());
                    }
                    continue;
                }

                let delta = match view.text.strip_prefix(shown.as_str()) {
                    Some(rest) => rest.to_string(),
                    // The answer was rewritten, start over on a fresh line
                    None => format!("\n{}", view.text),
                };
                output::stream(&delta);
                shown = view.text;

                if view.done {
                    output::stream("\n");
                    return Ok(());
                }
            }
            PanelMessage::AddEvent(event) => match event.kind {
                EventKind::Error => {
                    spinner.finish_and_clear();
                    return Err(anyhow!(event.message));
                }
                EventKind::Aborted => {
                    spinner.finish_and_clear();
                    if !shown.is_empty() {
                        output::stream("\n");
                    }
                    output::warning(&event.message);
                    return Ok(());
                }
                EventKind::Info => output::dim(&event.message),
            },
            _ => {}
        }
    }
}
