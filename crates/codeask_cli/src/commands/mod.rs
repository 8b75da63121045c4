//! Command dispatch.

pub mod ask;
pub mod config;
pub mod panel;
pub mod presets;

use std::sync::Arc;

use anyhow::Result;
use codeask_core::PanelMessage;
use codeask_runtime::{client_factory, ControllerHandle, RuntimeConfig, SessionController};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::cli::{Cli, Command, EditorArgs};
use crate::host::FileHost;

pub async fn handle(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Ask {
            task,
            preset,
            context,
            editor,
        } => ask::handle(task, preset, context, editor).await,
        Command::Panel { editor } => panel::handle(editor).await,
        Command::Config { action } => config::handle(action).await,
        Command::Presets => presets::handle().await,
    }
}

/// A running controller over the files in `editor`.
pub(crate) struct Session {
    pub handle: ControllerHandle,
    pub ui_rx: mpsc::Receiver<PanelMessage>,
    pub runner: JoinHandle<()>,
}

pub(crate) fn start_session(config: RuntimeConfig, editor: EditorArgs) -> Result<Session> {
    let host = Arc::new(FileHost::from_args(editor)?);
    let (ui_tx, ui_rx) = mpsc::channel(256);

    let settings = config.settings.clone();
    let auth = config.auth.clone();
    let (controller, handle) =
        SessionController::new(settings, auth, client_factory(config), host, ui_tx);
    let runner = tokio::spawn(controller.run());

    Ok(Session {
        handle,
        ui_rx,
        runner,
    })
}
