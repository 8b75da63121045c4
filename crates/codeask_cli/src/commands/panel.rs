//! `codeask panel` command: a JSON-lines bridge between a panel process and
//! the session controller.
//!
//! Each stdin line is a webview message (`{"type":"sendPrompt","value":{...}}`),
//! each stdout line a panel message. Logs stay on stderr.

use anyhow::Result;
use codeask_core::{PanelMessage, WebviewMessage};
use codeask_runtime::{ControllerHandle, RuntimeConfig};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{start_session, Session};
use crate::cli::EditorArgs;

pub async fn handle(editor: EditorArgs) -> Result<()> {
    let Session {
        handle,
        ui_rx,
        runner,
    } = start_session(RuntimeConfig::from_env(), editor)?;

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    let bridged = bridge(stdin, stdout, handle, ui_rx).await;

    runner.await?;
    bridged
}

/// Pump `input` into the controller and panel messages into `output`.
///
/// End of input shuts the controller down; the call returns once the
/// controller has dropped its panel sender and every message is written.
pub async fn bridge<R, W>(
    input: R,
    output: W,
    handle: ControllerHandle,
    ui_rx: mpsc::Receiver<PanelMessage>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let (read, write) = tokio::join!(read_webview(input, handle), write_panel(output, ui_rx));
    read?;
    write
}

async fn read_webview<R>(input: R, handle: ControllerHandle) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<WebviewMessage>(line) {
            Ok(message) => {
                debug!(?message, "Panel message in");
                handle.webview(message)?;
            }
            Err(e) => warn!(error = %e, "Ignoring malformed panel message"),
        }
    }

    debug!("Panel input closed");
    handle.shutdown()?;
    Ok(())
}

async fn write_panel<W>(mut output: W, mut ui_rx: mpsc::Receiver<PanelMessage>) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(message) = ui_rx.recv().await {
        let mut line = serde_json::to_vec(&message)?;
        line.push(b'\n');
        output.write_all(&line).await?;
        output.flush().await?;
    }
    Ok(())
}
