mod common;

use std::time::Duration;

use codeask_core::{ContextMode, ContextPayload, PanelMessage, Settings, WebviewMessage, WorkingState};
use codeask_runtime::RuntimeError;

use common::{response, Harness, Script};

async fn next_message(ui: &mut tokio::sync::mpsc::Receiver<PanelMessage>) -> PanelMessage {
    tokio::time::timeout(Duration::from_secs(5), ui.recv())
        .await
        .expect("timed out waiting for panel message")
        .expect("panel channel closed")
}

#[tokio::test]
async fn test_running_controller_handles_requests() {
    let h = Harness::new(Settings::default());
    h.client.push(Script::reply(response("r1", "done", "c1")).with_partials(&["do", "done"]));
    let Harness {
        controller,
        handle,
        mut ui,
        ..
    } = h;
    let runner = tokio::spawn(controller.run());

    let sequence = handle
        .ask_with_context(Some("go".to_string()), ContextMode::None, ContextPayload::Empty)
        .await
        .unwrap();
    assert_eq!(sequence, 1);

    let mut finished = false;
    while !finished {
        if let PanelMessage::SetWorkingState(WorkingState::Idle) = next_message(&mut ui).await {
            finished = true;
        }
    }

    handle.shutdown().unwrap();
    tokio::time::timeout(Duration::from_secs(5), runner)
        .await
        .unwrap()
        .unwrap();

    let err = handle
        .ask(Some("again".to_string()), None)
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::Closed));
}

#[tokio::test]
async fn test_webview_messages_through_handle() {
    let h = Harness::new(Settings::default());
    let Harness {
        controller,
        handle,
        mut ui,
        ..
    } = h;
    let runner = tokio::spawn(controller.run());

    handle.webview(WebviewMessage::Abort).unwrap();
    assert_eq!(
        next_message(&mut ui).await,
        PanelMessage::working_state(WorkingState::Idle)
    );

    drop(handle);
    tokio::time::timeout(Duration::from_secs(5), runner)
        .await
        .expect("controller should stop once every handle is dropped")
        .unwrap();
}
