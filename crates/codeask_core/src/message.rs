//! Messages exchanged between the session controller and the panel.
//!
//! Both directions serialize as `{"type": ..., "value": ...}` with camelCase
//! type names, the shape the panel script posts and listens for.

use serde::{Deserialize, Serialize};

use crate::context::ContextMode;
use crate::state::WorkingState;

/// Controller → panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum PanelMessage {
    SetWorkingState(WorkingState),

    AddRequest(RequestView),

    AddResponse(ResponseView),

    AddEvent(PanelEvent),

    ClearResponses,

    SetConversationId(Option<String>),

    SetTask(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestView {
    pub sequence: u64,
    pub task: String,
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseView {
    pub sequence: u64,
    pub id: String,
    pub text: String,
    pub done: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Info,
    Aborted,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelEvent {
    pub kind: EventKind,
    pub message: String,
}

impl PanelMessage {
    pub fn working_state(state: WorkingState) -> Self {
        PanelMessage::SetWorkingState(state)
    }

    pub fn request(sequence: u64, task: impl Into<String>, prompt: impl Into<String>) -> Self {
        PanelMessage::AddRequest(RequestView {
            sequence,
            task: task.into(),
            prompt: prompt.into(),
        })
    }

    pub fn partial(sequence: u64, id: impl Into<String>, text: impl Into<String>) -> Self {
        PanelMessage::AddResponse(ResponseView {
            sequence,
            id: id.into(),
            text: text.into(),
            done: false,
        })
    }

    pub fn response(sequence: u64, id: impl Into<String>, text: impl Into<String>) -> Self {
        PanelMessage::AddResponse(ResponseView {
            sequence,
            id: id.into(),
            text: text.into(),
            done: true,
        })
    }

    pub fn info(message: impl Into<String>) -> Self {
        PanelMessage::event(EventKind::Info, message)
    }

    pub fn aborted(message: impl Into<String>) -> Self {
        PanelMessage::event(EventKind::Aborted, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        PanelMessage::event(EventKind::Error, message)
    }

    fn event(kind: EventKind, message: impl Into<String>) -> Self {
        PanelMessage::AddEvent(PanelEvent {
            kind,
            message: message.into(),
        })
    }

    pub fn conversation_id(id: Option<String>) -> Self {
        PanelMessage::SetConversationId(id)
    }

    pub fn task(task: impl Into<String>) -> Self {
        PanelMessage::SetTask(task.into())
    }
}

/// Panel → controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum WebviewMessage {
    SendPrompt(PromptRequest),

    Abort,

    ResetConversation,

    CodeSelected(String),

    WebviewLoaded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRequest {
    #[serde(default)]
    pub task: String,
    /// Falls back to the configured default when absent
    #[serde(default)]
    pub context: Option<ContextMode>,
}
