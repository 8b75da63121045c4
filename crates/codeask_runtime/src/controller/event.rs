//! Controller inbox events and the handle used to post them.

use codeask_core::{ContextMode, ContextPayload, Preset, SettingsPatch, WebviewMessage};
use codeask_llms::{ChatResponse, PartialResponse};
use tokio::sync::{mpsc, oneshot};

use super::state::Ticket;
use crate::config::AuthInfo;
use crate::error::{Result, RuntimeError};

type Reply<T> = oneshot::Sender<Result<T>>;

/// Everything the controller reacts to. Processed strictly one at a time.
#[derive(Debug)]
pub enum ControllerEvent {
    Webview(WebviewMessage),
    Ask {
        task: Option<String>,
        mode: Option<ContextMode>,
        reply: Option<Reply<u64>>,
    },
    AskWithContext {
        task: Option<String>,
        mode: ContextMode,
        payload: ContextPayload,
        reply: Option<Reply<u64>>,
    },
    AskPreset {
        preset: Preset,
        reply: Option<Reply<u64>>,
    },
    Abort,
    ResetConversation,
    InsertCode(String),
    SetAuthInfo(AuthInfo),
    UpdateSettings(SettingsPatch),
    WebviewLoaded,
    /// Streaming update from a dispatched request
    Progress {
        ticket: Ticket,
        partial: PartialResponse,
    },
    /// Dispatched request ended
    Finished {
        ticket: Ticket,
        result: std::result::Result<ChatResponse, codeask_llms::Error>,
    },
    Shutdown,
}

/// Cloneable front door to a running [`SessionController`](super::SessionController).
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    tx: mpsc::UnboundedSender<ControllerEvent>,
}

impl ControllerHandle {
    pub(crate) fn new(tx: mpsc::UnboundedSender<ControllerEvent>) -> Self {
        Self { tx }
    }

    pub fn send(&self, event: ControllerEvent) -> Result<()> {
        self.tx.send(event).map_err(|_| RuntimeError::Closed)
    }

    pub fn webview(&self, message: WebviewMessage) -> Result<()> {
        self.send(ControllerEvent::Webview(message))
    }

    /// Ask about editor context collected for `mode`; resolves to the request's sequence number.
    pub async fn ask(&self, task: Option<String>, mode: Option<ContextMode>) -> Result<u64> {
        let (reply, rx) = oneshot::channel();
        self.send(ControllerEvent::Ask {
            task,
            mode,
            reply: Some(reply),
        })?;
        rx.await.map_err(|_| RuntimeError::Closed)?
    }

    pub async fn ask_with_context(
        &self,
        task: Option<String>,
        mode: ContextMode,
        payload: ContextPayload,
    ) -> Result<u64> {
        let (reply, rx) = oneshot::channel();
        self.send(ControllerEvent::AskWithContext {
            task,
            mode,
            payload,
            reply: Some(reply),
        })?;
        rx.await.map_err(|_| RuntimeError::Closed)?
    }

    pub async fn ask_preset(&self, preset: Preset) -> Result<u64> {
        let (reply, rx) = oneshot::channel();
        self.send(ControllerEvent::AskPreset {
            preset,
            reply: Some(reply),
        })?;
        rx.await.map_err(|_| RuntimeError::Closed)?
    }

    pub fn abort(&self) -> Result<()> {
        self.send(ControllerEvent::Abort)
    }

    pub fn reset_conversation(&self) -> Result<()> {
        self.send(ControllerEvent::ResetConversation)
    }

    pub fn insert_code(&self, code: impl Into<String>) -> Result<()> {
        self.send(ControllerEvent::InsertCode(code.into()))
    }

    pub fn set_auth_info(&self, auth: AuthInfo) -> Result<()> {
        self.send(ControllerEvent::SetAuthInfo(auth))
    }

    pub fn update_settings(&self, patch: SettingsPatch) -> Result<()> {
        self.send(ControllerEvent::UpdateSettings(patch))
    }

    pub fn webview_loaded(&self) -> Result<()> {
        self.send(ControllerEvent::WebviewLoaded)
    }

    /// Stop the controller loop; an in-flight request is aborted.
    pub fn shutdown(&self) -> Result<()> {
        self.send(ControllerEvent::Shutdown)
    }
}
