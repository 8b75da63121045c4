//! Request options and response types shared by every chat client.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::abort::AbortSignal;

/// Identifies where the next message continues an existing conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    pub parent_message_id: String,
}

impl ConversationContext {
    pub fn new(conversation_id: Option<String>, parent_message_id: impl Into<String>) -> Self {
        Self {
            conversation_id,
            parent_message_id: parent_message_id.into(),
        }
    }
}

/// Streaming update. `text` is everything received so far, not a delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialResponse {
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

/// Final result of a successful request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

impl ChatResponse {
    /// Continuation parameters for the message that follows this one.
    pub fn continuation(&self) -> ConversationContext {
        ConversationContext::new(self.conversation_id.clone(), self.id.clone())
    }
}

impl From<PartialResponse> for ChatResponse {
    fn from(partial: PartialResponse) -> Self {
        Self {
            id: partial.id,
            text: partial.text,
            parent_message_id: partial.parent_message_id,
            conversation_id: partial.conversation_id,
        }
    }
}

/// Receives streaming updates. Called from the request task; must not block.
pub type ProgressSink = Arc<dyn Fn(PartialResponse) + Send + Sync>;

/// Per-request options.
#[derive(Clone)]
pub struct SendOptions {
    pub on_progress: Option<ProgressSink>,
    pub timeout: Duration,
    pub abort: AbortSignal,
    pub conversation: Option<ConversationContext>,
}

impl SendOptions {
    pub fn new(timeout: Duration, abort: AbortSignal) -> Self {
        Self {
            on_progress: None,
            timeout,
            abort,
            conversation: None,
        }
    }

    pub fn with_progress(mut self, sink: ProgressSink) -> Self {
        self.on_progress = Some(sink);
        self
    }

    pub fn with_conversation(mut self, conversation: Option<ConversationContext>) -> Self {
        self.conversation = conversation;
        self
    }

    pub(crate) fn report(&self, partial: PartialResponse) {
        if let Some(sink) = &self.on_progress {
            sink(partial);
        }
    }
}

impl std::fmt::Debug for SendOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendOptions")
            .field("on_progress", &self.on_progress.as_ref().map(|_| "Some(ProgressSink)"))
            .field("timeout", &self.timeout)
            .field("abort", &self.abort)
            .field("conversation", &self.conversation)
            .finish()
    }
}
