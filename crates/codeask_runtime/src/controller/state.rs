//! Session and request state owned by the controller.

use codeask_core::WorkingState;
use codeask_llms::{AbortHandle, ConversationContext};

/// Identifies one dispatched request. `generation` changes whenever the
/// session is dropped, so a sequence number reused by a fresh session never
/// matches callbacks from the old one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub generation: u64,
    pub sequence: u64,
}

/// Request state. The abort handle lives only as long as its request is current.
#[derive(Debug, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Asking { ticket: Ticket, abort: AbortHandle },
}

impl SessionState {
    pub fn working_state(&self) -> WorkingState {
        match self {
            SessionState::Idle => WorkingState::Idle,
            SessionState::Asking { .. } => WorkingState::Asking,
        }
    }

    pub fn is_asking(&self) -> bool {
        matches!(self, SessionState::Asking { .. })
    }

    /// Whether callbacks tagged with `ticket` still belong to the live request.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        matches!(self, SessionState::Asking { ticket: live, .. } if *live == ticket)
    }
}

/// Conversation bookkeeping, created lazily on the first request.
#[derive(Debug, Default)]
pub(crate) struct Session {
    pub message_sequence: u64,
    pub conversation: Option<ConversationContext>,
}
