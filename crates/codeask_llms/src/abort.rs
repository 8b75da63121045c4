//! Single-use cancellation for one chat request.
//!
//! `AbortHandle` is owned by whoever may cancel the request and is consumed by
//! [`AbortHandle::abort`]; a signalled handle cannot be reused. The request
//! only receives the observing half, [`AbortSignal`].

use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub struct AbortHandle {
    token: CancellationToken,
}

#[derive(Debug, Clone)]
pub struct AbortSignal {
    token: CancellationToken,
}

impl AbortHandle {
    /// Create a fresh handle together with the signal handed to the client.
    pub fn new() -> (Self, AbortSignal) {
        let token = CancellationToken::new();
        let signal = AbortSignal {
            token: token.clone(),
        };
        (Self { token }, signal)
    }

    /// Another observer of this handle.
    pub fn signal(&self) -> AbortSignal {
        AbortSignal {
            token: self.token.clone(),
        }
    }

    pub fn abort(self) {
        self.token.cancel();
    }
}

impl AbortSignal {
    /// A signal that never fires, for callers that cannot cancel.
    pub fn never() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the owning handle is aborted.
    pub async fn aborted(&self) {
        self.token.cancelled().await
    }
}
