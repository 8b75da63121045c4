//! Runtime error types

use thiserror::Error;

use crate::config::AuthMode;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Not authenticated: no credentials configured for {0} mode")]
    AuthenticationMissing(AuthMode),

    #[error("Chat request failed: {0}")]
    Transport(#[from] codeask_llms::Error),

    #[error("Editor error: {0}")]
    Host(String),

    #[error("Session controller is not running")]
    Closed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RuntimeError {
    pub fn host(message: impl Into<String>) -> Self {
        RuntimeError::Host(message.into())
    }
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
