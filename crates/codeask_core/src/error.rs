use thiserror::Error;

/// Failure to parse a user-supplied name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("unknown context mode: {0}")]
    UnknownContextMode(String),

    #[error("unknown preset: {0}")]
    UnknownPreset(String),
}
