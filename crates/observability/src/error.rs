//! Error types for observability crate

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ObservabilityError {
    /// Exporter or subscriber could not be set up
    #[error("Failed to initialize observability: {0}")]
    InitFailed(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
