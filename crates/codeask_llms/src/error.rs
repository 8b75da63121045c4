//! Error types for chat clients

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing credentials for {0}")]
    MissingCredentials(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Request aborted")]
    Aborted,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn provider_error(message: impl Into<String>) -> Self {
        Error::Provider(message.into())
    }

    pub fn stream_error(message: impl Into<String>) -> Self {
        Error::Stream(message.into())
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, Error::Aborted)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message() {
        let err = Error::Timeout(Duration::from_secs(60));
        assert_eq!(err.to_string(), "Request timed out after 60s");
    }

    #[test]
    fn test_sub_second_timeout_message() {
        let err = Error::Timeout(Duration::from_millis(250));
        assert_eq!(err.to_string(), "Request timed out after 250ms");
    }

    #[test]
    fn test_missing_credentials_message() {
        let err = Error::MissingCredentials("api key".to_string());
        assert_eq!(err.to_string(), "Missing credentials for api key");
    }

    #[test]
    fn test_is_aborted() {
        assert!(Error::Aborted.is_aborted());
        assert!(!Error::stream_error("eof").is_aborted());
    }
}
