//! Span macros and recording helpers

/// Span for work the session controller does on behalf of one request.
///
/// ```rust
/// use codeask_observability::session_span;
///
/// let span = session_span!(3u64, "dispatch");
/// let _guard = span.enter();
/// ```
#[macro_export]
macro_rules! session_span {
    ($sequence:expr, $operation:expr) => {
        tracing::info_span!(
            "session.operation",
            session.sequence = $sequence,
            operation = $operation,
            error = tracing::field::Empty,
            error.message = tracing::field::Empty,
        )
    };
}

/// Span around one chat client call.
///
/// ```rust
/// use codeask_observability::request_span;
///
/// let span = request_span!("api", 3u64);
/// let _guard = span.enter();
/// ```
#[macro_export]
macro_rules! request_span {
    ($client_id:expr, $sequence:expr) => {
        tracing::info_span!(
            "chat.request",
            chat.client = $client_id,
            session.sequence = $sequence,
            chat.duration_ms = tracing::field::Empty,
            error = tracing::field::Empty,
            error.message = tracing::field::Empty,
        )
    };
}

/// Mark the current span as failed and log the error.
pub fn record_error<E: std::error::Error>(error: &E) {
    let span = tracing::Span::current();
    span.record("error", true);
    span.record("error.message", error.to_string());
    tracing::error!(error = %error, "Operation failed");
}

/// Record a duration in milliseconds on the current span under `key`.
pub fn record_duration(key: &str, duration: std::time::Duration) {
    let span = tracing::Span::current();
    span.record(key, duration.as_millis() as u64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Failure;

    impl std::fmt::Display for Failure {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "failure")
        }
    }

    impl std::error::Error for Failure {}

    #[test]
    fn test_helpers_work_without_subscriber() {
        let span = crate::session_span!(1u64, "test");
        let _guard = span.enter();
        record_error(&Failure);
        record_duration("chat.duration_ms", std::time::Duration::from_millis(5));
    }
}
