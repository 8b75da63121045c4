//! Chat client trait and request deadline handling

mod trait_def;

pub use trait_def::ChatClient;

use std::future::Future;
use std::time::Duration;

use crate::abort::AbortSignal;
use crate::error::{Error, Result};

/// Race `fut` against the abort signal and the timeout.
///
/// Abort wins over a result that becomes ready at the same time.
pub async fn run_with_deadline<F, T>(fut: F, timeout: Duration, abort: &AbortSignal) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    if abort.is_aborted() {
        return Err(Error::Aborted);
    }

    tokio::select! {
        biased;
        _ = abort.aborted() => Err(Error::Aborted),
        res = tokio::time::timeout(timeout, fut) => {
            res.unwrap_or_else(|_| Err(Error::Timeout(timeout)))
        }
    }
}
