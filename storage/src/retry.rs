//! Backoff helper for transient store errors.
//!
//! Only [`StorageError::Database`] is retried; `NotFound` and `Duplicate*`
//! are definitive and returned immediately. Attempts are bounded so a dead
//! store fails an event instead of hanging the dispatcher.

use crate::error::StorageError;
use std::future::Future;
use std::time::Duration;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;
use tracing::warn;

const RETRY_BASE_DELAY_MS: u64 = 50;
const RETRY_MAX_DELAY: Duration = Duration::from_secs(2);
const MAX_RETRIES: usize = 3;

/// Runs `action`, retrying transient failures with jittered exponential
/// backoff.
pub async fn with_backoff<T, A, F>(op: &'static str, mut action: A) -> Result<T, StorageError>
where
    A: FnMut() -> F,
    F: Future<Output = Result<T, StorageError>>,
{
    let strategy = ExponentialBackoff::from_millis(RETRY_BASE_DELAY_MS)
        .max_delay(RETRY_MAX_DELAY)
        .take(MAX_RETRIES)
        .map(jitter);

    RetryIf::start(
        strategy,
        || action(),
        |e: &StorageError| {
            let transient = e.is_transient();
            if transient {
                warn!(op = %op, error = %e, "Transient store error, retrying");
            }
            transient
        },
    )
    .await
}
