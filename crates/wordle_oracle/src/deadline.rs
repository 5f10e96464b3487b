//! Optional per-call RPC deadline.

use std::future::Future;
use std::time::Duration;

use wordle_oracle_chain::{LedgerError, LedgerResult};

/// Runs `call` under `limit`, or unbounded when `limit` is `None`.
pub(crate) async fn within<T, F>(
    limit: Option<Duration>,
    operation: &'static str,
    call: F,
) -> LedgerResult<T>
where
    F: Future<Output = LedgerResult<T>>,
{
    let Some(limit) = limit else {
        return call.await;
    };

    tokio::time::timeout(limit, call)
        .await
        .unwrap_or_else(|_| {
            Err(LedgerError::Timeout {
                operation,
                timeout_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
            })
        })
}
