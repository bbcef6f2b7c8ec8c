//! Retry wrapper for idempotent chain reads.
//!
//! Only reads go through here. Transaction broadcasts are never retried.

use std::future::Future;

use crate::config::schema::RetryConfig;
use crate::resilience::backoff::calculate_backoff;

/// How often and how patiently to retry a read.
pub type RetryPolicy = RetryConfig;

/// Run `op` until it succeeds or `policy.max_attempts` attempts have failed.
///
/// Each failure is logged with `label`; the last error is returned.
pub async fn retry_async<T, E, F, Fut>(policy: &RetryPolicy, label: &str, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= max_attempts => {
                tracing::warn!(op = label, attempt, error = %e, "Giving up");
                return Err(e);
            }
            Err(e) => {
                let delay = calculate_backoff(attempt, policy.base_delay_ms, policy.max_delay_ms);
                tracing::warn!(
                    op = label,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
