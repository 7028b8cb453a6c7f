//! Retry with exponential back-off and jitter for the service clients.
//!
//! [`retry_with_backoff`] wraps any fallible async operation and retries on
//! transient errors (network failures, 429, 5xx). Everything else is returned
//! immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::ClientError;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:**
/// - Network-level failures: timeout, connection reset.
/// - [`ClientError::RateLimited`]: the service asked us to back off.
/// - [`ClientError::UnexpectedStatus`] with a 5xx status.
///
/// **Not retriable:** auth failures, 404, other 4xx, malformed bodies and
/// input validation errors. Retrying won't change the answer.
pub(crate) fn is_retriable(err: &ClientError) -> bool {
    match err {
        ClientError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        ClientError::RateLimited { .. } => true,
        ClientError::UnexpectedStatus { status, .. } => *status >= 500,
        ClientError::Deserialize { .. }
        | ClientError::Unauthorized { .. }
        | ClientError::NotFound { .. }
        | ClientError::InvalidBaseUrl { .. }
        | ClientError::InvalidInput(_)
        | ClientError::MissingConfig(_)
        | ClientError::QrCodeUnavailable { .. }
        | ClientError::Core(_) => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// Back-off schedule with `backoff_base_ms = 500`:
///
/// | Attempt | Sleep before next attempt  |
/// |---------|----------------------------|
/// | 1       | 500 ms × 2⁰ ± 25 % jitter  |
/// | 2       | 500 ms × 2¹ ± 25 % jitter  |
/// | 3       | 500 ms × 2² ± 25 % jitter  |
///
/// Delay is capped at 30 s. A `Retry-After` hint from a 429 raises the delay
/// to at least that many seconds (still under the cap).
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ClientError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
{
    const MAX_DELAY_MS: u64 = 30_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let hinted = match &err {
                    ClientError::RateLimited {
                        retry_after_secs, ..
                    } => computed.max(retry_after_secs.saturating_mul(1_000)),
                    _ => computed,
                };
                let capped = hinted.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient service error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
