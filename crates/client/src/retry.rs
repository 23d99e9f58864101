//! Bounded retry with backoff and jitter.

use gwadmin_core::BackoffConfig;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::{error, warn};

/// Run `operation` until it succeeds or `config.max_attempts` attempts fail.
///
/// Returns the last error once the budget is spent. Delays grow by
/// `backoff_multiplier` up to `max_delay`, each scaled by a random factor in
/// `[0.5, 1.5)` when the multiplier is above 1.
pub async fn retry_with_backoff<F, Fut, T, E>(
    config: &BackoffConfig,
    operation_name: &str,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0u32;
    let mut delay = config.initial_delay();

    loop {
        attempt += 1;

        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                if attempt >= max_attempts {
                    error!(
                        operation = %operation_name,
                        attempt,
                        error = %e,
                        "operation failed after max retries"
                    );
                    return Err(e);
                }

                // Fixed-interval budgets stay fixed.
                let sleep = if config.backoff_multiplier > 1.0 {
                    let jitter = rand::thread_rng().gen_range(0.5..1.5);
                    Duration::from_secs_f64(delay.as_secs_f64() * jitter)
                } else {
                    delay
                };

                warn!(
                    operation = %operation_name,
                    attempt,
                    error = %e,
                    delay_ms = sleep.as_millis() as u64,
                    "operation failed, retrying"
                );

                tokio::time::sleep(sleep).await;

                delay = Duration::from_secs_f64(
                    (delay.as_secs_f64() * config.backoff_multiplier)
                        .min(config.max_delay().as_secs_f64()),
                );
            }
        }
    }
}
