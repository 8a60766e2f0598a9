//! Bounded retrier
//!
//! Wraps a fallible async operation and retries it with a fixed delay. Each
//! failure is logged before the next attempt; once the budget is spent the
//! last error is handed back untouched.

use std::fmt::Display;
use std::future::Future;

use relay_core::domain::retry::RetryBudget;
use tokio::time::sleep;
use tracing::warn;

/// Run `operation` until it succeeds or the retry budget is spent
///
/// `operation` is invoked at most `budget.max_retries + 1` times. `name`
/// describes the operation in log lines ("read build state").
pub async fn retry<T, E, F, Fut>(
    budget: RetryBudget,
    name: &str,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let attempts = budget.max_retries.saturating_add(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                warn!("Failed to {} (attempt {}/{}): {}", name, attempt, attempts, e);

                if attempt >= attempts {
                    return Err(e);
                }

                sleep(budget.delay).await;
            }
        }
    }
}
