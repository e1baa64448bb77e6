use std::{num::NonZeroUsize, time::Duration};

use tokio::time::sleep;

use crate::prelude::*;

/// Fixed-delay retry budget for the device writes.
///
/// The attempt is always made at least once.
#[must_use]
#[derive(Copy, Clone, Debug)]
pub struct RetryPolicy {
    pub max_attempts: NonZeroUsize,
    pub delay: Duration,
}

impl RetryPolicy {
    /// Call `attempt` until it reports a success or the attempts are exhausted.
    ///
    /// Errors are propagated immediately, only an unsuccessful outcome is retried.
    ///
    /// # Returns
    ///
    /// Whether the last attempt succeeded.
    pub async fn run<F, Fut>(self, mut attempt: F) -> Result<bool>
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Result<bool>>,
    {
        let max_attempts = self.max_attempts.get();
        for n_attempt in 1..=max_attempts {
            if attempt(n_attempt).await? {
                return Ok(true);
            }
            if n_attempt != max_attempts {
                debug!(n_attempt, delay = ?self.delay, "retrying…");
                sleep(self.delay).await;
            }
        }
        Ok(false)
    }
}
