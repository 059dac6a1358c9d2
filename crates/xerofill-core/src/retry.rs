use crate::{Error, Result};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

pub const DEFAULT_ATTEMPTS: u32 = 3;
pub const DEFAULT_BACKOFF: Duration = Duration::from_millis(500);

/// Bounded retry policy: up to `attempts - 1` guarded tries that log and
/// swallow failures, then one unguarded try so a persistent failure still
/// propagates to the caller.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    attempts: u32,
    backoff: Duration,
}

impl RetryPolicy {
    /// Create a policy. A budget below 2 attempts is rejected - with a
    /// single attempt there is nothing to retry.
    pub fn new(attempts: u32, backoff: Duration) -> Result<Self> {
        if attempts < 2 {
            return Err(Error::RetryBudget(attempts));
        }

        Ok(Self { attempts, backoff })
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn backoff(&self) -> Duration {
        self.backoff
    }

    /// Run `op` under this policy.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> std::result::Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: Display,
    {
        for attempt in 1..self.attempts {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    tracing::warn!(
                        "Attempt {attempt}/{} failed: {err} - retrying",
                        self.attempts
                    );
                    tokio::time::sleep(self.backoff).await;
                }
            }
        }

        // Final attempt runs unguarded
        op().await
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            backoff: DEFAULT_BACKOFF,
        }
    }
}
