// SPDX-License-Identifier: BUSL-1.1
//! Exponential backoff for Hopster HTTP calls.
//!
//! Only transport failures (connection refused, timeouts) are retried.
//! Status codes are left to the caller: a 4xx or 5xx response is a
//! successful send and is returned as-is.

use std::future::Future;
use std::time::Duration;

/// Retry schedule for transport failures.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RetryPolicy {
    /// Retries after the initial attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each subsequent one.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.pow(attempt)
    }

    /// Call `f` until it yields a response, at most `max_retries + 1` times.
    pub(crate) async fn send<F, Fut>(
        &self,
        endpoint: &str,
        f: F,
    ) -> Result<reqwest::Response, reqwest::Error>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<reqwest::Response, reqwest::Error>>,
    {
        for attempt in 0..self.max_retries {
            match f().await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    let delay = self.delay_for(attempt);
                    tracing::warn!(
                        endpoint,
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        "Hopster request failed, retrying in {delay:?}: {e}"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
        f().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn delays_double() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_millis(200));
        assert_eq!(policy.delay_for(2), Duration::from_millis(800));
    }

    #[tokio::test]
    async fn exhausts_all_attempts_on_transport_failure() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy {
            max_retries: 2,
            base_delay: Duration::from_millis(1),
        };

        let result = policy
            .send("GET /status", || {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    reqwest::Client::builder()
                        .timeout(Duration::from_millis(50))
                        .build()
                        .unwrap()
                        .get("http://127.0.0.1:1/")
                        .send()
                        .await
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
