use std::time::Duration;

use super::{HttpClient, HttpRequest, HttpResponse, Result};

/// Bounded retry for transport failures.
///
/// HTTP error statuses are responses, not failures, and never trigger a retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    /// Delay before the first retry; doubles for each subsequent one.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::ZERO,
        }
    }

    /// Delay before retry number `retry` (1-based).
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 1u32 << retry.saturating_sub(1).min(16);
        self.backoff.saturating_mul(factor)
    }

    /// Upper bound on one request's wall time: every attempt timing out plus all backoffs.
    #[must_use]
    pub fn worst_case(&self, timeout: Duration) -> Duration {
        let attempts = self.max_retries.saturating_add(1);
        let sleeps = (1..=self.max_retries)
            .map(|r| self.delay_for(r))
            .fold(Duration::ZERO, Duration::saturating_add);
        timeout.saturating_mul(attempts).saturating_add(sleeps)
    }
}

#[derive(Debug)]
pub struct Attempted<T> {
    pub result: Result<T>,
    /// Total attempts made, including the first one.
    pub attempts: u32,
}

impl HttpClient {
    pub async fn request_with_retry(
        &self,
        req: HttpRequest,
        policy: &RetryPolicy,
    ) -> Attempted<HttpResponse> {
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            match self.request(req.clone()).await {
                Ok(res) => {
                    return Attempted {
                        result: Ok(res),
                        attempts,
                    };
                }
                Err(err) if err.is_retryable() && attempts <= policy.max_retries => {
                    tokio::time::sleep(policy.delay_for(attempts)).await;
                }
                Err(err) => {
                    return Attempted {
                        result: Err(err),
                        attempts,
                    };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles() {
        let p = RetryPolicy {
            max_retries: 3,
            backoff: Duration::from_millis(100),
        };
        assert_eq!(p.delay_for(1), Duration::from_millis(100));
        assert_eq!(p.delay_for(2), Duration::from_millis(200));
        assert_eq!(p.delay_for(3), Duration::from_millis(400));
    }

    #[test]
    fn worst_case_includes_every_attempt() {
        let p = RetryPolicy::default();
        // 3 attempts x 1s + 250ms + 500ms
        assert_eq!(p.worst_case(Duration::from_secs(1)), Duration::from_millis(3750));
        assert_eq!(RetryPolicy::none().worst_case(Duration::from_secs(1)), Duration::from_secs(1));
    }
}
