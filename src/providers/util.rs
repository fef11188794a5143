use anyhow::Error;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// How often and how patiently a failed request is repeated.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Attempts after the first one.
    pub retries: usize,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(retries: usize, delay_ms: u64) -> Self {
        Self {
            retries,
            delay: Duration::from_millis(delay_ms),
        }
    }
}

/// Retries an async request until it succeeds or the policy is exhausted.
///
/// Returns the last error once `1 + policy.retries` attempts have failed.
pub async fn with_retry<F, Fut, T>(mut operation: F, policy: RetryPolicy) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, reqwest::Error>>,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(val) => return Ok(val),
            Err(err) => {
                if attempt > policy.retries {
                    return Err(err.into());
                }
                debug!(
                    attempt,
                    retries = policy.retries,
                    error = %err,
                    "Request failed, retrying"
                );
                attempt += 1;
                tokio::time::sleep(policy.delay).await;
            }
        }
    }
}

/// Joins a base URL and a relative endpoint path with exactly one slash.
pub fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("http://fees.test/api", "GetCarTypes"),
            "http://fees.test/api/GetCarTypes"
        );
        assert_eq!(
            join_url("http://fees.test/api/", "/GetCarTypes"),
            "http://fees.test/api/GetCarTypes"
        );
    }
}
