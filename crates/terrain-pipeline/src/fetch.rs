//! Source tile fetching with timeout and exponential backoff.

use crate::error::FetchError;
use crate::source::ElevationSource;
use std::time::Duration;
use terrain_dem::TileCoord;
use tracing::{debug, warn};

/// How often and how patiently a source tile is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first failed attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Time budget for each individual attempt.
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            attempt_timeout: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry number `attempt` (0-based): `base * 2^attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(1u32 << attempt.min(16))
    }
}

/// Fetch one tile, retrying transient failures.
///
/// Each attempt is bounded by `policy.attempt_timeout`. Non-retryable
/// failures (the tile does not exist upstream) return immediately.
pub async fn fetch_with_retry<S>(
    source: &S,
    coord: TileCoord,
    policy: &RetryPolicy,
) -> Result<Vec<u8>, FetchError>
where
    S: ElevationSource,
{
    let mut attempt = 0u32;
    loop {
        let result = match tokio::time::timeout(policy.attempt_timeout, source.fetch(coord)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(policy.attempt_timeout)),
        };

        let err = match result {
            Ok(bytes) => {
                if attempt > 0 {
                    debug!(tile = %coord, attempts = attempt + 1, "Fetch succeeded after retry");
                }
                return Ok(bytes);
            }
            Err(err) => err,
        };

        if !err.is_retryable() {
            debug!(tile = %coord, error = %err, "Source tile unavailable");
            return Err(err);
        }
        if attempt >= policy.max_retries {
            warn!(
                tile = %coord,
                attempts = attempt + 1,
                error = %err,
                "Giving up on source tile"
            );
            return Err(err);
        }

        let delay = policy.delay_for(attempt);
        warn!(
            tile = %coord,
            attempt = attempt + 1,
            max_attempts = policy.max_retries + 1,
            error = %err,
            delay_ms = delay.as_millis() as u64,
            "Fetch failed, retrying"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
