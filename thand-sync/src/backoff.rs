//! Retry/backoff policy for sync activities (§4.G): initial interval 1s,
//! coefficient 2, max interval 100s, max 10 attempts. This computes the
//! delay sequence only — it does not schedule retries itself, since the
//! durable workflow engine that actually drives retries is an out-of-scope
//! external collaborator (§1, §4.G).

use std::time::Duration;

pub const INITIAL_INTERVAL: Duration = Duration::from_secs(1);
pub const COEFFICIENT: u32 = 2;
pub const MAX_INTERVAL: Duration = Duration::from_secs(100);
pub const MAX_ATTEMPTS: u32 = 10;

/// The delay before attempt number `attempt` (1-indexed: the delay *before*
/// the first retry, i.e. after attempt 1 fails, is `next_delay(1)`).
/// Returns `None` once `attempt >= MAX_ATTEMPTS`, signalling the workflow
/// should give up.
pub fn next_delay(attempt: u32) -> Option<Duration> {
    if attempt >= MAX_ATTEMPTS {
        return None;
    }
    let factor = COEFFICIENT.saturating_pow(attempt.saturating_sub(1));
    let scaled = INITIAL_INTERVAL.saturating_mul(factor);
    Some(scaled.min(MAX_INTERVAL))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_sequence_doubles_until_capped() {
        assert_eq!(next_delay(1), Some(Duration::from_secs(1)));
        assert_eq!(next_delay(2), Some(Duration::from_secs(2)));
        assert_eq!(next_delay(3), Some(Duration::from_secs(4)));
        assert_eq!(next_delay(7), Some(Duration::from_secs(64)));
        assert_eq!(next_delay(8), Some(Duration::from_secs(100)));
    }

    #[test]
    fn exhausts_after_max_attempts() {
        assert!(next_delay(10).is_none());
        assert!(next_delay(11).is_none());
    }
}
