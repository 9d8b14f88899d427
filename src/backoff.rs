/// file: src/backoff.rs
/// description: exponential reconnect backoff for the push connection
use std::time::Duration;

/// First retry delay after an abnormal close.
pub const BASE_DELAY_MS: u64 = 1_000;
/// Ceiling for the retry delay; attempts past this retry at a fixed interval.
pub const MAX_DELAY_MS: u64 = 30_000;

/// Reconnect schedule: `delay(attempt) = min(base * 2^attempt, cap)`.
///
/// The attempt counter resets to zero on every successful open and advances
/// on every abnormal close, so a flapping connection walks back up the curve
/// from the start each time it manages to connect.
#[derive(Debug, Default, Clone)]
pub struct ReconnectPolicy {
    attempt: u32,
}

impl ReconnectPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pure form of the schedule, usable without a policy instance.
    pub fn delay_for(attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        let ms = BASE_DELAY_MS.saturating_mul(factor).min(MAX_DELAY_MS);
        Duration::from_millis(ms)
    }

    /// Delay to wait before the next attempt; advances the counter.
    pub fn next_delay(&mut self) -> Duration {
        let delay = Self::delay_for(self.attempt);
        self.attempt = self.attempt.saturating_add(1);
        delay
    }

    /// Called on a successful open.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_is_capped_exponential() {
        assert_eq!(ReconnectPolicy::delay_for(0), Duration::from_millis(1_000));
        assert_eq!(ReconnectPolicy::delay_for(1), Duration::from_millis(2_000));
        assert_eq!(ReconnectPolicy::delay_for(2), Duration::from_millis(4_000));
        assert_eq!(ReconnectPolicy::delay_for(3), Duration::from_millis(8_000));
        assert_eq!(ReconnectPolicy::delay_for(4), Duration::from_millis(16_000));
        assert_eq!(ReconnectPolicy::delay_for(5), Duration::from_millis(30_000));
        assert_eq!(ReconnectPolicy::delay_for(6), Duration::from_millis(30_000));
    }

    #[test]
    fn schedule_is_non_decreasing_and_total() {
        let mut prev = Duration::ZERO;
        for attempt in [0, 1, 2, 3, 10, 31, 32, 63, 64, 65, u32::MAX] {
            let delay = ReconnectPolicy::delay_for(attempt);
            assert!(delay >= prev, "delay regressed at attempt {attempt}");
            assert!(delay <= Duration::from_millis(MAX_DELAY_MS));
            prev = delay;
        }
    }

    #[test]
    fn three_abnormal_closes_walk_the_curve() {
        let mut policy = ReconnectPolicy::new();
        assert_eq!(policy.next_delay(), Duration::from_millis(1_000));
        assert_eq!(policy.next_delay(), Duration::from_millis(2_000));
        assert_eq!(policy.next_delay(), Duration::from_millis(4_000));
    }

    #[test]
    fn successful_open_resets_the_schedule() {
        let mut policy = ReconnectPolicy::new();
        for _ in 0..7 {
            policy.next_delay();
        }
        policy.reset();
        assert_eq!(policy.attempt(), 0);
        assert_eq!(policy.next_delay(), Duration::from_millis(1_000));
    }
}
