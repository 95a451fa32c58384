//! Reconnect pacing for the socket worker.

use std::time::{Duration, Instant};

use rand::{Rng, SeedableRng, rngs::StdRng};

use super::config::BackoffPolicy;

const MIN_SLEEP: Duration = Duration::from_millis(10);

/// Tracks consecutive connection failures and produces jittered delays.
pub struct Backoff {
    policy: BackoffPolicy,
    current: Duration,
    failing_since: Option<Instant>,
    healthy_since: Option<Instant>,
    rng: StdRng,
}

impl Backoff {
    pub fn new(policy: BackoffPolicy) -> Self {
        Self {
            current: policy.base,
            failing_since: None,
            healthy_since: None,
            rng: StdRng::from_entropy(),
            policy,
        }
    }

    /// Note a successful connect or write.
    ///
    /// The delay window shrinks back to the base once the connection has been
    /// healthy for `reset_after`.
    pub fn record_success(&mut self, now: Instant) {
        let since = *self.healthy_since.get_or_insert(now);
        if now.duration_since(since) >= self.policy.reset_after
            || self
                .failing_since
                .is_some_and(|start| now.duration_since(start) >= self.policy.reset_after)
        {
            self.current = self.policy.base;
            self.failing_since = None;
        }
    }

    /// Delay before the next attempt, or `None` once the retry deadline
    /// measured from the first failure has passed.
    pub fn next_delay(&mut self, now: Instant) -> Option<Duration> {
        self.healthy_since = None;
        let start = *self.failing_since.get_or_insert(now);
        if now.duration_since(start) >= self.policy.deadline {
            return None;
        }
        if now != start {
            self.current = self.current.saturating_mul(2).min(self.policy.cap);
        }
        let max_ms = u64::try_from(self.current.as_millis()).unwrap_or(u64::MAX);
        let min_ms = u64::try_from(MIN_SLEEP.as_millis()).unwrap_or(10);
        let sleep_ms = match max_ms {
            0 => min_ms,
            ms if ms <= min_ms => ms,
            ms => self.rng.gen_range(min_ms..=ms),
        };
        Some(Duration::from_millis(sleep_ms))
    }
}
