//! Capped exponential backoff for polling loops
//!
//! The work queue polls the database while waiting for new jobs. Each empty
//! poll grows the delay until it reaches the cap.

use std::time::Duration;

/// Backoff policy
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffPolicy {
    pub initial: Duration,
    pub max: Duration,
    pub factor: u32,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(100),
            max: Duration::from_secs(2),
            factor: 2,
        }
    }
}

impl BackoffPolicy {
    /// Start a fresh sequence of delays
    pub fn start(&self) -> Backoff {
        Backoff {
            policy: self.clone(),
            next: self.initial,
        }
    }
}

/// Iterator over successive delays
#[derive(Debug, Clone)]
pub struct Backoff {
    policy: BackoffPolicy,
    next: Duration,
}

impl Backoff {
    /// Delay to wait now; advances the sequence
    pub fn next_delay(&mut self) -> Duration {
        let current = self.next.min(self.policy.max);
        self.next = current
            .checked_mul(self.policy.factor.max(1))
            .unwrap_or(self.policy.max)
            .min(self.policy.max);
        current
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        Some(self.next_delay())
    }
}
