//! Confirmation poll schedule

use std::time::Duration;

/// Backoff multiplier between two polls
const BACKOFF_MULTIPLIER: u32 = 2;

/// Settings of the post-create confirmation poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    /// Total time a created record may take to become visible
    pub timeout: Duration,
    /// Delay after the first miss
    pub initial_interval: Duration,
    /// Cap on the delay between polls
    pub max_interval: Duration,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            initial_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(5),
        }
    }
}

/// Exponential backoff without jitter
///
/// Each call to [`Backoff::next_delay`] returns the current interval and
/// doubles it for the next call, up to `max_interval`.
#[derive(Debug)]
pub struct Backoff {
    current: Duration,
    max_interval: Duration,
}

impl Backoff {
    pub fn new(policy: &ConfirmationPolicy) -> Self {
        Self {
            current: policy.initial_interval,
            max_interval: policy.max_interval,
        }
    }

    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * BACKOFF_MULTIPLIER).min(self.max_interval);
        delay
    }
}
