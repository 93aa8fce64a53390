//! Outbound call pacing
//!
//! [`RateLimiter`] spaces acquisitions exactly `1/N` seconds apart. Idle time
//! is never banked: after a quiet period the next call goes out immediately
//! and the one after it still waits a full interval, so no one-second window
//! ever sees more than `N` calls.
//!
//! One limiter is shared by every operation of a
//! [`Reconciler`](crate::Reconciler); concurrent callers queue on the same
//! schedule, giving a global ceiling rather than a per-caller one.

use std::num::NonZeroU32;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;
use tracing::trace;

/// Default number of calls per second
pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 5;

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Token pacer bounding calls per second
#[derive(Debug)]
pub struct RateLimiter {
    /// Spacing between two consecutive acquisitions
    interval: Duration,

    /// Earliest instant the next acquisition may complete
    next_slot: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Create a limiter allowing `per_second` acquisitions per second
    pub fn new(per_second: NonZeroU32) -> Self {
        Self {
            // Rounded up so that N intervals never add up to less than a second
            interval: Duration::from_nanos(NANOS_PER_SEC.div_ceil(u64::from(per_second.get()))),
            next_slot: Mutex::new(None),
        }
    }

    /// Spacing between two acquisitions
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until this caller may issue one call
    ///
    /// Never fails. Dropping the returned future before it completes gives up
    /// the wait; the reserved slot is handed back if no later caller has
    /// queued behind it.
    pub async fn acquire(&self) {
        let now = Instant::now();
        let slot = self.reserve(now);
        if slot > now {
            trace!(wait_ms = (slot - now).as_millis() as u64, "Waiting for rate limit slot");
            let pending = PendingSlot {
                limiter: self,
                slot,
            };
            tokio::time::sleep_until(slot).await;
            std::mem::forget(pending);
        }
    }

    /// Reserve the next free slot at or after `now`
    fn reserve(&self, now: Instant) -> Instant {
        // The stored instant stays valid even if a holder panicked
        let mut next = self
            .next_slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let slot = match *next {
            Some(scheduled) if scheduled > now => scheduled,
            _ => now,
        };
        *next = Some(slot + self.interval);
        slot
    }

    /// Give back `slot` if it is still the last one reserved
    fn release(&self, slot: Instant) {
        let mut next = self
            .next_slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if *next == Some(slot + self.interval) {
            trace!("Returning unused rate limit slot");
            *next = Some(slot);
        }
    }
}

/// Reserved slot whose wait has not finished yet
///
/// Dropped only when the waiting future is cancelled.
struct PendingSlot<'a> {
    limiter: &'a RateLimiter,
    slot: Instant,
}

impl Drop for PendingSlot<'_> {
    fn drop(&mut self) {
        self.limiter.release(self.slot);
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(NonZeroU32::new(DEFAULT_REQUESTS_PER_SECOND).unwrap_or(NonZeroU32::MIN))
    }
}
