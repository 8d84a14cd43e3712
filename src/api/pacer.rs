// src/api/pacer.rs
//! Client-side request pacing.
//!
//! Notion allows an average of three requests per second per integration.
//! The pacer hands out evenly spaced send slots shared by every clone of the
//! client, so concurrent enrichment tasks cannot burst past the limit.

use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::Instant;

pub struct RequestPacer {
    interval: Duration,
    next_slot: Mutex<Instant>,
}

impl RequestPacer {
    /// A pacer allowing `requests_per_second` on average.
    ///
    /// Non-positive or non-finite rates disable pacing.
    pub fn new(requests_per_second: f64) -> Self {
        let interval = if requests_per_second.is_finite() && requests_per_second > 0.0 {
            Duration::from_secs_f64(1.0 / requests_per_second)
        } else {
            Duration::ZERO
        };
        Self {
            interval,
            next_slot: Mutex::new(Instant::now()),
        }
    }

    pub fn unlimited() -> Self {
        Self::new(0.0)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Waits for the next free send slot.
    pub async fn acquire(&self) {
        if self.interval.is_zero() {
            return;
        }

        let wait = {
            let mut next = self.next_slot.lock();
            let now = Instant::now();
            let slot = (*next).max(now);
            *next = slot + self.interval;
            slot - now
        };

        if !wait.is_zero() {
            log::trace!("Pacing request for {:?}", wait);
            tokio::time::sleep(wait).await;
        }
    }
}

impl std::fmt::Debug for RequestPacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestPacer")
            .field("interval", &self.interval)
            .finish()
    }
}
