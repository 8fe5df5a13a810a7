use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Fires at most once per `interval`.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns true, and restarts the interval, when the previous firing is at
    /// least `interval` old.
    pub fn try_fire(&mut self, now: Instant) -> bool {
        let ready = match self.last {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        };
        if ready {
            self.last = Some(now);
        }
        ready
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// At-most-one-outstanding flag. A second caller is turned away rather than
/// queued.
#[derive(Debug, Clone, Default)]
pub struct InFlight(Arc<AtomicBool>);

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Claim the flag. The flag is released when the ticket drops.
    pub fn try_begin(&self) -> Option<InFlightTicket> {
        self.0
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| InFlightTicket(self.0.clone()))
    }
}

#[derive(Debug)]
pub struct InFlightTicket(Arc<AtomicBool>);

impl Drop for InFlightTicket {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
