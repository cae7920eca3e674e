use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// Source of the current instant used for expiry checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant { Instant::now() }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    start: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self { Self { start: Instant::now(), offset: Mutex::new(Duration::ZERO) } }

    pub fn advance(&self, by: Duration) { *self.offset.lock() += by; }
}

impl Default for ManualClock {
    fn default() -> Self { Self::new() }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant { self.start + *self.offset.lock() }
}
