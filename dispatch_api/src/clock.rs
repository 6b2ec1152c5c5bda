use tokio::time::Instant;

/// Monotonic millisecond timestamp source.
///
/// Backed by [`tokio::time::Instant`] rather than `SystemTime` so that
/// tests can drive it deterministically with `tokio::time::pause` and
/// `tokio::time::advance`. All components that compare timestamps --
/// the rate limiter's gap/window checks, the worker's TTL check -- must
/// read `now_ms()` from the same `Clock` instance for those comparisons
/// to be well-defined.
#[derive(Clone, Copy, Debug)]
pub struct Clock {
    epoch: Instant,
}

impl Clock {
    /// Starts a new clock with its epoch at the current instant.
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }

    /// Milliseconds elapsed since this clock's epoch. Monotonically
    /// non-decreasing for the lifetime of the clock.
    pub fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
