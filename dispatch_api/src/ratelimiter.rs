use std::time::Duration;

use tokio::time::sleep;

use crate::clock::Clock;
use crate::error::ApiError;

/// Per-worker gate enforcing a minimum inter-acquisition gap and a
/// sliding per-second quota. One instance per credential; never shared
/// across tasks (see the concurrency notes in `dispatch_lib::worker`).
///
/// Tracks the last `per_second_rate` acquisition timestamps in a ring
/// buffer so that "no more than R acquisitions in the last 1000ms" can
/// be checked in O(1) without the unbounded growth a `VecDeque` of all
/// acquisitions would need.
///
/// The original reference implementation seeds `last_acquire_ms` and the
/// ring with the sentinel value `0`, relying on wall-clock epoch
/// timestamps being far larger than that at any real acquisition. Here
/// timestamps are relative to the `Clock`'s own epoch (see
/// `Clock::now_ms`), so `0` is a value `now_ms()` can legitimately take;
/// an `Option<u64>` is used instead so "no prior acquisition" can't be
/// confused with "acquired at time zero".
pub struct RateLimiter {
    clock: Clock,
    min_gap_ms: u64,
    last_acquire_ms: Option<u64>,
    ring: Vec<Option<u64>>,
    idx: usize,
}

impl RateLimiter {
    /// `per_second_rate` is R, the max acquisitions in any 1000ms sliding
    /// window. `min_gap_ms` is G, the minimum interval between
    /// consecutive acquisitions.
    pub fn new(clock: Clock, per_second_rate: usize, min_gap_ms: u64) -> Self {
        assert!(per_second_rate > 0, "per_second_rate must be positive");
        Self {
            clock,
            min_gap_ms,
            last_acquire_ms: None,
            ring: vec![None; per_second_rate],
            idx: 0,
        }
    }

    /// Blocks until both the minimum-gap and sliding-window conditions
    /// hold, then records the acquisition. Returns `ApiError::Timeout` if
    /// `timeout_ms > 0` and that many milliseconds elapse first.
    ///
    /// The scoped-acquisition idiom from the design notes (a guard whose
    /// construction waits and whose destruction does nothing) is skipped
    /// here in favor of a plain `Result`-returning function: release does
    /// no work, so a guard type would add a `Drop` impl with an empty
    /// body and nothing else.
    pub async fn acquire(&mut self, timeout_ms: u64) -> Result<(), ApiError> {
        let enter_ms = self.clock.now_ms();
        loop {
            let now = self.clock.now_ms();
            if timeout_ms > 0 && now.saturating_sub(enter_ms) > timeout_ms {
                return Err(ApiError::Timeout);
            }

            if let Some(last) = self.last_acquire_ms {
                if now.saturating_sub(last) <= self.min_gap_ms {
                    let wait = last + self.min_gap_ms - now;
                    sleep(Duration::from_millis(wait)).await;
                    continue;
                }
            }

            if let Some(slot) = self.ring[self.idx] {
                if now.saturating_sub(slot) < 1000 {
                    let wait = slot + 1000 - now;
                    sleep(Duration::from_millis(wait)).await;
                    continue;
                }
            }

            self.last_acquire_ms = Some(now);
            self.ring[self.idx] = Some(now);
            self.idx = (self.idx + 1) % self.ring.len();
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_acquire_is_immediate() {
        tokio::time::pause();
        let clock = Clock::new();
        let mut limiter = RateLimiter::new(clock, 20, 50);
        let before = clock.now_ms();
        limiter.acquire(0).await.unwrap();
        assert_eq!(clock.now_ms(), before);
    }

    #[tokio::test]
    async fn enforces_minimum_gap() {
        tokio::time::pause();
        let clock = Clock::new();
        let mut limiter = RateLimiter::new(clock, 20, 50);
        limiter.acquire(0).await.unwrap();
        let t0 = clock.now_ms();
        limiter.acquire(0).await.unwrap();
        let t1 = clock.now_ms();
        assert!(t1 - t0 >= 50);
    }

    #[tokio::test]
    async fn enforces_sliding_window_quota() {
        tokio::time::pause();
        let clock = Clock::new();
        // rate=3, gap=0 so only the window check matters.
        let mut limiter = RateLimiter::new(clock, 3, 0);
        for _ in 0..3 {
            limiter.acquire(0).await.unwrap();
        }
        assert_eq!(clock.now_ms(), 0, "first 3 acquisitions should not wait");

        // The 4th acquisition reuses the ring slot from the 1st (time 0),
        // so it must wait until that slot is >= 1000ms in the past.
        limiter.acquire(0).await.unwrap();
        assert_eq!(clock.now_ms(), 1000);
    }

    #[tokio::test]
    async fn never_exceeds_rate_in_any_one_second_window() {
        tokio::time::pause();
        let clock = Clock::new();
        let rate = 20usize;
        let mut limiter = RateLimiter::new(clock, rate, 50);
        let mut acquisitions = Vec::new();
        for _ in 0..100 {
            limiter.acquire(0).await.unwrap();
            acquisitions.push(clock.now_ms());
        }
        for window_start in acquisitions.iter().copied() {
            let count = acquisitions
                .iter()
                .filter(|&&t| t >= window_start && t < window_start + 1000)
                .count();
            assert!(count <= rate, "window starting at {window_start} had {count} acquisitions");
        }
    }

    #[tokio::test]
    async fn timeout_fires_when_slot_unavailable_in_time() {
        tokio::time::pause();
        let clock = Clock::new();
        // Saturate the window with a tight rate so the next acquisition
        // must wait well beyond a short timeout.
        let mut limiter = RateLimiter::new(clock, 1, 0);
        limiter.acquire(0).await.unwrap();
        let result = limiter.acquire(100).await;
        assert!(matches!(result, Err(ApiError::Timeout)));
    }

    #[tokio::test]
    async fn succeeds_within_timeout_once_slot_frees_up() {
        tokio::time::pause();
        let clock = Clock::new();
        let mut limiter = RateLimiter::new(clock, 1, 0);
        limiter.acquire(0).await.unwrap();

        let handle = tokio::spawn(async move {
            limiter.acquire(2000).await.unwrap();
            clock.now_ms()
        });

        tokio::time::advance(Duration::from_millis(1000)).await;
        tokio::task::yield_now().await;
        let finished_at = handle.await.unwrap();
        assert!(finished_at >= 1000);
    }
}
