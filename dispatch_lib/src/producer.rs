use std::time::Duration;

use dispatch_api::{Clock, Request};
use rand::Rng;
use tokio_util::sync::CancellationToken;

use crate::constants::GLOBAL_TARGET_RATE;
use crate::queue::RequestQueue;

/// Emits one `Request` per iteration at a randomized cadence whose
/// expectation matches the global target rate, then suspends for a
/// uniformly random interval in `[0, max_sleep_ms]`. Never blocks on
/// queue capacity -- the queue is unbounded by contract.
pub struct Producer {
    queue: RequestQueue,
    clock: Clock,
    max_sleep_ms: u64,
    next_req_id: u64,
}

impl Producer {
    /// `max_sleep_ms = ceil(1000 / R_global / num_workers * 1.05 * 2.0)`.
    /// The 1.05x2.0 factor deliberately overproduces so the queue never
    /// starves a worker waiting on fresh work.
    pub fn new(queue: RequestQueue, clock: Clock, num_workers: usize) -> Self {
        let max_sleep_ms = Self::max_sleep_ms(num_workers);
        Self {
            queue,
            clock,
            max_sleep_ms,
            next_req_id: 0,
        }
    }

    fn max_sleep_ms(num_workers: usize) -> u64 {
        let num_workers = num_workers.max(1) as f64;
        let raw = 1000.0 / f64::from(GLOBAL_TARGET_RATE) / num_workers * 1.05 * 2.0;
        raw.ceil() as u64
    }

    /// Runs until `cancel` is triggered. Does not drain or flush on
    /// cancellation -- the Producer simply stops emitting; outstanding
    /// queued requests are still available to workers.
    pub async fn run(mut self, cancel: CancellationToken) {
        loop {
            if self.queue.push(Request::new(self.next_req_id, self.clock.now_ms())).is_err() {
                tracing::warn!("request queue closed, producer stopping");
                return;
            }
            self.next_req_id += 1;

            let sleep_ms = if self.max_sleep_ms == 0 {
                0
            } else {
                rand::thread_rng().gen_range(0..=self.max_sleep_ms)
            };

            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(Duration::from_millis(sleep_ms)) => {}
            }
        }
    }
}
