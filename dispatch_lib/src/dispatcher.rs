use dispatch_api::{ApiClient, Clock};
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::producer::Producer;
use crate::queue::RequestQueue;
use crate::worker::Worker;

/// Top-level wiring: constructs the shared queue, one Producer task, and
/// one Worker task per credential, then runs them concurrently until
/// interrupted.
pub struct Dispatcher {
    config: Config,
}

impl Dispatcher {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Runs until `Ctrl-C` (or `cancel`, if the caller triggers it first)
    /// is received. Shutdown is graceful: the Producer is cancelled
    /// first, then each Worker finishes its current request (if any)
    /// before exiting -- no in-flight HTTP call is aborted mid-flight by
    /// shutdown itself, only by its own TTL/I-O deadlines.
    pub async fn run(self, cancel: CancellationToken) {
        let clock = Clock::new();
        let (queue, receiver) = RequestQueue::unbounded();

        let producer = Producer::new(queue, clock, self.config.api_keys.len());
        let mut tasks = vec![tokio::spawn(producer.run(cancel.clone()))];

        for credential in &self.config.api_keys {
            let client = ApiClient::new(self.config.url.clone());
            let worker = Worker::new(
                credential.clone(),
                receiver.clone(),
                clock,
                client,
                self.config.api_timeout,
            );
            tasks.push(tokio::spawn(worker.run(cancel.clone())));
        }
        drop(receiver);

        tokio::select! {
            _ = cancel.cancelled() => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutdown signal received");
                cancel.cancel();
            }
        }

        for task in tasks {
            let _ = task.await;
        }
    }
}
