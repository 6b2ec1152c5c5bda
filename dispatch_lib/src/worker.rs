use std::time::Duration;

use dispatch_api::{ApiClient, ApiError, ApiOutcome, Clock, RateLimiter, Request};
use tokio_util::sync::CancellationToken;

use crate::constants::{DURATION_MS_BETWEEN_REQUESTS, PER_SEC_RATE, REQUEST_TTL_MS};
use crate::queue::RequestReceiver;

/// The per-request classification a worker produces, for logging and for
/// property-test observation. Never escapes `Worker::handle_one` as a
/// `Result` -- each variant is a terminal outcome for that request, not
/// an error that propagates to the caller.
#[derive(Debug, PartialEq)]
pub enum Outcome {
    /// HTTP 200 and body `status == "OK"`.
    Success,
    /// Any other HTTP status or body `status`.
    NonOk { status: u16 },
    /// TTL elapsed while the request waited in the queue.
    TtlExpiredAtDequeue,
    /// The rate limiter's own timeout fired before a slot freed up.
    TtlExpiredInLimiter,
    /// Connection refused, reset, DNS failure, or similar.
    Transport,
    /// The HTTP response did not arrive within the I/O timeout.
    IoTimeout,
    /// The response body was not valid JSON or was missing fields.
    Malformed,
}

/// One instance per credential. Owns exactly one `RateLimiter` -- never
/// shared with another task -- and serializes HTTP calls for that
/// credential, so the server sees monotonically increasing nonces from
/// a given credential by construction.
pub struct Worker {
    credential: String,
    receiver: RequestReceiver,
    limiter: RateLimiter,
    client: ApiClient,
    clock: Clock,
    io_timeout: Duration,
}

impl Worker {
    pub fn new(
        credential: String,
        receiver: RequestReceiver,
        clock: Clock,
        client: ApiClient,
        io_timeout: Duration,
    ) -> Self {
        Self {
            credential,
            receiver,
            limiter: RateLimiter::new(clock, PER_SEC_RATE, DURATION_MS_BETWEEN_REQUESTS),
            client,
            clock,
            io_timeout,
        }
    }

    /// Pops requests until the queue closes or `cancel` fires, handling
    /// each to completion (or drop) before taking the next one -- HTTP
    /// submissions for one credential are strictly single-flight.
    pub async fn run(mut self, cancel: CancellationToken) {
        loop {
            let request = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!(credential = %self.credential, "worker cancelled, stopping");
                    return;
                }
                req = self.receiver.recv() => match req {
                    Ok(req) => req,
                    Err(_) => {
                        tracing::debug!(credential = %self.credential, "queue closed, worker stopping");
                        return;
                    }
                },
            };

            let outcome = self.handle_one(request).await;
            self.log(request, &outcome);
        }
    }

    /// Step-by-step per spec.md 4.4: TTL check, rate-limit acquisition
    /// (itself bounded by the remaining TTL), HTTP issue, classification.
    async fn handle_one(&mut self, request: Request) -> Outcome {
        let now = self.clock.now_ms();
        let remaining_ttl_ms = request.remaining_ttl_ms(now, REQUEST_TTL_MS);
        if remaining_ttl_ms <= 0 {
            return Outcome::TtlExpiredAtDequeue;
        }

        // Captured before the rate-limit wait, so it reflects the time
        // the worker decided to send, not the time it finished waiting.
        let nonce = self.clock.now_ms();

        if let Err(ApiError::Timeout) = self.limiter.acquire(remaining_ttl_ms as u64).await {
            return Outcome::TtlExpiredInLimiter;
        }

        match self
            .client
            .send(&self.credential, nonce, request.req_id, self.io_timeout)
            .await
        {
            Ok(ApiOutcome::Success(_)) => Outcome::Success,
            Ok(ApiOutcome::NonOk { status, .. }) => Outcome::NonOk { status },
            Err(ApiError::IoTimeout) => Outcome::IoTimeout,
            Err(ApiError::Transport(_)) => Outcome::Transport,
            Err(ApiError::Malformed(_)) => Outcome::Malformed,
            Err(ApiError::Timeout) => unreachable!("client does not raise limiter timeouts"),
        }
    }

    fn log(&self, request: Request, outcome: &Outcome) {
        match outcome {
            Outcome::Success => {
                tracing::info!(credential = %self.credential, req_id = request.req_id, "API response: OK")
            }
            Outcome::NonOk { status } => {
                tracing::warn!(credential = %self.credential, req_id = request.req_id, status, "API response: non-OK")
            }
            Outcome::TtlExpiredAtDequeue => {
                tracing::warn!(credential = %self.credential, req_id = request.req_id, "ignoring request from queue due to TTL")
            }
            Outcome::TtlExpiredInLimiter => {
                tracing::warn!(credential = %self.credential, req_id = request.req_id, "ignoring request in limiter due to TTL")
            }
            Outcome::Transport => {
                tracing::error!(credential = %self.credential, req_id = request.req_id, "transport error")
            }
            Outcome::IoTimeout => {
                tracing::error!(credential = %self.credential, req_id = request.req_id, "I/O timeout")
            }
            Outcome::Malformed => {
                tracing::error!(credential = %self.credential, req_id = request.req_id, "malformed response body")
            }
        }
    }
}
