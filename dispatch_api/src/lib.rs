//! Low-level, wire-facing primitives for the request dispatcher.
//!
//! Knows about timestamps, the sliding-window rate limiter, and the HTTP
//! GET call to the target endpoint. Knows nothing about queues, worker
//! pools, or credential sets -- that orchestration lives one layer up in
//! `dispatch_lib`.

mod client;
mod clock;
mod error;
mod ratelimiter;
mod request;

pub use client::{ApiClient, ApiOutcome, ApiResponse};
pub use clock::Clock;
pub use error::ApiError;
pub use ratelimiter::RateLimiter;
pub use request::Request;
