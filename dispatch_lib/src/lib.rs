//! Orchestration layer: the shared queue, the producer, the per-credential
//! worker pool, and the top-level dispatcher that wires them together.
//!
//! Wraps the low-level `dispatch_api` crate (clock, rate limiter, HTTP
//! client) with the credential set, configuration, and task spawning
//! spec.md's Dispatcher component describes.

pub mod config;
pub mod constants;
pub mod dispatcher;
pub mod error;
pub mod producer;
pub mod queue;
pub mod worker;

pub use config::Config;
pub use dispatcher::Dispatcher;
pub use error::DispatchError;
pub use producer::Producer;
pub use queue::{RequestQueue, RequestReceiver};
pub use worker::{Outcome, Worker};

pub use dispatch_api;
