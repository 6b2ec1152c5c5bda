use dispatch_api::Request;

use crate::error::DispatchError;

/// Unbounded FIFO shared by one Producer and N Workers. Each `Request`
/// is delivered to exactly one consumer; FIFO order is preserved with
/// respect to insertion across the union of all consumers.
///
/// Backed by `async_channel` rather than `tokio::sync::mpsc` because the
/// queue needs multiple independent consumers (one per Worker) draining
/// the same FIFO -- `mpsc` is single-consumer.
#[derive(Clone)]
pub struct RequestQueue {
    tx: async_channel::Sender<Request>,
}

/// The consuming side of a [`RequestQueue`]. Cloning a `RequestReceiver`
/// does not duplicate items -- each item is still delivered to exactly
/// one of the clones' `recv` callers.
pub type RequestReceiver = async_channel::Receiver<Request>;

impl RequestQueue {
    /// Creates an empty queue and returns the sender half alongside a
    /// receiver clone per worker is expected to hold.
    pub fn unbounded() -> (Self, RequestReceiver) {
        let (tx, rx) = async_channel::unbounded();
        (Self { tx }, rx)
    }

    /// Pushes a request. Never blocks -- the queue is unbounded by
    /// contract (spec.md section 5, "Backpressure: none").
    pub fn push(&self, request: Request) -> Result<(), DispatchError> {
        self.tx
            .try_send(request)
            .map_err(|_| DispatchError::QueueClosed)
    }
}
