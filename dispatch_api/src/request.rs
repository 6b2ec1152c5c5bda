/// A unit of work produced by the Producer and consumed by exactly one
/// Worker. Immutable once constructed; destroyed after the HTTP attempt
/// completes or is abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    /// Monotonically increasing, unique within a process lifetime.
    pub req_id: u64,
    /// Timestamp captured at construction, read from the same [`crate::Clock`]
    /// every other component uses.
    pub create_time_ms: u64,
}

impl Request {
    pub fn new(req_id: u64, create_time_ms: u64) -> Self {
        Self {
            req_id,
            create_time_ms,
        }
    }

    /// `REQUEST_TTL_MS - (now - create_time_ms)`. Negative or zero means
    /// the request should be dropped rather than sent.
    pub fn remaining_ttl_ms(&self, now_ms: u64, request_ttl_ms: u64) -> i64 {
        request_ttl_ms as i64 - (now_ms as i64 - self.create_time_ms as i64)
    }
}
