/// Errors that can occur while driving a request through the rate
/// limiter and the HTTP client. Mirrors four of the kinds enumerated in
/// the error-handling design: each is logged and the request is dropped
/// -- none of these propagate past a single worker iteration. The fifth
/// kind, a non-OK response, is not a failure to complete the call at
/// all (it still consumes a rate slot), so it is represented as an `Ok`
/// value -- see `ApiOutcome::NonOk`, not this type.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    /// The rate limiter could not grant a slot before the request's TTL
    /// expired.
    #[error("rate limiter timed out before a slot became available")]
    Timeout,
    /// Connection refused, reset, DNS failure, or similar transport
    /// failure reported by the HTTP client.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The HTTP response did not arrive within the configured I/O
    /// timeout.
    #[error("request timed out waiting for a response")]
    IoTimeout,
    /// The response body was not valid JSON, or was missing the fields
    /// the success predicate depends on.
    #[error("malformed response body: {0}")]
    Malformed(String),
}
