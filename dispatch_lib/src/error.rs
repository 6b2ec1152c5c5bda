/// Errors produced by the orchestration layer. `ApiError` never needs a
/// variant here: it is fully handled inside `Worker::handle_one`, which
/// maps every case to an `Outcome` and logs it rather than propagating
/// it up through this type.
#[derive(thiserror::Error, Debug)]
pub enum DispatchError {
    #[error("request queue is closed")]
    QueueClosed,
}
