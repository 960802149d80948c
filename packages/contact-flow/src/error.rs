use thiserror::Error;

/// Errors surfaced by the flow handle.
#[derive(Debug, Error)]
pub enum FlowError {
    /// The driver task has stopped; no further events can be delivered.
    #[error("flow driver is no longer running")]
    DriverGone,
}
