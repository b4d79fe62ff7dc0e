use std::time::Duration;
use thiserror::Error;

/// Transport-level failure. Carries the elapsed time observed before the
/// failure (the configured ceiling for timeouts) so the caller can still
/// record a latency sample.
#[derive(Debug, Error)]
#[error("network failure after {elapsed:?}")]
pub struct NetworkError {
    pub elapsed: Duration,
    #[source]
    pub source: reqwest::Error,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// A named check over the response failed. Recorded per iteration, never
    /// propagated out of the run.
    #[error("check failed: {check}")]
    Assertion { check: &'static str },

    #[error(transparent)]
    ThresholdBreach(#[from] stampede_core::ThresholdBreach),

    #[error("failed to construct HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}
