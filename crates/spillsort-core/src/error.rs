use thiserror::Error;

/// Canonical result for the sorting engine.
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure the engine surfaces. None of these are retried internally;
/// the first fatal condition aborts the whole sort and no usable partial
/// iterator is left behind.
#[derive(Debug, Error)]
pub enum Error {
    #[error(
        "memory limit exceeded: estimated {used} bytes against a budget of {budget} \
         bytes and external sorting is disallowed"
    )]
    MemoryLimitExceeded { used: usize, budget: usize },

    #[error("run file I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("deserialization: {0}")]
    Deserialization(String),

    // Caller programming errors: add-after-done, invalid configuration,
    // iterating past the end.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}

impl Error {
    /// Shorthand for malformed or truncated run data.
    pub fn corrupt(msg: impl Into<String>) -> Self {
        Error::Deserialization(msg.into())
    }
}
