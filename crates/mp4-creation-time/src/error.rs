use thiserror::Error;

/// Errors that can occur while scanning or decoding a byte source
#[derive(Debug, Error)]
pub enum Error {
    /// A sub-range read failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A read was requested outside the bounds of the source
    #[error("range {start}..{end} is outside of a source with {len} bytes")]
    OutOfBounds { start: u64, end: u64, len: u64 },

    #[error("marker must not be empty")]
    EmptyMarker,

    #[error("chunk size must be greater than zero")]
    ZeroChunkSize,

    /// The blocking task that served an async read did not complete
    #[error("blocking read task failed: {0}")]
    BlockingTask(#[from] tokio::task::JoinError),
}

/// A specialized Result type for creation time lookups
pub type Result<T> = std::result::Result<T, Error>;
