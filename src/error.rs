//! Error types for tokring.

use thiserror::Error;

/// Main error type for all token-ring operations.
#[derive(Debug, Error)]
pub enum TokenRingError {
    /// I/O error on a station or hub stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error (control plane reports only).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed bytes on the ring, or a payload that cannot be framed.
    #[error("Framing error: {0}")]
    Framing(String),

    /// Appending would exceed the buffer's configured capacity.
    #[error("Buffer overflow: {needed} bytes needed, capacity is {capacity}")]
    BufferOverflow {
        /// Total bytes the buffer would hold after the append.
        needed: usize,
        /// Configured maximum capacity.
        capacity: usize,
    },

    /// The downstream side of the ring is gone.
    #[error("Ring closed")]
    RingClosed,

    /// Read or write failure on one hub relay link.
    #[error("Relay I/O error on link {link}: {source}")]
    RelayIo {
        /// Index of the failing link (index of the upstream station).
        link: usize,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Invalid station or ring configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using TokenRingError.
pub type Result<T> = std::result::Result<T, TokenRingError>;
