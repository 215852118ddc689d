//! Error types for radiolink.
//!
//! The byte-level entry points (`handle_byte`, `append`, `tick`) never
//! return these; failures there degrade to a dropped frame or an eager
//! flush and are only logged. `LinkError` surfaces from the operations a
//! caller may want to check: explicit flushes, configuration loading and
//! the async host adapter.

use thiserror::Error;

/// Main error type for all radiolink operations.
#[derive(Debug, Error)]
pub enum LinkError {
    /// I/O error on the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error while loading a link configuration.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration values that cannot describe a working link.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The transport did not confirm a send.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Writer queue is full.
    #[error("Backpressure: writer queue full")]
    Backpressure,

    /// Writer task has gone away.
    #[error("Connection closed")]
    ConnectionClosed,

    /// Radio collaborator rejected an operation.
    #[error("Radio error: {0}")]
    Radio(String),

    /// A configuration frame that could not be interpreted.
    #[error("Invalid command: {0}")]
    InvalidCommand(String),
}

/// Result type alias using LinkError.
pub type Result<T> = std::result::Result<T, LinkError>;
