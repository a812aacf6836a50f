//! Error types for Publisher document parsing.

use thiserror::Error;

/// Main error type for longan operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The input is not an OLE compound document
    #[error("Not an OLE compound document")]
    NotCompound,

    /// A required sub-stream is missing from the container
    #[error("Stream not found: {0}")]
    StreamNotFound(String),

    /// The contents trailer holds no document chunk
    #[error("No document chunk in the contents trailer")]
    MissingDocumentChunk,

    /// Corrupted or truncated stream data
    #[error("Corrupted stream: {0}")]
    Corrupted(String),
}

/// Result type for longan operations.
pub type Result<T> = std::result::Result<T, Error>;
