//! Error types for the queue and the playback device

use thiserror::Error;

/// Queue store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// A list was started at an index outside of it
    #[error("Invalid start index {index} for a queue of {len} episodes")]
    InvalidStartIndex { index: usize, len: usize },
}

/// Playback device errors
#[derive(Debug, Error)]
pub enum DeviceError {
    /// No source is loaded on the device
    #[error("No source loaded")]
    NoSource,

    /// The episode location does not exist
    #[error("Source not found: {0}")]
    SourceNotFound(String),

    /// The episode location uses a scheme the device cannot open
    #[error("Unsupported source: {0}")]
    UnsupportedSource(String),

    /// The source could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Playback was refused by the output
    #[error("Playback blocked: {0}")]
    PlaybackBlocked(String),

    /// Seeking failed
    #[error("Seek failed: {0}")]
    Seek(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
