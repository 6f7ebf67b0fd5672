/*!
 * Error types for the lyricsync application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors raised when subtitle text does not match the SRT block grammar.
///
/// Block numbers are 1-based and count non-empty blocks in the normalized input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    /// The input contained no subtitle blocks at all
    #[error("No subtitle blocks found in input")]
    Empty,

    /// The first line of a block is not a positive integer
    #[error("Invalid sequence index in block {block}: {value:?}")]
    InvalidIndex {
        /// Block number
        block: usize,
        /// Offending line
        value: String,
    },

    /// The same sequence index appears twice
    #[error("Duplicate sequence index {index} in block {block}")]
    DuplicateIndex {
        /// Block number
        block: usize,
        /// Repeated index
        index: u32,
    },

    /// The block ends before its timing line
    #[error("Block {block} has no timing line")]
    MissingTiming {
        /// Block number
        block: usize,
    },

    /// The timing line lacks the `-->` separator
    #[error("Missing '-->' separator in block {block}: {line:?}")]
    MissingSeparator {
        /// Block number
        block: usize,
        /// Offending line
        line: String,
    },

    /// A timestamp segment is not numeric or not in `HH:MM:SS,mmm` form
    #[error("Invalid timestamp in block {block}: {value:?}")]
    InvalidTimestamp {
        /// Block number
        block: usize,
        /// Offending timestamp
        value: String,
    },

    /// The end timestamp precedes the start timestamp
    #[error("End time precedes start time in block {block}")]
    InvertedRange {
        /// Block number
        block: usize,
    },

    /// The block has a timing line but no text
    #[error("Block {block} has no text")]
    EmptyText {
        /// Block number
        block: usize,
    },
}

/// Errors raised while accepting an uploaded media file
#[derive(Error, Debug)]
pub enum MediaError {
    /// The file does not exist or is not a regular file
    #[error("Media file not found: {0}")]
    NotFound(String),

    /// The file is not recognised as audio
    #[error("Unsupported media type for {name}: {mime}")]
    UnsupportedType {
        /// File name
        name: String,
        /// Detected type, or "unknown"
        mime: String,
    },
}

/// Errors raised by a playback engine control call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaybackError {
    /// No audio has been loaded yet
    #[error("No audio loaded")]
    NotLoaded,

    /// The engine was destroyed and cannot be used again
    #[error("Playback engine has been destroyed")]
    Destroyed,

    /// A seek target that is not a finite number
    #[error("Invalid playback position: {0}")]
    InvalidPosition(f64),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// The subtitle track could not be parsed
    #[error("Subtitle track unavailable: {0}")]
    Format(#[from] FormatError),

    /// Error accepting the audio upload
    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    /// Error from the playback engine
    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
