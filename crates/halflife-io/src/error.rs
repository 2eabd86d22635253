//! Error types for reading and writing run files.

use halflife_core::error::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// `line` is 1-based.
    #[error("line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },

    #[error("unsupported snapshot format version {found}, expected {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("event of particle {particle} references isotope {isotope}, chain has {len}")]
    UnknownIsotope {
        particle: u64,
        isotope: usize,
        len: usize,
    },

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(#[from] ConfigError),
}
