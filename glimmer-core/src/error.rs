//! Error types for the glimmer core library.

use thiserror::Error;

/// Top-level error type for all glimmer operations.
#[derive(Error, Debug)]
pub enum GlimmerError {
    /// The rendering surface handed to the engine cannot host a creature.
    #[error("Invalid rendering surface: {width}x{height} (needs finite size larger than {min}x{min})")]
    InvalidSurface {
        /// Requested width.
        width: f32,
        /// Requested height.
        height: f32,
        /// Smallest accepted extent on either axis.
        min: f32,
    },

    /// Serialization or deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// SQLite persistence error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A key-value backend refused an operation.
    #[error("Store error: {0}")]
    Store(String),

    /// A stored record failed its integrity check.
    #[error("Corrupt record under key '{key}'")]
    CorruptRecord {
        /// Key that held the bad record.
        key: String,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for GlimmerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, GlimmerError>;
