//! Error types for peon-core.
//!
//! Only construction and configuration can fail. Once an engine is built, the
//! event and tick paths degrade to no-ops instead of returning errors.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PetError {
    // ─────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Configuration file malformed: {path}: {details}")]
    ConfigMalformed { path: PathBuf, details: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ─────────────────────────────────────────────────────────────────────
    // Skin Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Unknown skin: {0}")]
    UnknownSkin(String),

    #[error("Skin {skin} has no animation named {name}")]
    UnknownAnimation { skin: String, name: String },

    #[error("Skin {skin} is invalid: {reason}")]
    InvalidSkin { skin: String, reason: String },

    // ─────────────────────────────────────────────────────────────────────
    // I/O Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Results using PetError.
pub type Result<T> = std::result::Result<T, PetError>;

impl From<PetError> for String {
    fn from(err: PetError) -> String {
        err.to_string()
    }
}
