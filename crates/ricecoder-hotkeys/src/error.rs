//! Error types for hotkey operations
//!
//! Pattern parsing, conflict detection and completion never fail. Errors only
//! come from the ambient layers: configuration files, keymap documents and the
//! override store.

use thiserror::Error;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON config: {0}")]
    InvalidJson(String),

    #[error("Invalid YAML config: {0}")]
    InvalidYaml(String),

    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),
}

/// Errors that can occur while building or loading a keymap
#[derive(Debug, Error)]
pub enum KeymapError {
    #[error("Pattern cannot be empty")]
    EmptyPattern,

    #[error("Action ID cannot be empty")]
    EmptyAction,

    #[error("Invalid keymap document: {0}")]
    InvalidDocument(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Keymap error at entry {entry}: {message}")]
    EntryError { entry: usize, message: String },

    #[error("Unknown keymap format: {0}")]
    UnknownFormat(String),

    #[error("Failed to read keymap file: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur in a key/value store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
