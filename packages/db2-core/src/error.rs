//! Data loading error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating client game data.
#[derive(Error, Debug, Clone)]
pub enum DataError {
    /// Default locale directory is missing from the data path
    #[error("Default locale directory '{}' not found", path.display())]
    DefaultLocaleMissing { path: PathBuf },

    /// File header carries the wrong magic number
    #[error("Invalid magic {found:?} in table '{table}'")]
    InvalidMagic { table: String, found: [u8; 4] },

    /// File ended before the header, rows or string block were complete
    #[error("Truncated data in table '{table}': {context}")]
    Truncated { table: String, context: String },

    /// File header disagrees with the compiled record layout
    #[error("Schema mismatch for table '{table}': {message}")]
    SchemaMismatch { table: String, message: String },

    /// String column points outside the string block
    #[error("String offset {offset} out of bounds in table '{table}' (string block size {size})")]
    StringOutOfBounds {
        table: String,
        offset: u32,
        size: usize,
    },

    /// Last known records are absent, the data files belong to another client build
    #[error("Outdated client data, missing records: {}", missing.join(", "))]
    OutdatedClientData { missing: Vec<String> },

    /// One or more tables could not be loaded
    #[error("{} table(s) failed to load: {}", tables.len(), tables.join(", "))]
    TablesFailed { tables: Vec<String> },

    /// Game table text file is malformed
    #[error("Game table '{table}': {message}")]
    GameTable { table: String, message: String },

    /// Hotfix store could not be read
    #[error("Hotfix error: {0}")]
    Hotfix(String),

    /// Configuration could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error while reading data files
    #[error("I/O error: {0}")]
    IoError(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DataError>;
