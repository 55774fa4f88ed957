//! Error types for configuration and species loading
//!
//! Tree generation itself never fails: degenerate input only ever shows up as
//! missing geometry. Errors are limited to the surfaces that read user data.

use thiserror::Error;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown species: {0}")]
    UnknownSpecies(String),
}
