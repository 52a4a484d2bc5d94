//! Error types for the mu-app service layer.

use mu_chem::ChemError;
use mu_phase::PhaseError;
use mu_reservoir::ReservoirError;
use std::path::PathBuf;

/// Application error wrapping the computational crates and file I/O, shared
/// by the CLI and any other front end.
///
/// Computational errors pass through with their own message.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Unsupported file format: {path} (expected .json, .yaml or .yml)")]
    UnsupportedFormat { path: PathBuf },

    #[error("Settings validation failed: {0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Chem(#[from] ChemError),

    #[error(transparent)]
    Phase(#[from] PhaseError),

    #[error(transparent)]
    Reservoir(#[from] ReservoirError),
}

/// Result type for mu-app operations.
pub type AppResult<T> = Result<T, AppError>;
