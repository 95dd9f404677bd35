//! Error types for canopy generation

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot compute field '{field}', parameter set is likely under-constrained")]
    UnderConstrained { field: &'static str },

    #[error("shape error: {0}")]
    Shape(String),

    #[error(
        "unable to place all leaves: the specified canopy might be too dense \
         (leaf {leaf} could not be placed in {attempts} attempts)"
    )]
    CanopyTooDense { leaf: usize, attempts: usize },

    #[error("no file at {} found", .0.display())]
    FileNotFound(PathBuf),

    #[error("while reading {}, on line {line}: {message}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("parameter '{key}': unsupported value '{value}'")]
    UnsupportedValue { key: &'static str, value: String },

    #[error("padding must be >= 0, got {0}")]
    InvalidPadding(i64),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("scene dictionary already contains an entry with id '{0}'")]
    KeyCollision(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
