//! Error types for quire.
//!
//! Uses thiserror for derive macros. Every message names the offending
//! artifact, capability, or file so a single run is actionable.

use crate::compile::template::TemplateError;
use crate::exit_codes;
use std::path::Path;
use thiserror::Error;

/// Main error type for quire operations.
#[derive(Error, Debug)]
pub enum QuireError {
    /// Invalid arguments, invalid `quire.yaml`, or a refused operation.
    #[error("{0}")]
    UserError(String),

    /// A registry or profile document is malformed or unreadable.
    #[error("failed to load '{path}': {reason}")]
    LoadError { path: String, reason: String },

    /// A profile references an artifact or capability the registry lacks.
    #[error("unresolved reference: {0}")]
    ReferenceError(String),

    /// The resolved plan failed validation; holds the formatted error list.
    #[error("validation failed: {0}")]
    ValidationError(String),

    /// Reading fragments or writing output failed.
    #[error("I/O failure: {0}")]
    IoError(String),

    /// The document template could not be rendered.
    #[error("template failure in '{template}': {source}")]
    TemplateError {
        template: String,
        #[source]
        source: TemplateError,
    },
}

impl QuireError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            QuireError::UserError(_) => exit_codes::USER_ERROR,
            QuireError::LoadError { .. } => exit_codes::LOAD_FAILURE,
            QuireError::ReferenceError(_) => exit_codes::REFERENCE_FAILURE,
            QuireError::ValidationError(_) => exit_codes::VALIDATION_FAILURE,
            QuireError::IoError(_) => exit_codes::IO_FAILURE,
            QuireError::TemplateError { .. } => exit_codes::TEMPLATE_FAILURE,
        }
    }

    /// Build a load error for `path`.
    pub fn load(path: &Path, reason: impl std::fmt::Display) -> Self {
        QuireError::LoadError {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// Build an I/O error that names the action and the file involved.
    pub fn io(action: &str, path: &Path, err: impl std::fmt::Display) -> Self {
        QuireError::IoError(format!("failed to {} '{}': {}", action, path.display(), err))
    }
}

/// Result type alias for quire operations.
pub type Result<T> = std::result::Result<T, QuireError>;
