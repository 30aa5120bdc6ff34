//! Crate-level error type.

use thiserror::Error;

use crate::config::ConfigError;
use crate::path::PathError;
use crate::template::TemplateError;
use crate::view::FetchError;

/// Errors surfaced by the view controller and its collaborators.
#[derive(Debug, Error)]
pub enum ViewError {
    /// No template markup could be resolved at construction
    #[error("No template available")]
    MissingTemplate,

    /// The store root must be an object or a list
    #[error("Store root must be an object or a list, found {found}")]
    InvalidRoot { found: &'static str },

    /// Replacement data does not have the store's shape
    #[error("Cannot replace {expected} data with {found}")]
    ShapeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Path '{path}' does not lead to a list")]
    NotAList { path: String },

    #[error("Index {index} is out of range for '{path}' (length {len})")]
    IndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },

    #[error("Item {index} of '{path}' is not an object")]
    NotAnObject { path: String, index: usize },

    #[error("Invalid path: {0}")]
    Path(#[from] PathError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Hydration failed: {0}")]
    Fetch(#[from] FetchError),
}

impl ViewError {
    /// Stable classification string for logs and CLI output.
    pub fn error_type(&self) -> &'static str {
        match self {
            ViewError::MissingTemplate => "missing_template",
            ViewError::InvalidRoot { .. } => "invalid_root",
            ViewError::ShapeMismatch { .. } => "shape_mismatch",
            ViewError::NotAList { .. } => "not_a_list",
            ViewError::IndexOutOfRange { .. } => "index_out_of_range",
            ViewError::NotAnObject { .. } => "not_an_object",
            ViewError::Path(_) => "invalid_path",
            ViewError::Template(_) => "template_error",
            ViewError::Config(_) => "config_error",
            ViewError::Fetch(err) => err.error_type(),
        }
    }
}
