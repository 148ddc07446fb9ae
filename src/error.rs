//! Error types with fix suggestions
//!
//! Every variant carries a stable `FORM-xxx` code so hosts can match on the
//! message prefix without depending on the Rust type.

use thiserror::Error;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

#[derive(Error, Debug)]
pub enum BindError {
    // ─────────────────────────────────────────────────────────────
    // Path syntax (FORM-010)
    // ─────────────────────────────────────────────────────────────
    #[error("FORM-010: Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // Path resolution (FORM-020 to FORM-021)
    // ─────────────────────────────────────────────────────────────
    #[error("FORM-020: Path '{path}' not found (missing segment '{segment}')")]
    PathNotFound { path: String, segment: String },

    #[error("FORM-021: Cannot traverse '{segment}' on {value_type} at '{path}'")]
    InvalidTraversal {
        segment: String,
        value_type: String,
        path: String,
    },

    // ─────────────────────────────────────────────────────────────
    // Propagation (FORM-030)
    // ─────────────────────────────────────────────────────────────
    #[error("FORM-030: Propagation depth limit {limit} exceeded while setting '{path}'")]
    PropagationDepthExceeded { path: String, limit: usize },

    // ─────────────────────────────────────────────────────────────
    // Conversion and I/O (FORM-040 to FORM-051)
    // ─────────────────────────────────────────────────────────────
    #[error("FORM-040: JSON conversion error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("FORM-050: IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("FORM-051: YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl FixSuggestion for BindError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            BindError::InvalidPath { .. } => {
                Some("Use non-empty segments separated by dots, e.g. address.city")
            }
            BindError::PathNotFound { .. } => {
                Some("Set the parent object first, or check the key spelling")
            }
            BindError::InvalidTraversal { .. } => Some(
                "Check the path - you're indexing into a scalar, or using a non-numeric index on an array",
            ),
            BindError::PropagationDepthExceeded { .. } => Some(
                "A watcher keeps writing new values; make it idempotent or raise max_propagation_depth",
            ),
            BindError::Json(_) => Some("Ensure the value matches the requested Rust type"),
            BindError::Io(_) => Some("Check file path and permissions"),
            BindError::Yaml(_) => Some("Check YAML syntax: indentation and quoting"),
        }
    }
}
