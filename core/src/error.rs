//! Error types for shape conversion, compilation, reconstruction and calls.
//!
//! Annotation degradation is deliberately absent here: an annotation the
//! classifier does not recognise becomes a plain leaf, never an error.

use std::path::PathBuf;

use thiserror::Error;

/// Failure converting one command-line token into a [`Value`](crate::Value).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// Token does not parse as the expected type.
    #[error("invalid {expected} value: '{input}'")]
    Invalid { expected: String, input: String },

    /// Token is not one of the allowed literal values.
    #[error("'{input}' is not one of: {choices}")]
    NotAChoice { input: String, choices: String },

    /// Path was required to exist but does not.
    #[error("path does not exist: {}", .0.display())]
    MissingPath(PathBuf),

    /// Directory creation for a `mkdir` path failed.
    #[error("failed to create directory '{}': {reason}", .path.display())]
    CreateDir { path: PathBuf, reason: String },

    /// Path could not be made absolute.
    #[error("failed to resolve '{}': {reason}", .path.display())]
    Resolve { path: PathBuf, reason: String },

    /// `~` expansion requested but no home directory is known.
    #[error("cannot expand '~': no home directory")]
    NoHome,

    /// Function-typed parameters are assembled from slots, not parsed.
    #[error("function-typed values cannot be parsed from text")]
    NotParsable,
}

/// Schema compilation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// Two alternatives of one factory parameter share a name.
    #[error("duplicate alternative '{name}' for parameter '{flag}'")]
    DuplicateAlternative { flag: String, name: String },

    /// A factory parameter lists no alternatives.
    #[error("factory parameter '{0}' has no alternatives")]
    NoAlternatives(String),
}

/// Reconstruction failures.
///
/// Every variant is an internal consistency failure between the compiled
/// schema and the parsed values, never a user input error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconstructError {
    /// A binding names a flag that has no parsed value.
    #[error("internal error: '{owner}' binds flag '{flag}' which has no parsed value")]
    MissingValue { owner: String, flag: String },
}

/// Failures raised while invoking a function body.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CallError {
    /// The body asked for an argument that was not supplied.
    #[error("{function}: missing argument '{name}'")]
    MissingArgument { function: String, name: String },

    /// The body asked for an argument as the wrong type.
    #[error("{function}: argument '{name}' expected {expected}, found {found}")]
    TypeMismatch {
        function: String,
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    /// The body itself reported a failure.
    #[error("{0}")]
    Failed(String),
}

impl CallError {
    /// Creates a body-level failure with the given message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}
