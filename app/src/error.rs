//! Error types for registration, configuration and invocation.

use argslot_core::{CallError, CompileError, ReconstructError, ValidationError};
use thiserror::Error;

/// Registration failures. Earlier registrations are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// A callable is already registered under this name.
    #[error("a command named '{0}' is already registered")]
    Duplicate(String),

    /// The name is taken by the built-in `help` subcommand.
    #[error("'{0}' is reserved and cannot name a command")]
    Reserved(String),

    /// The function descriptor is malformed.
    #[error("invalid function descriptor: {}", join(.0))]
    Invalid(Vec<ValidationError>),
}

/// Configuration file failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Errors surfaced by [`App`](crate::App).
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Nothing has been registered.
    #[error("no commands registered")]
    NothingRegistered,

    /// A factory parameter's alternatives are malformed.
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// Command-line parse failure, help or version display.
    ///
    /// Carries clap's own error so callers can `.exit()` with clap's
    /// formatting and exit codes.
    #[error(transparent)]
    Engine(#[from] clap::Error),

    /// The compiled schema is inconsistent with itself.
    #[error("internal error: inconsistent schema: {}", join(.0))]
    Schema(Vec<ValidationError>),

    #[error(transparent)]
    Reconstruct(#[from] ReconstructError),

    /// The invoked function failed.
    #[error(transparent)]
    Call(#[from] CallError),

    /// Schema rendering failed.
    #[error("{0}")]
    Output(String),
}

impl AppError {
    /// Returns `true` for failures that indicate a defect rather than bad input.
    pub fn is_internal(&self) -> bool {
        matches!(self, AppError::Schema(_) | AppError::Reconstruct(_))
    }
}

/// Convenience alias for results with [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
