//! Error types for proppatch-edit.
//!
//! Two tiers, mapped to exit codes:
//! - Expectation failures (exit code 2): rules the caller required to match
//!   came up empty. Nothing is written when these fire.
//! - Runtime errors (exit code 1): I/O errors, invalid arguments.

use thiserror::Error;

/// The top-level error type for proppatch-edit operations.
#[derive(Debug, Error)]
pub enum PatchError {
    /// An expectation failure occurred (exit code 2).
    #[error("expectation failed: {0}")]
    Expectation(#[from] ExpectationError),

    /// A runtime/tool error occurred (exit code 1).
    #[error("runtime error: {0}")]
    Runtime(#[from] anyhow::Error),
}

/// Expectation failures that should result in exit code 2.
#[derive(Debug, Error)]
pub enum ExpectationError {
    /// One or more required rules matched zero times.
    #[error("rules matched zero times: {}", rules.join(", "))]
    UnmatchedRules {
        /// Ids of the rules that did not match.
        rules: Vec<String>,
    },
}

impl PatchError {
    /// Returns true if this is an expectation failure (exit code 2).
    pub fn is_expectation(&self) -> bool {
        matches!(self, PatchError::Expectation(_))
    }

    /// Returns the recommended exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            PatchError::Expectation(_) => 2,
            PatchError::Runtime(_) => 1,
        }
    }
}

/// Result type alias using PatchError.
pub type PatchResult<T> = Result<T, PatchError>;
