//! Core domain errors.

use thiserror::Error;

/// Core domain errors for taskscope.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Platform name not recognized.
    #[error("Invalid platform: {0}")]
    InvalidPlatform(String),
}

/// Raised when a task name does not follow the `kind-platform/buildtype[-suite]`
/// naming convention.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    #[error("Unrecognized task name: {0}")]
    Unrecognized(String),
}
