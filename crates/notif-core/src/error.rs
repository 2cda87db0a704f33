//! Domain-level error types.

use thiserror::Error;

/// Address validation failures - always caught before any side effect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmailError {
    #[error("Email address is empty")]
    Empty,

    #[error("Invalid email address format: {0}")]
    Invalid(String),
}
