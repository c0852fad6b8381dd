//! Errors raised by the pure domain crates.

use core::fmt::Display;

use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// Rejection of caller input or of a state change that would break a stock or
/// cost rule.
///
/// Storage failures and missing records are reported by the infrastructure
/// layer, never here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Draft or catalog input that can never be saved as given.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A mutation that would leave stock or cost inconsistent.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier string that does not parse.
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// `field` holds a negative money or quantity value.
    pub fn negative(field: &str, value: impl Display) -> Self {
        Self::Validation(format!("{field} cannot be negative (got {value})"))
    }

    /// Required text `field` is empty or whitespace.
    pub fn blank(field: &str) -> Self {
        Self::Validation(format!("{field} cannot be empty"))
    }

    /// Arithmetic on `what` left the representable decimal range.
    pub fn overflow(what: &str) -> Self {
        Self::InvariantViolation(format!("{what} overflow"))
    }
}
