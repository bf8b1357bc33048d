//! Error types for iac-gate.

use thiserror::Error;

/// Errors produced while parsing a failure-criteria expression.
///
/// The messages here are caller-facing: CI logs grep for them, so the
/// wording is part of the contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CriteriaError {
    /// A pair did not split into exactly `KEY:VALUE`.
    #[error("string format invalid")]
    InvalidFormat,

    /// The OPERATOR value was neither AND nor OR.
    #[error("operator value: {0} not valid")]
    InvalidOperator(String),

    /// A key was neither OPERATOR nor a severity name.
    #[error("invalid key: {key}, value: {value} pair found")]
    UnknownKey { key: String, value: String },

    /// A severity value did not parse as a number.
    #[error("invalid severity count")]
    InvalidSeverityCount,

    /// More than one OPERATOR entry.
    #[error("multiple operators found")]
    MultipleOperators,

    /// No OPERATOR entry.
    #[error("no operator found")]
    NoOperator,

    /// The same severity key appeared twice.
    #[error("multiple severities of type {0} found")]
    DuplicateSeverity(String),

    /// No severity entry at all.
    #[error("no severity mentioned")]
    NoSeverity,
}

/// Malformed user-supplied configuration.
///
/// Never suppressed by `--fail-silently`: a misconfigured run is not a
/// safe no-op.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Failure-criteria expression rejected by the parser.
    #[error("failure_criteria validation failed : {0}")]
    Criteria(#[from] CriteriaError),

    /// Scan timeout outside the supported bounds.
    #[error("scan_timeout value: {value} not valid (expected between {min} and {max} milliseconds)")]
    Timeout { value: u64, min: u64, max: u64 },
}

/// A scan failure carrying an HTTP-like status code.
///
/// Covers local preconditions (oversized payload), transport failures,
/// non-retryable remote statuses, operation-level errors, and malformed
/// remote responses. Purely internal invariant violations use status 500.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ScanError {
    pub status_code: u16,
    pub message: String,
}

impl ScanError {
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
        }
    }

    /// Internal invariant violation (status 500).
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(500, message)
    }

    /// Wall-clock deadline exceeded during submit or poll.
    pub fn timeout() -> Self {
        Self::internal("Operation timed out")
    }
}
