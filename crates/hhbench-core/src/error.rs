//! Errors raised while parsing executable output and reducing replicates.

use thiserror::Error;

/// Malformed or inconsistent benchmark output.
///
/// Any of these aborts the enclosing sweep. Line numbers count from 1 over
/// the raw output of a single invocation, banner included.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("output has {lines} lines, need a banner, a header, at least one row and a footer")]
    Truncated { lines: usize },

    #[error("header line names no metric columns")]
    EmptyHeader,

    #[error("first metric column is `{found}`, expected `{expected}`")]
    UnexpectedLeadingMetric { found: String, expected: &'static str },

    #[error("metric column `{metric}` appears twice in the header")]
    DuplicateMetric { metric: String },

    #[error("line {line}: expected at least {expected} columns, found {found}")]
    ShortRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: `{token}` in column `{column}` is not a number")]
    InvalidNumber {
        line: usize,
        column: String,
        token: String,
    },

    #[error("line {line}: algorithm `{algorithm}` reported twice")]
    DuplicateAlgorithm { line: usize, algorithm: String },

    #[error("expected sweep position {expected}, got {position}")]
    OutOfOrder { expected: usize, position: usize },

    #[error("sweep position {position} reports metrics {found:?}, earlier positions reported {expected:?}")]
    MetricMismatch {
        position: usize,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("algorithm `{algorithm}` is missing at sweep position {position}")]
    MissingAlgorithm { position: usize, algorithm: String },

    #[error("algorithm `{algorithm}` first appears at sweep position {position}")]
    UnexpectedAlgorithm { position: usize, algorithm: String },
}

/// A replicate set that cannot be averaged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AggregateError {
    #[error("replicate set is empty")]
    Empty,

    #[error("replicate {replicate} has no `{metric}` column")]
    MissingMetric { replicate: usize, metric: String },

    #[error("replicate {replicate} reports algorithms {found:?}, replicate 0 reports {expected:?}")]
    AlgorithmMismatch {
        replicate: usize,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("replicate {replicate} has {found} points for `{algorithm}`, replicate 0 has {expected}")]
    LengthMismatch {
        replicate: usize,
        algorithm: String,
        expected: usize,
        found: usize,
    },

    #[error("all {excluded} replicates contain saturated readings")]
    AllExcluded { excluded: usize },
}
