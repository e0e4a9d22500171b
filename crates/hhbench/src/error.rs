//! Error types for running experiments.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use hhbench_core::{AggregateError, ParseError};
use thiserror::Error;

/// The benchmark executable could not be run to a successful exit.
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("failed to launch `{program}`: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{program}` exited with {status}{}", stderr_suffix(.stderr))]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to create cache directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize replicate set: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write cache entry {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("replicate count must be at least 1")]
    NoReplicates,

    #[error("replicate count {0} exceeds the limit of {max}", max = crate::config::MAX_REPLICATES)]
    TooManyReplicates(usize),

    #[error("threshold index {0} is outside 1..=62")]
    ThresholdIndex(i32),

    #[error("comparison decay must be finite and positive, got {0}")]
    ComparisonDecay(f64),

    #[error("executable path is empty")]
    EmptyExecutable,
}

/// A sweep that could not be completed.
///
/// Invocation and parse failures name the replicate and configuration that
/// failed; nothing from the aborted run is cached.
#[derive(Debug, Error)]
pub enum ExperimentError {
    #[error("replicate {replicate}, {configuration}: {source}")]
    Invocation {
        replicate: usize,
        configuration: String,
        #[source]
        source: InvocationError,
    },

    #[error("replicate {replicate}, {configuration}: malformed output: {source}")]
    Parse {
        replicate: usize,
        configuration: String,
        #[source]
        source: ParseError,
    },

    #[error("cannot average replicates: {0}")]
    Aggregate(#[from] AggregateError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}
