//! Experiment configuration.
//!
//! One [`ExperimentConfig`] is built per run (normally from the command
//! line) and handed by reference to every stage of the pipeline.

use std::ffi::OsString;
use std::path::PathBuf;

use hhbench_core::constants::{
    threshold_for_index, DEFAULT_FIXED_THRESHOLD_INDEX, DEFAULT_REPLICATES,
};

use crate::error::ConfigError;

/// Upper bound on replicates per sweep.
pub const MAX_REPLICATES: usize = 10_000;

/// Settings shared by every sweep of an experiment run.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentConfig {
    /// Benchmark executable.
    pub executable: PathBuf,

    /// Command prefixed to every invocation, e.g. `taskset -c 2`.
    ///
    /// Empty by default.
    pub launcher: Vec<OsString>,

    /// Independent repetitions of each sweep. Default: 8.
    pub replicates: usize,

    /// phi = 2^-index held fixed during decay sweeps. Default: 15.
    pub fixed_threshold_index: i32,

    /// phi = 2^-index held fixed during skew sweeps. Default: 15.
    pub skew_threshold_index: i32,

    /// Decay of the second skew sweep, compared against the executable's
    /// default. Default: 1.0.
    pub comparison_decay: f64,

    /// Where replicate sets are cached. Default: `results`.
    pub cache_dir: PathBuf,

    /// Directory holding the trace files. Default: `data`.
    pub data_dir: PathBuf,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("hh-zipf"),
            launcher: Vec::new(),
            replicates: DEFAULT_REPLICATES,
            fixed_threshold_index: DEFAULT_FIXED_THRESHOLD_INDEX,
            skew_threshold_index: DEFAULT_FIXED_THRESHOLD_INDEX,
            comparison_decay: 1.0,
            cache_dir: PathBuf::from("results"),
            data_dir: PathBuf::from("data"),
        }
    }
}

impl ExperimentConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.executable.as_os_str().is_empty() {
            return Err(ConfigError::EmptyExecutable);
        }
        if self.replicates == 0 {
            return Err(ConfigError::NoReplicates);
        }
        if self.replicates > MAX_REPLICATES {
            return Err(ConfigError::TooManyReplicates(self.replicates));
        }
        for index in [self.fixed_threshold_index, self.skew_threshold_index] {
            if !(1..=62).contains(&index) {
                return Err(ConfigError::ThresholdIndex(index));
            }
        }
        if !self.comparison_decay.is_finite() || self.comparison_decay <= 0.0 {
            return Err(ConfigError::ComparisonDecay(self.comparison_decay));
        }
        Ok(())
    }

    /// phi used by decay sweeps.
    pub fn fixed_threshold(&self) -> f64 {
        threshold_for_index(self.fixed_threshold_index)
    }

    /// phi used by skew sweeps.
    pub fn skew_threshold(&self) -> f64 {
        threshold_for_index(self.skew_threshold_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ExperimentConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.replicates, 8);
        assert_eq!(config.fixed_threshold(), 2f64.powi(-15));
    }

    #[test]
    fn test_zero_replicates_rejected() {
        let config = ExperimentConfig {
            replicates: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoReplicates));
    }

    #[test]
    fn test_replicate_count_is_bounded() {
        let config = ExperimentConfig {
            replicates: usize::MAX,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::TooManyReplicates(usize::MAX))
        );

        let config = ExperimentConfig {
            replicates: MAX_REPLICATES,
            ..Default::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_threshold_index_bounds() {
        let config = ExperimentConfig {
            skew_threshold_index: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ThresholdIndex(0)));

        let config = ExperimentConfig {
            fixed_threshold_index: 63,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ThresholdIndex(63)));
    }

    #[test]
    fn test_comparison_decay_must_be_positive() {
        let config = ExperimentConfig {
            comparison_decay: 0.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ComparisonDecay(_))));
    }

    #[test]
    fn test_empty_executable_rejected() {
        let config = ExperimentConfig {
            executable: PathBuf::new(),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyExecutable));
    }
}
