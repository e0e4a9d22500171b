//! Fixed sweep geometry and output-format constants.

use std::ops::RangeInclusive;

/// Metric every aggregation stage reduces over.
pub const THROUGHPUT_METRIC: &str = "Updates/ms";

/// Number of metric columns read from each output row.
///
/// The executable prints many more columns (percentiles, error rates); only
/// the first three after the label are kept.
pub const METRIC_COLUMNS: usize = 3;

/// Threshold sweep: phi = 2^-i for each index, in order.
pub const THRESHOLD_INDICES: RangeInclusive<i32> = 10..=20;

/// Decay sweep: gamma = 2^i for each exponent, in order.
pub const DECAY_EXPONENTS: RangeInclusive<i32> = -4..=4;

/// Skew sweep: z = step / 10 for each step, in order.
pub const SKEW_STEPS: RangeInclusive<u32> = 1..=20;

/// Threshold index used by the decay sweep unless configured otherwise.
pub const DEFAULT_FIXED_THRESHOLD_INDEX: i32 = 15;

/// Decay the executable applies when no `-gamma` flag is passed.
pub const EXECUTABLE_DEFAULT_DECAY: f64 = 4.0;

/// Replicates per experiment.
pub const DEFAULT_REPLICATES: usize = 8;

/// phi for a threshold index.
pub fn threshold_for_index(index: i32) -> f64 {
    2f64.powi(-index)
}
