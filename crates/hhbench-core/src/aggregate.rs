//! Reduction of a replicate set to averaged per-algorithm series.

use crate::constants::THROUGHPUT_METRIC;
use crate::error::AggregateError;
use crate::table::{LabeledMap, ReplicateSet, Series};

/// Which replicates contribute to the mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationPolicy {
    /// Every replicate contributes; an infinite reading makes that point's
    /// mean infinite.
    IncludeAll,
    /// A replicate with an infinite reading anywhere in the metric (any
    /// algorithm, any point) is dropped as a whole before averaging.
    ExcludeSaturatedReplicates,
}

/// Averaged series plus how many replicates went into them.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    /// algorithm -> mean value per sweep point
    pub series: LabeledMap<Series>,
    pub contributing: usize,
    pub excluded: usize,
}

/// Average the throughput metric across replicates.
pub fn aggregate(
    replicates: &ReplicateSet,
    policy: AggregationPolicy,
) -> Result<Aggregation, AggregateError> {
    aggregate_metric(replicates, THROUGHPUT_METRIC, policy)
}

/// Average `metric` across replicates, position by position.
///
/// All replicates must report the same algorithms with the same number of
/// points; this is checked over the whole set before any filtering.
pub fn aggregate_metric(
    replicates: &ReplicateSet,
    metric: &str,
    policy: AggregationPolicy,
) -> Result<Aggregation, AggregateError> {
    let columns = replicates
        .iter()
        .enumerate()
        .map(|(replicate, table)| {
            table.metric(metric).ok_or_else(|| AggregateError::MissingMetric {
                replicate,
                metric: metric.to_owned(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let Some((reference, others)) = columns.split_first() else {
        return Err(AggregateError::Empty);
    };
    for (offset, column) in others.iter().enumerate() {
        let replicate = offset + 1;
        if !column.same_labels(reference) {
            return Err(AggregateError::AlgorithmMismatch {
                replicate,
                expected: reference.labels().map(str::to_owned).collect(),
                found: column.labels().map(str::to_owned).collect(),
            });
        }
        for (algorithm, series) in column.iter() {
            let expected = reference.get(algorithm).map_or(0, Series::len);
            if series.len() != expected {
                return Err(AggregateError::LengthMismatch {
                    replicate,
                    algorithm: algorithm.to_owned(),
                    expected,
                    found: series.len(),
                });
            }
        }
    }

    let contributing: Vec<&LabeledMap<Series>> = match policy {
        AggregationPolicy::IncludeAll => columns.clone(),
        AggregationPolicy::ExcludeSaturatedReplicates => columns
            .iter()
            .copied()
            .filter(|column| !column.values().any(Series::has_infinite))
            .collect(),
    };
    let excluded = columns.len() - contributing.len();
    if contributing.is_empty() {
        return Err(AggregateError::AllExcluded { excluded });
    }

    let mut sums: LabeledMap<Vec<f64>> = LabeledMap::new();
    for column in &contributing {
        for (algorithm, series) in column.iter() {
            let total = sums.get_or_create(algorithm);
            if total.is_empty() {
                total.resize(series.len(), 0.0);
            }
            for (slot, value) in total.iter_mut().zip(series.values()) {
                *slot += value;
            }
        }
    }

    let divisor = contributing.len() as f64;
    let series = sums
        .iter()
        .map(|(algorithm, total)| {
            let mean: Vec<f64> = total.iter().map(|sum| sum / divisor).collect();
            (algorithm, Series::from(mean))
        })
        .collect();

    Ok(Aggregation {
        series,
        contributing: contributing.len(),
        excluded,
    })
}
