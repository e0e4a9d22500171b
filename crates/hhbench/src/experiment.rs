//! Sequential experiment runner.
//!
//! An experiment is: look the sweep up in the cache; on a miss, run every
//! replicate of the sweep point by point, absorbing each invocation's output
//! as it arrives; store the replicate set; then average it with the family's
//! aggregation policy.
//!
//! Nothing here runs concurrently. Each invocation finishes before the next
//! starts and points are visited strictly in plan order.

use hhbench_core::aggregate::aggregate;
use hhbench_core::constants::EXECUTABLE_DEFAULT_DECAY;
use hhbench_core::{
    Aggregation, AuxiliaryParameters, RawMetricTable, ReplicateSet, SweepFamily, SweepPlan,
};

use crate::cache::{CacheKey, CacheLookup, MissReason, ResultCache};
use crate::config::ExperimentConfig;
use crate::dataset::Dataset;
use crate::error::{ConfigError, ExperimentError};
use crate::invoker::BenchmarkInvoker;

/// Label used for skew sweeps, which always run on the synthetic generator.
pub const SYNTHETIC_LABEL: &str = "Zipf";

/// One sweep to run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SweepRequest {
    Threshold { dataset: Dataset },
    Decay { dataset: Dataset },
    /// `decay: None` runs at the executable's default decay.
    Skew { decay: Option<f64> },
}

impl SweepRequest {
    pub fn family(&self) -> SweepFamily {
        match self {
            SweepRequest::Threshold { .. } => SweepFamily::Threshold,
            SweepRequest::Decay { .. } => SweepFamily::Decay,
            SweepRequest::Skew { .. } => SweepFamily::Skew,
        }
    }

    pub fn dataset_label(&self) -> &'static str {
        match self {
            SweepRequest::Threshold { dataset } | SweepRequest::Decay { dataset } => dataset.name(),
            SweepRequest::Skew { .. } => SYNTHETIC_LABEL,
        }
    }

    pub fn plan(&self, config: &ExperimentConfig) -> SweepPlan {
        match *self {
            SweepRequest::Threshold { dataset } => {
                SweepPlan::threshold(dataset_parameters(dataset, config))
            }
            SweepRequest::Decay { dataset } => {
                SweepPlan::decay(config.fixed_threshold(), dataset_parameters(dataset, config))
            }
            SweepRequest::Skew { decay } => SweepPlan::skew(config.skew_threshold(), decay),
        }
    }

    pub fn cache_key(&self, config: &ExperimentConfig) -> CacheKey {
        let key = CacheKey::new(self.dataset_label(), config.replicates, self.family());
        match *self {
            SweepRequest::Threshold { .. } => key,
            SweepRequest::Decay { .. } => {
                key.with_secondary(format!("phindex{}", config.fixed_threshold_index))
            }
            SweepRequest::Skew { decay } => key.with_secondary(format!(
                "phindex{}-decay{}",
                config.skew_threshold_index,
                decay.unwrap_or(EXECUTABLE_DEFAULT_DECAY)
            )),
        }
    }
}

fn dataset_parameters(dataset: Dataset, config: &ExperimentConfig) -> AuxiliaryParameters {
    let parameters = dataset.invocation_parameters(&config.data_dir);
    AuxiliaryParameters {
        trace: parameters.trace,
        skew: parameters.skew,
        ..Default::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Cached,
    Computed,
}

/// Averaged result of one sweep, ready for export.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepOutcome {
    pub family: SweepFamily,
    pub dataset: String,
    pub key: CacheKey,
    /// The varying parameter at each position.
    pub x_values: Vec<f64>,
    pub aggregation: Aggregation,
    pub provenance: Provenance,
}

pub struct Experiment<I> {
    config: ExperimentConfig,
    invoker: I,
    cache: ResultCache,
}

impl<I: BenchmarkInvoker> Experiment<I> {
    pub fn new(config: ExperimentConfig, invoker: I) -> Result<Self, ConfigError> {
        config.validate()?;
        let cache = ResultCache::new(config.cache_dir.clone());
        Ok(Self {
            config,
            invoker,
            cache,
        })
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Run one replicate of `plan`, calling `on_point` after each point.
    pub fn run_replicate(
        &self,
        plan: &SweepPlan,
        replicate: usize,
        mut on_point: impl FnMut(usize),
    ) -> Result<RawMetricTable, ExperimentError> {
        let mut table = RawMetricTable::new();
        for configuration in plan {
            let stdout = self
                .invoker
                .invoke(configuration, replicate)
                .map_err(|source| ExperimentError::Invocation {
                    replicate,
                    configuration: configuration.to_string(),
                    source,
                })?;
            table
                .absorb(configuration.position, &stdout)
                .map_err(|source| ExperimentError::Parse {
                    replicate,
                    configuration: configuration.to_string(),
                    source,
                })?;
            on_point(configuration.position);
        }
        Ok(table)
    }

    /// Run every replicate of `plan` in order.
    pub fn collect<P>(
        &self,
        plan: &SweepPlan,
        progress: &mut P,
    ) -> Result<ReplicateSet, ExperimentError>
    where
        P: FnMut(f64, &str),
    {
        let replicates = self.config.replicates;
        let total = replicates.saturating_mul(plan.len()).max(1) as f64;
        let mut set = ReplicateSet::new();

        for replicate in 0..replicates {
            tracing::info!(family = %plan.family(), replicate, "replicate started");
            let done_before = replicate * plan.len();
            let table = self.run_replicate(plan, replicate, |position| {
                let task = format!("{} replicate {}/{}", plan.family(), replicate + 1, replicates);
                progress((done_before + position + 1) as f64 / total, &task);
            })?;
            tracing::info!(family = %plan.family(), replicate, "replicate finished");
            set.push(table);
        }
        Ok(set)
    }

    /// Fetch the replicate set for `request` from the cache, or compute and
    /// store it.
    pub fn replicate_set<P>(
        &self,
        request: &SweepRequest,
        plan: &SweepPlan,
        progress: &mut P,
    ) -> Result<(ReplicateSet, Provenance), ExperimentError>
    where
        P: FnMut(f64, &str),
    {
        let key = request.cache_key(&self.config);
        match self.cache.load(&key) {
            CacheLookup::Hit(set) => {
                tracing::info!(entry = %key.file_name(), replicates = set.len(), "cache hit");
                progress(1.0, "loaded from cache");
                return Ok((set, Provenance::Cached));
            }
            CacheLookup::Miss(MissReason::Absent) => {}
            CacheLookup::Miss(MissReason::Unreadable(reason) | MissReason::Corrupt(reason)) => {
                tracing::warn!(entry = %key.file_name(), %reason, "ignoring unusable cache entry");
            }
        }

        let set = self.collect(plan, progress)?;
        match self.cache.store(&key, &set) {
            Ok(()) => tracing::info!(entry = %key.file_name(), "stored replicate set"),
            Err(e) => tracing::warn!(entry = %key.file_name(), error = %e, "failed to cache results"),
        }
        Ok((set, Provenance::Computed))
    }

    pub fn run<P>(
        &self,
        request: &SweepRequest,
        mut progress: P,
    ) -> Result<SweepOutcome, ExperimentError>
    where
        P: FnMut(f64, &str),
    {
        let plan = request.plan(&self.config);
        let (set, provenance) = self.replicate_set(request, &plan, &mut progress)?;

        let family = plan.family();
        let aggregation = aggregate(&set, family.aggregation_policy())?;
        if aggregation.excluded > 0 {
            tracing::info!(
                family = %family,
                excluded = aggregation.excluded,
                contributing = aggregation.contributing,
                "excluded saturated replicates"
            );
        }

        Ok(SweepOutcome {
            family,
            dataset: request.dataset_label().to_owned(),
            key: request.cache_key(&self.config),
            x_values: plan.values(),
            aggregation,
            provenance,
        })
    }

    /// Skew sweep at the executable's default decay, then at the configured
    /// comparison decay.
    pub fn run_skew_comparison<P>(
        &self,
        mut progress: P,
    ) -> Result<[SweepOutcome; 2], ExperimentError>
    where
        P: FnMut(f64, &str),
    {
        let default = self.run(&SweepRequest::Skew { decay: None }, |fraction, task| {
            progress(fraction / 2.0, task)
        })?;
        let comparison = SweepRequest::Skew {
            decay: Some(self.config.comparison_decay),
        };
        let compared = self.run(&comparison, |fraction, task| {
            progress(0.5 + fraction / 2.0, task)
        })?;
        Ok([default, compared])
    }
}
