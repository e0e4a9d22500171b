//! Benchmark sweeps of heavy-hitter sketch implementations.
//!
//! This crate drives the external benchmark executable through parameter
//! sweeps, caches each sweep's replicate set on disk and exports averaged
//! throughput series for plotting. Planning, parsing and averaging come from
//! [`hhbench_core`].
//!
//! # Example
//!
//! ```no_run
//! use hhbench::{Dataset, Experiment, ExperimentConfig, ProcessInvoker, SweepRequest};
//!
//! let config = ExperimentConfig::default();
//! let invoker = ProcessInvoker::from_config(&config);
//! let experiment = Experiment::new(config, invoker)?;
//!
//! let outcome = experiment.run(
//!     &SweepRequest::Threshold { dataset: Dataset::Caida },
//!     |fraction, task| eprintln!("{:.0}% {task}", fraction * 100.0),
//! )?;
//! println!("{}", hhbench::output::to_markdown(&[outcome]));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cache;
pub mod config;
pub mod dataset;
pub mod error;
pub mod experiment;
pub mod invoker;
pub mod output;

pub use cache::{CacheKey, CacheLookup, MissReason, ResultCache};
pub use config::ExperimentConfig;
pub use dataset::Dataset;
pub use error::{CacheError, ConfigError, ExperimentError, InvocationError};
pub use experiment::{Experiment, Provenance, SweepOutcome, SweepRequest};
pub use invoker::{BenchmarkInvoker, ProcessInvoker};
