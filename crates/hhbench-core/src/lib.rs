//! Core pipeline for heavy-hitter sketch throughput sweeps.
//!
//! This crate is free of I/O. It knows how to:
//!
//! - plan the ordered parameter configurations of a sweep ([`plan`])
//! - turn one invocation's tabular stdout into metric values ([`parse`])
//! - reduce a set of replicate runs to averaged per-algorithm series ([`aggregate`])
//!
//! Running the external benchmark executable, caching replicate sets and
//! exporting results live in the `hhbench` crate.
//!
//! ```ignore
//! use hhbench_core::{aggregate, plan::SweepPlan, RawMetricTable, ReplicateSet};
//!
//! let plan = SweepPlan::threshold(Default::default());
//! let mut table = RawMetricTable::new();
//! for configuration in plan.iter() {
//!     let stdout = run_executable(configuration);
//!     table.absorb(configuration.position, &stdout)?;
//! }
//! let replicates = ReplicateSet::from(vec![table]);
//! let averaged = aggregate::aggregate(&replicates, plan.family().aggregation_policy())?;
//! ```

pub mod aggregate;
pub mod constants;
pub mod error;
pub mod parse;
pub mod plan;
pub mod table;
pub mod types;

pub use aggregate::{Aggregation, AggregationPolicy};
pub use error::{AggregateError, ParseError};
pub use plan::SweepPlan;
pub use table::{LabeledMap, RawMetricTable, ReplicateSet, Series};
pub use types::{AuxiliaryParameters, SweepConfiguration, SweepFamily, SweepParameter};
