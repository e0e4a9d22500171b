//! Sweep families and the configurations a sweep is made of.

use std::fmt;
use std::path::PathBuf;

use crate::aggregate::AggregationPolicy;
use crate::constants::{DECAY_EXPONENTS, SKEW_STEPS, THRESHOLD_INDICES};

/// Which parameter a sweep varies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SweepFamily {
    /// phi from 2^-10 down to 2^-20.
    Threshold,
    /// gamma from 2^-4 up to 2^4 at a fixed phi.
    Decay,
    /// Zipf skew from 0.1 to 2.0 at a fixed phi.
    Skew,
}

impl SweepFamily {
    /// Short lowercase name, used in cache keys and file names.
    pub fn name(&self) -> &'static str {
        match self {
            SweepFamily::Threshold => "threshold",
            SweepFamily::Decay => "decay",
            SweepFamily::Skew => "skew",
        }
    }

    /// Executable flag carrying the varying parameter.
    pub fn flag(&self) -> &'static str {
        match self {
            SweepFamily::Threshold => "-phi",
            SweepFamily::Decay => "-gamma",
            SweepFamily::Skew => "-z",
        }
    }

    /// Number of points in every sweep of this family.
    pub fn points(&self) -> usize {
        match self {
            SweepFamily::Threshold => THRESHOLD_INDICES.count(),
            SweepFamily::Decay => DECAY_EXPONENTS.count(),
            SweepFamily::Skew => SKEW_STEPS.count(),
        }
    }

    /// Name of the x axis when the series are plotted.
    pub fn axis_label(&self) -> &'static str {
        match self {
            SweepFamily::Threshold => "epsilon",
            SweepFamily::Decay => "gamma",
            SweepFamily::Skew => "skew",
        }
    }

    /// How replicates of this family are reduced.
    ///
    /// Only decay sweeps drop replicates containing a saturated (infinite)
    /// reading; the other families average infinities straight through.
    pub fn aggregation_policy(&self) -> AggregationPolicy {
        match self {
            SweepFamily::Decay => AggregationPolicy::ExcludeSaturatedReplicates,
            SweepFamily::Threshold | SweepFamily::Skew => AggregationPolicy::IncludeAll,
        }
    }
}

impl fmt::Display for SweepFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Value of the varying parameter at one sweep point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SweepParameter {
    Threshold(f64),
    Decay(f64),
    Skew(f64),
}

impl SweepParameter {
    pub fn family(&self) -> SweepFamily {
        match self {
            SweepParameter::Threshold(_) => SweepFamily::Threshold,
            SweepParameter::Decay(_) => SweepFamily::Decay,
            SweepParameter::Skew(_) => SweepFamily::Skew,
        }
    }

    pub fn value(&self) -> f64 {
        match *self {
            SweepParameter::Threshold(v) | SweepParameter::Decay(v) | SweepParameter::Skew(v) => v,
        }
    }
}

/// Parameters held fixed across every point of a sweep.
///
/// `None` leaves the executable's own default in place. In particular an
/// absent `trace` makes the executable generate a synthetic Zipfian stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuxiliaryParameters {
    pub trace: Option<PathBuf>,
    pub threshold: Option<f64>,
    pub decay: Option<f64>,
    pub skew: Option<f64>,
}

/// One point of a sweep: its position and everything needed to invoke the
/// executable for it.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepConfiguration {
    pub position: usize,
    pub parameter: SweepParameter,
    pub fixed: AuxiliaryParameters,
}

impl SweepConfiguration {
    pub fn family(&self) -> SweepFamily {
        self.parameter.family()
    }
}

impl fmt::Display for SweepConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} point {} ({}={})",
            self.family(),
            self.position,
            self.family().flag().trim_start_matches('-'),
            self.parameter.value()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_lengths() {
        assert_eq!(SweepFamily::Threshold.points(), 11);
        assert_eq!(SweepFamily::Decay.points(), 9);
        assert_eq!(SweepFamily::Skew.points(), 20);
    }

    #[test]
    fn test_only_decay_filters_saturation() {
        assert_eq!(
            SweepFamily::Decay.aggregation_policy(),
            AggregationPolicy::ExcludeSaturatedReplicates
        );
        assert_eq!(SweepFamily::Threshold.aggregation_policy(), AggregationPolicy::IncludeAll);
        assert_eq!(SweepFamily::Skew.aggregation_policy(), AggregationPolicy::IncludeAll);
    }

    #[test]
    fn test_configuration_display_names_point() {
        let configuration = SweepConfiguration {
            position: 3,
            parameter: SweepParameter::Decay(0.5),
            fixed: AuxiliaryParameters::default(),
        };
        assert_eq!(configuration.to_string(), "decay point 3 (gamma=0.5)");
    }
}
