//! Sweep planning.
//!
//! A [`SweepPlan`] is the ordered list of configurations for one sweep.
//! Position `i` of every series produced from the sweep corresponds to
//! configuration `i`, so plans are deterministic and never reordered.

use crate::constants::{threshold_for_index, DECAY_EXPONENTS, SKEW_STEPS, THRESHOLD_INDICES};
use crate::types::{AuxiliaryParameters, SweepConfiguration, SweepFamily, SweepParameter};

#[derive(Debug, Clone, PartialEq)]
pub struct SweepPlan {
    family: SweepFamily,
    configurations: Vec<SweepConfiguration>,
}

impl SweepPlan {
    /// phi = 2^-10, 2^-11, ..., 2^-20.
    pub fn threshold(fixed: AuxiliaryParameters) -> Self {
        let fixed = AuxiliaryParameters {
            threshold: None,
            ..fixed
        };
        let parameters = THRESHOLD_INDICES.map(|i| SweepParameter::Threshold(threshold_for_index(i)));
        Self::build(SweepFamily::Threshold, parameters, fixed)
    }

    /// gamma = 2^-4, 2^-3, ..., 2^4 at a fixed phi.
    pub fn decay(threshold: f64, fixed: AuxiliaryParameters) -> Self {
        let fixed = AuxiliaryParameters {
            threshold: Some(threshold),
            decay: None,
            ..fixed
        };
        let parameters = DECAY_EXPONENTS.map(|i| SweepParameter::Decay(2f64.powi(i)));
        Self::build(SweepFamily::Decay, parameters, fixed)
    }

    /// z = 0.1, 0.2, ..., 2.0 at a fixed phi on the synthetic generator.
    ///
    /// `decay: None` keeps the executable's default decay.
    pub fn skew(threshold: f64, decay: Option<f64>) -> Self {
        let fixed = AuxiliaryParameters {
            trace: None,
            threshold: Some(threshold),
            decay,
            skew: None,
        };
        // Derived from the integer step so 0.3 is 0.3, not 0.1 + 0.1 + 0.1.
        let parameters = SKEW_STEPS.map(|step| SweepParameter::Skew(f64::from(step) / 10.0));
        Self::build(SweepFamily::Skew, parameters, fixed)
    }

    fn build(
        family: SweepFamily,
        parameters: impl Iterator<Item = SweepParameter>,
        fixed: AuxiliaryParameters,
    ) -> Self {
        let configurations = parameters
            .enumerate()
            .map(|(position, parameter)| SweepConfiguration {
                position,
                parameter,
                fixed: fixed.clone(),
            })
            .collect();
        Self {
            family,
            configurations,
        }
    }

    pub fn family(&self) -> SweepFamily {
        self.family
    }

    pub fn len(&self) -> usize {
        self.configurations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configurations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SweepConfiguration> {
        self.configurations.iter()
    }

    pub fn get(&self, position: usize) -> Option<&SweepConfiguration> {
        self.configurations.get(position)
    }

    /// The varying parameter at each position, for plotting.
    pub fn values(&self) -> Vec<f64> {
        self.configurations
            .iter()
            .map(|configuration| configuration.parameter.value())
            .collect()
    }
}

impl<'a> IntoIterator for &'a SweepPlan {
    type Item = &'a SweepConfiguration;
    type IntoIter = std::slice::Iter<'a, SweepConfiguration>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_sweep_lengths() {
        assert_eq!(SweepPlan::threshold(AuxiliaryParameters::default()).len(), 11);
        assert_eq!(SweepPlan::decay(2f64.powi(-15), AuxiliaryParameters::default()).len(), 9);
        assert_eq!(SweepPlan::skew(2f64.powi(-15), None).len(), 20);
    }

    #[test]
    fn test_threshold_values_descend_by_powers_of_two() {
        let plan = SweepPlan::threshold(AuxiliaryParameters::default());
        let values = plan.values();

        assert_eq!(values[0], 2f64.powi(-10));
        assert_eq!(values[10], 2f64.powi(-20));
        assert!(values.windows(2).all(|w| w[1] == w[0] / 2.0));
    }

    #[test]
    fn test_decay_values_and_fixed_threshold() {
        let phi = 2f64.powi(-15);
        let plan = SweepPlan::decay(phi, AuxiliaryParameters::default());

        assert_eq!(plan.values(), vec![0.0625, 0.125, 0.25, 0.5, 1.0, 2.0, 4.0, 8.0, 16.0]);
        assert!(plan.iter().all(|c| c.fixed.threshold == Some(phi) && c.fixed.decay.is_none()));
    }

    #[test]
    fn test_skew_values_are_exact_tenths() {
        let plan = SweepPlan::skew(0.001, Some(1.0));
        let values = plan.values();

        assert_eq!(values[0], 0.1);
        assert_eq!(values[2], 0.3);
        assert_eq!(values[19], 2.0);
        assert!(plan.iter().all(|c| c.fixed.decay == Some(1.0) && c.fixed.trace.is_none()));
    }

    #[test]
    fn test_positions_follow_order() {
        let plan = SweepPlan::decay(0.001, AuxiliaryParameters::default());
        for (i, configuration) in plan.iter().enumerate() {
            assert_eq!(configuration.position, i);
            assert_eq!(configuration.family(), SweepFamily::Decay);
        }
    }

    #[test]
    fn test_plans_are_deterministic() {
        let fixed = AuxiliaryParameters {
            trace: Some(PathBuf::from("data/trace")),
            skew: Some(1.3),
            ..Default::default()
        };
        assert_eq!(SweepPlan::threshold(fixed.clone()), SweepPlan::threshold(fixed));
    }

    #[test]
    fn test_threshold_plan_keeps_trace_and_skew() {
        let fixed = AuxiliaryParameters {
            trace: Some(PathBuf::from("data/trace")),
            threshold: Some(0.5),
            skew: Some(0.7),
            ..Default::default()
        };
        let plan = SweepPlan::threshold(fixed);
        let first = plan.get(0).unwrap();

        assert_eq!(first.fixed.trace, Some(PathBuf::from("data/trace")));
        assert_eq!(first.fixed.skew, Some(0.7));
        assert_eq!(first.fixed.threshold, None);
    }
}
