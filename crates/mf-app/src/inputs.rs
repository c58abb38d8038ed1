//! Per-timestep input arrays for a run.

use crate::error::{AppError, AppResult};
use mf_results::TimeSteps;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Staged time-series inputs. Arrays of length one broadcast over the
/// whole run; everything else must share one length.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct RunInputs {
    /// Fixed timestep in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestep_s: Option<f64>,
    /// Per-sample intervals in seconds, for interval-valued inputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_intervals_s: Option<Vec<f64>>,
    /// Bus-side consumer demand per switchboard id.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub switchboard_demand_kw: BTreeMap<u32, Vec<f64>>,
    /// Terminal-side load per electric consumer name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub consumer_power_kw: BTreeMap<String, Vec<f64>>,
    /// Terminal-side load per mechanical consumer name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub mechanical_load_kw: BTreeMap<String, Vec<f64>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub source_status: BTreeMap<String, Vec<bool>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub source_load_sharing: BTreeMap<String, Vec<f64>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub main_engine_status: BTreeMap<String, Vec<bool>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub main_engine_load_sharing: BTreeMap<String, Vec<f64>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub storage_status: BTreeMap<String, Vec<bool>>,
    /// Signed storage dispatch: positive charges, negative discharges.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub storage_dispatch_kw: BTreeMap<String, Vec<f64>>,
    /// Electric-side PTI/PTO dispatch: positive draws from the bus.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub pti_pto_electric_power_kw: BTreeMap<String, Vec<f64>>,
    /// Shaft-side PTI/PTO dispatch: positive drives the shaft.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub pti_pto_shaft_power_kw: BTreeMap<String, Vec<f64>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub full_pti: BTreeMap<String, Vec<bool>>,
    /// Per-breaker status arrays, in bus-tie declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bus_tie_status: Vec<Vec<bool>>,
}

impl RunInputs {
    /// The time axis of this run.
    pub fn time_steps(&self) -> AppResult<TimeSteps> {
        match (&self.timestep_s, &self.time_intervals_s) {
            (Some(_), Some(_)) => Err(AppError::InvalidInput(
                "give either timestep_s or time_intervals_s, not both".to_string(),
            )),
            (Some(dt), None) if *dt > 0.0 && dt.is_finite() => Ok(TimeSteps::Uniform(*dt)),
            (Some(dt), None) => Err(AppError::InvalidInput(format!(
                "timestep_s must be positive and finite, got {dt}"
            ))),
            (None, Some(intervals)) if !intervals.is_empty() => {
                Ok(TimeSteps::PerStep(intervals.clone()))
            }
            (None, Some(_)) => Err(AppError::InvalidInput(
                "time_intervals_s must not be empty".to_string(),
            )),
            (None, None) => Err(AppError::InvalidInput(
                "inputs carry no timestep_s or time_intervals_s".to_string(),
            )),
        }
    }

    /// Total staged electric bus demand per timestep, used by the power
    /// management heuristic. Terminal-side loads are not included; stage
    /// demand at the bus when relying on the PMS.
    pub fn total_switchboard_demand_kw(&self) -> Vec<f64> {
        let n = self
            .switchboard_demand_kw
            .values()
            .map(|v| v.len())
            .max()
            .unwrap_or(0);
        let mut total = vec![0.0; n];
        for series in self.switchboard_demand_kw.values() {
            for (t, slot) in total.iter_mut().enumerate() {
                *slot += if series.len() == 1 {
                    series[0]
                } else {
                    series.get(t).copied().unwrap_or(0.0)
                };
            }
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestep_and_intervals_are_exclusive() {
        let inputs = RunInputs {
            timestep_s: Some(60.0),
            time_intervals_s: Some(vec![60.0]),
            ..Default::default()
        };
        assert!(inputs.time_steps().is_err());
    }

    #[test]
    fn uniform_timestep() {
        let inputs = RunInputs {
            timestep_s: Some(60.0),
            ..Default::default()
        };
        assert_eq!(inputs.time_steps().unwrap(), TimeSteps::Uniform(60.0));
    }

    #[test]
    fn total_demand_broadcasts_single_samples() {
        let mut inputs = RunInputs::default();
        inputs.switchboard_demand_kw.insert(1, vec![100.0]);
        inputs.switchboard_demand_kw.insert(2, vec![50.0, 70.0]);
        assert_eq!(inputs.total_switchboard_demand_kw(), vec![150.0, 170.0]);
    }
}
