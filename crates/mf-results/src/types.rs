//! Result data types.

use crate::error::{ResultsError, ResultsResult};
use mf_core::NodeId;
use mf_fuel::{EmissionSpecies, FuelConsumption};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// CO2eq totals in kg, partitioned by accounting phase.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Co2EmissionBreakdown {
    pub well_to_tank: f64,
    pub tank_to_wake: f64,
    pub well_to_wake: f64,
    pub tank_to_wake_without_slip: f64,
    pub tank_to_wake_from_green_fuel: f64,
}

impl Co2EmissionBreakdown {
    pub fn accumulate(&mut self, other: &Co2EmissionBreakdown) {
        self.well_to_tank += other.well_to_tank;
        self.tank_to_wake += other.tank_to_wake;
        self.well_to_wake += other.well_to_wake;
        self.tank_to_wake_without_slip += other.tank_to_wake_without_slip;
        self.tank_to_wake_from_green_fuel += other.tank_to_wake_from_green_fuel;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    PowerBalance,
    StorageSaturation,
}

/// Recorded when the solver continues past an infeasible timestep because
/// the caller asked for the power balance to be ignored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolverWarning {
    pub kind: WarningKind,
    pub node: NodeId,
    pub timestep: usize,
    pub residual_kw: f64,
}

/// Per-component readout: time series from the solved run plus scalar
/// totals from the aggregation pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentResultRow {
    pub name: String,
    pub component_kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub switchboard_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shaftline_id: Option<u32>,
    pub rated_capacity: f64,
    pub rated_capacity_unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel_consumer_class: Option<String>,
    pub power_output_kw: Vec<f64>,
    pub power_input_kw: Vec<f64>,
    pub load_ratio: Vec<f64>,
    pub efficiency: Vec<f64>,
    pub status: Vec<bool>,
    /// State of charge per time point for storages, length T+1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soc: Option<Vec<f64>>,
    pub fuel_consumption_kg: f64,
    pub multi_fuel_consumption_kg: FuelConsumption,
    pub co2_emission_kg: f64,
    pub nox_emission_kg: f64,
    pub running_hours_hr: f64,
}

/// Aggregated outcome of one machinery (sub)system run.
///
/// Field names are stable; downstream consumers read them by name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MachineryResult {
    pub duration_s: f64,
    pub multi_fuel_consumption_total_kg: FuelConsumption,
    pub co2_emission_total_kg: Co2EmissionBreakdown,
    pub total_emission_kg: BTreeMap<EmissionSpecies, f64>,
    pub energy_consumption_electric_total_mj: f64,
    pub energy_consumption_mechanical_total_mj: f64,
    pub energy_consumption_propulsion_total_mj: f64,
    pub energy_consumption_auxiliary_total_mj: f64,
    pub energy_input_mechanical_total_mj: f64,
    pub energy_input_electric_total_mj: f64,
    pub energy_stored_total_mj: f64,
    pub running_hours_main_engines_total_hr: f64,
    pub running_hours_genset_total_hr: f64,
    pub running_hours_fuel_cell_total_hr: f64,
    pub running_hours_pti_pto_total_hr: f64,
    pub detail_result: Vec<ComponentResultRow>,
    pub warnings: Vec<SolverWarning>,
}

impl MachineryResult {
    pub fn with_duration(duration_s: f64) -> Self {
        Self {
            duration_s,
            ..Default::default()
        }
    }

    /// Total fuel mass over all fuels, kg.
    pub fn fuel_consumption_total_kg(&self) -> f64 {
        self.multi_fuel_consumption_total_kg.total()
    }

    /// Chemical energy of the consumed fuel, MJ.
    pub fn fuel_energy_total_mj(&self) -> f64 {
        self.multi_fuel_consumption_total_kg.fuel_energy_mj()
    }

    /// Sum another result into this one. Durations must agree; component
    /// rows and warnings are concatenated.
    pub fn merge(&mut self, other: MachineryResult) -> ResultsResult<()> {
        if self.duration_s != 0.0
            && other.duration_s != 0.0
            && (self.duration_s - other.duration_s).abs() > 1e-6
        {
            return Err(ResultsError::DurationMismatch {
                left: self.duration_s,
                right: other.duration_s,
            });
        }
        if self.duration_s == 0.0 {
            self.duration_s = other.duration_s;
        }
        self.multi_fuel_consumption_total_kg = self
            .multi_fuel_consumption_total_kg
            .add(&other.multi_fuel_consumption_total_kg)?;
        self.co2_emission_total_kg.accumulate(&other.co2_emission_total_kg);
        for (species, kg) in other.total_emission_kg {
            *self.total_emission_kg.entry(species).or_insert(0.0) += kg;
        }
        self.energy_consumption_electric_total_mj += other.energy_consumption_electric_total_mj;
        self.energy_consumption_mechanical_total_mj +=
            other.energy_consumption_mechanical_total_mj;
        self.energy_consumption_propulsion_total_mj +=
            other.energy_consumption_propulsion_total_mj;
        self.energy_consumption_auxiliary_total_mj +=
            other.energy_consumption_auxiliary_total_mj;
        self.energy_input_mechanical_total_mj += other.energy_input_mechanical_total_mj;
        self.energy_input_electric_total_mj += other.energy_input_electric_total_mj;
        self.energy_stored_total_mj += other.energy_stored_total_mj;
        self.running_hours_main_engines_total_hr += other.running_hours_main_engines_total_hr;
        self.running_hours_genset_total_hr += other.running_hours_genset_total_hr;
        self.running_hours_fuel_cell_total_hr += other.running_hours_fuel_cell_total_hr;
        self.running_hours_pti_pto_total_hr += other.running_hours_pti_pto_total_hr;
        self.detail_result.extend(other.detail_result);
        self.warnings.extend(other.warnings);
        Ok(())
    }
}

/// Run outcome for a whole machinery system. Hybrid and combined systems
/// report the electric and mechanical sides separately.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub electric_system: Option<MachineryResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mechanical_system: Option<MachineryResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_sums_scalars_and_keeps_duration() {
        let mut a = MachineryResult::with_duration(3600.0);
        a.energy_stored_total_mj = 1.0;
        a.total_emission_kg.insert(EmissionSpecies::Nox, 2.0);

        let mut b = MachineryResult::with_duration(3600.0);
        b.energy_stored_total_mj = 2.0;
        b.total_emission_kg.insert(EmissionSpecies::Nox, 3.0);

        a.merge(b).unwrap();
        assert!((a.energy_stored_total_mj - 3.0).abs() < 1e-12);
        assert!((a.total_emission_kg[&EmissionSpecies::Nox] - 5.0).abs() < 1e-12);
        assert!((a.duration_s - 3600.0).abs() < 1e-12);
    }

    #[test]
    fn merge_rejects_conflicting_durations() {
        let mut a = MachineryResult::with_duration(3600.0);
        let b = MachineryResult::with_duration(1800.0);
        assert!(a.merge(b).is_err());
    }

    #[test]
    fn co2_breakdown_accumulates() {
        let mut a = Co2EmissionBreakdown {
            well_to_tank: 1.0,
            tank_to_wake: 2.0,
            well_to_wake: 3.0,
            tank_to_wake_without_slip: 2.0,
            tank_to_wake_from_green_fuel: 0.5,
        };
        a.accumulate(&a.clone());
        assert!((a.well_to_wake - 6.0).abs() < 1e-12);
    }
}
