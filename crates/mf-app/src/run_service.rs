//! Run execution: staging, power management, solving and aggregation.

use crate::error::{AppError, AppResult};
use crate::inputs::RunInputs;
use crate::pms::PmsLoadTable;
use mf_fuel::{Fuel, FuelLibrary, FuelRegime};
use mf_machinery::aggregate::{aggregate_electric, aggregate_mechanical, Aggregation};
use mf_machinery::{ElectricPowerSystem, MechanicalPropulsionSystem};
use mf_project::{build_system, MachinerySystem, SystemDef};
use mf_results::{compute_run_id, IntegrationRule, SystemResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SOLVER_VERSION: &str = "0.1.0";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunOptions {
    pub fuel_regime: FuelRegime,
    pub integration_rule: IntegrationRule,
    #[serde(default)]
    pub ignore_power_balance: bool,
    /// Derive source on/off patterns from the demand when the inputs do
    /// not stage any source status.
    #[serde(default = "default_true")]
    pub apply_pms_when_unstaged: bool,
    #[serde(default)]
    pub user_defined_fuels: Vec<Fuel>,
    #[serde(default)]
    pub user_defined_fuels_by_component: BTreeMap<String, Vec<Fuel>>,
}

fn default_true() -> bool {
    true
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            fuel_regime: FuelRegime::Imo,
            integration_rule: IntegrationRule::SumWithInterval,
            ignore_power_balance: false,
            apply_pms_when_unstaged: true,
            user_defined_fuels: Vec::new(),
            user_defined_fuels_by_component: BTreeMap::new(),
        }
    }
}

impl RunOptions {
    pub fn fuel_library(&self) -> FuelLibrary {
        match self.fuel_regime {
            FuelRegime::User => FuelLibrary::user_defined(
                self.user_defined_fuels.clone(),
                self.user_defined_fuels_by_component.clone(),
            ),
            regime => FuelLibrary::prescribed(regime),
        }
    }
}

/// Write the staged input arrays onto the system's component slots.
pub fn stage_inputs(system: &mut MachinerySystem, inputs: &RunInputs) -> AppResult<()> {
    match system {
        MachinerySystem::Electric(electric) => stage_electric(electric, inputs)?,
        MachinerySystem::Mechanical(mechanical) => stage_mechanical(mechanical, inputs)?,
        MachinerySystem::MechanicalWithElectric(combined) => {
            stage_electric(&mut combined.electric, inputs)?;
            stage_mechanical(&mut combined.mechanical, inputs)?;
        }
        MachinerySystem::Hybrid(hybrid) => {
            stage_electric(&mut hybrid.electric, inputs)?;
            stage_mechanical(&mut hybrid.mechanical, inputs)?;
        }
    }
    Ok(())
}

fn stage_electric(system: &mut ElectricPowerSystem, inputs: &RunInputs) -> AppResult<()> {
    for (id, values) in &inputs.switchboard_demand_kw {
        system.set_switchboard_demand_kw(mf_core::SwitchboardId(*id), values)?;
    }
    for (name, values) in &inputs.consumer_power_kw {
        system.set_consumer_load_kw(name, values)?;
    }
    for (name, values) in &inputs.source_status {
        system.set_source_status(name, values)?;
    }
    for (name, values) in &inputs.source_load_sharing {
        system.set_source_load_sharing(name, values)?;
    }
    for (name, values) in &inputs.storage_status {
        system.set_storage_status(name, values)?;
    }
    for (name, values) in &inputs.storage_dispatch_kw {
        system.set_storage_dispatch_kw(name, values)?;
    }
    for (name, values) in &inputs.pti_pto_electric_power_kw {
        system.set_pti_pto_electric_power_kw(name, values)?;
    }
    for (name, values) in &inputs.full_pti {
        // The flag lives on both sides of the coupling; ignore names that
        // only exist on the other side.
        let _ = system.set_full_pti(name, values);
    }
    for (index, values) in inputs.bus_tie_status.iter().enumerate() {
        system.set_bus_tie_status(index, values)?;
    }
    Ok(())
}

fn stage_mechanical(
    system: &mut MechanicalPropulsionSystem,
    inputs: &RunInputs,
) -> AppResult<()> {
    for (name, values) in &inputs.mechanical_load_kw {
        system.set_consumer_load_kw(name, values)?;
    }
    for (name, values) in &inputs.main_engine_status {
        system.set_main_engine_status(name, values)?;
    }
    for (name, values) in &inputs.main_engine_load_sharing {
        system.set_main_engine_load_sharing(name, values)?;
    }
    for (name, values) in &inputs.pti_pto_shaft_power_kw {
        system.set_pti_pto_shaft_power_kw(name, values)?;
    }
    for (name, values) in &inputs.full_pti {
        let _ = system.set_full_pti(name, values);
    }
    Ok(())
}

fn apply_pms(system: &mut ElectricPowerSystem, inputs: &RunInputs) -> AppResult<()> {
    let demand = inputs.total_switchboard_demand_kw();
    if demand.is_empty() {
        return Ok(());
    }
    let table = PmsLoadTable::from_system(system);
    for (name, status) in table.status_for(&demand) {
        system.set_source_status(&name, &status)?;
    }
    Ok(())
}

/// Execute a complete run: stage, balance, aggregate.
pub fn run(
    system: &mut MachinerySystem,
    inputs: &RunInputs,
    options: &RunOptions,
) -> AppResult<SystemResult> {
    let steps = inputs.time_steps()?;
    let fuels = options.fuel_library();
    stage_inputs(system, inputs)?;

    let pms_wanted = options.apply_pms_when_unstaged && inputs.source_status.is_empty();

    match system {
        MachinerySystem::Electric(electric) => {
            if pms_wanted {
                apply_pms(electric, inputs)?;
            }
            let warnings = electric.solve(&steps, options.ignore_power_balance)?;
            let agg = Aggregation {
                steps: &steps,
                rule: options.integration_rule,
                fuels: &fuels,
            };
            Ok(SystemResult {
                electric_system: Some(aggregate_electric(electric, &agg, warnings)?),
                mechanical_system: None,
            })
        }
        MachinerySystem::Mechanical(mechanical) => {
            let warnings = mechanical.solve(&steps, options.ignore_power_balance)?;
            let agg = Aggregation {
                steps: &steps,
                rule: options.integration_rule,
                fuels: &fuels,
            };
            Ok(SystemResult {
                electric_system: None,
                mechanical_system: Some(aggregate_mechanical(mechanical, &agg, warnings)?),
            })
        }
        MachinerySystem::MechanicalWithElectric(combined) => {
            if pms_wanted {
                apply_pms(&mut combined.electric, inputs)?;
            }
            let (elec_warnings, mech_warnings) =
                combined.solve(&steps, options.ignore_power_balance)?;
            let agg = Aggregation {
                steps: &steps,
                rule: options.integration_rule,
                fuels: &fuels,
            };
            Ok(SystemResult {
                electric_system: Some(aggregate_electric(&combined.electric, &agg, elec_warnings)?),
                mechanical_system: Some(aggregate_mechanical(
                    &combined.mechanical,
                    &agg,
                    mech_warnings,
                )?),
            })
        }
        MachinerySystem::Hybrid(hybrid) => {
            if pms_wanted {
                apply_pms(&mut hybrid.electric, inputs)?;
            }
            let (elec_warnings, mech_warnings) =
                hybrid.solve(&steps, options.ignore_power_balance)?;
            let agg = Aggregation {
                steps: &steps,
                rule: options.integration_rule,
                fuels: &fuels,
            };
            Ok(SystemResult {
                electric_system: Some(aggregate_electric(&hybrid.electric, &agg, elec_warnings)?),
                mechanical_system: Some(aggregate_mechanical(
                    &hybrid.mechanical,
                    &agg,
                    mech_warnings,
                )?),
            })
        }
    }
}

/// Build and run from a topology definition in one call.
pub fn run_from_def(
    def: &SystemDef,
    inputs: &RunInputs,
    options: &RunOptions,
) -> AppResult<SystemResult> {
    let mut system = build_system(def)?;
    run(&mut system, inputs, options)
}

/// Deterministic run id from the serialized definition, inputs and
/// options.
pub fn run_id_for(
    def: &SystemDef,
    inputs: &RunInputs,
    options: &RunOptions,
) -> AppResult<String> {
    let def_json = serde_json::to_string(def)?;
    let inputs_json = serde_json::to_string(inputs)?;
    let options_json = serde_json::to_string(options)?;
    Ok(compute_run_id(&[
        &def_json,
        &inputs_json,
        &options_json,
        SOLVER_VERSION,
    ]))
}
