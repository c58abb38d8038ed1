//! Machinery systems coupling a shaft line with an electric plant.

use crate::electric::ElectricPowerSystem;
use crate::error::{MachineryError, MachineryResult};
use crate::mechanical::MechanicalPropulsionSystem;
use mf_results::{SolverWarning, TimeSteps};

fn joint_timesteps(
    electric: &mut ElectricPowerSystem,
    mechanical: &mut MechanicalPropulsionSystem,
) -> MachineryResult<usize> {
    // Prepare both sides to a common length before any cross coupling;
    // staging only one side is fine.
    let staged = electric
        .staged_max_len()
        .max(mechanical.staged_max_len())
        .max(electric.timesteps().unwrap_or(0))
        .max(mechanical.timesteps().unwrap_or(0));
    if staged == 0 {
        return Err(MachineryError::InputShape {
            what: "no per-timestep inputs staged".to_string(),
        });
    }
    electric.prepare(Some(staged))?;
    mechanical.prepare(Some(staged))?;
    Ok(staged)
}

/// Copy the PTI/PTO series from each mechanical slot onto the electric
/// slot carrying the same uid. The machines are the same physical device
/// seen from both buses.
fn sync_pti_mech_to_electric(
    electric: &mut ElectricPowerSystem,
    mechanical: &MechanicalPropulsionSystem,
) -> MachineryResult<()> {
    for line in &mechanical.shaft_lines {
        for mech_slot in &line.pti_ptos {
            let name = mech_slot.name().to_string();
            let elec_slot = electric.find_pti_pto_mut(&name)?;
            elec_slot.electric_power_kw = mech_slot.electric_power_kw.clone();
            elec_slot.shaft_power_kw = mech_slot.shaft_power_kw.clone();
            elec_slot.full_pti = mech_slot.full_pti.clone();
            elec_slot.synced = true;
        }
    }
    Ok(())
}

fn sync_pti_electric_to_mech(
    electric: &ElectricPowerSystem,
    mechanical: &mut MechanicalPropulsionSystem,
) -> MachineryResult<()> {
    for swb in &electric.switchboards {
        for elec_slot in &swb.pti_ptos {
            let name = elec_slot.name().to_string();
            let mech_slot = mechanical.find_pti_pto_mut(&name)?;
            mech_slot.electric_power_kw = elec_slot.electric_power_kw.clone();
            mech_slot.shaft_power_kw = elec_slot.shaft_power_kw.clone();
            mech_slot.full_pti = elec_slot.full_pti.clone();
            mech_slot.synced = true;
        }
    }
    Ok(())
}

fn any_full_pti(mechanical: &MechanicalPropulsionSystem) -> bool {
    mechanical
        .shaft_lines
        .iter()
        .flat_map(|l| l.pti_ptos.iter())
        .any(|p| p.full_pti.iter().any(|f| *f))
}

/// Conventional mechanical propulsion with an independent electric plant.
///
/// The shaft lines are settled first; the resulting PTI/PTO electric
/// power is injected into the electric system, which then settles its own
/// balance.
#[derive(Clone, Debug)]
pub struct MechanicalPropulsionSystemWithElectricPowerSystem {
    pub name: String,
    pub electric: ElectricPowerSystem,
    pub mechanical: MechanicalPropulsionSystem,
}

impl MechanicalPropulsionSystemWithElectricPowerSystem {
    pub fn new(
        name: &str,
        electric: ElectricPowerSystem,
        mechanical: MechanicalPropulsionSystem,
    ) -> Self {
        Self {
            name: name.to_string(),
            electric,
            mechanical,
        }
    }

    pub fn solve(
        &mut self,
        steps: &TimeSteps,
        ignore_power_balance: bool,
    ) -> MachineryResult<(Vec<SolverWarning>, Vec<SolverWarning>)> {
        joint_timesteps(&mut self.electric, &mut self.mechanical)?;
        let mech_warnings = self.mechanical.solve(steps, ignore_power_balance)?;
        sync_pti_mech_to_electric(&mut self.electric, &self.mechanical)?;
        let elec_warnings = self.electric.solve(steps, ignore_power_balance)?;
        Ok((elec_warnings, mech_warnings))
    }
}

/// Hybrid propulsion: the PTI/PTO couples the buses in both directions.
///
/// The electric balance runs first so a staged power-take-off is seen by
/// the shaft line; the mechanical balance may then rewrite the machine
/// series wherever full power-take-in is flagged, in which case the
/// electric balance runs once more with the updated injection.
#[derive(Clone, Debug)]
pub struct HybridPropulsionSystem {
    pub name: String,
    pub electric: ElectricPowerSystem,
    pub mechanical: MechanicalPropulsionSystem,
}

impl HybridPropulsionSystem {
    pub fn new(
        name: &str,
        electric: ElectricPowerSystem,
        mechanical: MechanicalPropulsionSystem,
    ) -> MachineryResult<Self> {
        let n_elec: usize = electric
            .switchboards
            .iter()
            .map(|s| s.pti_ptos.len())
            .sum();
        let n_mech: usize = mechanical
            .shaft_lines
            .iter()
            .map(|l| l.pti_ptos.len())
            .sum();
        if n_elec == 0 || n_mech == 0 {
            return Err(MachineryError::Configuration {
                what: "hybrid propulsion requires a PTI/PTO on both the electric and mechanical side"
                    .to_string(),
            });
        }
        if n_elec != n_mech {
            return Err(MachineryError::Configuration {
                what: format!(
                    "PTI/PTO count differs between the electric ({n_elec}) and mechanical ({n_mech}) side"
                ),
            });
        }
        Ok(Self {
            name: name.to_string(),
            electric,
            mechanical,
        })
    }

    pub fn solve(
        &mut self,
        steps: &TimeSteps,
        ignore_power_balance: bool,
    ) -> MachineryResult<(Vec<SolverWarning>, Vec<SolverWarning>)> {
        joint_timesteps(&mut self.electric, &mut self.mechanical)?;
        let first_elec = self.electric.solve(steps, ignore_power_balance)?;
        sync_pti_electric_to_mech(&self.electric, &mut self.mechanical)?;
        let mech_warnings = self.mechanical.solve(steps, ignore_power_balance)?;
        let elec_warnings = if any_full_pti(&self.mechanical) {
            sync_pti_mech_to_electric(&mut self.electric, &self.mechanical)?;
            self.electric.solve(steps, ignore_power_balance)?
        } else {
            first_elec
        };
        Ok((elec_warnings, mech_warnings))
    }
}
