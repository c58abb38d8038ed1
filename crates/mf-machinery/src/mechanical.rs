//! Mechanical propulsion system: shaft lines with main engines,
//! mechanical loads and an optional PTI/PTO.

use crate::balance::{distribute_demand, SourceEntry};
use crate::error::{MachineryError, MachineryResult};
use crate::node::{ConsumerSlot, MainEngineSlot, PtiPtoSlot, ShaftLine};
use mf_components::LOAD_TOLERANCE;
use mf_core::NodeId;
use mf_results::{SolverWarning, TimeSteps, WarningKind};

#[derive(Clone, Debug)]
pub struct MechanicalPropulsionSystem {
    pub name: String,
    pub shaft_lines: Vec<ShaftLine>,
    /// Highest allowed load fraction on the main engines.
    pub max_engine_load_fraction: f64,
    /// Load fraction base-load engines are promoted to carry first.
    pub base_load_fraction: f64,
    timesteps: Option<usize>,
}

impl MechanicalPropulsionSystem {
    pub fn new(name: &str, mut shaft_lines: Vec<ShaftLine>) -> MachineryResult<Self> {
        shaft_lines.sort_by_key(|s| s.id);
        for pair in shaft_lines.windows(2) {
            if pair[0].id == pair[1].id {
                return Err(MachineryError::Configuration {
                    what: format!("duplicate {}", pair[0].id),
                });
            }
        }
        for line in &shaft_lines {
            if line.main_engines.is_empty() && line.pti_ptos.is_empty() {
                return Err(MachineryError::Configuration {
                    what: format!("{} has no main engine or PTI/PTO", line.id),
                });
            }
        }
        Ok(Self {
            name: name.to_string(),
            shaft_lines,
            max_engine_load_fraction: 1.0,
            base_load_fraction: 0.0,
            timesteps: None,
        })
    }

    pub fn with_load_limits(
        mut self,
        max_engine_load_fraction: f64,
        base_load_fraction: f64,
    ) -> Self {
        self.max_engine_load_fraction = max_engine_load_fraction;
        self.base_load_fraction = base_load_fraction;
        self
    }

    pub fn timesteps(&self) -> Option<usize> {
        self.timesteps
    }

    // ------------------------------------------------------------------
    // Input staging

    pub fn set_consumer_load_kw(&mut self, name: &str, values: &[f64]) -> MachineryResult<()> {
        let slot = self.find_consumer_mut(name)?;
        slot.staged_at_bus = false;
        slot.power_output_kw = values.to_vec();
        Ok(())
    }

    pub fn set_main_engine_status(&mut self, name: &str, values: &[bool]) -> MachineryResult<()> {
        self.find_engine_mut(name)?.status = values.to_vec();
        Ok(())
    }

    pub fn set_main_engine_load_sharing(
        &mut self,
        name: &str,
        values: &[f64],
    ) -> MachineryResult<()> {
        self.find_engine_mut(name)?.load_sharing = values.to_vec();
        Ok(())
    }

    /// Stage the PTI/PTO shaft power: positive drives the shaft (power
    /// take in), negative extracts from it (power take off).
    pub fn set_pti_pto_shaft_power_kw(
        &mut self,
        name: &str,
        values: &[f64],
    ) -> MachineryResult<()> {
        let slot = self.find_pti_pto_mut(name)?;
        slot.shaft_power_kw = values.to_vec();
        slot.synced = false;
        Ok(())
    }

    pub fn set_full_pti(&mut self, name: &str, values: &[bool]) -> MachineryResult<()> {
        self.find_pti_pto_mut(name)?.full_pti = values.to_vec();
        Ok(())
    }

    fn find_engine_mut(&mut self, name: &str) -> MachineryResult<&mut MainEngineSlot> {
        self.shaft_lines
            .iter_mut()
            .flat_map(|s| s.main_engines.iter_mut())
            .find(|s| s.name() == name)
            .ok_or_else(|| MachineryError::UnknownComponent {
                name: name.to_string(),
            })
    }

    fn find_consumer_mut(&mut self, name: &str) -> MachineryResult<&mut ConsumerSlot> {
        self.shaft_lines
            .iter_mut()
            .flat_map(|s| s.consumers.iter_mut())
            .find(|s| s.name() == name)
            .ok_or_else(|| MachineryError::UnknownComponent {
                name: name.to_string(),
            })
    }

    pub(crate) fn find_pti_pto_mut(&mut self, name: &str) -> MachineryResult<&mut PtiPtoSlot> {
        self.shaft_lines
            .iter_mut()
            .flat_map(|s| s.pti_ptos.iter_mut())
            .find(|s| s.name() == name)
            .ok_or_else(|| MachineryError::UnknownComponent {
                name: name.to_string(),
            })
    }

    pub(crate) fn staged_max_len(&self) -> usize {
        let mut max = 0;
        for line in &self.shaft_lines {
            for e in &line.main_engines {
                max = max.max(e.status.len()).max(e.load_sharing.len());
            }
            for c in &line.consumers {
                max = max.max(c.power_output_kw.len()).max(c.power_input_kw.len());
            }
            for p in &line.pti_ptos {
                max = max.max(p.shaft_power_kw.len()).max(p.full_pti.len());
            }
        }
        max
    }

    pub fn prepare(&mut self, timesteps: Option<usize>) -> MachineryResult<usize> {
        let staged = self.staged_max_len();
        let n = timesteps
            .or(self.timesteps)
            .or(if staged > 0 { Some(staged) } else { None })
            .ok_or_else(|| MachineryError::InputShape {
                what: "no per-timestep inputs staged".to_string(),
            })?;
        for line in &mut self.shaft_lines {
            for slot in &mut line.main_engines {
                slot.prepare(n)?;
            }
            for slot in &mut line.consumers {
                slot.prepare(n)?;
            }
            for slot in &mut line.pti_ptos {
                slot.prepare(n, false)?;
            }
        }
        self.timesteps = Some(n);
        Ok(n)
    }

    /// Solve the shaft power balance over all timesteps.
    pub fn solve(
        &mut self,
        _steps: &TimeSteps,
        ignore_power_balance: bool,
    ) -> MachineryResult<Vec<SolverWarning>> {
        let n = self.prepare(None)?;
        let mut warnings = Vec::new();
        let max_fraction = self.max_engine_load_fraction;
        let base_fraction = self.base_load_fraction;
        for line in &mut self.shaft_lines {
            let node = NodeId::ShaftLine(line.id);
            let rated = line.rated_engine_power_kw();
            let tol = 1e-6 * rated.max(1.0);
            for t in 0..n {
                let demand: f64 = line
                    .consumers
                    .iter()
                    .map(|c| c.power_input_kw[t])
                    .sum();

                // Settle the PTI/PTO contribution seen by the engines.
                let mut pti_shaft = 0.0;
                for slot in &mut line.pti_ptos {
                    if slot.full_pti[t] {
                        // The machine alone drives the propeller; verify
                        // the chain can carry it.
                        let rated_pti = slot.pti_pto.meta().rated_kw();
                        if demand > rated_pti * (1.0 + LOAD_TOLERANCE) {
                            if ignore_power_balance {
                                warnings.push(SolverWarning {
                                    kind: WarningKind::PowerBalance,
                                    node,
                                    timestep: t,
                                    residual_kw: demand - rated_pti,
                                });
                                slot.set_shaft_power_at(t, rated_pti)?;
                                pti_shaft += rated_pti;
                            } else {
                                return Err(MachineryError::PowerBalance {
                                    node,
                                    timestep: t,
                                    residual_kw: demand - rated_pti,
                                });
                            }
                        } else {
                            slot.set_shaft_power_at(t, demand)?;
                            pti_shaft += demand;
                        }
                    } else {
                        pti_shaft += slot.shaft_power_kw[t];
                    }
                }

                let engine_demand = demand - pti_shaft;

                let mut refs: Vec<usize> = Vec::new();
                let mut entries: Vec<SourceEntry> = Vec::new();
                for (j, slot) in line.main_engines.iter_mut().enumerate() {
                    if !slot.status[t] {
                        slot.power_output_kw[t] = 0.0;
                        continue;
                    }
                    let engine_rated = slot.engine.meta.rated_kw();
                    let sharing = slot.load_sharing[t];
                    entries.push(SourceEntry {
                        weight: if sharing > 0.0 { sharing } else { engine_rated },
                        cap_kw: engine_rated * max_fraction,
                        base_load_order: slot.engine.meta.base_load_order,
                        base_level_kw: engine_rated * base_fraction,
                    });
                    refs.push(j);
                }
                let dist = distribute_demand(engine_demand, &entries);
                for (k, &j) in refs.iter().enumerate() {
                    line.main_engines[j].power_output_kw[t] = dist.shares_kw[k];
                }
                if dist.residual_kw.abs() > tol {
                    if ignore_power_balance {
                        warnings.push(SolverWarning {
                            kind: WarningKind::PowerBalance,
                            node,
                            timestep: t,
                            residual_kw: dist.residual_kw,
                        });
                    } else {
                        return Err(MachineryError::PowerBalance {
                            node,
                            timestep: t,
                            residual_kw: dist.residual_kw,
                        });
                    }
                }
            }
        }
        Ok(warnings)
    }
}
