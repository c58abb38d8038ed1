//! Electric power system: switchboards joined by bus ties.

use crate::balance::{distribute_demand, SourceEntry};
use crate::error::{MachineryError, MachineryResult};
use crate::node::{expand, BusTie, ConsumerSlot, PtiPtoSlot, SourceSlot, StorageSlot, Switchboard};
use mf_components::{ComponentError, PowerSource};
use mf_core::{NodeId, SwitchboardId};
use mf_results::{SolverWarning, TimeSteps, WarningKind};

/// Diesel-electric power plant: a set of switchboards with sources,
/// consumers, storages and PTI/PTO machines, joined by bus-tie breakers.
///
/// The solver walks timesteps in order. Within a timestep the switchboards
/// joined by closed ties pool their demand; shore power and staged storage
/// dispatch are netted first, the residual demand is shared symmetrically
/// over the running sources with capacity redistribution, and a shortfall
/// is served from the storages before it counts as an imbalance.
#[derive(Clone, Debug)]
pub struct ElectricPowerSystem {
    pub name: String,
    pub switchboards: Vec<Switchboard>,
    pub bus_ties: Vec<BusTie>,
    /// Highest allowed load fraction on gensets and other engines.
    pub max_genset_load_fraction: f64,
    /// Highest allowed load fraction on fuel cell systems.
    pub max_fuel_cell_load_fraction: f64,
    /// Load fraction base-load sources are promoted to carry first.
    pub base_load_fraction: f64,
    timesteps: Option<usize>,
}

impl ElectricPowerSystem {
    pub fn new(
        name: &str,
        mut switchboards: Vec<Switchboard>,
        bus_tie_connections: &[(SwitchboardId, SwitchboardId)],
    ) -> MachineryResult<Self> {
        switchboards.sort_by_key(|s| s.id);
        for pair in switchboards.windows(2) {
            if pair[0].id == pair[1].id {
                return Err(MachineryError::Configuration {
                    what: format!("duplicate {}", pair[0].id),
                });
            }
        }
        for swb in &switchboards {
            if !swb.has_supply() {
                return Err(MachineryError::Configuration {
                    what: format!("{} has no power source or energy storage", swb.id),
                });
            }
        }
        let mut bus_ties = Vec::new();
        for (i, (a, b)) in bus_tie_connections.iter().enumerate() {
            for id in [a, b] {
                if !switchboards.iter().any(|s| s.id == *id) {
                    return Err(MachineryError::Configuration {
                        what: format!("bus tie {} references unknown {}", i + 1, id),
                    });
                }
            }
            bus_ties.push(BusTie::new(&format!("bus tie {}", i + 1), *a, *b));
        }
        Ok(Self {
            name: name.to_string(),
            switchboards,
            bus_ties,
            max_genset_load_fraction: 1.0,
            max_fuel_cell_load_fraction: 1.0,
            base_load_fraction: 0.0,
            timesteps: None,
        })
    }

    pub fn with_load_limits(
        mut self,
        max_genset_load_fraction: f64,
        max_fuel_cell_load_fraction: f64,
        base_load_fraction: f64,
    ) -> Self {
        self.max_genset_load_fraction = max_genset_load_fraction;
        self.max_fuel_cell_load_fraction = max_fuel_cell_load_fraction;
        self.base_load_fraction = base_load_fraction;
        self
    }

    pub fn timesteps(&self) -> Option<usize> {
        self.timesteps
    }

    pub fn rated_power_kw(&self) -> f64 {
        self.switchboards
            .iter()
            .map(|s| s.rated_source_power_kw())
            .sum()
    }

    // ------------------------------------------------------------------
    // Input staging

    pub fn set_consumer_load_kw(&mut self, name: &str, values: &[f64]) -> MachineryResult<()> {
        let slot = self.find_consumer_mut(name)?;
        slot.staged_at_bus = false;
        slot.power_output_kw = values.to_vec();
        Ok(())
    }

    /// Stage bus-side demand on a switchboard, split equally over its
    /// consumers.
    pub fn set_switchboard_demand_kw(
        &mut self,
        id: SwitchboardId,
        values: &[f64],
    ) -> MachineryResult<()> {
        let swb = self
            .switchboards
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| MachineryError::Configuration {
                what: format!("unknown {id}"),
            })?;
        if swb.consumers.is_empty() {
            return Err(MachineryError::Configuration {
                what: format!("{id} has no consumers to carry the staged demand"),
            });
        }
        let share = 1.0 / swb.consumers.len() as f64;
        for slot in &mut swb.consumers {
            slot.staged_at_bus = true;
            slot.power_input_kw = values.iter().map(|v| v * share).collect();
        }
        Ok(())
    }

    pub fn set_source_status(&mut self, name: &str, values: &[bool]) -> MachineryResult<()> {
        self.find_source_mut(name)?.status = values.to_vec();
        Ok(())
    }

    pub fn set_source_load_sharing(&mut self, name: &str, values: &[f64]) -> MachineryResult<()> {
        self.find_source_mut(name)?.load_sharing = values.to_vec();
        Ok(())
    }

    pub fn set_storage_status(&mut self, name: &str, values: &[bool]) -> MachineryResult<()> {
        self.find_storage_mut(name)?.status = values.to_vec();
        Ok(())
    }

    /// Stage a signed storage dispatch: positive charges, negative
    /// discharges.
    pub fn set_storage_dispatch_kw(&mut self, name: &str, values: &[f64]) -> MachineryResult<()> {
        self.find_storage_mut(name)?.requested_power_kw = values.to_vec();
        Ok(())
    }

    /// Stage the PTI/PTO electric power: positive draws from the bus
    /// (power take in), negative feeds it (power take off).
    pub fn set_pti_pto_electric_power_kw(
        &mut self,
        name: &str,
        values: &[f64],
    ) -> MachineryResult<()> {
        let slot = self.find_pti_pto_mut(name)?;
        slot.electric_power_kw = values.to_vec();
        slot.synced = false;
        Ok(())
    }

    pub fn set_full_pti(&mut self, name: &str, values: &[bool]) -> MachineryResult<()> {
        self.find_pti_pto_mut(name)?.full_pti = values.to_vec();
        Ok(())
    }

    pub fn set_bus_tie_status(&mut self, index: usize, values: &[bool]) -> MachineryResult<()> {
        let tie = self
            .bus_ties
            .get_mut(index)
            .ok_or_else(|| MachineryError::Configuration {
                what: format!("bus tie index {index} out of range"),
            })?;
        tie.status = values.to_vec();
        Ok(())
    }

    fn find_source_mut(&mut self, name: &str) -> MachineryResult<&mut SourceSlot> {
        self.switchboards
            .iter_mut()
            .flat_map(|s| s.sources.iter_mut())
            .find(|s| s.name() == name)
            .ok_or_else(|| MachineryError::UnknownComponent {
                name: name.to_string(),
            })
    }

    fn find_consumer_mut(&mut self, name: &str) -> MachineryResult<&mut ConsumerSlot> {
        self.switchboards
            .iter_mut()
            .flat_map(|s| s.consumers.iter_mut())
            .find(|s| s.name() == name)
            .ok_or_else(|| MachineryError::UnknownComponent {
                name: name.to_string(),
            })
    }

    fn find_storage_mut(&mut self, name: &str) -> MachineryResult<&mut StorageSlot> {
        self.switchboards
            .iter_mut()
            .flat_map(|s| s.storages.iter_mut())
            .find(|s| s.name() == name)
            .ok_or_else(|| MachineryError::UnknownComponent {
                name: name.to_string(),
            })
    }

    pub(crate) fn find_pti_pto_mut(&mut self, name: &str) -> MachineryResult<&mut PtiPtoSlot> {
        self.switchboards
            .iter_mut()
            .flat_map(|s| s.pti_ptos.iter_mut())
            .find(|s| s.name() == name)
            .ok_or_else(|| MachineryError::UnknownComponent {
                name: name.to_string(),
            })
    }

    pub(crate) fn staged_max_len(&self) -> usize {
        let mut max = 0;
        for swb in &self.switchboards {
            for s in &swb.sources {
                max = max.max(s.status.len()).max(s.load_sharing.len());
            }
            for c in &swb.consumers {
                max = max.max(c.power_output_kw.len()).max(c.power_input_kw.len());
            }
            for s in &swb.storages {
                max = max
                    .max(s.status.len())
                    .max(s.requested_power_kw.len());
            }
            for p in &swb.pti_ptos {
                max = max
                    .max(p.electric_power_kw.len())
                    .max(p.full_pti.len());
            }
        }
        for tie in &self.bus_ties {
            max = max.max(tie.status.len());
        }
        max
    }

    /// Expand all staged arrays to a common length and reset the solver
    /// output series. Length-1 arrays broadcast; unset arrays take their
    /// defaults (sources on, equal sharing, ties closed, zero demand).
    pub fn prepare(&mut self, timesteps: Option<usize>) -> MachineryResult<usize> {
        let staged = self.staged_max_len();
        let n = timesteps
            .or(self.timesteps)
            .or(if staged > 0 { Some(staged) } else { None })
            .ok_or_else(|| MachineryError::InputShape {
                what: "no per-timestep inputs staged".to_string(),
            })?;
        for swb in &mut self.switchboards {
            for slot in &mut swb.sources {
                slot.prepare(n)?;
            }
            for slot in &mut swb.consumers {
                slot.prepare(n)?;
            }
            for slot in &mut swb.storages {
                slot.prepare(n)?;
            }
            for slot in &mut swb.pti_ptos {
                slot.prepare(n, true)?;
            }
        }
        for tie in &mut self.bus_ties {
            tie.status = expand(&tie.status, n, "bus tie status", true)?;
        }
        self.timesteps = Some(n);
        Ok(n)
    }

    /// Switchboard groups joined by closed ties at timestep `t`.
    fn pools_at(&self, t: usize) -> Vec<Vec<usize>> {
        let n = self.switchboards.len();
        let mut parent: Vec<usize> = (0..n).collect();
        fn find(parent: &mut [usize], mut i: usize) -> usize {
            while parent[i] != i {
                parent[i] = parent[parent[i]];
                i = parent[i];
            }
            i
        }
        for tie in &self.bus_ties {
            if tie.status[t] {
                let a = self
                    .switchboards
                    .iter()
                    .position(|s| s.id == tie.switchboards.0)
                    .expect("tie endpoints are validated");
                let b = self
                    .switchboards
                    .iter()
                    .position(|s| s.id == tie.switchboards.1)
                    .expect("tie endpoints are validated");
                let ra = find(&mut parent, a);
                let rb = find(&mut parent, b);
                if ra != rb {
                    parent[rb.max(ra)] = rb.min(ra);
                }
            }
        }
        let mut pools: Vec<Vec<usize>> = vec![Vec::new(); n];
        for i in 0..n {
            let root = find(&mut parent, i);
            pools[root].push(i);
        }
        pools.into_iter().filter(|p| !p.is_empty()).collect()
    }

    /// Solve the power balance over all timesteps.
    ///
    /// With `ignore_power_balance` set, infeasible timesteps are clipped
    /// and recorded as warnings instead of failing the run.
    pub fn solve(
        &mut self,
        steps: &TimeSteps,
        ignore_power_balance: bool,
    ) -> MachineryResult<Vec<SolverWarning>> {
        let n = self.prepare(None)?;
        if let TimeSteps::PerStep(v) = steps {
            if v.len() != n {
                return Err(MachineryError::InputShape {
                    what: format!(
                        "timestep interval array has {} samples, inputs have {n}",
                        v.len()
                    ),
                });
            }
        }
        let mut warnings = Vec::new();
        for t in 0..n {
            let dt = match steps {
                TimeSteps::Uniform(dt) => *dt,
                TimeSteps::PerStep(v) => v[t],
            };
            let pools = self.pools_at(t);
            for pool in pools {
                self.solve_pool(&pool, t, dt, ignore_power_balance, &mut warnings)?;
            }
        }
        Ok(warnings)
    }

    fn solve_pool(
        &mut self,
        pool: &[usize],
        t: usize,
        dt: f64,
        ignore_power_balance: bool,
        warnings: &mut Vec<SolverWarning>,
    ) -> MachineryResult<()> {
        let node = NodeId::Switchboard(self.switchboards[pool[0]].id);
        let pool_rated: f64 = pool
            .iter()
            .map(|&si| self.switchboards[si].rated_source_power_kw())
            .sum();
        let tol = 1e-6 * pool_rated.max(1.0);

        // Demand from consumers and staged PTI/PTO electric power.
        let mut demand = 0.0;
        for &si in pool {
            let swb = &self.switchboards[si];
            demand += swb
                .consumers
                .iter()
                .map(|c| c.power_input_kw[t])
                .sum::<f64>();
            demand += swb
                .pti_ptos
                .iter()
                .map(|p| p.electric_power_kw[t])
                .sum::<f64>();
        }

        // Staged storage dispatch. Charging adds demand, discharging
        // covers it. The step is trialled against the current SoC; the
        // commit happens after the shortfall dispatch below.
        let mut storage_plan: Vec<(usize, usize, f64)> = Vec::new();
        for &si in pool {
            for ki in 0..self.switchboards[si].storages.len() {
                let slot = &self.switchboards[si].storages[ki];
                let soc = *slot.soc.last().expect("soc series is seeded");
                let desired = if slot.status[t] {
                    slot.requested_power_kw[t]
                } else {
                    0.0
                };
                let trial = match slot.storage.step_soc(
                    soc,
                    desired,
                    dt,
                    t,
                    !ignore_power_balance,
                ) {
                    Ok(step) => step,
                    Err(ComponentError::StorageSaturation { component, .. }) => {
                        return Err(MachineryError::StorageSaturation {
                            node,
                            component,
                            timestep: t,
                        })
                    }
                    Err(e) => return Err(e.into()),
                };
                if trial.saturated {
                    warnings.push(SolverWarning {
                        kind: WarningKind::StorageSaturation,
                        node,
                        timestep: t,
                        residual_kw: desired - trial.achieved_power_kw,
                    });
                }
                demand += trial.achieved_power_kw;
                storage_plan.push((si, ki, trial.achieved_power_kw));
            }
        }

        // Shore power covers demand before the gensets.
        let mut remaining = demand;
        for &si in pool {
            for slot in self.switchboards[si].sources.iter_mut() {
                if slot.source.is_shore_power() {
                    if slot.status[t] {
                        let supply = remaining.max(0.0).min(slot.source.meta().rated_kw());
                        slot.power_output_kw[t] = supply;
                        remaining -= supply;
                    } else {
                        slot.power_output_kw[t] = 0.0;
                    }
                }
            }
        }

        // Symmetric distribution over the running sources.
        let mut refs: Vec<(usize, usize)> = Vec::new();
        let mut entries: Vec<SourceEntry> = Vec::new();
        for &si in pool {
            for (j, slot) in self.switchboards[si].sources.iter_mut().enumerate() {
                if slot.source.is_shore_power() {
                    continue;
                }
                if !slot.status[t] {
                    slot.power_output_kw[t] = 0.0;
                    continue;
                }
                let rated = slot.source.meta().rated_kw();
                let max_fraction = match slot.source {
                    PowerSource::FuelCellSystem(_) => self.max_fuel_cell_load_fraction,
                    _ => self.max_genset_load_fraction,
                };
                let sharing = slot.load_sharing[t];
                entries.push(SourceEntry {
                    weight: if sharing > 0.0 { sharing } else { rated },
                    cap_kw: rated * max_fraction,
                    base_load_order: slot.source.meta().base_load_order,
                    base_level_kw: rated * self.base_load_fraction,
                });
                refs.push((si, j));
            }
        }
        let dist = distribute_demand(remaining, &entries);
        for (k, &(si, j)) in refs.iter().enumerate() {
            self.switchboards[si].sources[j].power_output_kw[t] = dist.shares_kw[k];
        }
        let mut residual = dist.residual_kw;

        // Shortfall is served from the storages with SoC headroom.
        if residual > tol {
            for (si, ki, planned) in storage_plan.iter_mut() {
                let slot = &self.switchboards[*si].storages[*ki];
                if !slot.status[t] {
                    continue;
                }
                let soc = *slot.soc.last().expect("soc series is seeded");
                let already_discharging = (-*planned).max(0.0);
                let avail = (slot.storage.available_discharge_power_kw(soc, dt)
                    - already_discharging)
                    .max(0.0);
                let extra = residual.min(avail);
                *planned -= extra;
                residual -= extra;
                if residual <= tol {
                    break;
                }
            }
        }

        // Commit the storage steps and advance SoC.
        for (si, ki, planned) in storage_plan {
            let slot = &mut self.switchboards[si].storages[ki];
            let soc = *slot.soc.last().expect("soc series is seeded");
            let step = slot.storage.step_soc(soc, planned, dt, t, false)?;
            residual += step.achieved_power_kw - planned;
            slot.power_input_kw.push(step.achieved_power_kw);
            slot.stored_power_kw.push(step.stored_power_kw);
            slot.soc.push(step.soc_next);
        }

        if residual.abs() > tol {
            if ignore_power_balance {
                warnings.push(SolverWarning {
                    kind: WarningKind::PowerBalance,
                    node,
                    timestep: t,
                    residual_kw: residual,
                });
            } else {
                return Err(MachineryError::PowerBalance {
                    node,
                    timestep: t,
                    residual_kw: residual,
                });
            }
        }
        Ok(())
    }
}
