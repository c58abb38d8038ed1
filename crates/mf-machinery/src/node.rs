//! Switchboard and shaft line nodes with their component slots.
//!
//! A slot pairs a component with its staged per-timestep arrays and the
//! series the solver writes. Topology is immutable after construction;
//! only the slot arrays change between runs.

use crate::error::{MachineryError, MachineryResult};
use mf_components::{Consumer, EnergyStorage, MainEngine, PowerSource, PtiPto};
use mf_core::{ShaftLineId, SwitchboardId};

fn check_unique_names<'a, I: Iterator<Item = &'a str>>(
    names: I,
    category: &str,
    node: &str,
) -> MachineryResult<()> {
    let mut seen: Vec<&str> = Vec::new();
    for name in names {
        if seen.contains(&name) {
            return Err(MachineryError::Configuration {
                what: format!("duplicate {category} name '{name}' on {node}"),
            });
        }
        seen.push(name);
    }
    Ok(())
}

/// Expand a staged array to `n` samples: full length passes through, a
/// single value broadcasts, anything else is a shape error.
pub(crate) fn expand<T: Clone>(
    values: &[T],
    n: usize,
    what: &str,
    default: T,
) -> MachineryResult<Vec<T>> {
    match values.len() {
        0 => Ok(vec![default; n]),
        1 => Ok(vec![values[0].clone(); n]),
        len if len == n => Ok(values.to_vec()),
        len => Err(MachineryError::InputShape {
            what: format!("{what}: expected {n} samples (or 1 to broadcast), got {len}"),
        }),
    }
}

#[derive(Clone, Debug)]
pub struct SourceSlot {
    pub source: PowerSource,
    pub status: Vec<bool>,
    pub load_sharing: Vec<f64>,
    /// Electric power delivered to the bus, filled by the solver.
    pub power_output_kw: Vec<f64>,
}

impl SourceSlot {
    pub fn new(source: PowerSource) -> Self {
        Self {
            source,
            status: Vec::new(),
            load_sharing: Vec::new(),
            power_output_kw: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.source.meta().name
    }

    pub(crate) fn prepare(&mut self, n: usize) -> MachineryResult<()> {
        self.status = expand(&self.status, n, "source status", true)?;
        self.load_sharing = expand(&self.load_sharing, n, "source load sharing", 0.0)?;
        self.power_output_kw = vec![0.0; n];
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct ConsumerSlot {
    pub consumer: Consumer,
    /// True when the staged demand refers to the bus side rather than the
    /// consumer terminal.
    pub staged_at_bus: bool,
    /// Power at the consumer terminal, kW.
    pub power_output_kw: Vec<f64>,
    /// Power drawn at the bus, kW.
    pub power_input_kw: Vec<f64>,
    pub load_ratio: Vec<f64>,
    pub efficiency: Vec<f64>,
}

impl ConsumerSlot {
    pub fn new(consumer: Consumer) -> Self {
        Self {
            consumer,
            staged_at_bus: false,
            power_output_kw: Vec::new(),
            power_input_kw: Vec::new(),
            load_ratio: Vec::new(),
            efficiency: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.consumer.meta().name
    }

    pub(crate) fn prepare(&mut self, n: usize) -> MachineryResult<()> {
        if self.staged_at_bus {
            self.power_input_kw = expand(&self.power_input_kw, n, "consumer demand", 0.0)?;
            self.power_output_kw = Vec::with_capacity(n);
            self.load_ratio = Vec::with_capacity(n);
            self.efficiency = Vec::with_capacity(n);
            for t in 0..n {
                let flow = self
                    .consumer
                    .chain
                    .power_output_from_input(self.power_input_kw[t])?;
                self.power_output_kw.push(flow.power_kw);
                self.load_ratio.push(flow.load_ratio);
                self.efficiency.push(flow.efficiency);
            }
        } else {
            self.power_output_kw = expand(&self.power_output_kw, n, "consumer load", 0.0)?;
            self.power_input_kw = Vec::with_capacity(n);
            self.load_ratio = Vec::with_capacity(n);
            self.efficiency = Vec::with_capacity(n);
            for t in 0..n {
                let flow = self.consumer.bus_power_from_load(self.power_output_kw[t])?;
                self.power_input_kw.push(flow.power_kw);
                self.load_ratio.push(flow.load_ratio);
                self.efficiency.push(flow.efficiency);
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct StorageSlot {
    pub storage: EnergyStorage,
    pub status: Vec<bool>,
    /// Staged dispatch at the bus: positive charges, negative discharges.
    pub requested_power_kw: Vec<f64>,
    /// Bus power actually served, filled by the solver.
    pub power_input_kw: Vec<f64>,
    /// Power into or out of the cells, filled by the solver.
    pub stored_power_kw: Vec<f64>,
    /// State of charge per time point (length T+1), filled by the solver.
    pub soc: Vec<f64>,
}

impl StorageSlot {
    pub fn new(storage: EnergyStorage) -> Self {
        Self {
            storage,
            status: Vec::new(),
            requested_power_kw: Vec::new(),
            power_input_kw: Vec::new(),
            stored_power_kw: Vec::new(),
            soc: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.storage.meta().name
    }

    pub(crate) fn prepare(&mut self, n: usize) -> MachineryResult<()> {
        self.status = expand(&self.status, n, "storage status", true)?;
        self.requested_power_kw =
            expand(&self.requested_power_kw, n, "storage dispatch", 0.0)?;
        self.power_input_kw = Vec::with_capacity(n);
        self.stored_power_kw = Vec::with_capacity(n);
        self.soc = vec![self.storage.soc0()];
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct PtiPtoSlot {
    pub pti_pto: PtiPto,
    /// Electric power at the bus: positive draws (power take in), negative
    /// feeds the bus (power take off).
    pub electric_power_kw: Vec<f64>,
    /// Shaft-side power: positive drives the shaft, negative extracts.
    pub shaft_power_kw: Vec<f64>,
    pub full_pti: Vec<bool>,
    /// True when both power series are already consistent through the
    /// chain; staging either side clears it.
    pub(crate) synced: bool,
}

impl PtiPtoSlot {
    pub fn new(pti_pto: PtiPto) -> Self {
        Self {
            pti_pto,
            electric_power_kw: Vec::new(),
            shaft_power_kw: Vec::new(),
            full_pti: Vec::new(),
            synced: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.pti_pto.meta().name
    }

    pub fn uid(&self) -> &str {
        &self.pti_pto.meta().uid
    }

    /// Expand staged arrays; when `from_electric`, the shaft series is
    /// derived from the staged electric series, otherwise the other way.
    /// Already-synced slots (after cross-system coupling) keep both
    /// series untouched.
    pub(crate) fn prepare(&mut self, n: usize, from_electric: bool) -> MachineryResult<()> {
        self.full_pti = expand(&self.full_pti, n, "full PTI flags", false)?;
        if self.synced
            && self.electric_power_kw.len() == n
            && self.shaft_power_kw.len() == n
        {
            return Ok(());
        }
        if from_electric {
            self.electric_power_kw =
                expand(&self.electric_power_kw, n, "PTI/PTO electric power", 0.0)?;
            self.shaft_power_kw = Vec::with_capacity(n);
            for t in 0..n {
                let flow = self
                    .pti_pto
                    .shaft_power_from_electric(self.electric_power_kw[t])?;
                self.shaft_power_kw.push(flow.power_kw);
            }
        } else {
            self.shaft_power_kw =
                expand(&self.shaft_power_kw, n, "PTI/PTO shaft power", 0.0)?;
            self.electric_power_kw = Vec::with_capacity(n);
            for t in 0..n {
                let flow = self
                    .pti_pto
                    .electric_power_from_shaft(self.shaft_power_kw[t])?;
                self.electric_power_kw.push(flow.power_kw);
            }
        }
        self.synced = true;
        Ok(())
    }

    /// Rewrite the shaft power at one timestep and keep the electric side
    /// consistent through the chain.
    pub(crate) fn set_shaft_power_at(&mut self, t: usize, shaft_kw: f64) -> MachineryResult<()> {
        let flow = self.pti_pto.electric_power_from_shaft(shaft_kw)?;
        self.shaft_power_kw[t] = shaft_kw;
        self.electric_power_kw[t] = flow.power_kw;
        Ok(())
    }
}

/// Electric bus node.
#[derive(Clone, Debug)]
pub struct Switchboard {
    pub id: SwitchboardId,
    pub sources: Vec<SourceSlot>,
    pub consumers: Vec<ConsumerSlot>,
    pub storages: Vec<StorageSlot>,
    pub pti_ptos: Vec<PtiPtoSlot>,
}

impl Switchboard {
    pub fn new(
        id: SwitchboardId,
        sources: Vec<PowerSource>,
        consumers: Vec<Consumer>,
        storages: Vec<EnergyStorage>,
        pti_ptos: Vec<PtiPto>,
    ) -> MachineryResult<Self> {
        let node = id.to_string();
        check_unique_names(sources.iter().map(|s| s.meta().name.as_str()), "source", &node)?;
        check_unique_names(
            consumers.iter().map(|s| s.meta().name.as_str()),
            "consumer",
            &node,
        )?;
        check_unique_names(
            storages.iter().map(|s| s.meta().name.as_str()),
            "storage",
            &node,
        )?;
        check_unique_names(
            pti_ptos.iter().map(|s| s.meta().name.as_str()),
            "PTI/PTO",
            &node,
        )?;
        Ok(Self {
            id,
            sources: sources.into_iter().map(SourceSlot::new).collect(),
            consumers: consumers.into_iter().map(ConsumerSlot::new).collect(),
            storages: storages.into_iter().map(StorageSlot::new).collect(),
            pti_ptos: pti_ptos.into_iter().map(PtiPtoSlot::new).collect(),
        })
    }

    pub fn has_supply(&self) -> bool {
        !self.sources.is_empty() || !self.storages.is_empty()
    }

    pub fn rated_source_power_kw(&self) -> f64 {
        self.sources.iter().map(|s| s.source.meta().rated_kw()).sum()
    }
}

/// Bus-tie breaker joining two switchboards when closed.
#[derive(Clone, Debug)]
pub struct BusTie {
    pub name: String,
    pub switchboards: (SwitchboardId, SwitchboardId),
    pub status: Vec<bool>,
}

impl BusTie {
    pub fn new(name: &str, a: SwitchboardId, b: SwitchboardId) -> Self {
        Self {
            name: name.to_string(),
            switchboards: (a, b),
            status: Vec::new(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct MainEngineSlot {
    pub engine: MainEngine,
    pub status: Vec<bool>,
    pub load_sharing: Vec<f64>,
    /// Shaft power delivered, filled by the solver.
    pub power_output_kw: Vec<f64>,
}

impl MainEngineSlot {
    pub fn new(engine: MainEngine) -> Self {
        Self {
            engine,
            status: Vec::new(),
            load_sharing: Vec::new(),
            power_output_kw: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.engine.meta.name
    }

    pub(crate) fn prepare(&mut self, n: usize) -> MachineryResult<()> {
        self.status = expand(&self.status, n, "main engine status", true)?;
        self.load_sharing = expand(&self.load_sharing, n, "main engine load sharing", 0.0)?;
        self.power_output_kw = vec![0.0; n];
        Ok(())
    }
}

/// Mechanical bus node.
#[derive(Clone, Debug)]
pub struct ShaftLine {
    pub id: ShaftLineId,
    pub main_engines: Vec<MainEngineSlot>,
    pub consumers: Vec<ConsumerSlot>,
    pub pti_ptos: Vec<PtiPtoSlot>,
}

impl ShaftLine {
    pub fn new(
        id: ShaftLineId,
        main_engines: Vec<MainEngine>,
        consumers: Vec<Consumer>,
        pti_ptos: Vec<PtiPto>,
    ) -> MachineryResult<Self> {
        let node = id.to_string();
        check_unique_names(
            main_engines.iter().map(|s| s.meta.name.as_str()),
            "main engine",
            &node,
        )?;
        check_unique_names(
            consumers.iter().map(|s| s.meta().name.as_str()),
            "consumer",
            &node,
        )?;
        check_unique_names(
            pti_ptos.iter().map(|s| s.meta().name.as_str()),
            "PTI/PTO",
            &node,
        )?;
        if pti_ptos.len() > 1 {
            return Err(MachineryError::Configuration {
                what: format!("{node} carries more than one PTI/PTO"),
            });
        }
        Ok(Self {
            id,
            main_engines: main_engines.into_iter().map(MainEngineSlot::new).collect(),
            consumers: consumers.into_iter().map(ConsumerSlot::new).collect(),
            pti_ptos: pti_ptos.into_iter().map(PtiPtoSlot::new).collect(),
        })
    }

    pub fn rated_engine_power_kw(&self) -> f64 {
        self.main_engines
            .iter()
            .map(|s| s.engine.meta.rated_kw())
            .sum()
    }
}
