//! Closed component unions dispatched by match.

use crate::chain::{ChainFlow, SerialChain};
use crate::cogas::Coges;
use crate::converter::PowerConverter;
use crate::engine::{EngineRunPoint, EngineVariant};
use crate::error::ComponentResult;
use crate::fuel_cell::FuelCellSystem;
use crate::genset::Genset;
use crate::meta::{ComponentKind, ComponentMeta};
use crate::shore::ShorePower;
use crate::storage::{Battery, SocSeries, SocStep, Supercapacitor};
use mf_core::{ShaftLineId, SwitchboardId};
use mf_fuel::{ConsumerClass, FuelLibrary};

/// Electric power source attached to a switchboard.
#[derive(Clone, Debug)]
pub enum PowerSource {
    Genset(Genset),
    FuelCellSystem(FuelCellSystem),
    Coges(Coges),
    ShorePower(ShorePower),
}

impl PowerSource {
    pub fn meta(&self) -> &ComponentMeta {
        match self {
            PowerSource::Genset(c) => &c.meta,
            PowerSource::FuelCellSystem(c) => &c.meta,
            PowerSource::Coges(c) => &c.meta,
            PowerSource::ShorePower(c) => &c.meta,
        }
    }

    pub fn is_shore_power(&self) -> bool {
        matches!(self, PowerSource::ShorePower(_))
    }

    pub fn consumer_class(&self) -> Option<ConsumerClass> {
        match self {
            PowerSource::Genset(c) => Some(c.consumer_class()),
            PowerSource::FuelCellSystem(c) => Some(c.consumer_class()),
            PowerSource::Coges(c) => Some(c.cogas.consumer_class()),
            PowerSource::ShorePower(_) => None,
        }
    }
}

/// Main engine driving a shaft line, optionally through a gearbox.
#[derive(Clone, Debug)]
pub struct MainEngine {
    pub meta: ComponentMeta,
    pub engine: EngineVariant,
    pub gearbox: Option<PowerConverter>,
}

impl MainEngine {
    pub fn new(
        name: &str,
        engine: EngineVariant,
        gearbox: Option<PowerConverter>,
    ) -> ComponentResult<Self> {
        let kind = if gearbox.is_some() {
            ComponentKind::MainEngineWithGearbox
        } else {
            ComponentKind::MainEngine
        };
        let meta = ComponentMeta::new(
            name,
            kind,
            crate::meta::PowerRole::Source,
            engine.meta().rated_kw(),
        )?
        .with_rated_speed_rpm(engine.meta().rated_rpm());
        Ok(Self {
            meta,
            engine,
            gearbox,
        })
    }

    pub fn consumer_class(&self) -> ConsumerClass {
        self.engine.consumer_class()
    }

    /// Evaluate fuel and emissions for shaft power delivered after the
    /// gearbox.
    pub fn run_point(
        &self,
        power_out_kw: &[f64],
        fuels: &FuelLibrary,
    ) -> ComponentResult<EngineRunPoint> {
        match &self.gearbox {
            None => self.engine.run_point(power_out_kw, fuels),
            Some(gearbox) => {
                let mut engine_power = Vec::with_capacity(power_out_kw.len());
                for &p in power_out_kw {
                    engine_power.push(gearbox.power_input_from_output(p)?.0);
                }
                self.engine.run_point(&engine_power, fuels)
            }
        }
    }
}

/// Power consumer: a serial chain from the bus down to its terminal load.
#[derive(Clone, Debug)]
pub struct Consumer {
    pub chain: SerialChain,
}

impl Consumer {
    pub fn new(chain: SerialChain) -> Self {
        Self { chain }
    }

    pub fn meta(&self) -> &ComponentMeta {
        &self.chain.meta
    }

    /// True when this consumer counts towards propulsion energy rather
    /// than auxiliary energy.
    pub fn is_propulsion(&self) -> bool {
        matches!(
            self.meta().kind,
            ComponentKind::PropulsionDrive | ComponentKind::PropellerLoad
        )
    }

    pub fn bus_power_from_load(&self, power_output_kw: f64) -> ComponentResult<ChainFlow> {
        self.chain.power_input_from_output(power_output_kw)
    }
}

/// Energy storage attached to a switchboard.
#[derive(Clone, Debug)]
pub enum EnergyStorage {
    Battery(Battery),
    Supercapacitor(Supercapacitor),
}

impl EnergyStorage {
    pub fn meta(&self) -> &ComponentMeta {
        match self {
            EnergyStorage::Battery(c) => &c.meta,
            EnergyStorage::Supercapacitor(c) => &c.meta,
        }
    }

    pub fn soc0(&self) -> f64 {
        match self {
            EnergyStorage::Battery(c) => c.soc0(),
            EnergyStorage::Supercapacitor(c) => c.soc0(),
        }
    }

    pub fn rated_capacity(&self) -> (f64, &'static str) {
        match self {
            EnergyStorage::Battery(c) => (c.rated_capacity_kwh, "kWh"),
            EnergyStorage::Supercapacitor(c) => (c.rated_capacity_wh, "Wh"),
        }
    }

    pub fn available_discharge_power_kw(&self, soc: f64, dt_s: f64) -> f64 {
        match self {
            EnergyStorage::Battery(c) => c.available_discharge_power_kw(soc, dt_s),
            EnergyStorage::Supercapacitor(c) => c.available_discharge_power_kw(soc, dt_s),
        }
    }

    pub fn soc_series(
        &self,
        power_input_kw: &[f64],
        dt_s: &[f64],
        strict: bool,
    ) -> ComponentResult<SocSeries> {
        match self {
            EnergyStorage::Battery(c) => c.soc_series(power_input_kw, dt_s, strict),
            EnergyStorage::Supercapacitor(c) => c.soc_series(power_input_kw, dt_s, strict),
        }
    }

    pub fn step_soc(
        &self,
        soc: f64,
        requested_kw: f64,
        dt_s: f64,
        timestep: usize,
        strict: bool,
    ) -> ComponentResult<SocStep> {
        match self {
            EnergyStorage::Battery(c) => c.step_soc(soc, requested_kw, dt_s, timestep, strict),
            EnergyStorage::Supercapacitor(c) => {
                c.step_soc(soc, requested_kw, dt_s, timestep, strict)
            }
        }
    }
}

/// Shared electric machine between a switchboard and a shaft line.
///
/// The chain runs from the electric bus (input side) to the shaft
/// (output side). Positive power is power-take-in: electric to shaft.
/// Negative power is power-take-off: shaft to electric.
#[derive(Clone, Debug)]
pub struct PtiPto {
    pub chain: SerialChain,
    pub switchboard_id: SwitchboardId,
    pub shaftline_id: ShaftLineId,
}

impl PtiPto {
    pub fn new(chain: SerialChain, switchboard_id: SwitchboardId, shaftline_id: ShaftLineId) -> Self {
        Self {
            chain,
            switchboard_id,
            shaftline_id,
        }
    }

    pub fn meta(&self) -> &ComponentMeta {
        &self.chain.meta
    }

    /// Electric power at the bus for a given shaft power.
    pub fn electric_power_from_shaft(&self, power_shaft_kw: f64) -> ComponentResult<ChainFlow> {
        self.chain.power_input_from_output(power_shaft_kw)
    }

    /// Shaft power for a given electric power at the bus.
    pub fn shaft_power_from_electric(&self, power_electric_kw: f64) -> ComponentResult<ChainFlow> {
        self.chain.power_output_from_input(power_electric_kw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::PowerRole;
    use mf_core::curve::EfficiencyCurve;

    fn chain(name: &str, kind: ComponentKind, eta: f64) -> SerialChain {
        SerialChain::new(
            name,
            kind,
            PowerRole::Consumer,
            vec![PowerConverter::new(
                ComponentMeta::new("stage", ComponentKind::PowerConverter, PowerRole::Transmission, 1000.0)
                    .unwrap(),
                EfficiencyCurve::constant(eta).unwrap(),
            )],
        )
        .unwrap()
    }

    #[test]
    fn propulsion_kinds_are_classified() {
        let prop = Consumer::new(chain("drive", ComponentKind::PropulsionDrive, 0.95));
        let aux = Consumer::new(chain("hotel", ComponentKind::OtherLoad, 1.0));
        assert!(prop.is_propulsion());
        assert!(!aux.is_propulsion());
    }

    #[test]
    fn pti_pto_directions() {
        let pti_pto = PtiPto::new(
            chain("pti/pto 1", ComponentKind::PtiPto, 0.9),
            SwitchboardId(1),
            ShaftLineId(1),
        );
        // PTI: 888.9 kW electric delivers 800 kW to the shaft.
        let shaft = pti_pto.shaft_power_from_electric(800.0 / 0.9).unwrap();
        assert!((shaft.power_kw - 800.0).abs() < 1e-9);
        // PTO: extracting 100 kW shaft yields 90 kW electric.
        let electric = pti_pto.electric_power_from_shaft(-100.0).unwrap();
        assert!((electric.power_kw + 90.0).abs() < 1e-9);
    }
}
