//! Genset: engine plus generator, optionally a rectifier for DC buses.

use crate::converter::PowerConverter;
use crate::engine::{EngineRunPoint, EngineVariant};
use crate::error::ComponentResult;
use crate::machine::ElectricMachine;
use crate::meta::{ComponentKind, ComponentMeta, PowerRole};
use mf_fuel::{ConsumerClass, FuelLibrary};

#[derive(Clone, Debug)]
pub struct GensetRunPoint {
    /// Electric load ratio referenced to the generator rating.
    pub genset_load_ratio: Vec<f64>,
    /// Engine shaft power behind the generator, kW.
    pub shaft_power_kw: Vec<f64>,
    pub engine: EngineRunPoint,
}

/// Serial composition behaving as one electric power source.
#[derive(Clone, Debug)]
pub struct Genset {
    pub meta: ComponentMeta,
    pub engine: EngineVariant,
    pub generator: ElectricMachine,
    pub rectifier: Option<PowerConverter>,
}

impl Genset {
    pub fn new(
        name: &str,
        engine: EngineVariant,
        generator: ElectricMachine,
        rectifier: Option<PowerConverter>,
    ) -> ComponentResult<Self> {
        let meta = ComponentMeta::new(
            name,
            ComponentKind::Genset,
            PowerRole::Source,
            generator.meta().rated_kw(),
        )?
        .with_rated_speed_rpm(generator.meta().rated_rpm());
        Ok(Self {
            meta,
            engine,
            generator,
            rectifier,
        })
    }

    pub fn consumer_class(&self) -> ConsumerClass {
        self.engine.consumer_class()
    }

    /// Evaluate fuel and emissions for an electric output series at the
    /// bus. The rectifier (if any) and the generator are walked in
    /// reverse to find the engine shaft power.
    pub fn run_point(
        &self,
        power_electric_kw: &[f64],
        fuels: &FuelLibrary,
    ) -> ComponentResult<GensetRunPoint> {
        let mut shaft_power_kw = Vec::with_capacity(power_electric_kw.len());
        let mut genset_load_ratio = Vec::with_capacity(power_electric_kw.len());
        for &p in power_electric_kw {
            let at_generator = match &self.rectifier {
                Some(rect) => rect.power_input_from_output(p)?.0,
                None => p,
            };
            let (shaft, load) = self.generator.shaft_power_from_electric(at_generator)?;
            shaft_power_kw.push(shaft);
            genset_load_ratio.push(load);
        }
        let engine = self.engine.run_point(&shaft_power_kw, fuels)?;
        Ok(GensetRunPoint {
            genset_load_ratio,
            shaft_power_kw,
            engine,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Engine, EngineCycle, NoxCalculationMethod};
    use mf_core::curve::{Curve, EfficiencyCurve};
    use mf_fuel::{FuelKind, FuelOrigin, FuelRegime};
    use std::collections::BTreeMap;

    fn test_genset() -> Genset {
        let engine = Engine::new(
            ComponentMeta::new("aux engine 1", ComponentKind::AuxEngine, PowerRole::Source, 1100.0)
                .unwrap()
                .with_rated_speed_rpm(750.0),
            Curve::constant(200.0).unwrap(),
            FuelKind::Diesel,
            FuelOrigin::Fossil,
            EngineCycle::Diesel,
            NoxCalculationMethod::Tier2,
            BTreeMap::new(),
        )
        .unwrap();
        let generator = ElectricMachine::new(PowerConverter::new(
            ComponentMeta::new("generator 1", ComponentKind::Generator, PowerRole::Source, 1000.0)
                .unwrap(),
            EfficiencyCurve::constant(0.95).unwrap(),
        ));
        Genset::new("genset 1", EngineVariant::Single(engine), generator, None).unwrap()
    }

    #[test]
    fn electric_output_maps_to_engine_shaft_power() {
        let genset = test_genset();
        let fuels = FuelLibrary::prescribed(FuelRegime::Imo);
        let run = genset.run_point(&[475.0], &fuels).unwrap();
        assert!((run.shaft_power_kw[0] - 500.0).abs() < 1e-9);
        // 200 g/kWh at 500 kW shaft
        let rate = run.engine.fuel_flow_rate_kg_per_s.total_at(0);
        assert!((rate - 200.0 * 500.0 / 3.6e6).abs() < 1e-12);
        assert!((run.genset_load_ratio[0] - 0.475).abs() < 1e-12);
    }

    #[test]
    fn dc_genset_walks_the_rectifier_first() {
        let mut genset = test_genset();
        genset.rectifier = Some(PowerConverter::new(
            ComponentMeta::new("rectifier 1", ComponentKind::Rectifier, PowerRole::Transmission, 1000.0)
                .unwrap(),
            EfficiencyCurve::constant(0.99).unwrap(),
        ));
        let fuels = FuelLibrary::prescribed(FuelRegime::Imo);
        let run = genset.run_point(&[475.0], &fuels).unwrap();
        assert!((run.shaft_power_kw[0] - 475.0 / 0.99 / 0.95).abs() < 1e-9);
    }
}
