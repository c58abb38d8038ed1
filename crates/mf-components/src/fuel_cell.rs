//! Fuel cell module and fuel cell system.

use crate::converter::PowerConverter;
use crate::error::ComponentResult;
use crate::meta::{ComponentMeta, LOAD_TOLERANCE};
use mf_core::curve::EfficiencyCurve;
use mf_core::numeric::clamp;
use mf_fuel::{ConsumerClass, FuelConsumption, FuelKind, FuelLibrary, FuelOrigin, ScalarOrSeries};

#[derive(Clone, Debug)]
pub struct FuelCellRunPoint {
    pub load_ratio: Vec<f64>,
    pub fuel_flow_rate_kg_per_s: FuelConsumption,
    pub efficiency: Vec<f64>,
}

/// Single fuel cell module with an efficiency curve over load.
#[derive(Clone, Debug)]
pub struct FuelCell {
    pub meta: ComponentMeta,
    efficiency: EfficiencyCurve,
    pub fuel_kind: FuelKind,
    pub fuel_origin: FuelOrigin,
    /// Load ratio below which the stack should not run. Advisory.
    pub minimum_load_ratio: f64,
    /// Cold start delay in seconds. Advisory.
    pub start_delay_s: f64,
}

impl FuelCell {
    pub fn new(
        meta: ComponentMeta,
        efficiency: EfficiencyCurve,
        fuel_kind: FuelKind,
        fuel_origin: FuelOrigin,
    ) -> Self {
        Self {
            meta,
            efficiency,
            fuel_kind,
            fuel_origin,
            minimum_load_ratio: 0.0,
            start_delay_s: 0.0,
        }
    }

    pub fn consumer_class(&self) -> ConsumerClass {
        ConsumerClass::FuelCell
    }

    pub fn run_point(
        &self,
        power_out_kw: &[f64],
        fuels: &FuelLibrary,
    ) -> ComponentResult<FuelCellRunPoint> {
        let rated = self.meta.rated_kw();
        let fuel = fuels.resolve(&self.meta.name, self.fuel_kind, self.fuel_origin)?;
        let mut load_ratio = Vec::with_capacity(power_out_kw.len());
        let mut efficiency = Vec::with_capacity(power_out_kw.len());
        let mut rate_kg_per_s = Vec::with_capacity(power_out_kw.len());
        for &p in power_out_kw {
            let load = clamp(p.abs() / rated, 0.0, 1.0 + LOAD_TOLERANCE);
            let eta = self.efficiency.at(load)?;
            let chemical_power_kw = p.abs() / eta;
            load_ratio.push(load);
            efficiency.push(eta);
            rate_kg_per_s.push(chemical_power_kw / (fuel.lhv_mj_per_g * 1e6));
        }
        Ok(FuelCellRunPoint {
            load_ratio,
            fuel_flow_rate_kg_per_s: FuelConsumption::from_fuel(
                fuel.with_mass(ScalarOrSeries::Series(rate_kg_per_s)),
            ),
            efficiency,
        })
    }
}

/// One or more fuel cell modules behind an optional converter.
#[derive(Clone, Debug)]
pub struct FuelCellSystem {
    pub meta: ComponentMeta,
    pub fuel_cell: FuelCell,
    pub converter: Option<PowerConverter>,
    pub number_modules: u32,
}

impl FuelCellSystem {
    pub fn new(
        meta: ComponentMeta,
        fuel_cell: FuelCell,
        converter: Option<PowerConverter>,
        number_modules: u32,
    ) -> Self {
        Self {
            meta,
            fuel_cell,
            converter,
            number_modules: number_modules.max(1),
        }
    }

    pub fn consumer_class(&self) -> ConsumerClass {
        ConsumerClass::FuelCell
    }

    /// Evaluate from the bus power: converter losses first, then the
    /// stack power split across the modules.
    pub fn run_point(
        &self,
        power_out_kw: &[f64],
        fuels: &FuelLibrary,
    ) -> ComponentResult<FuelCellRunPoint> {
        let modules = self.number_modules as f64;
        let mut per_module_kw = Vec::with_capacity(power_out_kw.len());
        let mut system_load = Vec::with_capacity(power_out_kw.len());
        for &p in power_out_kw {
            let stack_power = match &self.converter {
                Some(conv) => conv.power_input_from_output(p)?.0,
                None => p,
            };
            per_module_kw.push(stack_power / modules);
            system_load.push(self.meta.load_ratio(p));
        }
        let per_module = self.fuel_cell.run_point(&per_module_kw, fuels)?;
        Ok(FuelCellRunPoint {
            load_ratio: system_load,
            fuel_flow_rate_kg_per_s: per_module.fuel_flow_rate_kg_per_s.scale(modules),
            efficiency: per_module.efficiency,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::{ComponentKind, PowerRole};
    use mf_fuel::FuelRegime;

    fn stack() -> FuelCell {
        FuelCell::new(
            ComponentMeta::new("fc", ComponentKind::FuelCell, PowerRole::Source, 500.0).unwrap(),
            EfficiencyCurve::constant(0.55).unwrap(),
            FuelKind::Hydrogen,
            FuelOrigin::RenewableNonBio,
        )
    }

    #[test]
    fn hydrogen_flow_from_efficiency() {
        let fuels = FuelLibrary::prescribed(FuelRegime::Imo);
        let run = stack().run_point(&[275.0], &fuels).unwrap();
        // 275 kW at 55% on 0.12 MJ/g hydrogen
        let expected = 275.0 / 0.55 / (0.12 * 1e6);
        assert!((run.fuel_flow_rate_kg_per_s.total_at(0) - expected).abs() < 1e-12);
        assert!((run.load_ratio[0] - 0.55).abs() < 1e-12);
    }

    #[test]
    fn system_scales_by_modules_and_converter() {
        let fuels = FuelLibrary::prescribed(FuelRegime::Imo);
        let converter = PowerConverter::new(
            ComponentMeta::new("fc conv", ComponentKind::PowerConverter, PowerRole::Transmission, 1000.0)
                .unwrap(),
            EfficiencyCurve::constant(0.97).unwrap(),
        );
        let system = FuelCellSystem::new(
            ComponentMeta::new("fc system", ComponentKind::FuelCellSystem, PowerRole::Source, 1000.0)
                .unwrap(),
            stack(),
            Some(converter),
            2,
        );
        let run = system.run_point(&[970.0], &fuels).unwrap();
        // Bus 970 kW means 1000 kW from the stacks, 500 kW per module.
        let expected = 1000.0 / 0.55 / (0.12 * 1e6);
        assert!((run.fuel_flow_rate_kg_per_s.total_at(0) - expected).abs() < 1e-9);
    }
}
