//! Combined gas-and-steam turbine plant.
//!
//! Unlike a reciprocating engine the COGAS plant is characterised by an
//! efficiency curve; fuel mass follows from the fuel heating value. An
//! equivalent BSFC is derived so the emission-curve factor override works
//! exactly as for engines.

use crate::engine::EngineRunPoint;
use crate::error::ComponentResult;
use crate::machine::ElectricMachine;
use crate::meta::{ComponentMeta, LOAD_TOLERANCE};
use mf_core::curve::{Curve, EfficiencyCurve};
use mf_core::numeric::clamp;
use mf_fuel::{
    ConsumerClass, EmissionSpecies, FuelConsumption, FuelKind, FuelLibrary, FuelOrigin,
    ScalarOrSeries,
};
use std::collections::BTreeMap;

#[derive(Clone, Debug)]
pub struct Cogas {
    pub meta: ComponentMeta,
    efficiency: EfficiencyCurve,
    pub fuel_kind: FuelKind,
    pub fuel_origin: FuelOrigin,
    emission_curves: BTreeMap<EmissionSpecies, Curve>,
}

impl Cogas {
    pub fn new(
        meta: ComponentMeta,
        efficiency: EfficiencyCurve,
        fuel_kind: FuelKind,
        fuel_origin: FuelOrigin,
        emission_curves: BTreeMap<EmissionSpecies, Curve>,
    ) -> Self {
        Self {
            meta,
            efficiency,
            fuel_kind,
            fuel_origin,
            emission_curves,
        }
    }

    /// Turbines burn the charge completely; no slip class applies.
    pub fn consumer_class(&self) -> ConsumerClass {
        ConsumerClass::Ice
    }

    pub fn run_point(
        &self,
        power_out_kw: &[f64],
        fuels: &FuelLibrary,
    ) -> ComponentResult<EngineRunPoint> {
        let rated = self.meta.rated_kw();
        let n = power_out_kw.len();
        let fuel = fuels.resolve(&self.meta.name, self.fuel_kind, self.fuel_origin)?;

        let mut load_ratio = Vec::with_capacity(n);
        let mut rate_kg_per_s = Vec::with_capacity(n);
        let mut bsfc_g_per_kwh = Vec::with_capacity(n);
        for &p in power_out_kw {
            let load = clamp(p.abs() / rated, 0.0, 1.0 + LOAD_TOLERANCE);
            let eta = self.efficiency.at(load)?;
            // P [kW] over eta * LHV [MJ/g] gives the fuel flow.
            let rate = p.abs() / (eta * fuel.lhv_mj_per_g * 1e6);
            let bsfc = if p.abs() > 0.0 {
                rate * 3.6e6 / p.abs()
            } else {
                0.0
            };
            load_ratio.push(load);
            rate_kg_per_s.push(rate);
            bsfc_g_per_kwh.push(bsfc);
        }

        let mut emissions_g_per_s = BTreeMap::new();
        for (species, curve) in &self.emission_curves {
            let mut series = Vec::with_capacity(n);
            for (load, p) in load_ratio.iter().zip(power_out_kw) {
                series.push(curve.value_at(*load)? * p.abs() / 3600.0);
            }
            emissions_g_per_s.insert(*species, series);
        }

        let ch4_override = self.factor_override(EmissionSpecies::Ch4, &load_ratio, &bsfc_g_per_kwh)?;
        let n2o_override = self.factor_override(EmissionSpecies::N2o, &load_ratio, &bsfc_g_per_kwh)?;
        let fuel = fuel
            .with_emission_curve_overrides(ch4_override.as_deref(), n2o_override.as_deref())
            .with_mass(ScalarOrSeries::Series(rate_kg_per_s));

        Ok(EngineRunPoint {
            load_ratio,
            fuel_flow_rate_kg_per_s: FuelConsumption::from_fuel(fuel),
            bsfc_g_per_kwh,
            pilot_bsfc_g_per_kwh: None,
            emissions_g_per_s,
        })
    }

    fn factor_override(
        &self,
        species: EmissionSpecies,
        load_ratio: &[f64],
        bsfc_g_per_kwh: &[f64],
    ) -> ComponentResult<Option<Vec<f64>>> {
        let curve = match self.emission_curves.get(&species) {
            Some(curve) => curve,
            None => return Ok(None),
        };
        let mut series = Vec::with_capacity(load_ratio.len());
        for (load, bsfc) in load_ratio.iter().zip(bsfc_g_per_kwh) {
            let g_per_kwh = curve.value_at(*load)?;
            series.push(if *bsfc > 0.0 { g_per_kwh / bsfc } else { 0.0 });
        }
        Ok(Some(series))
    }
}

/// COGAS plant with a generator on the electric bus.
#[derive(Clone, Debug)]
pub struct Coges {
    pub meta: ComponentMeta,
    pub cogas: Cogas,
    pub generator: ElectricMachine,
}

impl Coges {
    pub fn new(meta: ComponentMeta, cogas: Cogas, generator: ElectricMachine) -> Self {
        Self {
            meta,
            cogas,
            generator,
        }
    }

    /// Evaluate from the electric output: the generator maps bus power to
    /// turbine shaft power, then the COGAS kernel runs.
    pub fn run_point(
        &self,
        power_electric_kw: &[f64],
        fuels: &FuelLibrary,
    ) -> ComponentResult<EngineRunPoint> {
        let mut shaft_kw = Vec::with_capacity(power_electric_kw.len());
        for &p in power_electric_kw {
            let (shaft, _) = self.generator.shaft_power_from_electric(p)?;
            shaft_kw.push(shaft);
        }
        self.cogas.run_point(&shaft_kw, fuels)
    }
}
