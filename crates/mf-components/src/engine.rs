//! Engine models and the fuel/emission run-point kernel.

use crate::error::{ComponentError, ComponentResult};
use crate::meta::{ComponentMeta, LOAD_TOLERANCE};
use mf_core::curve::Curve;
use mf_core::numeric::clamp;
use mf_core::units::constants::G_PER_KWH_TIMES_KW_TO_KG_PER_S;
use mf_fuel::{
    ConsumerClass, EmissionSpecies, FuelConsumption, FuelKind, FuelLibrary, FuelOrigin,
    ScalarOrSeries,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineCycle {
    #[default]
    None,
    Diesel,
    Otto,
    LeanBurnSparkIgnition,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoxCalculationMethod {
    /// Per-load NOx emission curve supplied with the engine.
    Curve,
    Tier1,
    #[default]
    Tier2,
    Tier3,
}

/// Above this rated speed the IMO speed-dependent NOx curves apply.
const NOX_TIER_SLOW_SPEED_MAX_RPM: f64 = 130.0;

/// IMO Annex VI NOx limit in g/kWh for an engine of the given rated speed.
fn nox_tier_g_per_kwh(method: NoxCalculationMethod, rated_rpm: f64) -> f64 {
    if rated_rpm <= NOX_TIER_SLOW_SPEED_MAX_RPM {
        match method {
            NoxCalculationMethod::Tier1 => 17.0,
            NoxCalculationMethod::Tier2 => 14.4,
            NoxCalculationMethod::Tier3 => 3.4,
            NoxCalculationMethod::Curve => unreachable!("curve method has no tier factor"),
        }
    } else {
        let (factor, exponent) = match method {
            NoxCalculationMethod::Tier1 => (45.0, -0.2),
            NoxCalculationMethod::Tier2 => (44.0, -0.23),
            NoxCalculationMethod::Tier3 => (9.0, -0.2),
            NoxCalculationMethod::Curve => unreachable!("curve method has no tier factor"),
        };
        factor * rated_rpm.powf(exponent)
    }
}

/// Outcome of evaluating an engine over a power series.
#[derive(Clone, Debug)]
pub struct EngineRunPoint {
    pub load_ratio: Vec<f64>,
    pub fuel_flow_rate_kg_per_s: FuelConsumption,
    pub bsfc_g_per_kwh: Vec<f64>,
    pub pilot_bsfc_g_per_kwh: Option<Vec<f64>>,
    pub emissions_g_per_s: BTreeMap<EmissionSpecies, Vec<f64>>,
}

/// Single-fuel combustion engine with a BSFC curve and optional per-load
/// emission curves.
#[derive(Clone, Debug)]
pub struct Engine {
    pub meta: ComponentMeta,
    bsfc: Curve,
    pub fuel_kind: FuelKind,
    pub fuel_origin: FuelOrigin,
    pub cycle: EngineCycle,
    pub nox_method: NoxCalculationMethod,
    emission_curves: BTreeMap<EmissionSpecies, Curve>,
}

impl Engine {
    pub fn new(
        meta: ComponentMeta,
        bsfc: Curve,
        fuel_kind: FuelKind,
        fuel_origin: FuelOrigin,
        cycle: EngineCycle,
        nox_method: NoxCalculationMethod,
        mut emission_curves: BTreeMap<EmissionSpecies, Curve>,
    ) -> ComponentResult<Self> {
        match nox_method {
            NoxCalculationMethod::Curve => {
                if !emission_curves.contains_key(&EmissionSpecies::Nox) {
                    return Err(ComponentError::Configuration {
                        what: format!(
                            "engine '{}' uses the NOx curve method without a NOX curve",
                            meta.name
                        ),
                    });
                }
            }
            _ => {
                let g_per_kwh = nox_tier_g_per_kwh(nox_method, meta.rated_rpm());
                emission_curves.insert(EmissionSpecies::Nox, Curve::constant(g_per_kwh)?);
            }
        }
        Ok(Self {
            meta,
            bsfc,
            fuel_kind,
            fuel_origin,
            cycle,
            nox_method,
            emission_curves,
        })
    }

    pub fn bsfc_curve(&self) -> &Curve {
        &self.bsfc
    }

    pub fn emission_curves(&self) -> &BTreeMap<EmissionSpecies, Curve> {
        &self.emission_curves
    }

    /// FuelEU consumer class of this engine.
    pub fn consumer_class(&self) -> ConsumerClass {
        if self.fuel_kind != FuelKind::NaturalGas {
            return ConsumerClass::Ice;
        }
        match self.cycle {
            EngineCycle::Diesel => ConsumerClass::LngDiesel,
            EngineCycle::Otto => {
                if self.meta.rated_rpm() < 200.0 {
                    ConsumerClass::LngOttoSlowSpeed
                } else {
                    ConsumerClass::LngOttoMediumSpeed
                }
            }
            EngineCycle::LeanBurnSparkIgnition => ConsumerClass::LngLbsi,
            EngineCycle::None => ConsumerClass::Ice,
        }
    }

    /// Evaluate the engine at a shaft power series.
    ///
    /// A CH4 or N2O emission curve replaces the corresponding tank-to-wake
    /// factor of the emitted fuel with the measured per-point value
    /// (curve / BSFC, g per g of fuel). The CH4 curve measures total
    /// methane including slip, so the slip percentage is zeroed to avoid
    /// counting it twice.
    pub fn run_point(
        &self,
        power_out_kw: &[f64],
        fuels: &FuelLibrary,
    ) -> ComponentResult<EngineRunPoint> {
        let rated = self.meta.rated_kw();
        let n = power_out_kw.len();
        let mut load_ratio = Vec::with_capacity(n);
        let mut bsfc_g_per_kwh = Vec::with_capacity(n);
        let mut rate_kg_per_s = Vec::with_capacity(n);
        for &p in power_out_kw {
            let load = clamp(p.abs() / rated, 0.0, 1.0 + LOAD_TOLERANCE);
            let bsfc = self.bsfc.value_at(load)?;
            load_ratio.push(load);
            bsfc_g_per_kwh.push(bsfc);
            rate_kg_per_s.push(bsfc * p.abs() / G_PER_KWH_TIMES_KW_TO_KG_PER_S);
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

        let fuel = fuels
            .resolve(&self.meta.name, self.fuel_kind, self.fuel_origin)?
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

    /// Per-point factor in g per g of fuel for a species with a curve.
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

/// Gas engine with main and pilot fuel. The emission-curve factor
/// override applies to the main fuel only; the pilot fuel keeps its
/// table factors.
#[derive(Clone, Debug)]
pub struct EngineDualFuel {
    pub engine: Engine,
    pilot_bsfc: Curve,
    pub pilot_fuel_kind: FuelKind,
    pub pilot_fuel_origin: FuelOrigin,
}

impl EngineDualFuel {
    pub fn new(
        engine: Engine,
        pilot_bsfc: Curve,
        pilot_fuel_kind: FuelKind,
        pilot_fuel_origin: FuelOrigin,
    ) -> Self {
        Self {
            engine,
            pilot_bsfc,
            pilot_fuel_kind,
            pilot_fuel_origin,
        }
    }

    pub fn run_point(
        &self,
        power_out_kw: &[f64],
        fuels: &FuelLibrary,
    ) -> ComponentResult<EngineRunPoint> {
        let mut run_point = self.engine.run_point(power_out_kw, fuels)?;

        let mut pilot_bsfc_g_per_kwh = Vec::with_capacity(power_out_kw.len());
        let mut pilot_rate_kg_per_s = Vec::with_capacity(power_out_kw.len());
        for (load, p) in run_point.load_ratio.iter().zip(power_out_kw) {
            let bsfc = self.pilot_bsfc.value_at(*load)?;
            pilot_bsfc_g_per_kwh.push(bsfc);
            pilot_rate_kg_per_s.push(bsfc * p.abs() / G_PER_KWH_TIMES_KW_TO_KG_PER_S);
        }

        let pilot_fuel = fuels
            .resolve(
                &self.engine.meta.name,
                self.pilot_fuel_kind,
                self.pilot_fuel_origin,
            )?
            .with_mass(ScalarOrSeries::Series(pilot_rate_kg_per_s));
        run_point.fuel_flow_rate_kg_per_s.fuels.push(pilot_fuel);
        run_point.pilot_bsfc_g_per_kwh = Some(pilot_bsfc_g_per_kwh);
        Ok(run_point)
    }
}

/// Engine that can burn one of several configured fuels. The active mode
/// is fixed during a run; switching produces a derived instance.
#[derive(Clone, Debug)]
pub struct EngineMultiFuel {
    modes: Vec<Engine>,
    active: usize,
}

impl EngineMultiFuel {
    pub fn new(modes: Vec<Engine>) -> ComponentResult<Self> {
        if modes.is_empty() {
            return Err(ComponentError::InvalidArg {
                what: "multi-fuel engine requires at least one fuel mode",
            });
        }
        Ok(Self { modes, active: 0 })
    }

    pub fn modes(&self) -> &[Engine] {
        &self.modes
    }

    pub fn active_engine(&self) -> &Engine {
        &self.modes[self.active]
    }

    /// Derived instance with the mode burning the given fuel active.
    pub fn with_fuel_in_use(
        &self,
        kind: FuelKind,
        origin: FuelOrigin,
    ) -> ComponentResult<Self> {
        let active = self
            .modes
            .iter()
            .position(|m| m.fuel_kind == kind && m.fuel_origin == origin)
            .ok_or_else(|| ComponentError::Configuration {
                what: format!(
                    "engine '{}' has no fuel mode for {kind:?}/{origin:?}",
                    self.modes[0].meta.name
                ),
            })?;
        Ok(Self {
            modes: self.modes.clone(),
            active,
        })
    }

    pub fn run_point(
        &self,
        power_out_kw: &[f64],
        fuels: &FuelLibrary,
    ) -> ComponentResult<EngineRunPoint> {
        self.active_engine().run_point(power_out_kw, fuels)
    }
}

/// Closed set of engine shapes used by gensets and main engines.
#[derive(Clone, Debug)]
pub enum EngineVariant {
    Single(Engine),
    DualFuel(EngineDualFuel),
    MultiFuel(EngineMultiFuel),
}

impl EngineVariant {
    pub fn meta(&self) -> &ComponentMeta {
        match self {
            EngineVariant::Single(e) => &e.meta,
            EngineVariant::DualFuel(e) => &e.engine.meta,
            EngineVariant::MultiFuel(e) => &e.active_engine().meta,
        }
    }

    pub fn consumer_class(&self) -> ConsumerClass {
        match self {
            EngineVariant::Single(e) => e.consumer_class(),
            EngineVariant::DualFuel(e) => e.engine.consumer_class(),
            EngineVariant::MultiFuel(e) => e.active_engine().consumer_class(),
        }
    }

    pub fn run_point(
        &self,
        power_out_kw: &[f64],
        fuels: &FuelLibrary,
    ) -> ComponentResult<EngineRunPoint> {
        match self {
            EngineVariant::Single(e) => e.run_point(power_out_kw, fuels),
            EngineVariant::DualFuel(e) => e.run_point(power_out_kw, fuels),
            EngineVariant::MultiFuel(e) => e.run_point(power_out_kw, fuels),
        }
    }
}
