//! Multi-fuel consumption bag with keyed aggregation.

use crate::error::FuelResult;
use crate::factors::ScalarOrSeries;
use crate::fuel::Fuel;
use crate::species::{ConsumerClass, FuelKind, FuelOrigin};
use serde::{Deserialize, Serialize};

/// Unordered multiset of fuels. The unit of the attached masses is kg or
/// kg/s depending on context; keep the unit in the variable name at call
/// sites.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FuelConsumption {
    pub fuels: Vec<Fuel>,
}

/// CO2eq rates partitioned by accounting phase, kg/s per timestep.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Co2RateBreakdown {
    pub well_to_tank: Vec<f64>,
    pub tank_to_wake: Vec<f64>,
    pub tank_to_wake_without_slip: Vec<f64>,
    pub tank_to_wake_from_green_fuel: Vec<f64>,
}

impl FuelConsumption {
    pub fn new(fuels: Vec<Fuel>) -> Self {
        Self { fuels }
    }

    pub fn from_fuel(fuel: Fuel) -> Self {
        Self { fuels: vec![fuel] }
    }

    pub fn is_empty(&self) -> bool {
        self.fuels.is_empty()
    }

    /// Keyed sum: fuels with equal aggregation keys merge; the rest are
    /// appended in encounter order, keeping the result deterministic.
    pub fn add(&self, other: &FuelConsumption) -> FuelResult<FuelConsumption> {
        let mut fuels: Vec<Fuel> = self.fuels.clone();
        for incoming in &other.fuels {
            match fuels.iter_mut().find(|f| f.key() == incoming.key()) {
                Some(existing) => {
                    existing.mass = existing.mass.add(&incoming.mass)?;
                }
                None => fuels.push(incoming.clone()),
            }
        }
        Ok(FuelConsumption { fuels })
    }

    pub fn scale(&self, k: f64) -> FuelConsumption {
        FuelConsumption {
            fuels: self
                .fuels
                .iter()
                .map(|f| f.with_mass(f.mass.scale(k)))
                .collect(),
        }
    }

    /// Total mass over all fuels at timestep `i`.
    pub fn total_at(&self, i: usize) -> f64 {
        self.fuels.iter().map(|f| f.mass.at(i)).sum()
    }

    /// Total aggregated mass over all fuels (scalar masses).
    pub fn total(&self) -> f64 {
        self.fuels.iter().map(|f| f.mass.total()).sum()
    }

    /// Total mass for one fuel kind, any origin.
    pub fn total_of_kind(&self, kind: FuelKind) -> f64 {
        self.fuels
            .iter()
            .filter(|f| f.kind == kind)
            .map(|f| f.mass.total())
            .sum()
    }

    /// CO2eq emission rates in kg/s for masses holding kg/s flow series of
    /// length `len`. Factors may be per-timestep after curve overrides.
    pub fn co2_rate_breakdown(
        &self,
        consumer_class: Option<ConsumerClass>,
        len: usize,
    ) -> FuelResult<Co2RateBreakdown> {
        let mut out = Co2RateBreakdown {
            well_to_tank: vec![0.0; len],
            tank_to_wake: vec![0.0; len],
            tank_to_wake_without_slip: vec![0.0; len],
            tank_to_wake_from_green_fuel: vec![0.0; len],
        };
        for fuel in &self.fuels {
            let row = fuel.ttw_factor(consumer_class)?;
            let wtt_per_g = fuel.wtt_gco2eq_per_gfuel();
            let green = fuel.origin != FuelOrigin::Fossil;
            for i in 0..len {
                let mass = fuel.mass.at(i);
                let ttw = mass * row.co2eq_gco2eq_per_gfuel_at(i);
                out.well_to_tank[i] += mass * wtt_per_g;
                out.tank_to_wake[i] += ttw;
                out.tank_to_wake_without_slip[i] += mass * row.co2eq_without_slip_at(i);
                if green {
                    out.tank_to_wake_from_green_fuel[i] += ttw;
                }
            }
        }
        Ok(out)
    }

    /// Tank-to-wake CO2eq rate in kg/s, summed over fuels.
    pub fn co2eq_ttw_rate(
        &self,
        consumer_class: Option<ConsumerClass>,
        len: usize,
    ) -> FuelResult<Vec<f64>> {
        Ok(self.co2_rate_breakdown(consumer_class, len)?.tank_to_wake)
    }

    /// Fuel energy in MJ for aggregated kg masses.
    pub fn fuel_energy_mj(&self) -> f64 {
        self.fuels
            .iter()
            .map(|f| f.mass.total() * 1e3 * f.lhv_mj_per_g)
            .sum()
    }
}

impl From<Fuel> for FuelConsumption {
    fn from(fuel: Fuel) -> Self {
        FuelConsumption::from_fuel(fuel)
    }
}
