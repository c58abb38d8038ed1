//! The `Fuel` value: kind, origin, regime, factors and a mass slot.

use crate::error::{FuelError, FuelResult};
use crate::factors::{GhgFactorTankToWake, ScalarOrSeries};
use crate::species::{ConsumerClass, FuelKind, FuelOrigin, FuelRegime};
use crate::table;
use serde::{Deserialize, Serialize};

/// One fuel with its GHG factors and an attached mass (kg) or mass flow
/// rate (kg/s), depending on context.
///
/// For the IMO and FuelEU regimes the factors come from the bundled table.
/// User-defined fuels carry their own name, heating value and factor rows.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fuel {
    pub kind: FuelKind,
    pub origin: FuelOrigin,
    pub regime: FuelRegime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub lhv_mj_per_g: f64,
    pub wtt_gco2eq_per_mj: f64,
    pub ttw_factors: Vec<GhgFactorTankToWake>,
    pub mass: ScalarOrSeries,
}

/// Aggregation key for fuel addition. The name participates only for
/// user-defined fuels, so two USER blends of the same kind stay separate
/// while prescribed fuels merge by kind, origin and regime alone.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FuelKey {
    pub kind: FuelKind,
    pub origin: FuelOrigin,
    pub regime: FuelRegime,
    pub name: Option<String>,
}

impl Fuel {
    /// Build a fuel with factors taken from the bundled regime table.
    pub fn prescribed(
        regime: FuelRegime,
        kind: FuelKind,
        origin: FuelOrigin,
    ) -> FuelResult<Self> {
        let entry = table::prescribed_factors(regime, kind, origin)?;
        Ok(Self {
            kind,
            origin,
            regime,
            name: None,
            lhv_mj_per_g: entry.lhv_mj_per_g,
            wtt_gco2eq_per_mj: entry.wtt_gco2eq_per_mj,
            ttw_factors: entry
                .ttw
                .iter()
                .map(|r| {
                    GhgFactorTankToWake::new(
                        r.consumer_class,
                        r.co2_gco2_per_gfuel,
                        r.ch4_gch4_per_gfuel,
                        r.n2o_gn2o_per_gfuel,
                        r.c_slip_percent,
                    )
                })
                .collect(),
            mass: ScalarOrSeries::zero(),
        })
    }

    /// Build a user-defined fuel. The name must be non-empty, the heating
    /// value positive and at least one tank-to-wake row supplied.
    pub fn user(
        name: &str,
        kind: FuelKind,
        origin: FuelOrigin,
        lhv_mj_per_g: f64,
        wtt_gco2eq_per_mj: f64,
        ttw_factors: Vec<GhgFactorTankToWake>,
    ) -> FuelResult<Self> {
        if name.trim().is_empty() {
            return Err(FuelError::InvalidUserFuel {
                what: "user-defined fuel requires a non-empty name",
            });
        }
        if !(lhv_mj_per_g.is_finite() && lhv_mj_per_g > 0.0) {
            return Err(FuelError::InvalidUserFuel {
                what: "user-defined fuel requires a positive lower heating value",
            });
        }
        if ttw_factors.is_empty() {
            return Err(FuelError::InvalidUserFuel {
                what: "user-defined fuel requires at least one tank-to-wake factor row",
            });
        }
        Ok(Self {
            kind,
            origin,
            regime: FuelRegime::User,
            name: Some(name.to_string()),
            lhv_mj_per_g,
            wtt_gco2eq_per_mj,
            ttw_factors,
            mass: ScalarOrSeries::zero(),
        })
    }

    pub fn key(&self) -> FuelKey {
        FuelKey {
            kind: self.kind,
            origin: self.origin,
            regime: self.regime,
            name: if self.regime == FuelRegime::User {
                self.name.clone()
            } else {
                None
            },
        }
    }

    /// Copy of this fuel with the mass slot zeroed.
    pub fn without_mass(&self) -> Self {
        let mut fuel = self.clone();
        fuel.mass = ScalarOrSeries::zero();
        fuel
    }

    pub fn with_mass(&self, mass: ScalarOrSeries) -> Self {
        let mut fuel = self.clone();
        fuel.mass = mass;
        fuel
    }

    /// Well-to-tank factor in gCO2eq per gram of fuel.
    pub fn wtt_gco2eq_per_gfuel(&self) -> f64 {
        self.wtt_gco2eq_per_mj * self.lhv_mj_per_g
    }

    /// Tank-to-wake row applicable for the given consumer class.
    ///
    /// Class-less rows (IMO, USER without classes) match any query. A
    /// non-LNG fuel queried with an LNG engine class falls back to the
    /// generic ICE row, mirroring how pilot fuels are accounted in gas
    /// engines.
    pub fn ttw_factor(
        &self,
        consumer_class: Option<ConsumerClass>,
    ) -> FuelResult<&GhgFactorTankToWake> {
        if self.ttw_factors.is_empty() {
            return Err(FuelError::MissingTtwFactors { kind: self.kind });
        }
        let mut query = consumer_class;
        if let Some(class) = query {
            if class.is_lng_engine() && self.kind != FuelKind::NaturalGas {
                query = Some(ConsumerClass::Ice);
            }
        }
        if let Some(class) = query {
            if let Some(row) = self
                .ttw_factors
                .iter()
                .find(|r| r.consumer_class == Some(class))
            {
                return Ok(row);
            }
            if let Some(row) = self
                .ttw_factors
                .iter()
                .find(|r| r.consumer_class == Some(ConsumerClass::Ice))
            {
                return Ok(row);
            }
        }
        Ok(&self.ttw_factors[0])
    }

    /// New fuel with CH4 and/or N2O tank-to-wake factors replaced by
    /// per-timestep values derived from engine emission curves.
    ///
    /// With both overrides absent the fuel is returned unchanged. A CH4
    /// override also zeroes the slip percentage in every row: the curve
    /// already measures total methane, slip included.
    pub fn with_emission_curve_overrides(
        &self,
        ch4_gch4_per_gfuel: Option<&[f64]>,
        n2o_gn2o_per_gfuel: Option<&[f64]>,
    ) -> Self {
        if ch4_gch4_per_gfuel.is_none() && n2o_gn2o_per_gfuel.is_none() {
            return self.clone();
        }
        let mut fuel = self.clone();
        for fac in &mut fuel.ttw_factors {
            if let Some(ch4) = ch4_gch4_per_gfuel {
                fac.ch4_gch4_per_gfuel = ScalarOrSeries::Series(ch4.to_vec());
                fac.c_slip_percent = 0.0;
            }
            if let Some(n2o) = n2o_gn2o_per_gfuel {
                fac.n2o_gn2o_per_gfuel = ScalarOrSeries::Series(n2o.to_vec());
            }
        }
        fuel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factors::GWP100_CH4;

    fn diesel() -> Fuel {
        Fuel::prescribed(FuelRegime::Imo, FuelKind::Diesel, FuelOrigin::Fossil).unwrap()
    }

    #[test]
    fn prescribed_diesel_carries_table_values() {
        let fuel = diesel();
        assert!((fuel.lhv_mj_per_g - 0.0427).abs() < 1e-12);
        assert!((fuel.ttw_factors[0].co2_gco2_per_gfuel - 3.206).abs() < 1e-12);
    }

    #[test]
    fn user_fuel_requires_name_lhv_and_factors() {
        let row = GhgFactorTankToWake::new(None, 3.2, 0.0, 0.0, 0.0);
        assert!(Fuel::user("", FuelKind::Diesel, FuelOrigin::Fossil, 0.042, 14.0, vec![row.clone()]).is_err());
        assert!(Fuel::user("blend", FuelKind::Diesel, FuelOrigin::Fossil, 0.0, 14.0, vec![row.clone()]).is_err());
        assert!(Fuel::user("blend", FuelKind::Diesel, FuelOrigin::Fossil, 0.042, 14.0, vec![]).is_err());
        assert!(Fuel::user("blend", FuelKind::Diesel, FuelOrigin::Fossil, 0.042, 14.0, vec![row]).is_ok());
    }

    #[test]
    fn key_includes_name_only_for_user_fuels() {
        let row = GhgFactorTankToWake::new(None, 3.2, 0.0, 0.0, 0.0);
        let user =
            Fuel::user("blend_A", FuelKind::Diesel, FuelOrigin::Fossil, 0.042, 14.0, vec![row])
                .unwrap();
        assert_eq!(user.key().name.as_deref(), Some("blend_A"));

        let mut prescribed = diesel();
        prescribed.name = Some("ignored".to_string());
        assert_eq!(prescribed.key().name, None);
    }

    #[test]
    fn lng_class_on_non_lng_fuel_falls_back_to_ice() {
        let fuel = Fuel::prescribed(
            FuelRegime::FuelEuMaritime,
            FuelKind::Diesel,
            FuelOrigin::Fossil,
        )
        .unwrap();
        let row = fuel
            .ttw_factor(Some(ConsumerClass::LngOttoMediumSpeed))
            .unwrap();
        assert_eq!(row.consumer_class, Some(ConsumerClass::Ice));
    }

    #[test]
    fn override_without_curves_is_identity() {
        let fuel = diesel();
        assert_eq!(fuel.with_emission_curve_overrides(None, None), fuel);
    }

    #[test]
    fn ch4_override_replaces_factor_and_zeroes_slip() {
        let mut fuel = Fuel::prescribed(
            FuelRegime::FuelEuMaritime,
            FuelKind::NaturalGas,
            FuelOrigin::Fossil,
        )
        .unwrap();
        for fac in &mut fuel.ttw_factors {
            assert!(fac.ch4_gch4_per_gfuel.is_scalar());
        }
        let series = vec![0.0333, 0.04];
        let overridden = fuel.with_emission_curve_overrides(Some(&series), None);
        for fac in &overridden.ttw_factors {
            assert_eq!(fac.c_slip_percent, 0.0);
            assert!((fac.ch4_gch4_per_gfuel.at(1) - 0.04).abs() < 1e-12);
        }
        // Per-timestep co2eq reflects the series.
        let row = overridden.ttw_factor(Some(ConsumerClass::LngDiesel)).unwrap();
        let expected = row.co2_gco2_per_gfuel
            + 0.0333 * GWP100_CH4
            + row.n2o_gn2o_per_gfuel.at(0) * crate::factors::GWP100_N2O;
        assert!((row.co2eq_gco2eq_per_gfuel_at(0) - expected).abs() < 1e-12);
    }
}
