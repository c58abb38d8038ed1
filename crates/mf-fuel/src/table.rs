//! Bundled GHG factor tables for the IMO and FuelEU Maritime regimes.
//!
//! The tables are process-wide constants keyed by fuel kind, origin and,
//! for FuelEU rows, the consumer class. IMO rows carry a single class-less
//! tank-to-wake entry with the carbon factor only; FuelEU rows carry the
//! full CH4/N2O factors and per-class methane slip for LNG engines.
//!
//! Lower heating values are MJ/g, well-to-tank factors gCO2eq/MJ and
//! tank-to-wake factors g/gfuel, following the published regulation
//! defaults.

use crate::error::{FuelError, FuelResult};
use crate::species::{ConsumerClass, FuelKind, FuelOrigin, FuelRegime};

#[derive(Clone, Copy, Debug)]
pub struct TtwRow {
    pub consumer_class: Option<ConsumerClass>,
    pub co2_gco2_per_gfuel: f64,
    pub ch4_gch4_per_gfuel: f64,
    pub n2o_gn2o_per_gfuel: f64,
    pub c_slip_percent: f64,
}

#[derive(Clone, Copy, Debug)]
pub struct RegimeEntry {
    pub kind: FuelKind,
    pub origin: FuelOrigin,
    pub lhv_mj_per_g: f64,
    pub wtt_gco2eq_per_mj: f64,
    pub ttw: &'static [TtwRow],
}

const fn row(
    class: Option<ConsumerClass>,
    co2: f64,
    ch4: f64,
    n2o: f64,
    slip: f64,
) -> TtwRow {
    TtwRow {
        consumer_class: class,
        co2_gco2_per_gfuel: co2,
        ch4_gch4_per_gfuel: ch4,
        n2o_gn2o_per_gfuel: n2o,
        c_slip_percent: slip,
    }
}

// Distillate and residual oils share the ICE row shape.
const TTW_DIESEL_EU: &[TtwRow] = &[row(Some(ConsumerClass::Ice), 3.206, 0.00005, 0.00018, 0.0)];
const TTW_HFO_EU: &[TtwRow] = &[row(Some(ConsumerClass::Ice), 3.114, 0.00005, 0.00018, 0.0)];
const TTW_LFO_EU: &[TtwRow] = &[row(Some(ConsumerClass::Ice), 3.151, 0.00005, 0.00018, 0.0)];
const TTW_LNG_EU: &[TtwRow] = &[
    row(Some(ConsumerClass::LngOttoMediumSpeed), 2.750, 0.0, 0.00011, 3.1),
    row(Some(ConsumerClass::LngOttoSlowSpeed), 2.750, 0.0, 0.00011, 1.7),
    row(Some(ConsumerClass::LngDiesel), 2.750, 0.0, 0.00011, 0.2),
    row(Some(ConsumerClass::LngLbsi), 2.750, 0.0, 0.00011, 2.6),
    row(Some(ConsumerClass::Ice), 2.750, 0.0, 0.00011, 0.0),
];
const TTW_LPG_PROPANE_EU: &[TtwRow] = &[row(Some(ConsumerClass::Ice), 3.000, 0.0, 0.0, 0.0)];
const TTW_LPG_BUTANE_EU: &[TtwRow] = &[row(Some(ConsumerClass::Ice), 3.030, 0.0, 0.0, 0.0)];
const TTW_METHANOL_EU: &[TtwRow] = &[row(Some(ConsumerClass::Ice), 1.375, 0.0, 0.0, 0.0)];
const TTW_ETHANOL_EU: &[TtwRow] = &[row(Some(ConsumerClass::Ice), 1.913, 0.0, 0.0, 0.0)];
const TTW_HYDROGEN_EU: &[TtwRow] = &[
    row(Some(ConsumerClass::FuelCell), 0.0, 0.0, 0.0, 0.0),
    row(Some(ConsumerClass::Ice), 0.0, 0.0, 0.0, 0.0),
];
const TTW_AMMONIA_EU: &[TtwRow] = &[
    row(Some(ConsumerClass::FuelCell), 0.0, 0.0, 0.0, 0.0),
    row(Some(ConsumerClass::Ice), 0.0, 0.0, 0.0, 0.0),
];

/// FuelEU Maritime Annex II defaults.
pub static FUEL_EU_TABLE: &[RegimeEntry] = &[
    entry(FuelKind::Diesel, FuelOrigin::Fossil, 0.0427, 14.4, TTW_DIESEL_EU),
    entry(FuelKind::Diesel, FuelOrigin::Bio, 0.0440, 20.8, TTW_DIESEL_EU),
    entry(FuelKind::Diesel, FuelOrigin::RenewableNonBio, 0.0440, 28.2, TTW_DIESEL_EU),
    entry(FuelKind::Hfo, FuelOrigin::Fossil, 0.0405, 13.5, TTW_HFO_EU),
    entry(FuelKind::Lfo, FuelOrigin::Fossil, 0.0410, 13.2, TTW_LFO_EU),
    entry(FuelKind::LsfoCrude, FuelOrigin::Fossil, 0.0410, 13.2, TTW_LFO_EU),
    entry(FuelKind::LsfoBlend, FuelOrigin::Fossil, 0.0410, 13.7, TTW_LFO_EU),
    entry(FuelKind::Ulsfo, FuelOrigin::Fossil, 0.0410, 13.2, TTW_LFO_EU),
    entry(FuelKind::Vlsfo, FuelOrigin::Fossil, 0.0410, 13.5, TTW_LFO_EU),
    entry(FuelKind::NaturalGas, FuelOrigin::Fossil, 0.0491, 18.5, TTW_LNG_EU),
    entry(FuelKind::NaturalGas, FuelOrigin::Bio, 0.0491, 30.0, TTW_LNG_EU),
    entry(FuelKind::NaturalGas, FuelOrigin::RenewableNonBio, 0.0491, 12.8, TTW_LNG_EU),
    entry(FuelKind::LpgPropane, FuelOrigin::Fossil, 0.0460, 7.8, TTW_LPG_PROPANE_EU),
    entry(FuelKind::LpgButane, FuelOrigin::Fossil, 0.0460, 7.8, TTW_LPG_BUTANE_EU),
    entry(FuelKind::Methanol, FuelOrigin::Fossil, 0.0199, 31.3, TTW_METHANOL_EU),
    entry(FuelKind::Methanol, FuelOrigin::Bio, 0.0199, 13.5, TTW_METHANOL_EU),
    entry(FuelKind::Methanol, FuelOrigin::RenewableNonBio, 0.0199, 10.0, TTW_METHANOL_EU),
    entry(FuelKind::Ethanol, FuelOrigin::Fossil, 0.0268, 38.1, TTW_ETHANOL_EU),
    entry(FuelKind::Ethanol, FuelOrigin::Bio, 0.0268, 15.7, TTW_ETHANOL_EU),
    entry(FuelKind::Hydrogen, FuelOrigin::Fossil, 0.1200, 132.0, TTW_HYDROGEN_EU),
    entry(FuelKind::Hydrogen, FuelOrigin::RenewableNonBio, 0.1200, 3.6, TTW_HYDROGEN_EU),
    entry(FuelKind::Ammonia, FuelOrigin::Fossil, 0.0186, 121.0, TTW_AMMONIA_EU),
    entry(FuelKind::Ammonia, FuelOrigin::RenewableNonBio, 0.0186, 0.0, TTW_AMMONIA_EU),
];

// IMO rows carry the carbon factor only; CH4/N2O are accounted through the
// dedicated emission species, not the CO2eq combinator.
const TTW_DIESEL_IMO: &[TtwRow] = &[row(None, 3.206, 0.0, 0.0, 0.0)];
const TTW_HFO_IMO: &[TtwRow] = &[row(None, 3.114, 0.0, 0.0, 0.0)];
const TTW_LFO_IMO: &[TtwRow] = &[row(None, 3.151, 0.0, 0.0, 0.0)];
const TTW_LNG_IMO: &[TtwRow] = &[row(None, 2.750, 0.0, 0.0, 0.0)];
const TTW_LPG_PROPANE_IMO: &[TtwRow] = &[row(None, 3.000, 0.0, 0.0, 0.0)];
const TTW_LPG_BUTANE_IMO: &[TtwRow] = &[row(None, 3.030, 0.0, 0.0, 0.0)];
const TTW_METHANOL_IMO: &[TtwRow] = &[row(None, 1.375, 0.0, 0.0, 0.0)];
const TTW_ETHANOL_IMO: &[TtwRow] = &[row(None, 1.913, 0.0, 0.0, 0.0)];
const TTW_ZERO_CARBON_IMO: &[TtwRow] = &[row(None, 0.0, 0.0, 0.0, 0.0)];

/// IMO (MEPC) defaults.
pub static IMO_TABLE: &[RegimeEntry] = &[
    entry(FuelKind::Diesel, FuelOrigin::Fossil, 0.0427, 14.4, TTW_DIESEL_IMO),
    entry(FuelKind::Diesel, FuelOrigin::Bio, 0.0440, 20.8, TTW_DIESEL_IMO),
    entry(FuelKind::Diesel, FuelOrigin::RenewableNonBio, 0.0440, 28.2, TTW_DIESEL_IMO),
    entry(FuelKind::Hfo, FuelOrigin::Fossil, 0.0405, 13.5, TTW_HFO_IMO),
    entry(FuelKind::Lfo, FuelOrigin::Fossil, 0.0410, 13.2, TTW_LFO_IMO),
    entry(FuelKind::LsfoCrude, FuelOrigin::Fossil, 0.0410, 13.2, TTW_LFO_IMO),
    entry(FuelKind::LsfoBlend, FuelOrigin::Fossil, 0.0410, 13.7, TTW_LFO_IMO),
    entry(FuelKind::Ulsfo, FuelOrigin::Fossil, 0.0410, 13.2, TTW_LFO_IMO),
    entry(FuelKind::Vlsfo, FuelOrigin::Fossil, 0.0410, 13.5, TTW_LFO_IMO),
    entry(FuelKind::NaturalGas, FuelOrigin::Fossil, 0.0480, 18.5, TTW_LNG_IMO),
    entry(FuelKind::NaturalGas, FuelOrigin::Bio, 0.0480, 30.0, TTW_LNG_IMO),
    entry(FuelKind::LpgPropane, FuelOrigin::Fossil, 0.0463, 7.8, TTW_LPG_PROPANE_IMO),
    entry(FuelKind::LpgButane, FuelOrigin::Fossil, 0.0457, 7.8, TTW_LPG_BUTANE_IMO),
    entry(FuelKind::Methanol, FuelOrigin::Fossil, 0.0199, 31.3, TTW_METHANOL_IMO),
    entry(FuelKind::Methanol, FuelOrigin::Bio, 0.0199, 13.5, TTW_METHANOL_IMO),
    entry(FuelKind::Ethanol, FuelOrigin::Fossil, 0.0268, 38.1, TTW_ETHANOL_IMO),
    entry(FuelKind::Ethanol, FuelOrigin::Bio, 0.0268, 15.7, TTW_ETHANOL_IMO),
    entry(FuelKind::Hydrogen, FuelOrigin::Fossil, 0.1200, 132.0, TTW_ZERO_CARBON_IMO),
    entry(FuelKind::Hydrogen, FuelOrigin::RenewableNonBio, 0.1200, 3.6, TTW_ZERO_CARBON_IMO),
    entry(FuelKind::Ammonia, FuelOrigin::Fossil, 0.0186, 121.0, TTW_ZERO_CARBON_IMO),
    entry(FuelKind::Ammonia, FuelOrigin::RenewableNonBio, 0.0186, 0.0, TTW_ZERO_CARBON_IMO),
];

const fn entry(
    kind: FuelKind,
    origin: FuelOrigin,
    lhv: f64,
    wtt: f64,
    ttw: &'static [TtwRow],
) -> RegimeEntry {
    RegimeEntry {
        kind,
        origin,
        lhv_mj_per_g: lhv,
        wtt_gco2eq_per_mj: wtt,
        ttw,
    }
}

/// Look up the bundled factors for a fuel under the given regime.
pub fn prescribed_factors(
    regime: FuelRegime,
    kind: FuelKind,
    origin: FuelOrigin,
) -> FuelResult<&'static RegimeEntry> {
    let table = match regime {
        FuelRegime::Imo => IMO_TABLE,
        FuelRegime::FuelEuMaritime => FUEL_EU_TABLE,
        FuelRegime::User => {
            return Err(FuelError::FactorsUnavailable {
                kind,
                origin,
                regime,
            })
        }
    };
    table
        .iter()
        .find(|e| e.kind == kind && e.origin == origin)
        .ok_or(FuelError::FactorsUnavailable {
            kind,
            origin,
            regime,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diesel_fossil_is_available_in_both_regimes() {
        let imo = prescribed_factors(FuelRegime::Imo, FuelKind::Diesel, FuelOrigin::Fossil)
            .unwrap();
        assert!((imo.ttw[0].co2_gco2_per_gfuel - 3.206).abs() < 1e-12);
        assert!((imo.lhv_mj_per_g - 0.0427).abs() < 1e-12);

        let eu = prescribed_factors(
            FuelRegime::FuelEuMaritime,
            FuelKind::Diesel,
            FuelOrigin::Fossil,
        )
        .unwrap();
        assert_eq!(eu.ttw[0].consumer_class, Some(ConsumerClass::Ice));
    }

    #[test]
    fn lng_rows_carry_per_class_slip() {
        let eu = prescribed_factors(
            FuelRegime::FuelEuMaritime,
            FuelKind::NaturalGas,
            FuelOrigin::Fossil,
        )
        .unwrap();
        let otto_medium = eu
            .ttw
            .iter()
            .find(|r| r.consumer_class == Some(ConsumerClass::LngOttoMediumSpeed))
            .unwrap();
        assert!((otto_medium.c_slip_percent - 3.1).abs() < 1e-12);
        let lng_diesel = eu
            .ttw
            .iter()
            .find(|r| r.consumer_class == Some(ConsumerClass::LngDiesel))
            .unwrap();
        assert!((lng_diesel.c_slip_percent - 0.2).abs() < 1e-12);
    }

    #[test]
    fn unknown_combination_is_an_error() {
        let err = prescribed_factors(FuelRegime::Imo, FuelKind::Hfo, FuelOrigin::Bio);
        assert!(err.is_err());
    }

    #[test]
    fn user_regime_has_no_bundled_table() {
        assert!(
            prescribed_factors(FuelRegime::User, FuelKind::Diesel, FuelOrigin::Fossil)
                .is_err()
        );
    }
}
