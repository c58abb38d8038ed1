//! Closed enumerations for fuels and emission species.

use serde::{Deserialize, Serialize};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FuelKind {
    Diesel,
    Hfo,
    NaturalGas,
    Hydrogen,
    Ammonia,
    LpgPropane,
    LpgButane,
    Ethanol,
    Methanol,
    Lfo,
    LsfoCrude,
    LsfoBlend,
    Ulsfo,
    Vlsfo,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FuelOrigin {
    Fossil,
    Bio,
    RenewableNonBio,
}

/// Which regulation supplies the GHG factors for a fuel.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FuelRegime {
    Imo,
    FuelEuMaritime,
    User,
}

/// FuelEU Maritime consumer class qualifying which tank-to-wake factor row
/// applies for a fuel burned in a given kind of machine.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ConsumerClass {
    Ice,
    LngOttoMediumSpeed,
    LngOttoSlowSpeed,
    LngDiesel,
    LngLbsi,
    FuelCell,
}

impl ConsumerClass {
    /// True for the classes describing gas engines burning LNG.
    pub fn is_lng_engine(self) -> bool {
        matches!(
            self,
            ConsumerClass::LngOttoMediumSpeed
                | ConsumerClass::LngOttoSlowSpeed
                | ConsumerClass::LngDiesel
                | ConsumerClass::LngLbsi
        )
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum EmissionSpecies {
    Nox,
    Sox,
    Co,
    Pm,
    Hc,
    Ch4,
    N2o,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lng_engine_classes() {
        assert!(ConsumerClass::LngOttoSlowSpeed.is_lng_engine());
        assert!(ConsumerClass::LngDiesel.is_lng_engine());
        assert!(!ConsumerClass::Ice.is_lng_engine());
        assert!(!ConsumerClass::FuelCell.is_lng_engine());
    }

    #[test]
    fn serde_names_are_stable() {
        let json = serde_json::to_string(&FuelKind::NaturalGas).unwrap();
        assert_eq!(json, "\"natural_gas\"");
        let json = serde_json::to_string(&EmissionSpecies::Nox).unwrap();
        assert_eq!(json, "\"NOX\"");
    }
}
