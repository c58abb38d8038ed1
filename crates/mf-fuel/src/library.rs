//! Fuel resolution per regime, including user-defined fuels.

use crate::error::{FuelError, FuelResult};
use crate::fuel::Fuel;
use crate::species::{FuelKind, FuelOrigin, FuelRegime};
use std::collections::BTreeMap;

/// Resolves the fuel a component burns under the configured regime.
///
/// For the IMO and FuelEU regimes the bundled table supplies the factors.
/// For the USER regime the fuel must appear in the per-component override
/// list or, failing that, the global user fuel list.
#[derive(Clone, Debug, Default)]
pub struct FuelLibrary {
    regime: Option<FuelRegime>,
    global: Vec<Fuel>,
    by_component: BTreeMap<String, Vec<Fuel>>,
}

impl FuelLibrary {
    pub fn prescribed(regime: FuelRegime) -> Self {
        Self {
            regime: Some(regime),
            global: Vec::new(),
            by_component: BTreeMap::new(),
        }
    }

    pub fn user_defined(
        global: Vec<Fuel>,
        by_component: BTreeMap<String, Vec<Fuel>>,
    ) -> Self {
        Self {
            regime: None,
            global,
            by_component,
        }
    }

    pub fn regime(&self) -> FuelRegime {
        self.regime.unwrap_or(FuelRegime::User)
    }

    /// Fuel for `component` burning `kind`/`origin`, with the mass zeroed.
    pub fn resolve(
        &self,
        component: &str,
        kind: FuelKind,
        origin: FuelOrigin,
    ) -> FuelResult<Fuel> {
        match self.regime {
            Some(regime) => Fuel::prescribed(regime, kind, origin),
            None => {
                if let Some(fuels) = self.by_component.get(component) {
                    if let Some(fuel) =
                        fuels.iter().find(|f| f.kind == kind && f.origin == origin)
                    {
                        return Ok(fuel.without_mass());
                    }
                }
                self.global
                    .iter()
                    .find(|f| f.kind == kind && f.origin == origin)
                    .map(Fuel::without_mass)
                    .ok_or_else(|| FuelError::MissingUserFuel {
                        kind,
                        origin,
                        component: component.to_string(),
                    })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factors::GhgFactorTankToWake;

    fn blend(name: &str, wtt: f64) -> Fuel {
        Fuel::user(
            name,
            FuelKind::Diesel,
            FuelOrigin::Fossil,
            0.042,
            wtt,
            vec![GhgFactorTankToWake::new(None, 3.2, 0.0, 0.0, 0.0)],
        )
        .unwrap()
    }

    #[test]
    fn prescribed_library_uses_table() {
        let lib = FuelLibrary::prescribed(FuelRegime::Imo);
        let fuel = lib.resolve("any", FuelKind::Diesel, FuelOrigin::Fossil).unwrap();
        assert_eq!(fuel.regime, FuelRegime::Imo);
    }

    #[test]
    fn component_override_wins_over_global() {
        let mut by_component = BTreeMap::new();
        by_component.insert("engine 1".to_string(), vec![blend("special", 10.0)]);
        let lib = FuelLibrary::user_defined(vec![blend("generic", 14.0)], by_component);

        let special = lib
            .resolve("engine 1", FuelKind::Diesel, FuelOrigin::Fossil)
            .unwrap();
        assert_eq!(special.name.as_deref(), Some("special"));

        let generic = lib
            .resolve("engine 2", FuelKind::Diesel, FuelOrigin::Fossil)
            .unwrap();
        assert_eq!(generic.name.as_deref(), Some("generic"));
    }

    #[test]
    fn missing_user_fuel_is_an_error() {
        let lib = FuelLibrary::user_defined(vec![], BTreeMap::new());
        assert!(lib
            .resolve("engine 1", FuelKind::Diesel, FuelOrigin::Fossil)
            .is_err());
    }
}
