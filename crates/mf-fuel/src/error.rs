use crate::species::{FuelKind, FuelOrigin, FuelRegime};
use thiserror::Error;

pub type FuelResult<T> = Result<T, FuelError>;

#[derive(Error, Debug)]
pub enum FuelError {
    #[error("No {regime:?} factors bundled for fuel {kind:?} of origin {origin:?}")]
    FactorsUnavailable {
        kind: FuelKind,
        origin: FuelOrigin,
        regime: FuelRegime,
    },

    #[error("No user-defined fuel matches {kind:?}/{origin:?} for component '{component}'")]
    MissingUserFuel {
        kind: FuelKind,
        origin: FuelOrigin,
        component: String,
    },

    #[error("Invalid user-defined fuel: {what}")]
    InvalidUserFuel { what: &'static str },

    #[error("Fuel series length mismatch: {left} vs {right}")]
    ShapeMismatch { left: usize, right: usize },

    #[error("Fuel {kind:?} has no tank-to-wake factor row")]
    MissingTtwFactors { kind: FuelKind },
}
