//! mf-fuel: fuel and greenhouse-gas accounting for marineflow.
//!
//! Provides:
//! - fuel kind / origin / regime enumerations
//! - tank-to-wake GHG factors with the GWP100 combinator and methane slip
//! - the bundled IMO and FuelEU Maritime factor tables
//! - `Fuel` values and the `FuelConsumption` multi-fuel bag
//! - a `FuelLibrary` resolving fuels per regime, including user-defined
//!   fuels with per-component overrides

pub mod consumption;
pub mod error;
pub mod factors;
pub mod fuel;
pub mod library;
pub mod species;
pub mod table;

pub use consumption::{Co2RateBreakdown, FuelConsumption};
pub use error::{FuelError, FuelResult};
pub use factors::{GhgFactorTankToWake, ScalarOrSeries, GWP100_CH4, GWP100_N2O};
pub use fuel::{Fuel, FuelKey};
pub use library::FuelLibrary;
pub use species::{ConsumerClass, EmissionSpecies, FuelKind, FuelOrigin, FuelRegime};
pub use table::prescribed_factors;
