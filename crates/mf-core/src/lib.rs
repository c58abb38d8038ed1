//! mf-core: stable foundation for marineflow.
//!
//! Contains:
//! - units (uom SI types + constructors)
//! - numeric (Real + float helpers)
//! - ids (node identifiers for switchboards and shaft lines)
//! - curve (monotone 1-D lookup tables with clamped extrapolation)
//! - error (shared error types)

pub mod curve;
pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use curve::{Curve, EfficiencyCurve, EFFICIENCY_CEILING, EFFICIENCY_FLOOR};
pub use error::{CoreError, CoreResult};
pub use ids::*;
pub use numeric::*;
pub use units::*;
