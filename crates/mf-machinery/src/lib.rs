//! mf-machinery: power balance and aggregation over machinery systems.
//!
//! A run has three phases:
//! 1. staging writes per-timestep arrays onto the component slots,
//! 2. the solver walks timesteps in order, settling the balance at every
//!    switchboard pool and shaft line (storage state of charge is the only
//!    quantity carried between timesteps),
//! 3. aggregation turns the solved series into fuel, emission, energy and
//!    running-hour totals.

pub mod aggregate;
pub mod balance;
pub mod combined;
pub mod electric;
pub mod error;
pub mod mechanical;
pub mod node;

pub use balance::{distribute_demand, Distribution, SourceEntry};
pub use combined::{HybridPropulsionSystem, MechanicalPropulsionSystemWithElectricPowerSystem};
pub use electric::ElectricPowerSystem;
pub use error::{MachineryError, MachineryResult};
pub use mechanical::MechanicalPropulsionSystem;
pub use node::{
    BusTie, ConsumerSlot, MainEngineSlot, PtiPtoSlot, ShaftLine, SourceSlot, StorageSlot,
    Switchboard,
};
