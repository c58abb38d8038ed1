//! mf-components: component models for marine machinery.
//!
//! Every component follows the same bidirectional load/efficiency
//! contract: power propagates forward (input to output) or in reverse
//! (output to input), the load ratio is the absolute power over rated
//! power, and efficiencies stay within [0.01, 1.0].
//!
//! Components are deterministic functions of their parameters and the
//! requested power; only storages carry state between timesteps, and that
//! state is advanced explicitly by the caller.

pub mod chain;
pub mod cogas;
pub mod converter;
pub mod engine;
pub mod error;
pub mod fuel_cell;
pub mod genset;
pub mod machine;
pub mod meta;
pub mod shore;
pub mod storage;
pub mod variants;

pub use chain::{ChainFlow, SerialChain};
pub use cogas::{Cogas, Coges};
pub use converter::PowerConverter;
pub use engine::{
    Engine, EngineCycle, EngineDualFuel, EngineMultiFuel, EngineRunPoint, EngineVariant,
    NoxCalculationMethod,
};
pub use error::{ComponentError, ComponentResult};
pub use fuel_cell::{FuelCell, FuelCellRunPoint, FuelCellSystem};
pub use genset::{Genset, GensetRunPoint};
pub use machine::ElectricMachine;
pub use meta::{ComponentKind, ComponentMeta, PowerRole, RampLimits, LOAD_TOLERANCE};
pub use shore::ShorePower;
pub use storage::{Battery, SocSeries, SocStep, Supercapacitor};
pub use variants::{Consumer, EnergyStorage, MainEngine, PowerSource, PtiPto};
