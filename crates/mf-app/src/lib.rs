//! mf-app: shared service layer driving marineflow runs.
//!
//! Centralizes the glue between the topology schema, input staging, the
//! power management heuristic, the solver and the persisted run store, so
//! the CLI and other frontends stay thin.

pub mod error;
pub mod inputs;
pub mod pms;
pub mod run_service;

pub use error::{AppError, AppResult};
pub use inputs::RunInputs;
pub use pms::PmsLoadTable;
pub use run_service::{run, run_id_for, stage_inputs, RunOptions};
