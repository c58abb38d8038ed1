//! mf-results: time integration and result bookkeeping for marineflow.

pub mod error;
pub mod hash;
pub mod integrate;
pub mod store;
pub mod types;

pub use error::{ResultsError, ResultsResult};
pub use hash::compute_run_id;
pub use integrate::{
    cumulative_sum_with_interval, duration_s, integrate, running_hours, IntegrationRule,
    TimeSteps,
};
pub use store::{RunManifest, RunStore};
pub use types::{
    Co2EmissionBreakdown, ComponentResultRow, MachineryResult, SolverWarning, SystemResult,
    WarningKind,
};
