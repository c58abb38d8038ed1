use thiserror::Error;

pub type ComponentResult<T> = Result<T, ComponentError>;

#[derive(Error, Debug)]
pub enum ComponentError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Component configuration error: {what}")]
    Configuration { what: String },

    #[error("Serial chain '{component}' cannot carry power (efficiency collapsed)")]
    ChainInfeasible { component: String },

    #[error("Storage '{component}' cannot serve the requested power at timestep {timestep}")]
    StorageSaturation { component: String, timestep: usize },

    #[error(transparent)]
    Core(#[from] mf_core::CoreError),

    #[error(transparent)]
    Fuel(#[from] mf_fuel::FuelError),
}
