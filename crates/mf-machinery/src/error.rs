use mf_core::NodeId;
use thiserror::Error;

pub type MachineryResult<T> = Result<T, MachineryError>;

#[derive(Error, Debug)]
pub enum MachineryError {
    #[error("System configuration error: {what}")]
    Configuration { what: String },

    #[error("Power balance cannot be satisfied at {node}, timestep {timestep}: residual {residual_kw:.3} kW")]
    PowerBalance {
        node: NodeId,
        timestep: usize,
        residual_kw: f64,
    },

    #[error("Storage '{component}' at {node} cannot serve the dispatch at timestep {timestep}")]
    StorageSaturation {
        node: NodeId,
        component: String,
        timestep: usize,
    },

    #[error("Input shape error: {what}")]
    InputShape { what: String },

    #[error("Unknown component: '{name}'")]
    UnknownComponent { name: String },

    #[error(transparent)]
    Component(#[from] mf_components::ComponentError),

    #[error(transparent)]
    Fuel(#[from] mf_fuel::FuelError),

    #[error(transparent)]
    Results(#[from] mf_results::ResultsError),
}
