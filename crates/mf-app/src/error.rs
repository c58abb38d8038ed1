use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Project(#[from] mf_project::ProjectError),

    #[error(transparent)]
    Machinery(#[from] mf_machinery::MachineryError),

    #[error(transparent)]
    Results(#[from] mf_results::ResultsError),

    #[error(transparent)]
    Fuel(#[from] mf_fuel::FuelError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
