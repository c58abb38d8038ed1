use thiserror::Error;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(Error, Debug)]
pub enum ResultsError {
    #[error("Integration error: {what}")]
    Integration { what: &'static str },

    #[error("Result durations disagree: {left} s vs {right} s")]
    DurationMismatch { left: f64, right: f64 },

    #[error("Run not found: {run_id}")]
    RunNotFound { run_id: String },

    #[error("Fuel error: {0}")]
    Fuel(#[from] mf_fuel::FuelError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
