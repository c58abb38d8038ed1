//! mf-project: canonical topology file format, validation and building.

pub mod build;
pub mod schema;
pub mod validate;

pub use build::{build_system, MachinerySystem};
pub use schema::*;
pub use validate::{validate_system, ValidationError};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Build error: {0}")]
    Machinery(#[from] mf_machinery::MachineryError),

    #[error("Build error: {0}")]
    Component(#[from] mf_components::ComponentError),

    #[error("Build error: {0}")]
    Core(#[from] mf_core::CoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_yaml(path: &std::path::Path) -> ProjectResult<SystemDef> {
    let content = std::fs::read_to_string(path)?;
    let system: SystemDef = serde_yaml::from_str(&content)?;
    validate_system(&system)?;
    Ok(system)
}

pub fn save_yaml(path: &std::path::Path, system: &SystemDef) -> ProjectResult<()> {
    validate_system(system)?;
    let content = serde_yaml::to_string(system)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &std::path::Path) -> ProjectResult<SystemDef> {
    let content = std::fs::read_to_string(path)?;
    let system: SystemDef = serde_json::from_str(&content)?;
    validate_system(&system)?;
    Ok(system)
}

pub fn save_json(path: &std::path::Path, system: &SystemDef) -> ProjectResult<()> {
    validate_system(system)?;
    let content = serde_json::to_string_pretty(system)?;
    std::fs::write(path, content)?;
    Ok(())
}
