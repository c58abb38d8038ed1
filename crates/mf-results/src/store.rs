//! Run storage API.

use crate::error::{ResultsError, ResultsResult};
use crate::types::SystemResult;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: String,
    pub system_name: String,
    pub solver_version: String,
    pub fuel_regime: String,
    pub integration_rule: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Clone)]
pub struct RunStore {
    root_dir: PathBuf,
}

impl RunStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    pub fn for_project(project_path: &Path) -> ResultsResult<Self> {
        let project_dir = project_path.parent().unwrap_or_else(|| Path::new("."));
        Self::new(project_dir.join(".marineflow").join("runs"))
    }

    fn run_dir(&self, run_id: &str) -> PathBuf {
        self.root_dir.join(run_id)
    }

    pub fn has_run(&self, run_id: &str) -> bool {
        self.run_dir(run_id).join("manifest.json").exists()
    }

    pub fn save_run(&self, manifest: &RunManifest, result: &SystemResult) -> ResultsResult<()> {
        let run_dir = self.run_dir(&manifest.run_id);
        fs::create_dir_all(&run_dir)?;

        let manifest_json = serde_json::to_string_pretty(manifest)?;
        fs::write(run_dir.join("manifest.json"), manifest_json)?;

        let result_json = serde_json::to_string(result)?;
        fs::write(run_dir.join("result.json"), result_json)?;

        Ok(())
    }

    pub fn load_manifest(&self, run_id: &str) -> ResultsResult<RunManifest> {
        let manifest_path = self.run_dir(run_id).join("manifest.json");
        if !manifest_path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }
        let content = fs::read_to_string(manifest_path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn load_result(&self, run_id: &str) -> ResultsResult<SystemResult> {
        let result_path = self.run_dir(run_id).join("result.json");
        if !result_path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }
        let content = fs::read_to_string(result_path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn list_runs(&self) -> ResultsResult<Vec<RunManifest>> {
        let mut runs = Vec::new();
        if !self.root_dir.exists() {
            return Ok(runs);
        }
        for dir_entry in fs::read_dir(&self.root_dir)? {
            let path = dir_entry?.path();
            if path.join("manifest.json").exists() {
                let content = fs::read_to_string(path.join("manifest.json"))?;
                runs.push(serde_json::from_str(&content)?);
            }
        }
        runs.sort_by(|a: &RunManifest, b: &RunManifest| a.run_id.cmp(&b.run_id));
        Ok(runs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MachineryResult;

    fn temp_store(tag: &str) -> RunStore {
        let dir = std::env::temp_dir().join(format!("mf-results-test-{tag}"));
        let _ = fs::remove_dir_all(&dir);
        RunStore::new(dir).unwrap()
    }

    #[test]
    fn save_and_load_round_trip() {
        let store = temp_store("roundtrip");
        let manifest = RunManifest {
            run_id: "abc123".to_string(),
            system_name: "test system".to_string(),
            solver_version: "0.1.0".to_string(),
            fuel_regime: "imo".to_string(),
            integration_rule: "sum_with_interval".to_string(),
            timestamp: None,
        };
        let result = SystemResult {
            electric_system: Some(MachineryResult::with_duration(3600.0)),
            mechanical_system: None,
        };
        store.save_run(&manifest, &result).unwrap();

        assert!(store.has_run("abc123"));
        let loaded_manifest = store.load_manifest("abc123").unwrap();
        assert_eq!(loaded_manifest.system_name, "test system");
        let loaded_result = store.load_result("abc123").unwrap();
        assert_eq!(loaded_result, result);
    }

    #[test]
    fn missing_run_is_an_error() {
        let store = temp_store("missing");
        assert!(store.load_manifest("nope").is_err());
        assert!(!store.has_run("nope"));
    }
}
