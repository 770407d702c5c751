//! Serializable run configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unique identifier for a run configuration (content-addressable hash).
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Configuration for one repricing run, loaded from TOML.
///
/// Captures everything needed to reproduce the run: which scenario to
/// evaluate and where to put the artifacts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    /// Path to the JSON scenario file.
    pub scenario: PathBuf,

    /// Directory the artifacts land in.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Also write the CSV decision tape next to the JSON summary.
    #[serde(default)]
    pub export_csv: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("out")
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Deterministic content hash of this configuration.
    ///
    /// Two runs with an identical config share the same RunId, which is
    /// stamped into the summary artifact.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("RunConfig serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}
