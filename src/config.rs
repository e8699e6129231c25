use crate::error::{ConfigError, SourceError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Execution data for one run, in the shape the generator's test data uses:
///
/// ```json
/// {
///   "logVerification": { "logName": "Import PCS7 Diagram-24-12-2025, 05:32 PM" },
///   "connectionVerification": { "diagramName": "=7BHA01GH001" }
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RunConfig {
    #[serde(default)]
    pub db_path: Option<PathBuf>,
    #[serde(default)]
    pub jar_path: Option<PathBuf>,
    #[serde(default)]
    pub log_verification: Option<LogVerification>,
    #[serde(default)]
    pub connection_verification: Option<ConnectionVerification>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LogVerification {
    pub log_name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionVerification {
    pub diagram_name: String,
}

impl RunConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn run_id(&self) -> Option<&str> {
        self.log_verification
            .as_ref()
            .map(|log| log.log_name.as_str())
    }

    pub fn diagram(&self) -> Option<&str> {
        self.connection_verification
            .as_ref()
            .map(|connection| connection.diagram_name.as_str())
    }
}

/// Locations of the generator database and the diagram archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPaths {
    pub database: PathBuf,
    pub archive: PathBuf,
}

impl InputPaths {
    /// Explicit values (command line or environment) win over the config file.
    pub fn resolve(
        database: Option<PathBuf>,
        archive: Option<PathBuf>,
        config: &RunConfig,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            database: database
                .or_else(|| config.db_path.clone())
                .ok_or(ConfigError::MissingValue("database path"))?,
            archive: archive
                .or_else(|| config.jar_path.clone())
                .ok_or(ConfigError::MissingValue("archive path"))?,
        })
    }

    /// Both inputs must exist before any rule runs.
    pub fn verify(&self) -> Result<(), SourceError> {
        for path in [&self.database, &self.archive] {
            if !path.exists() {
                return Err(SourceError::MissingInput(path.display().to_string()));
            }
        }
        Ok(())
    }
}
