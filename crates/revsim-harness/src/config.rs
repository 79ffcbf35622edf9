use crate::error::{HarnessError, Result};
use crate::executor::RunOptions;
use revsim_store::{GatewayConfig, GatewayMode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Everything needed for a run, as read from a JSON config file.
///
/// Every field is optional in the file; missing ones take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub data_dir: Option<PathBuf>,
    pub task_dir: Option<PathBuf>,
    pub groundtruth_dir: Option<PathBuf>,
    pub gateway: GatewayMode,
    pub cache: GatewayConfig,
    pub run: RunOptions,
    /// Name of the agent to run.
    pub agent: Option<String>,
    /// Agent-specific settings, handed to the agent factory as is.
    pub agent_params: Value,
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| HarnessError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|source| HarnessError::Parse {
            path: path.to_path_buf(),
            source: Box::new(source),
        })
    }
}
