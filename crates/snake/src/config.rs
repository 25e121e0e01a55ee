//! Snake configuration.
//!
//! Values come from three layers, lowest first: built-in defaults, an
//! optional YAML file, and command-line overrides.

use std::fs;
use std::path::Path;

use ofdpa::DEFAULT_CLIENT_NAME;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{SnakeError, SnakeResult};
use crate::planner::TopologyPlanner;
use crate::types::PortId;

/// Default values
pub mod defaults {
    use crate::types::PortId;

    pub const START_PORT: PortId = 1;
    pub const END_PORT: PortId = 48;
    pub const VLAN_ID: u32 = 10;
}

/// Snake run configuration.
///
/// ```yaml
/// start_port: 1
/// end_port: 32
/// vlan_id: 0        # untagged
/// max_port: 32
/// client_name: OFDPA_patch
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SnakeConfig {
    pub start_port: PortId,
    pub end_port: PortId,
    /// 0 selects untagged traffic.
    pub vlan_id: u32,
    /// Highest port number on the switch, if known.
    pub max_port: Option<PortId>,
    /// Name the session registers with the OF-DPA agent.
    pub client_name: String,
}

impl Default for SnakeConfig {
    fn default() -> Self {
        Self {
            start_port: defaults::START_PORT,
            end_port: defaults::END_PORT,
            vlan_id: defaults::VLAN_ID,
            max_port: None,
            client_name: DEFAULT_CLIENT_NAME.to_string(),
        }
    }
}

/// Command-line values that override the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub start_port: Option<PortId>,
    pub end_port: Option<PortId>,
    pub vlan_id: Option<u32>,
    pub max_port: Option<PortId>,
    pub client_name: Option<String>,
}

impl SnakeConfig {
    /// Parses a YAML document. Missing fields keep their defaults.
    pub fn from_yaml(path: &Path, text: &str) -> SnakeResult<Self> {
        serde_yaml::from_str(text).map_err(|source| SnakeError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads a YAML config file.
    pub fn load(path: &Path) -> SnakeResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| SnakeError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(path, &text)?;
        info!("Loaded snake config from {}", path.display());
        Ok(config)
    }

    /// Applies command-line overrides on top of this config.
    pub fn merge(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(v) = overrides.start_port {
            self.start_port = v;
        }
        if let Some(v) = overrides.end_port {
            self.end_port = v;
        }
        if let Some(v) = overrides.vlan_id {
            self.vlan_id = v;
        }
        if let Some(v) = overrides.max_port {
            self.max_port = Some(v);
        }
        if let Some(v) = overrides.client_name {
            self.client_name = v;
        }
        self
    }

    /// Builds the planner for this config.
    pub fn planner(&self) -> TopologyPlanner {
        match self.max_port {
            Some(max) => TopologyPlanner::new().with_max_port(max),
            None => TopologyPlanner::new(),
        }
    }
}
