//! Toolchain and network settings for compiling and deploying the contract

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::DeployError;
use crate::core::constants::DEFAULT_RPC_URL;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Optimizer {
    pub enabled: bool,
    pub runs: u32,
}

impl Default for Optimizer {
    fn default() -> Self { Self { enabled: true, runs: 200 } }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolidityConfig {
    pub version: String,
    #[serde(default)]
    pub optimizer: Optimizer,
}

impl Default for SolidityConfig {
    fn default() -> Self { Self { version: "0.8.33".into(), optimizer: Optimizer::default() } }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardhatConfig {
    #[serde(default)]
    pub solidity: SolidityConfig,
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkConfig>,
}

impl Default for HardhatConfig {
    fn default() -> Self {
        let mut networks = BTreeMap::new();
        networks.insert("localhost".into(), NetworkConfig { url: DEFAULT_RPC_URL.into() });
        Self { solidity: SolidityConfig::default(), networks }
    }
}

impl HardhatConfig {
    pub fn load(path: &Path) -> Result<Self, DeployError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| DeployError::Io(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&raw).map_err(|e| DeployError::Json(format!("{}: {}", path.display(), e)))
    }

    pub fn network(&self, name: &str) -> Result<&NetworkConfig, DeployError> {
        self.networks.get(name).ok_or_else(|| DeployError::UnknownNetwork(name.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let config = HardhatConfig::default();
        assert_eq!(config.solidity.version, "0.8.33");
        assert_eq!(config.solidity.optimizer, Optimizer { enabled: true, runs: 200 });
        assert_eq!(config.network("localhost").unwrap().url, "http://127.0.0.1:8545");
        assert!(matches!(config.network("mainnet"), Err(DeployError::UnknownNetwork(_))));
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("hardhat.json");
        std::fs::write(
            &path,
            json!({"solidity": {"version": "0.8.33", "optimizer": {"enabled": true, "runs": 20}},
                   "networks": {"sepolia": {"url": "https://rpc.sepolia.org"}}})
            .to_string(),
        )
        .unwrap();
        let config = HardhatConfig::load(&path).unwrap();
        assert_eq!(config.solidity.optimizer.runs, 20);
        assert_eq!(config.network("sepolia").unwrap().url, "https://rpc.sepolia.org");

        std::fs::write(&path, "{}").unwrap();
        let empty = HardhatConfig::load(&path).unwrap();
        assert_eq!(empty.solidity, SolidityConfig::default());
        assert!(empty.networks.is_empty());
    }
}
