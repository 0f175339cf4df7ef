//! Client configuration - built by the composition root, overridable from the environment

use crate::abi::{Abi, AbiError};
use crate::core::constants::{env, CONTRACT_ABI, CONTRACT_ADDRESS, DEFAULT_ARTIFACT_PATH, DEFAULT_RPC_URL};
use crate::core::ipfs::IpfsGateway;
use crate::core::types::{Address, ParseError};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid contract address '{value}': {source}")]
    InvalidAddress { value: String, source: ParseError },
    #[error("Invalid call signatures: {0}")]
    Abi(#[from] AbiError),
}

/// Where the contract lives and how to call it
#[derive(Debug, Clone)]
pub struct ContractConfig {
    pub address: Address,
    pub abi: Arc<Abi>,
}

impl ContractConfig {
    pub fn new(address: Address, abi: Abi) -> Self {
        Self { address, abi: Arc::new(abi) }
    }

    /// The blog contract at its fixed address
    pub fn blog() -> Result<Self, ConfigError> {
        Ok(Self::new(parse_address(CONTRACT_ADDRESS)?, Abi::parse(CONTRACT_ABI)?))
    }

    pub fn with_address(mut self, address: Address) -> Self { self.address = address; self }
}

fn parse_address(value: &str) -> Result<Address, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|source| ConfigError::InvalidAddress { value: value.into(), source })
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub rpc_url: String,
    pub contract: ContractConfig,
    pub ipfs: IpfsGateway,
    pub artifact_path: PathBuf,
}

impl ClientConfig {
    pub fn new() -> Result<Self, ConfigError> {
        Ok(Self {
            rpc_url: DEFAULT_RPC_URL.into(),
            contract: ContractConfig::blog()?,
            ipfs: IpfsGateway::default(),
            artifact_path: PathBuf::from(DEFAULT_ARTIFACT_PATH),
        })
    }

    /// Defaults overridden by `BLOGCHAIN_*` variables (empty values are ignored)
    pub fn from_env() -> Result<Self, ConfigError> {
        let var = |key: &str| std::env::var(key).ok().filter(|s| !s.trim().is_empty());
        let mut config = Self::new()?;
        if let Some(url) = var(env::RPC_URL) {
            config.rpc_url = url;
        }
        if let Some(address) = var(env::CONTRACT_ADDRESS) {
            config.contract = config.contract.with_address(parse_address(&address)?);
        }
        if let Some(path) = var(env::ARTIFACT) {
            config.artifact_path = PathBuf::from(path);
        }
        config.ipfs = IpfsGateway::from_env();
        Ok(config)
    }

    pub fn with_rpc_url(mut self, url: impl Into<String>) -> Self { self.rpc_url = url.into(); self }
    pub fn with_contract_address(mut self, address: Address) -> Self { self.contract = self.contract.with_address(address); self }
    pub fn with_ipfs_gateway(mut self, gateway: impl Into<String>) -> Self { self.ipfs = IpfsGateway::new(gateway); self }
    pub fn with_artifact_path(mut self, path: impl Into<PathBuf>) -> Self { self.artifact_path = path.into(); self }
}
