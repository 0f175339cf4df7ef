//! Deploy - one-shot contract deployment to a dev node
//!
//! ```text
//! Artifact::load ─► pick sender (explicit or node account #0)
//!                ─► eth_sendTransaction {from, data: bytecode}
//!                ─► poll eth_getTransactionReceipt
//!                ─► Deployment {address, tx_hash, block_number}
//! ```
//!
//! Nothing is signed locally: the sender must be unlocked on the node, so only
//! dev nodes (Hardhat, Anvil) are supported.

mod artifact;
mod config;

pub use artifact::Artifact;
pub use config::{HardhatConfig, NetworkConfig, Optimizer, SolidityConfig};

use crate::core::types::{Address, TxHash};
use crate::session::{CapabilityError, Provider, TransactionRequest};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("I/O error: {0}")]
    Io(String),
    #[error("Invalid JSON: {0}")]
    Json(String),
    #[error("Artifact has no bytecode")]
    EmptyBytecode,
    #[error("Unknown network: {0}")]
    UnknownNetwork(String),
    #[error("Node exposes no accounts to deploy from")]
    NoSender,
    #[error("Deployment {0} reverted")]
    Reverted(TxHash),
    #[error("Receipt for {0} has no contract address")]
    NoContractAddress(TxHash),
    #[error("No receipt for {hash} after {attempts} attempts")]
    Timeout { hash: TxHash, attempts: u32 },
    #[error(transparent)]
    Capability(#[from] CapabilityError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deployment {
    pub address: Address,
    pub tx_hash: TxHash,
    pub block_number: u64,
}

pub struct Deployer {
    provider: Provider,
    from: Option<Address>,
    poll_interval: Duration,
    max_attempts: u32,
}

impl Deployer {
    pub fn new(provider: Provider) -> Self {
        Self { provider, from: None, poll_interval: Duration::from_millis(500), max_attempts: 120 }
    }

    pub fn with_sender(mut self, from: Address) -> Self { self.from = Some(from); self }

    pub fn with_polling(mut self, interval: Duration, max_attempts: u32) -> Self {
        self.poll_interval = interval;
        self.max_attempts = max_attempts.max(1);
        self
    }

    async fn sender(&self) -> Result<Address, DeployError> {
        if let Some(from) = self.from {
            return Ok(from);
        }
        let accounts = self.provider.accounts().await?;
        accounts.first().copied().ok_or(DeployError::NoSender)
    }

    pub async fn deploy(&self, artifact: &Artifact) -> Result<Deployment, DeployError> {
        let from = self.sender().await?;
        info!(from = %from, bytes = artifact.bytecode.len(), "Sending deployment transaction");
        let tx = TransactionRequest { from: Some(from), to: None, data: artifact.bytecode.clone(), value: None };
        let tx_hash = self.provider.send_transaction(&tx).await?;
        info!(tx = %tx_hash, "Waiting for deployment receipt");

        for attempt in 1..=self.max_attempts {
            if let Some(receipt) = self.provider.transaction_receipt(&tx_hash).await? {
                if !receipt.status {
                    return Err(DeployError::Reverted(tx_hash));
                }
                let address = receipt.contract_address.ok_or(DeployError::NoContractAddress(tx_hash))?;
                info!(address = %address, block = receipt.block_number, "Contract deployed");
                return Ok(Deployment { address, tx_hash, block_number: receipt.block_number });
            }
            debug!(attempt, "receipt pending");
            tokio::time::sleep(self.poll_interval).await;
        }
        Err(DeployError::Timeout { hash: tx_hash, attempts: self.max_attempts })
    }
}
