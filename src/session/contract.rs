//! ContractHandle: the blog contract bound to an address, a call-signature set and a signer

use super::provider::{Signer, TransactionRequest};
use super::SessionError;
use crate::abi::{Abi, Function, Token};
use crate::config::ContractConfig;
use crate::core::types::{Address, TxHash};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone, Debug)]
pub struct ContractHandle {
    address: Address,
    abi: Arc<Abi>,
    signer: Signer,
}

impl ContractHandle {
    pub fn new(config: &ContractConfig, signer: Signer) -> Self {
        Self { address: config.address, abi: config.abi.clone(), signer }
    }

    pub fn address(&self) -> Address { self.address }
    pub fn abi(&self) -> &Abi { &self.abi }
    pub fn signer(&self) -> &Signer { &self.signer }

    fn request(&self, function: &Function, args: &[Token]) -> Result<TransactionRequest, SessionError> {
        Ok(TransactionRequest {
            from: Some(self.signer.address()),
            to: Some(self.address),
            data: function.encode_input(args)?,
            value: None,
        })
    }

    /// Read-only call (`eth_call`). Returns the decoded outputs.
    pub async fn call(&self, function: &str, args: &[Token]) -> Result<Vec<Token>, SessionError> {
        let f = self.abi.function(function)?;
        if !f.is_read_only() {
            return Err(SessionError::StateChangingFunction(f.name.clone()));
        }
        let tx = self.request(f, args)?;
        debug!(function = %f.signature(), contract = %self.address, "eth_call");
        let output = self.signer.provider().call(&tx).await?;
        Ok(f.decode_output(&output)?)
    }

    /// State-changing call (`eth_sendTransaction` from the bound signer)
    pub async fn send(&self, function: &str, args: &[Token]) -> Result<TxHash, SessionError> {
        let f = self.abi.function(function)?;
        if f.is_read_only() {
            return Err(SessionError::ReadOnlyFunction(f.name.clone()));
        }
        let tx = self.request(f, args)?;
        debug!(function = %f.signature(), contract = %self.address, from = %self.signer.address(), "eth_sendTransaction");
        Ok(self.signer.send_transaction(tx).await?)
    }
}
