//! Provider and Signer: typed views over a ChainCapability

use super::capability::{CapabilityError, CapabilityResult, ChainCapability};
use super::SessionError;
use crate::core::constants::methods;
use crate::core::encoding::{from_hex_data, parse_quantity, to_hex_data, to_quantity};
use crate::core::types::{Address, TxHash};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionRequest {
    pub from: Option<Address>,
    /// `None` deploys a contract
    pub to: Option<Address>,
    pub data: Vec<u8>,
    pub value: Option<u128>,
}

impl TransactionRequest {
    pub fn to_json(&self) -> Value {
        let mut tx = Map::new();
        if let Some(from) = self.from {
            tx.insert("from".into(), json!(from));
        }
        if let Some(to) = self.to {
            tx.insert("to".into(), json!(to));
        }
        tx.insert("data".into(), json!(to_hex_data(&self.data)));
        if let Some(value) = self.value {
            tx.insert("value".into(), json!(to_quantity(value)));
        }
        Value::Object(tx)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionReceipt {
    pub transaction_hash: TxHash,
    pub block_number: u64,
    pub contract_address: Option<Address>,
    pub status: bool,
}

impl TransactionReceipt {
    pub fn from_json(value: &Value) -> CapabilityResult<Self> {
        let field = |name: &str| {
            value[name].as_str().ok_or_else(|| CapabilityError::Malformed(format!("receipt missing '{}'", name)))
        };
        let contract_address = match value.get("contractAddress").and_then(|v| v.as_str()) {
            Some(raw) => Some(raw.parse::<Address>()?),
            None => None,
        };
        // Pre-Byzantium receipts carry no status; treat as success
        let status = match value.get("status").and_then(|v| v.as_str()) {
            Some(raw) => parse_quantity(raw)? == 1,
            None => true,
        };
        Ok(Self {
            transaction_hash: field("transactionHash")?.parse::<TxHash>()?,
            block_number: parse_quantity(field("blockNumber")?)?,
            contract_address,
            status,
        })
    }
}

/// Read-oriented handle on the chain connection
#[derive(Clone)]
pub struct Provider {
    capability: Rc<dyn ChainCapability>,
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("Provider") }
}

impl Provider {
    pub fn new(capability: Rc<dyn ChainCapability>) -> Self { Self { capability } }

    /// Ask the user to expose accounts (may open an approval prompt)
    pub async fn request_accounts(&self) -> CapabilityResult<Vec<Address>> {
        parse_accounts(self.capability.request(methods::REQUEST_ACCOUNTS, json!([])).await?)
    }

    /// Accounts already authorized for this origin. Never prompts.
    pub async fn accounts(&self) -> CapabilityResult<Vec<Address>> {
        parse_accounts(self.capability.request(methods::ACCOUNTS, json!([])).await?)
    }

    pub async fn chain_id(&self) -> CapabilityResult<u64> {
        let raw = self.capability.request(methods::CHAIN_ID, json!([])).await?;
        let raw = raw.as_str().ok_or_else(|| CapabilityError::Malformed(format!("chain id: {}", raw)))?;
        Ok(parse_quantity(raw)?)
    }

    pub async fn call(&self, tx: &TransactionRequest) -> CapabilityResult<Vec<u8>> {
        let raw = self.capability.request(methods::CALL, json!([tx.to_json(), "latest"])).await?;
        let raw = raw.as_str().ok_or_else(|| CapabilityError::Malformed(format!("call result: {}", raw)))?;
        Ok(from_hex_data(raw)?)
    }

    pub async fn send_transaction(&self, tx: &TransactionRequest) -> CapabilityResult<TxHash> {
        let raw = self.capability.request(methods::SEND_TRANSACTION, json!([tx.to_json()])).await?;
        let raw = raw.as_str().ok_or_else(|| CapabilityError::Malformed(format!("tx hash: {}", raw)))?;
        Ok(raw.parse::<TxHash>()?)
    }

    /// `None` while the transaction is still pending
    pub async fn transaction_receipt(&self, hash: &TxHash) -> CapabilityResult<Option<TransactionReceipt>> {
        let raw = self.capability.request(methods::TRANSACTION_RECEIPT, json!([hash.to_string()])).await?;
        if raw.is_null() {
            return Ok(None);
        }
        TransactionReceipt::from_json(&raw).map(Some)
    }

    /// Request account exposure and bind the first account
    pub async fn get_signer(&self) -> Result<Signer, SessionError> {
        let accounts = self.request_accounts().await?;
        let address = *accounts.first().ok_or(SessionError::NoAccounts)?;
        Ok(self.signer_for(address))
    }

    /// Bind an already-authorized account without prompting
    pub fn signer_for(&self, address: Address) -> Signer {
        Signer { address, provider: self.clone() }
    }
}

fn parse_accounts(value: Value) -> CapabilityResult<Vec<Address>> {
    value
        .as_array()
        .ok_or_else(|| CapabilityError::Malformed(format!("accounts: {}", value)))?
        .iter()
        .map(|v| {
            let raw = v.as_str().ok_or_else(|| CapabilityError::Malformed(format!("account: {}", v)))?;
            Ok(raw.parse::<Address>()?)
        })
        .collect()
}

/// Account authorized to sign
#[derive(Clone, Debug)]
pub struct Signer {
    address: Address,
    provider: Provider,
}

impl Signer {
    pub fn address(&self) -> Address { self.address }

    pub fn provider(&self) -> &Provider { &self.provider }

    /// Send with `from` forced to this signer
    pub async fn send_transaction(&self, mut tx: TransactionRequest) -> CapabilityResult<TxHash> {
        tx.from = Some(self.address);
        self.provider.send_transaction(&tx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tx_request_json() {
        let to: Address = "0x5FbDB2315678afecb367f032d93F642f64180aa3".parse().unwrap();
        let tx = TransactionRequest { from: None, to: Some(to), data: vec![0x12, 0x34], value: Some(255) };
        assert_eq!(
            tx.to_json(),
            json!({"to": "0x5FbDB2315678afecb367f032d93F642f64180aa3", "data": "0x1234", "value": "0xff"})
        );
    }

    #[test]
    fn test_receipt_parsing() {
        let receipt = TransactionReceipt::from_json(&json!({
            "transactionHash": format!("0x{}", "11".repeat(32)),
            "blockNumber": "0x1",
            "contractAddress": "0x5fbdb2315678afecb367f032d93f642f64180aa3",
            "status": "0x1"
        }))
        .unwrap();
        assert_eq!(receipt.block_number, 1);
        assert!(receipt.status);
        assert_eq!(receipt.contract_address.unwrap().to_string(), "0x5FbDB2315678afecb367f032d93F642f64180aa3");

        let reverted = TransactionReceipt::from_json(&json!({
            "transactionHash": format!("0x{}", "22".repeat(32)),
            "blockNumber": "0x2",
            "contractAddress": null,
            "status": "0x0"
        }))
        .unwrap();
        assert!(!reverted.status);
        assert!(reverted.contract_address.is_none());

        assert!(TransactionReceipt::from_json(&json!({"blockNumber": "0x2"})).is_err());
    }

    #[test]
    fn test_parse_accounts() {
        let accounts = parse_accounts(json!(["0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"])).unwrap();
        assert_eq!(accounts.len(), 1);
        assert!(parse_accounts(json!("0xf39f")).is_err());
        assert!(parse_accounts(json!([42])).is_err());
    }
}
