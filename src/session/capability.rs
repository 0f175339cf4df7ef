//! Injected chain connection (EIP-1193 shaped)

use crate::core::encoding::HexError;
use crate::core::types::ParseError;
use async_trait::async_trait;
use serde_json::Value;

/// EIP-1193 code for a request the user declined
pub const USER_REJECTED: i64 = 4001;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CapabilityError {
    #[error("Request rejected by user")]
    Rejected,
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl CapabilityError {
    pub fn from_rpc(code: i64, message: impl Into<String>) -> Self {
        if code == USER_REJECTED {
            CapabilityError::Rejected
        } else {
            CapabilityError::Rpc { code, message: message.into() }
        }
    }
}

impl From<HexError> for CapabilityError {
    fn from(e: HexError) -> Self { CapabilityError::Malformed(e.to_string()) }
}

impl From<ParseError> for CapabilityError {
    fn from(e: ParseError) -> Self { CapabilityError::Malformed(e.to_string()) }
}

pub type CapabilityResult<T> = Result<T, CapabilityError>;

/// The externally supplied chain connection: a browser wallet extension,
/// or a JSON-RPC node standing in for one.
///
/// Not `Send`: the session is single-threaded and browser handles are `!Send`.
#[async_trait(?Send)]
pub trait ChainCapability {
    async fn request(&self, method: &str, params: Value) -> CapabilityResult<Value>;
}
