//! Wallet Session Manager
//!
//! Holds `{provider, signer, contract}` for the running client. The session is
//! an explicit object owned by the composition root and lent to whatever
//! needs wallet access.
//!
//! # States
//!
//! ```text
//! Uninitialized ──connect() ok──────────► Connected { account }
//!       │                                     ▲   │
//!       └──silent_reconnect() = Some(acct)────┘   └─ connect()/silent_reconnect()
//!                                                    rebind; failures leave it as is
//! ```
//!
//! # Operations
//!
//! | Operation | Prompts | Failure |
//! |-----------|---------|---------|
//! | `connect()` | yes (`eth_requestAccounts`) | `CapabilityUnavailable`, `NoAccounts`, capability errors |
//! | `silent_reconnect()` | no (`eth_accounts`) | never; returns `None` and logs |
//! | `contract()` | no | `NoActiveSession` |
//!
//! The connection slot is replaced in a single assignment after the awaited
//! request resolves, so no caller sees a new signer with a stale contract.
//! Two overlapping `connect()` calls both bind; the one that resolves last wins.
//! There is no disconnect, and account-changed notifications are not observed.

mod capability;
mod contract;
mod provider;

pub use capability::{CapabilityError, CapabilityResult, ChainCapability, USER_REJECTED};
pub use contract::ContractHandle;
pub use provider::{Provider, Signer, TransactionReceipt, TransactionRequest};

use crate::abi::AbiError;
use crate::config::ContractConfig;
use crate::core::types::Address;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("No injected chain connection available")]
    CapabilityUnavailable,
    #[error("No active wallet session; connect first")]
    NoActiveSession,
    #[error("Wallet exposed no accounts")]
    NoAccounts,
    #[error("Authorized account query failed: {0}")]
    AuthorizationQueryFailed(CapabilityError),
    #[error("{0} is read-only; use call")]
    ReadOnlyFunction(String),
    #[error("{0} changes state; use send")]
    StateChangingFunction(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Unexpected return data from {0}")]
    UnexpectedOutput(String),
    #[error(transparent)]
    Capability(#[from] CapabilityError),
    #[error(transparent)]
    Abi(#[from] AbiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Connected { account: Address },
}

/// A bound session. All three parts are always from the same connect.
#[derive(Clone, Debug)]
pub struct Connection {
    pub provider: Provider,
    pub signer: Signer,
    pub contract: ContractHandle,
}

pub struct WalletSession {
    capability: Option<Rc<dyn ChainCapability>>,
    contract: ContractConfig,
    connection: RefCell<Option<Connection>>,
}

impl WalletSession {
    /// `capability = None` models a client with no injected wallet.
    pub fn new(capability: Option<Rc<dyn ChainCapability>>, contract: ContractConfig) -> Self {
        Self { capability, contract, connection: RefCell::new(None) }
    }

    pub fn has_capability(&self) -> bool { self.capability.is_some() }

    pub fn contract_config(&self) -> &ContractConfig { &self.contract }

    /// Explicit, user-gesture-gated connect. Always re-requests accounts, even
    /// when already connected.
    pub async fn connect(&self) -> Result<Connection, SessionError> {
        let Some(capability) = self.capability.clone() else {
            warn!("connect: no injected chain connection");
            return Err(SessionError::CapabilityUnavailable);
        };
        let provider = Provider::new(capability);
        let signer = provider.get_signer().await?;
        let connection = self.bind(provider, signer);
        info!(account = %connection.signer.address(), contract = %self.contract.address, "Wallet connected");
        Ok(connection)
    }

    /// Startup probe: rebinds from already-authorized accounts without
    /// prompting. Returns the first account, or `None` for "no session".
    /// Query failures are logged and absorbed.
    pub async fn silent_reconnect(&self) -> Option<Address> {
        let Some(capability) = self.capability.clone() else {
            debug!("silent reconnect: no injected chain connection");
            return None;
        };
        let provider = Provider::new(capability);
        let accounts = match provider.accounts().await {
            Ok(accounts) => accounts,
            Err(e) => {
                let err = SessionError::AuthorizationQueryFailed(e);
                warn!(error = %err, "Silent reconnect failed");
                return None;
            }
        };
        let Some(account) = accounts.first().copied() else {
            debug!("silent reconnect: no authorized accounts");
            return None;
        };
        let signer = provider.signer_for(account);
        self.bind(provider, signer);
        info!(account = %account, "Wallet session restored");
        Some(account)
    }

    fn bind(&self, provider: Provider, signer: Signer) -> Connection {
        let contract = ContractHandle::new(&self.contract, signer.clone());
        let connection = Connection { provider, signer, contract };
        *self.connection.borrow_mut() = Some(connection.clone());
        connection
    }

    /// Bound contract handle. Fails before any successful connect.
    pub fn contract(&self) -> Result<ContractHandle, SessionError> {
        self.connection
            .borrow()
            .as_ref()
            .map(|c| c.contract.clone())
            .ok_or(SessionError::NoActiveSession)
    }

    pub fn connection(&self) -> Option<Connection> { self.connection.borrow().clone() }

    pub fn state(&self) -> SessionState {
        match self.connection.borrow().as_ref() {
            Some(c) => SessionState::Connected { account: c.signer.address() },
            None => SessionState::Uninitialized,
        }
    }

    pub fn account(&self) -> Option<Address> {
        match self.state() {
            SessionState::Connected { account } => Some(account),
            SessionState::Uninitialized => None,
        }
    }
}
