//! Blogchain: wallet session, contract calls and deployment for the on-chain blog.
//!
//! # Architecture
//!
//! ```text
//! Composition root (CLI / BlogClient)
//!   │
//!   ├── WalletSession ── {Provider, Signer, ContractHandle}
//!   │         │
//!   │         └── ChainCapability (EIP-1193 request)
//!   │                 ├── InjectedCapability  (wasm: window.ethereum)
//!   │                 └── HttpCapability      (native: JSON-RPC node)
//!   │
//!   ├── BlogContract ── publish / purchase / comment / vote / queries
//!   │         │
//!   │         └── abi (human-readable signatures → calldata)
//!   │
//!   └── Deployer (native) ── artifact bytecode → receipt → address
//! ```
//!
//! # Session lifecycle
//!
//! | Call | When | Result |
//! |------|------|--------|
//! | `silent_reconnect()` | app startup | account or `None`, never an error |
//! | `connect()` | user gesture | `Connection` or `CapabilityUnavailable` |
//! | `contract()` | before any chain call | handle or `NoActiveSession` |
//!
//! # Features
//!
//! - `native` - CLI, JSON-RPC over HTTP, deployment, tracing subscriber
//! - `wasm` - browser client over the injected wallet
//!
//! # Usage
//!
//! ```ignore
//! use blogchain::{BlogContract, ClientConfig, HttpCapability, WalletSession};
//! use std::rc::Rc;
//!
//! let config = ClientConfig::from_env()?;
//! let capability = Rc::new(HttpCapability::new(&config.rpc_url)?);
//! let session = WalletSession::new(Some(capability), config.contract.clone());
//!
//! if session.silent_reconnect().await.is_none() {
//!     session.connect().await?;
//! }
//! let blog = BlogContract::from_session(&session)?;
//! let detail = blog.get_blog_detail(1).await?;
//! println!("{}", detail.content_url(&config.ipfs));
//! ```

// =============================================================================
// Shared modules (compile everywhere)
// =============================================================================
pub mod abi;
pub mod blog;
pub mod config;
pub mod core;
pub mod session;

// =============================================================================
// Native-only modules (CLI, HTTP, tokio)
// =============================================================================
#[cfg(feature = "native")]
pub mod deploy;
#[cfg(feature = "native")]
pub mod logging;
#[cfg(feature = "native")]
pub mod rpc;

// =============================================================================
// WASM-only modules (browser, wasm-bindgen)
// =============================================================================
#[cfg(feature = "wasm")]
pub mod wasm;

// =============================================================================
// Re-exports: Shared
// =============================================================================
pub use abi::{Abi, AbiError, Token};
pub use blog::{BlogContract, BlogDetail, PublishBlog};
pub use config::{ClientConfig, ConfigError, ContractConfig};
pub use crate::core::ipfs::IpfsGateway;
pub use crate::core::routes::Route;
pub use crate::core::types::{Address, TxHash};
pub use session::{
    CapabilityError, ChainCapability, Connection, ContractHandle, Provider, SessionError, SessionState, Signer,
    WalletSession,
};

// =============================================================================
// Re-exports: Native
// =============================================================================
#[cfg(feature = "native")]
pub use deploy::{Artifact, DeployError, Deployer, Deployment, HardhatConfig};
#[cfg(feature = "native")]
pub use rpc::HttpCapability;

// =============================================================================
// Re-exports: WASM
// =============================================================================
#[cfg(feature = "wasm")]
pub use wasm::{BlogClient, InjectedCapability};
