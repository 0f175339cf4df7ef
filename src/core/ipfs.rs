//! IPFS gateway links for blog content

use crate::core::constants::{env, DEFAULT_IPFS_GATEWAY};

/// HTTP gateway that serves IPFS content by CID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpfsGateway {
    base: String,
}

impl Default for IpfsGateway {
    fn default() -> Self { Self::new(DEFAULT_IPFS_GATEWAY) }
}

impl IpfsGateway {
    pub fn new(gateway: impl Into<String>) -> Self {
        let mut base = gateway.into();
        if !base.ends_with('/') {
            base.push('/');
        }
        Self { base }
    }

    /// Gateway from `BLOGCHAIN_IPFS_GATEWAY`, falling back to the public default
    pub fn from_env() -> Self {
        std::env::var(env::IPFS_GATEWAY)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(Self::new)
            .unwrap_or_default()
    }

    pub fn base(&self) -> &str { &self.base }

    /// HTTP link for a CID. An empty CID yields an empty link.
    pub fn url(&self, cid: &str) -> String {
        if cid.is_empty() {
            return String::new();
        }
        format!("{}{}", self.base, cid)
    }
}
