//! Fixed deployment constants for the blog contract
//!
//! Centralized registry for the contract address, the call-signature list
//! and the default endpoints. Deployment replaces the address; everything
//! else is baked into the client.

/// Contract address produced by the first deployment on a fresh local dev node
pub const CONTRACT_ADDRESS: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

/// Human-readable call signatures of the blog contract
pub const CONTRACT_ABI: &[&str] = &[
    // Faucet
    "function claimTokens() public",
    // Publishing and reading
    "function publishBlog(string calldata name, string calldata intro, string calldata ipfsCID, uint256 price) public returns (uint256, string)",
    "function purchaseBlog(uint256 blogId) public",
    "function viewBlog(uint256 blogId) public",
    "function addComment(uint256 blogId, string calldata content) public returns (uint256)",
    // Queries
    "function balanceOf(address account) public view returns (uint256)",
    "function hasPurchased(address, uint256) public view returns (bool)",
    "function getBlogDetail(uint256 blogId) public view returns (address owner, string memory name, string memory intro, string memory ipfsCID, uint256 price, uint256 viewCount, uint256 publishDate, bool isHidden)",
    "function getUserPublishedBlogs(address user) public view returns (uint256[] memory)",
    // Governance
    "function createHideProposal(uint256 blogId, string calldata reason) public",
    "function voteOnProposal(uint256 proposalId) public",
    "function executeProposal(uint256 proposalId) public",
];

/// Contract function names
pub mod functions {
    pub const CLAIM_TOKENS: &str = "claimTokens";
    pub const PUBLISH_BLOG: &str = "publishBlog";
    pub const PURCHASE_BLOG: &str = "purchaseBlog";
    pub const VIEW_BLOG: &str = "viewBlog";
    pub const ADD_COMMENT: &str = "addComment";
    pub const BALANCE_OF: &str = "balanceOf";
    pub const HAS_PURCHASED: &str = "hasPurchased";
    pub const GET_BLOG_DETAIL: &str = "getBlogDetail";
    pub const GET_USER_PUBLISHED_BLOGS: &str = "getUserPublishedBlogs";
    pub const CREATE_HIDE_PROPOSAL: &str = "createHideProposal";
    pub const VOTE_ON_PROPOSAL: &str = "voteOnProposal";
    pub const EXECUTE_PROPOSAL: &str = "executeProposal";
}

/// JSON-RPC methods of the injected chain connection (EIP-1193)
pub mod methods {
    pub const REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
    pub const ACCOUNTS: &str = "eth_accounts";
    pub const CHAIN_ID: &str = "eth_chainId";
    pub const CALL: &str = "eth_call";
    pub const SEND_TRANSACTION: &str = "eth_sendTransaction";
    pub const TRANSACTION_RECEIPT: &str = "eth_getTransactionReceipt";
}

/// Local dev node endpoint
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

/// Public gateway used when no gateway is configured
pub const DEFAULT_IPFS_GATEWAY: &str = "https://gateway.pinata.cloud/ipfs/";

/// Compiled contract artifact written by the Solidity toolchain
pub const DEFAULT_ARTIFACT_PATH: &str = "artifacts/contracts/BlogSystem.sol/BlogSystem.json";

/// Environment variables
pub mod env {
    pub const RPC_URL: &str = "BLOGCHAIN_RPC_URL";
    pub const CONTRACT_ADDRESS: &str = "BLOGCHAIN_CONTRACT_ADDRESS";
    pub const IPFS_GATEWAY: &str = "BLOGCHAIN_IPFS_GATEWAY";
    pub const ARTIFACT: &str = "BLOGCHAIN_ARTIFACT";
    pub const LOG_JSON: &str = "BLOGCHAIN_LOG_JSON";
}
