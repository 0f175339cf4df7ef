//! Core: chain primitives, fixed constants, and the pure client helpers
//! (IPFS links, route table). Compiles on every platform.

pub mod constants;
pub mod encoding;
pub mod ipfs;
pub mod routes;
pub mod types;
