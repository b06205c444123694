// src/blockchain/mod.rs

// Re-export the client module with the chain API seam
pub mod client;
pub use client::{ChainApi, EvmClient, SharedChain};

// Re-export other modules
pub mod evm_client;
pub mod memory;
pub mod models;
pub mod services;
pub mod view_slot;

// Re-export commonly used types
pub use ethers::types::{Address, H256, U256, U64};
