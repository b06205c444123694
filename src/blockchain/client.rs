//! Chain access seam for the explorer.
//!
//! Every view is built against [`ChainApi`] instead of a global client, so the
//! HTTP JSON-RPC implementation ([`EvmClient`]) and the in-memory one
//! ([`super::memory::InMemoryChain`]) are interchangeable.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ethers::types::{
    Address, Block, BlockNumber, Transaction, TransactionReceipt, H256, U256,
};

pub use super::evm_client::EvmClient;
use crate::blockchain::models::{AssetTransfer, ExplorerResult, TransferQuery};

/// Read-only view of a node API.
#[async_trait]
pub trait ChainApi: Send + Sync {
    /// Current chain head height.
    async fn block_number(&self) -> ExplorerResult<u64>;

    /// Block at a height or tag, with full transaction objects. `None` when the node has no such block.
    async fn block_with_transactions(
        &self,
        block: BlockNumber,
    ) -> ExplorerResult<Option<Block<Transaction>>>;

    async fn transaction(&self, hash: H256) -> ExplorerResult<Option<Transaction>>;

    async fn transaction_receipt(&self, hash: H256) -> ExplorerResult<Option<TransactionReceipt>>;

    /// Native balance in wei at the latest block.
    async fn balance(&self, address: Address) -> ExplorerResult<U256>;

    /// Transfer history matching `query`, capped at `query.max_count`.
    async fn asset_transfers(&self, query: &TransferQuery) -> ExplorerResult<Vec<AssetTransfer>>;
}

/// Shared handle used by the application state.
pub type SharedChain = Arc<dyn ChainApi>;

/// Create the HTTP client used for node requests
pub fn create_http_client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))
}
