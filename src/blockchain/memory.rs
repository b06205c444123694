// src/blockchain/memory.rs

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;
use ethers::types::{
    Address, Block, BlockNumber, Transaction, TransactionReceipt, H256, U256,
};

use crate::blockchain::{
    client::ChainApi,
    models::{AssetTransfer, ExplorerError, ExplorerResult, TransferQuery},
};

#[derive(Default)]
struct ChainData {
    blocks: BTreeMap<u64, Block<Transaction>>,
    receipts: HashMap<H256, TransactionReceipt>,
    balances: HashMap<Address, U256>,
    transfers: Vec<AssetTransfer>,
    failing_heights: HashSet<u64>,
    fail_transfers: bool,
}

/// A [`ChainApi`] backed by process memory.
///
/// Blocks, receipts, balances and transfers are inserted up front; selected
/// heights can be marked as failing to exercise partial-failure paths.
#[derive(Default)]
pub struct InMemoryChain {
    data: RwLock<ChainData>,
}

impl InMemoryChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_block(&self, block: Block<Transaction>) {
        let number = block.number.map(|n| n.as_u64()).unwrap_or_default();
        self.write().blocks.insert(number, block);
    }

    pub fn insert_receipt(&self, receipt: TransactionReceipt) {
        self.write().receipts.insert(receipt.transaction_hash, receipt);
    }

    pub fn set_balance(&self, address: Address, wei: U256) {
        self.write().balances.insert(address, wei);
    }

    pub fn push_transfer(&self, transfer: AssetTransfer) {
        self.write().transfers.push(transfer);
    }

    /// Reads of `height` fail with an RPC error until cleared.
    pub fn fail_height(&self, height: u64) {
        self.write().failing_heights.insert(height);
    }

    pub fn fail_transfers(&self, fail: bool) {
        self.write().fail_transfers = fail;
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, ChainData> {
        self.data.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, ChainData> {
        self.data.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn unavailable(what: String) -> ExplorerError {
    ExplorerError::Rpc {
        code: -32000,
        message: format!("{} unavailable", what),
    }
}

fn matches_address(filter: &Option<String>, value: Option<&str>) -> bool {
    match filter {
        None => true,
        Some(wanted) => value.is_some_and(|v| v.eq_ignore_ascii_case(wanted)),
    }
}

#[async_trait]
impl ChainApi for InMemoryChain {
    async fn block_number(&self) -> ExplorerResult<u64> {
        Ok(self.read().blocks.keys().next_back().copied().unwrap_or_default())
    }

    async fn block_with_transactions(
        &self,
        block: BlockNumber,
    ) -> ExplorerResult<Option<Block<Transaction>>> {
        let data = self.read();
        let height = match block {
            BlockNumber::Number(n) => n.as_u64(),
            BlockNumber::Earliest => 0,
            _ => match data.blocks.keys().next_back() {
                Some(h) => *h,
                None => return Ok(None),
            },
        };
        if data.failing_heights.contains(&height) {
            return Err(unavailable(format!("block {}", height)));
        }
        Ok(data.blocks.get(&height).cloned())
    }

    async fn transaction(&self, hash: H256) -> ExplorerResult<Option<Transaction>> {
        Ok(self
            .read()
            .blocks
            .values()
            .flat_map(|b| b.transactions.iter())
            .find(|tx| tx.hash == hash)
            .cloned())
    }

    async fn transaction_receipt(&self, hash: H256) -> ExplorerResult<Option<TransactionReceipt>> {
        Ok(self.read().receipts.get(&hash).cloned())
    }

    async fn balance(&self, address: Address) -> ExplorerResult<U256> {
        Ok(self.read().balances.get(&address).copied().unwrap_or_default())
    }

    async fn asset_transfers(&self, query: &TransferQuery) -> ExplorerResult<Vec<AssetTransfer>> {
        let data = self.read();
        if data.fail_transfers {
            return Err(unavailable("transfers".to_string()));
        }
        let max = usize::try_from(query.max_count).unwrap_or(usize::MAX);
        Ok(data
            .transfers
            .iter()
            .filter(|t| matches_address(&query.from_address, Some(&t.from)))
            .filter(|t| matches_address(&query.to_address, t.to.as_deref()))
            .filter(|t| query.categories.contains(&t.category))
            .filter(|t| t.block_number() >= query.from_block)
            .take(max)
            .cloned()
            .collect())
    }
}
