// src/blockchain/services/blocks.rs

use chrono::{DateTime, Utc};
use ethers::types::{Block, BlockNumber, Transaction, U64};
use futures::future::join_all;
use tracing::{debug, warn};

use crate::blockchain::{
    client::ChainApi,
    models::{
        BlockDetail, BlockFetch, BlockSummary, BlockTransactionRow, ExplorerError,
        ExplorerResult, FailedHeight, TransactionKind, TransactionSummary,
    },
};
use crate::utils::{
    format_eth_compact, format_ether, format_gas_usage, format_relative_time, format_time_ago,
    short_address, short_hash,
};

/// A page of block heights counted down from `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    start: u64,
    index: u64,
    size: u64,
}

impl PageWindow {
    /// `index` is 1-based; both `index` and `size` must be non-zero.
    pub fn new(start: u64, index: u64, size: u64) -> ExplorerResult<Self> {
        if index == 0 {
            return Err(ExplorerError::InvalidPage("page index starts at 1".into()));
        }
        if size == 0 {
            return Err(ExplorerError::InvalidPage("page size must be positive".into()));
        }
        Ok(Self { start, index, size })
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Highest height on this page, or `None` when the page lies entirely below zero.
    pub fn base(&self) -> Option<u64> {
        (self.index - 1)
            .checked_mul(self.size)
            .and_then(|offset| self.start.checked_sub(offset))
    }

    /// Heights on this page, descending, with negatives clipped away.
    pub fn heights(&self) -> Vec<u64> {
        let Some(base) = self.base() else {
            return Vec::new();
        };
        (0..self.size).map_while(|i| base.checked_sub(i)).collect()
    }
}

async fn fetch_height(api: &dyn ChainApi, height: u64) -> BlockFetch {
    match api
        .block_with_transactions(BlockNumber::Number(U64::from(height)))
        .await
    {
        Ok(Some(block)) => BlockFetch::Fetched(block),
        Ok(None) => BlockFetch::Failed {
            height,
            reason: "block not found".to_string(),
        },
        Err(e) => {
            warn!("Failed to fetch block {}: {}", height, e);
            BlockFetch::Failed {
                height,
                reason: e.to_string(),
            }
        }
    }
}

/// Reads every height of the window concurrently; results keep the window's descending order.
pub async fn fetch_page(api: &dyn ChainApi, window: &PageWindow) -> Vec<BlockFetch> {
    let heights = window.heights();
    debug!(
        "Fetching page {} ({} heights from {:?})",
        window.index(),
        heights.len(),
        window.base()
    );
    join_all(heights.into_iter().map(|h| fetch_height(api, h))).await
}

/// Fetched blocks of a page, separated from the heights that could not be read.
#[derive(Debug, Clone, Default)]
pub struct BlockPage {
    pub blocks: Vec<Block<Transaction>>,
    pub failed: Vec<FailedHeight>,
}

impl BlockPage {
    pub fn from_fetches(fetches: Vec<BlockFetch>) -> Self {
        let mut page = BlockPage::default();
        for fetch in fetches {
            match fetch {
                BlockFetch::Fetched(block) => page.blocks.push(block),
                BlockFetch::Failed { height, reason } => {
                    page.failed.push(FailedHeight { height, reason })
                }
            }
        }
        page
    }

    /// Transactions of every fetched block, block order first, then position in block.
    pub fn into_transactions(self) -> Vec<Transaction> {
        self.blocks
            .into_iter()
            .flat_map(|block| block.transactions)
            .collect()
    }
}

/// Transactions of every block on the page that could be read.
pub async fn fetch_page_transactions(
    api: &dyn ChainApi,
    window: &PageWindow,
) -> (Vec<Transaction>, Vec<FailedHeight>) {
    let page = BlockPage::from_fetches(fetch_page(api, window).await);
    let failed = page.failed.clone();
    (page.into_transactions(), failed)
}

// --- View shaping ---

pub fn hex_string<T: std::fmt::LowerHex>(value: &T) -> String {
    format!("{:#x}", value)
}

pub fn block_summary(block: &Block<Transaction>, now: DateTime<Utc>) -> BlockSummary {
    let hash = block.hash.as_ref().map(hex_string).unwrap_or_default();
    let timestamp = block.timestamp.low_u64();
    BlockSummary {
        number: block.number.map(|n| n.as_u64()).unwrap_or_default(),
        hash_short: short_hash(&hash),
        hash,
        miner: block.author.as_ref().map(hex_string).unwrap_or_default(),
        timestamp,
        time_ago: format_time_ago(timestamp, now),
        transaction_count: block.transactions.len(),
        gas_used: block.gas_used.to_string(),
        gas_usage: format_gas_usage(block.gas_used, block.gas_limit),
    }
}

pub fn transaction_kind(tx: &Transaction) -> TransactionKind {
    if tx.to.is_none() {
        TransactionKind::ContractCreation
    } else if !tx.value.is_zero() {
        TransactionKind::Transfer
    } else {
        TransactionKind::ContractCall
    }
}

pub fn transaction_summary(tx: &Transaction, time_ago: Option<String>) -> TransactionSummary {
    let hash = hex_string(&tx.hash);
    TransactionSummary {
        hash_short: short_hash(&hash),
        hash,
        block_number: tx.block_number.map(|n| n.as_u64()),
        from: hex_string(&tx.from),
        to: tx.to.as_ref().map(hex_string),
        value: format_eth_compact(tx.value),
        kind: transaction_kind(tx),
        time_ago,
    }
}

/// Transactions of the newest block, at most `limit` of them.
pub async fn latest_transactions(
    api: &dyn ChainApi,
    limit: usize,
    now: DateTime<Utc>,
) -> ExplorerResult<Vec<TransactionSummary>> {
    let block = api
        .block_with_transactions(BlockNumber::Latest)
        .await?
        .ok_or_else(|| ExplorerError::NotFound("latest block".into()))?;
    let time_ago = format_relative_time(block.timestamp.low_u64(), now);
    Ok(block
        .transactions
        .iter()
        .take(limit)
        .map(|tx| transaction_summary(tx, Some(time_ago.clone())))
        .collect())
}

fn block_transaction_row(tx: &Transaction) -> BlockTransactionRow {
    let hash = hex_string(&tx.hash);
    let from = hex_string(&tx.from);
    let to = tx.to.as_ref().map(hex_string);
    BlockTransactionRow {
        hash_short: short_hash(&hash),
        hash,
        from_short: short_hash(&from),
        from,
        to_short: to.as_deref().map(short_hash),
        to,
        value: format!("{} ETH", format_ether(tx.value, 6)),
    }
}

/// Full detail of the block at `height`.
pub async fn block_detail(
    api: &dyn ChainApi,
    height: u64,
    now: DateTime<Utc>,
) -> ExplorerResult<BlockDetail> {
    let block = api
        .block_with_transactions(BlockNumber::Number(U64::from(height)))
        .await?
        .ok_or_else(|| ExplorerError::NotFound(format!("block {}", height)))?;

    let timestamp = block.timestamp.low_u64();
    Ok(BlockDetail {
        number: block.number.map(|n| n.as_u64()).unwrap_or(height),
        hash: block.hash.as_ref().map(hex_string).unwrap_or_default(),
        parent_hash: hex_string(&block.parent_hash),
        miner: block.author.as_ref().map(hex_string).unwrap_or_default(),
        timestamp,
        time_ago: format_time_ago(timestamp, now),
        gas_used: block.gas_used.to_string(),
        gas_limit: block.gas_limit.to_string(),
        gas_usage: format_gas_usage(block.gas_used, block.gas_limit),
        base_fee: block
            .base_fee_per_gas
            .map(|fee| format!("{} ETH", format_ether(fee, 9)))
            .unwrap_or_else(|| "N/A".to_string()),
        size: block.size.map(|s| format!("{} bytes", s)),
        transaction_count: block.transactions.len(),
        transactions: block.transactions.iter().map(block_transaction_row).collect(),
    })
}
