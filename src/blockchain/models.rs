// src/blockchain/models.rs
use ethers::types::{Block, Transaction, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// --- Error types for explorer operations ---

#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("Not a valid address, tx hash, or block number")]
    InvalidQuery,
    #[error("invalid page: {0}")]
    InvalidPage(String),
    #[error("invalid request: {0}")]
    BadRequest(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("node returned error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("request to node failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("failed to decode node response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ExplorerError {
    /// True when the error was caused by the caller's input rather than the node.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ExplorerError::InvalidQuery
                | ExplorerError::InvalidPage(_)
                | ExplorerError::BadRequest(_)
        )
    }
}

pub type ExplorerResult<T> = Result<T, ExplorerError>;

// --- Asset Transfer Models ---

/// Category of a value movement as reported by the transfers API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferCategory {
    External,
    Internal,
    Erc20,
    Erc721,
    Erc1155,
    Specialnft,
}

impl TransferCategory {
    /// The categories an account view asks for.
    pub const ACCOUNT_VIEW: [TransferCategory; 4] = [
        TransferCategory::External,
        TransferCategory::Erc20,
        TransferCategory::Erc721,
        TransferCategory::Erc1155,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TransferCategory::External => "ETH",
            TransferCategory::Internal => "Internal",
            TransferCategory::Erc20 => "ERC-20",
            TransferCategory::Erc721 => "ERC-721",
            TransferCategory::Erc1155 => "ERC-1155",
            TransferCategory::Specialnft => "NFT",
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, TransferCategory::External | TransferCategory::Internal)
    }
}

/// Filter for a single transfer-history query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferQuery {
    pub from_address: Option<String>,
    pub to_address: Option<String>,
    pub from_block: u64,
    pub categories: Vec<TransferCategory>,
    pub max_count: u64,
}

impl TransferQuery {
    pub fn outgoing(address: &str, max_count: u64) -> Self {
        Self {
            from_address: Some(address.to_string()),
            to_address: None,
            from_block: 0,
            categories: TransferCategory::ACCOUNT_VIEW.to_vec(),
            max_count,
        }
    }

    pub fn incoming(address: &str, max_count: u64) -> Self {
        Self {
            from_address: None,
            to_address: Some(address.to_string()),
            from_block: 0,
            categories: TransferCategory::ACCOUNT_VIEW.to_vec(),
            max_count,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawContract {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub decimal: Option<String>,
}

/// One transfer as returned by `alchemy_getAssetTransfers`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetTransfer {
    #[serde(default)]
    pub block_num: Option<String>,
    pub hash: String,
    pub from: String,
    #[serde(default)]
    pub to: Option<String>,
    pub category: TransferCategory,
    #[serde(default)]
    pub asset: Option<String>,
    #[serde(default)]
    pub raw_contract: RawContract,
}

impl AssetTransfer {
    /// Block number decoded from the hex `blockNum` field; missing or garbage sorts as 0.
    pub fn block_number(&self) -> u64 {
        self.block_num
            .as_deref()
            .and_then(parse_hex_u64)
            .unwrap_or(0)
    }

    /// Raw transferred amount in the asset's smallest unit.
    pub fn raw_value(&self) -> U256 {
        self.raw_contract
            .value
            .as_deref()
            .and_then(|v| U256::from_str_radix(v.trim_start_matches("0x"), 16).ok())
            .unwrap_or_default()
    }

    /// Declared token decimals, if the API reported them.
    pub fn decimals(&self) -> Option<u32> {
        self.raw_contract
            .decimal
            .as_deref()
            .and_then(parse_hex_u64)
            .and_then(|d| u32::try_from(d).ok())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetTransfersPage {
    #[serde(default)]
    pub transfers: Vec<AssetTransfer>,
    #[serde(default)]
    pub page_key: Option<String>,
}

pub(crate) fn parse_hex_u64(s: &str) -> Option<u64> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    if digits.is_empty() {
        return None;
    }
    u64::from_str_radix(digits, 16).ok()
}

// --- Block Page Models ---

/// Outcome of reading a single height inside a page.
#[derive(Debug, Clone)]
pub enum BlockFetch {
    Fetched(Block<Transaction>),
    Failed { height: u64, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedHeight {
    pub height: u64,
    pub reason: String,
}

/// Defines the structure for one row of a block table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockSummary {
    pub number: u64,
    pub hash: String,
    pub hash_short: String,
    pub miner: String,
    pub timestamp: u64,
    pub time_ago: String,
    pub transaction_count: usize,
    pub gas_used: String,
    pub gas_usage: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockPageResponse {
    pub start: u64,
    pub page: u64,
    pub page_size: u64,
    pub heights: Vec<u64>,
    pub blocks: Vec<BlockSummary>,
    pub failed: Vec<FailedHeight>,
}

// --- Transaction Models ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    #[serde(rename = "Contract Creation")]
    ContractCreation,
    Transfer,
    #[serde(rename = "Contract Call")]
    ContractCall,
}

/// Defines the structure for one row of a transaction list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub hash: String,
    pub hash_short: String,
    pub block_number: Option<u64>,
    pub from: String,
    pub to: Option<String>,
    pub value: String,
    pub kind: TransactionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_ago: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionPageResponse {
    pub start: u64,
    pub page: u64,
    pub page_size: u64,
    pub transactions: Vec<TransactionSummary>,
    pub failed: Vec<FailedHeight>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    Success,
    Failed,
    Pending,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionDetail {
    pub hash: String,
    pub status: TransactionStatus,
    pub block_number: Option<u64>,
    pub block_hash: Option<String>,
    pub from: String,
    pub to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
    pub value: String,
    pub gas_price: String,
    pub gas_limit: String,
    pub gas_used: String,
    pub fee: String,
    pub nonce: String,
    pub transaction_index: Option<u64>,
    pub input_size: usize,
}

// --- Block Detail Models ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockTransactionRow {
    pub hash: String,
    pub hash_short: String,
    pub from: String,
    pub from_short: String,
    pub to: Option<String>,
    pub to_short: Option<String>,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockDetail {
    pub number: u64,
    pub hash: String,
    pub parent_hash: String,
    pub miner: String,
    pub timestamp: u64,
    pub time_ago: String,
    pub gas_used: String,
    pub gas_limit: String,
    pub gas_usage: String,
    pub base_fee: String,
    pub size: Option<String>,
    pub transaction_count: usize,
    pub transactions: Vec<BlockTransactionRow>,
}

// --- Account Models ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferDirection {
    Sent,
    Received,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRow {
    pub hash: String,
    pub hash_short: String,
    pub block_number: u64,
    pub from_short: String,
    pub to_short: String,
    pub direction: TransferDirection,
    pub category: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountOverview {
    pub address: String,
    pub balance_wei: String,
    pub balance: String,
    pub total_transfers: usize,
    pub last_activity_block: Option<u64>,
    pub transfers: Vec<TransferRow>,
}

// --- Home Models ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeSnapshot {
    pub head: u64,
    pub blocks: Vec<BlockSummary>,
    pub latest_transactions: Vec<TransactionSummary>,
    pub refreshed_at: chrono::DateTime<chrono::Utc>,
}
