// src/blockchain/evm_client.rs

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use ethers::types::{
    Address, Block, BlockNumber, Transaction, TransactionReceipt, H256, U256, U64,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;

use crate::blockchain::{
    client::ChainApi,
    models::{AssetTransfer, AssetTransfersPage, ExplorerError, ExplorerResult, TransferQuery},
};

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcEnvelope {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AssetTransfersParams<'a> {
    from_block: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    from_address: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    to_address: Option<&'a str>,
    category: &'a [crate::blockchain::models::TransferCategory],
    max_count: String,
}

/// JSON-RPC client for an EVM node API (Alchemy or any compatible endpoint).
#[derive(Clone)]
pub struct EvmClient {
    http: reqwest::Client,
    rpc_url: Url,
    next_id: Arc<AtomicU64>,
}

impl EvmClient {
    /// Create a new EvmClient for the given RPC URL
    pub fn new(http: reqwest::Client, rpc_url: Url) -> Self {
        Self {
            http,
            rpc_url,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn rpc_url(&self) -> &Url {
        &self.rpc_url
    }

    /// Send one JSON-RPC request and decode its `result`.
    async fn call<R: DeserializeOwned>(&self, method: &str, params: Value) -> ExplorerResult<R> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id
        });
        debug!("RPC call {} (id {})", method, id);

        let envelope: RpcEnvelope = self
            .http
            .post(self.rpc_url.clone())
            .json(&payload)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(err) = envelope.error {
            warn!("RPC error from {}: {} {}", method, err.code, err.message);
            return Err(ExplorerError::Rpc {
                code: err.code,
                message: err.message,
            });
        }

        Ok(serde_json::from_value(envelope.result)?)
    }
}

#[async_trait]
impl ChainApi for EvmClient {
    async fn block_number(&self) -> ExplorerResult<u64> {
        let head: U64 = self.call("eth_blockNumber", json!([])).await?;
        Ok(head.as_u64())
    }

    async fn block_with_transactions(
        &self,
        block: BlockNumber,
    ) -> ExplorerResult<Option<Block<Transaction>>> {
        self.call("eth_getBlockByNumber", json!([block, true])).await
    }

    async fn transaction(&self, hash: H256) -> ExplorerResult<Option<Transaction>> {
        self.call("eth_getTransactionByHash", json!([hash])).await
    }

    async fn transaction_receipt(&self, hash: H256) -> ExplorerResult<Option<TransactionReceipt>> {
        self.call("eth_getTransactionReceipt", json!([hash])).await
    }

    async fn balance(&self, address: Address) -> ExplorerResult<U256> {
        self.call("eth_getBalance", json!([address, "latest"])).await
    }

    async fn asset_transfers(&self, query: &TransferQuery) -> ExplorerResult<Vec<AssetTransfer>> {
        let params = AssetTransfersParams {
            from_block: format!("{:#x}", query.from_block),
            from_address: query.from_address.as_deref(),
            to_address: query.to_address.as_deref(),
            category: &query.categories,
            max_count: format!("{:#x}", query.max_count),
        };
        let page: AssetTransfersPage = self
            .call("alchemy_getAssetTransfers", json!([params]))
            .await?;
        Ok(page.transfers)
    }
}
