//! # API Module
//!
//! HTTP handlers for the explorer. Every page of the explorer has one
//! endpoint returning its view model as JSON.
//!
//! ## Available Endpoints
//!
//! ### Search
//! - `GET /search?q=` - Classify a query as address, tx hash or block number
//!
//! ### Lists
//! - `GET /blocks?page=&page_size=&start=` - One page of blocks, newest first
//! - `GET /transactions?page=&page_size=&start=` - Transactions of one page of blocks
//! - `GET /transactions/latest?limit=` - Transactions of the newest block
//! - `GET /home` - Chain head, newest blocks and newest transactions
//!
//! ### Details
//! - `GET /block/:number` - Block detail
//! - `GET /transaction/:hash` - Transaction and receipt detail
//! - `GET /account/:address` - Balance and transfer history
//!
//! ### Tools
//! - `POST /rpc` - JSON-RPC tool calls, same tools as the stdio mode

pub mod account;
pub mod blocks;
pub mod extract;
pub mod health;
pub mod home;
pub mod search;
pub mod transaction;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use extract::ApiJson;
use serde_json::json;
use tracing::error;

use crate::{
    blockchain::models::ExplorerError,
    mcp::{
        handler::handle_mcp_request,
        protocol::{error_codes, Request, Response as RpcResponse},
    },
    AppState,
};

impl IntoResponse for ExplorerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ExplorerError::InvalidQuery
            | ExplorerError::InvalidPage(_)
            | ExplorerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ExplorerError::NotFound(_) => StatusCode::NOT_FOUND,
            ExplorerError::Rpc { .. } | ExplorerError::Transport(_) | ExplorerError::Decode(_) => {
                error!("Upstream failure: {}", self);
                StatusCode::BAD_GATEWAY
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

// Forward JSON-RPC requests over HTTP to the tool handler
async fn rpc_handler(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<Request>,
) -> Json<RpcResponse> {
    match handle_mcp_request(req, state).await {
        Some(resp) => Json(resp),
        None => Json(RpcResponse::error(
            serde_json::Value::Null,
            error_codes::INVALID_REQUEST,
            "Notifications are not supported over HTTP".into(),
        )),
    }
}

/// Router with every explorer endpoint, to be nested under `/api`.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health_handler))
        // Search
        .route("/search", get(search::search_handler))
        // Lists
        .route("/blocks", get(blocks::get_blocks_handler))
        .route("/transactions", get(blocks::get_page_transactions_handler))
        .route(
            "/transactions/latest",
            get(blocks::get_latest_transactions_handler),
        )
        .route("/home", get(home::get_home_handler))
        // Details
        .route("/block/:number", get(blocks::get_block_handler))
        .route("/transaction/:hash", get(transaction::get_transaction_handler))
        .route("/account/:address", get(account::get_account_handler))
        // JSON-RPC endpoint for tool calls
        .route("/rpc", post(rpc_handler))
}
