//! # Tool Handler Module
//!
//! JSON-RPC tool interface to the explorer, served over stdin/stdout and at
//! `POST /api/rpc`. Each tool returns the same view model as the matching
//! HTTP endpoint.
//!
//! ## Supported Tools
//!
//! - `search` - Classify a query and return the route of its detail view
//! - `get_blocks_page` - One page of blocks counted down from the head
//! - `get_transactions_page` - Transactions of one page of blocks
//! - `get_latest_transactions` - Transactions of the newest block
//! - `get_block` - Block detail
//! - `get_transaction` - Transaction and receipt detail
//! - `get_account` - Balance and transfer history of an address

use std::str::FromStr;

use chrono::Utc;
use ethers::types::{Address, H256};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::{
    blockchain::services::{
        account::account_overview,
        blocks::{
            block_detail, block_summary, fetch_page, fetch_page_transactions, latest_transactions,
            transaction_summary, BlockPage, PageWindow,
        },
        search::{classify, Target},
        transactions::transaction_detail,
    },
    mcp::protocol::{error_codes, Request, Response},
    utils, AppState,
};

const TOOL_NAMES: [&str; 7] = [
    "search",
    "get_blocks_page",
    "get_transactions_page",
    "get_latest_transactions",
    "get_block",
    "get_transaction",
    "get_account",
];

// Helper: produce a result Value that always contains a text content array
// and preserves structured data for JSON-friendly clients.
fn make_texty_result<T: Serialize>(text: String, payload: &T, req_id: &Value) -> Response {
    match serde_json::to_value(payload) {
        Ok(data) => Response::success(
            req_id.clone(),
            json!({
                "data": data,
                "message": text,
                "content": [{ "type": "text", "text": text }]
            }),
        ),
        Err(e) => {
            error!("Failed to serialize tool result: {}", e);
            Response::error(req_id.clone(), error_codes::INTERNAL_ERROR, e.to_string())
        }
    }
}

/// This is the main dispatcher for all incoming tool requests.
pub async fn handle_mcp_request(req: Request, state: AppState) -> Option<Response> {
    info!("Handling tool request for method: {}", req.method);

    if req.is_notification() {
        return None;
    }

    let response = match req.method.as_str() {
        "initialize" => handle_initialize(&req),
        "tools/list" => handle_tools_list(&req),
        "tools/call" => handle_tool_call(req, state).await,
        // Direct method calls are rewritten into tools/call to reuse the same logic
        name if TOOL_NAMES.contains(&name) => {
            let wrapped = Request {
                jsonrpc: req.jsonrpc.clone(),
                id: req.id.clone(),
                method: "tools/call".to_string(),
                params: Some(json!({
                    "name": name,
                    "arguments": req.params.clone().unwrap_or_else(|| json!({}))
                })),
            };
            handle_tool_call(wrapped, state).await
        }
        _ => Response::error(
            req.id,
            error_codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", req.method),
        ),
    };

    Some(response)
}

/// Page window from `start`, `page` and `page_size` arguments; `start` defaults to the head.
async fn window_from_args(
    args: &Value,
    state: &AppState,
    req_id: &Value,
) -> Result<PageWindow, Response> {
    let page = utils::get_optional_arg::<u64>(args, "page", req_id)?.unwrap_or(1);
    let page_size = utils::get_optional_arg::<u64>(args, "page_size", req_id)?
        .unwrap_or(state.config.page_size)
        .min(state.config.max_page_size);
    let start = match utils::get_optional_arg::<u64>(args, "start", req_id)? {
        Some(start) => start,
        None => state
            .chain
            .block_number()
            .await
            .map_err(|e| Response::from_explorer_error(req_id.clone(), &e))?,
    };
    PageWindow::new(start, page, page_size)
        .map_err(|e| Response::from_explorer_error(req_id.clone(), &e))
}

/// Handles a 'tools/call' request by dispatching it to the correct tool logic.
async fn handle_tool_call(req: Request, state: AppState) -> Response {
    let params = match req.params.as_ref() {
        Some(p) => p,
        None => {
            return Response::error(
                req.id,
                error_codes::INVALID_PARAMS,
                "Missing 'params' object".into(),
            )
        }
    };

    let tool_name = match params.get("name").and_then(|n| n.as_str()) {
        Some(name) => name,
        None => {
            return Response::error(
                req.id,
                error_codes::INVALID_PARAMS,
                "Missing 'name' field in params".into(),
            )
        }
    };

    let empty_args = json!({});
    let args = params.get("arguments").unwrap_or(&empty_args);
    let req_id = &req.id;
    let api = state.chain.as_ref();

    let res: Result<Response, Response> = match tool_name {
        "search" => (async {
            let query = utils::get_required_arg::<String>(args, "query", req_id)?;
            match classify(&query) {
                Some(target) => Ok::<_, Response>(make_texty_result(
                    format!("{} -> {}", target.kind(), target.route()),
                    &json!({
                        "kind": target.kind(),
                        "value": target.value(),
                        "route": target.route(),
                    }),
                    req_id,
                )),
                None => Err(Response::error(
                    req_id.clone(),
                    error_codes::INVALID_PARAMS,
                    "Not a valid address, tx hash, or block number".into(),
                )),
            }
        })
        .await,

        "get_blocks_page" => (async {
            let window = window_from_args(args, &state, req_id).await?;
            let page = BlockPage::from_fetches(fetch_page(api, &window).await);
            let now = Utc::now();
            let blocks: Vec<_> = page.blocks.iter().map(|b| block_summary(b, now)).collect();
            Ok::<_, Response>(make_texty_result(
                format!(
                    "{} blocks on page {} ({} unavailable)",
                    blocks.len(),
                    window.index(),
                    page.failed.len()
                ),
                &json!({ "blocks": blocks, "failed": page.failed }),
                req_id,
            ))
        })
        .await,

        "get_transactions_page" => (async {
            let window = window_from_args(args, &state, req_id).await?;
            let (txs, failed) = fetch_page_transactions(api, &window).await;
            let transactions: Vec<_> = txs.iter().map(|tx| transaction_summary(tx, None)).collect();
            Ok::<_, Response>(make_texty_result(
                format!("{} transactions on page {}", transactions.len(), window.index()),
                &json!({ "transactions": transactions, "failed": failed }),
                req_id,
            ))
        })
        .await,

        "get_latest_transactions" => (async {
            let limit = utils::get_optional_arg::<usize>(args, "limit", req_id)?
                .unwrap_or(state.config.latest_tx_limit);
            let txs = latest_transactions(api, limit, Utc::now())
                .await
                .map_err(|e| Response::from_explorer_error(req_id.clone(), &e))?;
            Ok::<_, Response>(make_texty_result(
                format!("{} latest transactions", txs.len()),
                &txs,
                req_id,
            ))
        })
        .await,

        "get_block" => (async {
            let raw = utils::get_required_arg::<Value>(args, "number", req_id)?;
            // accept both 123 and "123"
            let digits = match raw {
                Value::Number(n) => n.to_string(),
                Value::String(s) => s,
                _ => String::new(),
            };
            let height = match classify(&digits) {
                Some(target @ Target::Block(_)) => target.height(),
                _ => None,
            }
            .ok_or_else(|| {
                Response::error(
                    req_id.clone(),
                    error_codes::INVALID_PARAMS,
                    format!("Invalid block number: '{}'", digits),
                )
            })?;
            let detail = block_detail(api, height, Utc::now())
                .await
                .map_err(|e| Response::from_explorer_error(req_id.clone(), &e))?;
            Ok::<_, Response>(make_texty_result(
                format!("Block {} with {} transactions", detail.number, detail.transaction_count),
                &detail,
                req_id,
            ))
        })
        .await,

        "get_transaction" => (async {
            let hash = utils::get_required_arg::<String>(args, "hash", req_id)?;
            let parsed = match classify(&hash) {
                Some(Target::Transaction(h)) => H256::from_str(&h).ok(),
                _ => None,
            }
            .ok_or_else(|| {
                Response::error(
                    req_id.clone(),
                    error_codes::INVALID_PARAMS,
                    format!("Invalid transaction hash: '{}'", hash),
                )
            })?;
            let detail = transaction_detail(api, parsed)
                .await
                .map_err(|e| Response::from_explorer_error(req_id.clone(), &e))?;
            Ok::<_, Response>(make_texty_result(
                format!("Transaction {:?}", detail.status),
                &detail,
                req_id,
            ))
        })
        .await,

        "get_account" => (async {
            let address = utils::get_required_arg::<String>(args, "address", req_id)?;
            let (address, parsed) = match classify(&address) {
                Some(Target::Account(a)) => Address::from_str(&a).ok().map(|p| (a, p)),
                _ => None,
            }
            .ok_or_else(|| {
                Response::error(
                    req_id.clone(),
                    error_codes::INVALID_PARAMS,
                    format!("Invalid address: '{}'", address),
                )
            })?;
            let overview = account_overview(
                api,
                &address,
                parsed,
                state.config.transfer_max_count,
                state.config.account_recent_limit,
            )
            .await
            .map_err(|e| Response::from_explorer_error(req_id.clone(), &e))?;
            Ok::<_, Response>(make_texty_result(
                format!(
                    "Balance {}, {} transfers",
                    overview.balance, overview.total_transfers
                ),
                &overview,
                req_id,
            ))
        })
        .await,

        _ => Err(Response::error(
            req_id.clone(),
            error_codes::METHOD_NOT_FOUND,
            format!("Tool not found: {}", tool_name),
        )),
    };

    res.unwrap_or_else(|err_resp| err_resp)
}

/// Handles the 'initialize' request.
fn handle_initialize(req: &Request) -> Response {
    let server_info = json!({
        "name": "evm_explorer",
        "version": env!("CARGO_PKG_VERSION")
    });
    let capabilities = json!({ "tools": { "listChanged": false } });
    let instructions =
        "EVM block explorer: search, block and transaction pages, block/transaction/account details.";

    Response::success(
        req.id.clone(),
        json!({
            "serverInfo": server_info,
            "protocolVersion": "2025-06-18",
            "capabilities": capabilities,
            "instructions": instructions
        }),
    )
}

/// Handles the 'tools/list' request by returning a JSON definition of all available tools.
fn handle_tools_list(req: &Request) -> Response {
    let page_props = json!({
        "page": {"type": "integer", "minimum": 1, "description": "1-based page index (default 1)"},
        "page_size": {"type": "integer", "minimum": 1, "description": "Blocks per page"},
        "start": {"type": "integer", "minimum": 0, "description": "Height to count down from (default: chain head)"}
    });
    let tools = json!([
        {
            "name": "search",
            "description": "Classify a query as an address, transaction hash or block number.",
            "inputSchema": {
                "type": "object",
                "properties": {"query": {"type": "string"}},
                "required": ["query"]
            }
        },
        {
            "name": "get_blocks_page",
            "description": "List one page of blocks, newest first.",
            "inputSchema": {"type": "object", "properties": page_props}
        },
        {
            "name": "get_transactions_page",
            "description": "List the transactions of one page of blocks.",
            "inputSchema": {"type": "object", "properties": page_props}
        },
        {
            "name": "get_latest_transactions",
            "description": "List the transactions of the newest block.",
            "inputSchema": {
                "type": "object",
                "properties": {"limit": {"type": "integer", "minimum": 1}}
            }
        },
        {
            "name": "get_block",
            "description": "Get a block by number.",
            "inputSchema": {
                "type": "object",
                "properties": {"number": {"type": ["integer", "string"]}},
                "required": ["number"]
            }
        },
        {
            "name": "get_transaction",
            "description": "Get a transaction and its receipt by hash.",
            "inputSchema": {
                "type": "object",
                "properties": {"hash": {"type": "string", "description": "0x-prefixed 32-byte hash"}},
                "required": ["hash"]
            }
        },
        {
            "name": "get_account",
            "description": "Get the balance and recent transfers of an address.",
            "inputSchema": {
                "type": "object",
                "properties": {"address": {"type": "string", "description": "0x-prefixed 20-byte address"}},
                "required": ["address"]
            }
        }
    ]);
    Response::success(req.id.clone(), json!({ "tools": tools }))
}
