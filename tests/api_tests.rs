//! Tests for the explorer HTTP endpoints, served over an in-memory chain

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use ethers::types::{Address, Block, Transaction, TransactionReceipt, H256, U256, U64};
use serde_json::{json, Value};
use std::str::FromStr;
use tower::ServiceExt;

use evm_explorer::{
    api::create_api_router,
    blockchain::{
        memory::InMemoryChain,
        models::{AssetTransfer, RawContract, TransferCategory},
    },
    config::Config,
    AppState,
};

const ACCOUNT: &str = "0x742d35Cc6634C0532925a3b844Bc454e4438f44e";
const COUNTERPARTY: &str = "0x1111111111111111111111111111111111111111";

fn tx(hash: u64, block: u64, value: u64) -> Transaction {
    Transaction {
        hash: H256::from_low_u64_be(hash),
        block_number: Some(U64::from(block)),
        from: Address::from_low_u64_be(0xaa),
        to: Some(Address::from_low_u64_be(0xbb)),
        value: U256::from(value),
        gas: U256::from(21_000u64),
        gas_price: Some(U256::from(1_000_000_000u64)),
        ..Default::default()
    }
}

fn transfer(hash: &str, block: u64, from: &str, to: &str) -> AssetTransfer {
    AssetTransfer {
        block_num: Some(format!("{:#x}", block)),
        hash: hash.to_string(),
        from: from.to_string(),
        to: Some(to.to_string()),
        category: TransferCategory::External,
        asset: Some("ETH".to_string()),
        raw_contract: RawContract {
            value: Some("0xde0b6b3a7640000".to_string()),
            address: None,
            decimal: Some("0x12".to_string()),
        },
    }
}

/// Chain with blocks 0..=20; block 20 carries two transactions.
fn seeded_chain() -> InMemoryChain {
    let chain = InMemoryChain::new();
    for n in 0..=20u64 {
        let transactions = if n == 20 {
            vec![tx(0xabc, 20, 2_000_000_000_000_000_000), tx(0xabd, 20, 0)]
        } else {
            vec![]
        };
        chain.insert_block(Block {
            number: Some(U64::from(n)),
            hash: Some(H256::from_low_u64_be(0x1000 + n)),
            timestamp: U256::from(1_700_000_000u64 + n * 12),
            gas_used: U256::from(15_000_000u64),
            gas_limit: U256::from(30_000_000u64),
            transactions,
            ..Default::default()
        });
    }
    chain.insert_receipt(TransactionReceipt {
        transaction_hash: H256::from_low_u64_be(0xabc),
        status: Some(U64::from(1)),
        gas_used: Some(U256::from(21_000u64)),
        ..Default::default()
    });
    chain
}

fn create_test_app(chain: InMemoryChain) -> Router {
    let state = AppState::with_chain(Config::default(), chain);
    Router::new()
        .nest("/api", create_api_router())
        .with_state(state)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get(create_test_app(seeded_chain()), "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["home_ready"], false);
}

#[tokio::test]
async fn test_search_routes_each_kind() {
    let tx_hash = format!("{:#x}", H256::from_low_u64_be(0xabc));
    for (query, kind, route) in [
        (ACCOUNT.to_string(), "account", format!("/account/{}", ACCOUNT)),
        (tx_hash.clone(), "transaction", format!("/transaction/{}", tx_hash)),
        ("17".to_string(), "block", "/block/17".to_string()),
    ] {
        let uri = format!("/api/search?q={}", query);
        let (status, body) = get(create_test_app(seeded_chain()), &uri).await;
        assert_eq!(status, StatusCode::OK, "query {}", query);
        assert_eq!(body["kind"], kind);
        assert_eq!(body["route"], route);
    }
}

#[tokio::test]
async fn test_search_rejects_garbage() {
    let (status, body) = get(create_test_app(seeded_chain()), "/api/search?q=hello").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Not a valid address, tx hash, or block number");

    let (status, _) = get(create_test_app(seeded_chain()), "/api/search?q=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_blocks_page_keeps_going_past_failed_height() {
    let chain = seeded_chain();
    chain.fail_height(18);
    let (status, body) = get(
        create_test_app(chain),
        "/api/blocks?page=1&page_size=4",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["start"], 20);
    assert_eq!(body["heights"], json!([20, 19, 18, 17]));
    let numbers: Vec<u64> = body["blocks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["number"].as_u64().unwrap())
        .collect();
    assert_eq!(numbers, vec![20, 19, 17]);
    assert_eq!(body["failed"][0]["height"], 18);
    assert_eq!(body["blocks"][0]["gas_usage"], "50.00%");
}

#[tokio::test]
async fn test_blocks_page_clips_at_genesis() {
    let (status, body) = get(
        create_test_app(seeded_chain()),
        "/api/blocks?start=20&page=3&page_size=8",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["heights"], json!([4, 3, 2, 1, 0]));
}

#[tokio::test]
async fn test_blocks_page_rejects_bad_paging() {
    for uri in [
        "/api/blocks?page=0",
        "/api/blocks?page_size=0",
        "/api/blocks?page_size=1000",
    ] {
        let (status, _) = get(create_test_app(seeded_chain()), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri {}", uri);
    }
}

#[tokio::test]
async fn test_malformed_query_gets_json_error() {
    for uri in [
        "/api/blocks?page=abc",
        "/api/transactions?start=-1",
        "/api/transactions/latest?limit=many",
    ] {
        let (status, body) = get(create_test_app(seeded_chain()), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri {}", uri);
        assert!(body["error"].is_string(), "uri {}", uri);
    }
}

#[tokio::test]
async fn test_malformed_rpc_body_gets_json_error() {
    let response = create_test_app(seeded_chain())
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/rpc")
                .header("Content-Type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("invalid request"));
}

#[tokio::test]
async fn test_page_transactions() {
    let (status, body) = get(
        create_test_app(seeded_chain()),
        "/api/transactions?page_size=2",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let txs = body["transactions"].as_array().unwrap();
    assert_eq!(txs.len(), 2);
    assert_eq!(txs[0]["kind"], "Transfer");
    assert_eq!(txs[0]["value"], "2.000000 ETH");
    assert_eq!(txs[1]["kind"], "Contract Call");
    assert_eq!(txs[1]["value"], "0 ETH");
}

#[tokio::test]
async fn test_latest_transactions_limit() {
    let (status, body) = get(
        create_test_app(seeded_chain()),
        "/api/transactions/latest?limit=1",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_block_detail_and_not_found() {
    let (status, body) = get(create_test_app(seeded_chain()), "/api/block/20").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["number"], 20);
    assert_eq!(body["transaction_count"], 2);
    assert_eq!(body["base_fee"], "N/A");

    let (status, body) = get(create_test_app(seeded_chain()), "/api/block/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("999"));

    let huge = format!("/api/block/{}", "9".repeat(30));
    let (status, _) = get(create_test_app(seeded_chain()), &huge).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(create_test_app(seeded_chain()), "/api/block/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upstream_failure_is_bad_gateway() {
    let chain = seeded_chain();
    chain.fail_height(5);
    let (status, body) = get(create_test_app(chain), "/api/block/5").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_transaction_detail() {
    let hash = format!("{:#x}", H256::from_low_u64_be(0xabc));
    let (status, body) = get(
        create_test_app(seeded_chain()),
        &format!("/api/transaction/{}", hash),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Success");
    assert_eq!(body["block_number"], 20);

    // no receipt yet
    let pending = format!("{:#x}", H256::from_low_u64_be(0xabd));
    let (_, body) = get(
        create_test_app(seeded_chain()),
        &format!("/api/transaction/{}", pending),
    )
    .await;
    assert_eq!(body["status"], "Pending");

    let missing = format!("{:#x}", H256::from_low_u64_be(0xfff));
    let (status, _) = get(
        create_test_app(seeded_chain()),
        &format!("/api/transaction/{}", missing),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_account_overview() {
    let chain = seeded_chain();
    chain.set_balance(
        Address::from_str(ACCOUNT).unwrap(),
        U256::from(2_500_000_000_000_000_000u64),
    );
    chain.push_transfer(transfer("0x01", 5, ACCOUNT, COUNTERPARTY));
    chain.push_transfer(transfer("0x02", 9, COUNTERPARTY, ACCOUNT));
    chain.push_transfer(transfer("0x03", 7, COUNTERPARTY, COUNTERPARTY));

    let (status, body) = get(create_test_app(chain), &format!("/api/account/{}", ACCOUNT)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["address"], ACCOUNT);
    assert_eq!(body["balance_wei"], "2500000000000000000");
    assert_eq!(body["balance"], "2.5000 ETH");
    assert_eq!(body["total_transfers"], 2);
    assert_eq!(body["last_activity_block"], 9);
    assert_eq!(body["transfers"][0]["hash"], "0x02");
    assert_eq!(body["transfers"][0]["direction"], "Received");
    assert_eq!(body["transfers"][1]["direction"], "Sent");
}

#[tokio::test]
async fn test_account_fails_whole_view_when_transfers_fail() {
    let chain = seeded_chain();
    chain.fail_transfers(true);
    let (status, _) = get(create_test_app(chain), &format!("/api/account/{}", ACCOUNT)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let (status, _) = get(create_test_app(seeded_chain()), "/api/account/0x1234").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_home_loads_on_first_request() {
    let (status, body) = get(create_test_app(seeded_chain()), "/api/home").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["head"], 20);
    assert_eq!(body["blocks"].as_array().unwrap().len(), 10);
    assert_eq!(body["latest_transactions"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_rpc_tool_call() {
    let app = create_test_app(seeded_chain());
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/rpc")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    serde_json::to_vec(&json!({
                        "jsonrpc": "2.0",
                        "id": 7,
                        "method": "tools/call",
                        "params": {"name": "get_block", "arguments": {"number": "20"}}
                    }))
                    .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["id"], 7);
    assert_eq!(body["result"]["data"]["number"], 20);
    assert_eq!(body["result"]["content"][0]["type"], "text");
}
