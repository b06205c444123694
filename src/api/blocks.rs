use axum::{
    extract::State,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use crate::{
    api::extract::{ApiPath, ApiQuery},
    blockchain::{
        models::{
            BlockDetail, BlockPageResponse, ExplorerError, TransactionPageResponse,
            TransactionSummary,
        },
        services::{
            blocks::{
                block_detail, block_summary, fetch_page, fetch_page_transactions,
                latest_transactions, transaction_summary, BlockPage, PageWindow,
            },
            search::{classify, Target},
        },
    },
    AppState,
};

// --- Request Models ---

/// Query parameters shared by the paged list endpoints.
/// `start` defaults to the current chain head.
#[derive(Debug, Deserialize, Validate)]
pub struct PageQuery {
    #[validate(range(min = 1))]
    pub page: Option<u64>,
    #[validate(range(min = 1))]
    pub page_size: Option<u64>,
    pub start: Option<u64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LatestQuery {
    #[validate(range(min = 1, max = 1000))]
    pub limit: Option<usize>,
}

async fn resolve_window(state: &AppState, query: &PageQuery) -> Result<PageWindow, ExplorerError> {
    query
        .validate()
        .map_err(|e| ExplorerError::InvalidPage(e.to_string()))?;
    let page_size = query.page_size.unwrap_or(state.config.page_size);
    if page_size > state.config.max_page_size {
        return Err(ExplorerError::InvalidPage(format!(
            "page_size must be at most {}",
            state.config.max_page_size
        )));
    }
    let start = match query.start {
        Some(start) => start,
        None => state.chain.block_number().await?,
    };
    PageWindow::new(start, query.page.unwrap_or(1), page_size)
}

// --- Handlers ---

/// Handler for the GET /blocks endpoint.
pub async fn get_blocks_handler(
    ApiQuery(query): ApiQuery<PageQuery>,
    State(state): State<AppState>,
) -> Result<Json<BlockPageResponse>, ExplorerError> {
    let window = resolve_window(&state, &query).await?;
    let page = BlockPage::from_fetches(fetch_page(state.chain.as_ref(), &window).await);
    info!(
        "Block page {} from {}: {} blocks, {} failed",
        window.index(),
        window.start(),
        page.blocks.len(),
        page.failed.len()
    );

    let now = Utc::now();
    Ok(Json(BlockPageResponse {
        start: window.start(),
        page: window.index(),
        page_size: window.size(),
        heights: window.heights(),
        blocks: page.blocks.iter().map(|b| block_summary(b, now)).collect(),
        failed: page.failed,
    }))
}

/// Handler for the GET /transactions endpoint.
pub async fn get_page_transactions_handler(
    ApiQuery(query): ApiQuery<PageQuery>,
    State(state): State<AppState>,
) -> Result<Json<TransactionPageResponse>, ExplorerError> {
    let window = resolve_window(&state, &query).await?;
    let (transactions, failed) = fetch_page_transactions(state.chain.as_ref(), &window).await;

    Ok(Json(TransactionPageResponse {
        start: window.start(),
        page: window.index(),
        page_size: window.size(),
        transactions: transactions
            .iter()
            .map(|tx| transaction_summary(tx, None))
            .collect(),
        failed,
    }))
}

/// Handler for the GET /transactions/latest endpoint.
pub async fn get_latest_transactions_handler(
    ApiQuery(query): ApiQuery<LatestQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<TransactionSummary>>, ExplorerError> {
    query
        .validate()
        .map_err(|e| ExplorerError::InvalidPage(e.to_string()))?;
    let limit = query.limit.unwrap_or(state.config.latest_tx_limit);
    let txs = latest_transactions(state.chain.as_ref(), limit, Utc::now()).await?;
    Ok(Json(txs))
}

/// Handler for the GET /block/{number} endpoint.
pub async fn get_block_handler(
    ApiPath(number): ApiPath<String>,
    State(state): State<AppState>,
) -> Result<Json<BlockDetail>, ExplorerError> {
    let target = match classify(&number) {
        Some(target @ Target::Block(_)) => target,
        _ => return Err(ExplorerError::InvalidQuery),
    };
    // digits beyond u64 cannot name an existing block
    let height = target
        .height()
        .ok_or_else(|| ExplorerError::NotFound(format!("block {}", number)))?;
    let detail = block_detail(state.chain.as_ref(), height, Utc::now()).await?;
    Ok(Json(detail))
}
