use std::str::FromStr;

use axum::{extract::State, Json};
use ethers::types::H256;

use crate::{
    api::extract::ApiPath,
    blockchain::{
        models::{ExplorerError, TransactionDetail},
        services::{
            search::{classify, Target},
            transactions::transaction_detail,
        },
    },
    AppState,
};

/// Handler for the GET /transaction/{hash} endpoint.
pub async fn get_transaction_handler(
    ApiPath(hash): ApiPath<String>,
    State(state): State<AppState>,
) -> Result<Json<TransactionDetail>, ExplorerError> {
    let hash = match classify(&hash) {
        Some(Target::Transaction(hash)) => hash,
        _ => return Err(ExplorerError::InvalidQuery),
    };
    let parsed = H256::from_str(&hash).map_err(|_| ExplorerError::InvalidQuery)?;
    Ok(Json(transaction_detail(state.chain.as_ref(), parsed).await?))
}
