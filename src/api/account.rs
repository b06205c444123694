use std::str::FromStr;

use axum::{extract::State, Json};
use ethers::types::Address;
use tracing::error;

use crate::{
    api::extract::ApiPath,
    blockchain::{
        models::{AccountOverview, ExplorerError},
        services::{
            account::account_overview,
            search::{classify, Target},
        },
    },
    AppState,
};

/// Handler for the GET /account/{address} endpoint.
pub async fn get_account_handler(
    ApiPath(address): ApiPath<String>,
    State(state): State<AppState>,
) -> Result<Json<AccountOverview>, ExplorerError> {
    let address = match classify(&address) {
        Some(Target::Account(address)) => address,
        _ => return Err(ExplorerError::InvalidQuery),
    };
    let parsed = Address::from_str(&address).map_err(|_| ExplorerError::InvalidQuery)?;

    account_overview(
        state.chain.as_ref(),
        &address,
        parsed,
        state.config.transfer_max_count,
        state.config.account_recent_limit,
    )
    .await
    .map(Json)
    .map_err(|e| {
        error!("Failed to load account {}: {}", address, e);
        e
    })
}
