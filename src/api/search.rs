use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    api::extract::ApiQuery,
    blockchain::{models::ExplorerError, services::search::classify},
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

// Defines the structure for the JSON output returned by the search endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchOutput {
    pub kind: String,
    pub value: String,
    pub route: String,
}

/// Handler for the GET /search?q= endpoint.
pub async fn search_handler(
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<Json<SearchOutput>, ExplorerError> {
    let target = classify(&query.q).ok_or(ExplorerError::InvalidQuery)?;
    info!("Search '{}' resolved to {}", query.q.trim(), target.kind());
    Ok(Json(SearchOutput {
        kind: target.kind().to_string(),
        value: target.value().to_string(),
        route: target.route(),
    }))
}
