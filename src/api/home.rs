use axum::{extract::State, Json};
use tracing::debug;

use crate::{
    blockchain::models::{ExplorerError, HomeSnapshot},
    AppState,
};

/// Handler for the GET /home endpoint. Serves the feed's snapshot, loading it
/// on demand when the background refresher has not produced one yet.
pub async fn get_home_handler(
    State(state): State<AppState>,
) -> Result<Json<HomeSnapshot>, ExplorerError> {
    if let Some(snapshot) = state.home_feed.snapshot().await {
        return Ok(Json(snapshot));
    }
    debug!("Home feed empty, refreshing inline");
    let snapshot = state.home_feed.refresh(state.chain.as_ref()).await?;
    Ok(Json(snapshot))
}
