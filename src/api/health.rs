use axum::{extract::State, response::IntoResponse, Json};

use crate::AppState;

pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let home_ready = state.home_feed.snapshot().await.is_some();
    Json(serde_json::json!({
        "status": "ok",
        "rpc_host": state.config.rpc_url.host_str(),
        "home_ready": home_ready,
    }))
}
