// src/main.rs

use evm_explorer::{
    api::create_api_router,
    blockchain::{client::create_http_client, EvmClient},
    config::Config,
    mcp::stdio,
    AppState,
};
use axum::Router;
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// --- HTTP Server Logic ---
async fn run_http_server(state: AppState) {
    let app = Router::new()
        .nest("/api", create_api_router())
        .with_state(state.clone())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([127, 0, 0, 1], state.config.port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("❌ Failed to bind {}: {}", addr, e);
            return;
        }
    };
    info!("🚀 HTTP Server listening on {}", addr);
    if let Err(e) = axum::serve(listener, app.into_make_service()).await {
        error!("HTTP server stopped: {}", e);
    }
}

// --- Stdio Tool Server Logic ---
async fn run_mcp_server(state: AppState) {
    info!("🚀 Starting tool server on stdin/stdout...");
    let stdin = io::BufReader::new(io::stdin());
    if let Err(e) = stdio::serve(stdin, io::stdout(), state).await {
        error!("Tool server stopped: {}", e);
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "evm_explorer=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("❌ Failed to load configuration: {:#}", e);
            return;
        }
    };

    let http = match create_http_client(config.rpc_timeout) {
        Ok(http) => http,
        Err(e) => {
            error!("❌ Failed to initialize HTTP client: {:#}", e);
            return;
        }
    };
    let client = EvmClient::new(http, config.rpc_url.clone());
    info!(
        "Using node API at {}",
        client.rpc_url().host_str().unwrap_or("<unknown host>")
    );

    let refresh = config.home_refresh;
    let app_state = AppState::new(config, Arc::new(client));
    app_state
        .home_feed
        .spawn_refresher(app_state.chain.clone(), refresh);

    // Check if running in tool mode (stdin/stdout) or HTTP server mode
    let args: Vec<String> = env::args().collect();
    if args.contains(&"--mcp".to_string()) || env::var("MCP_MODE").is_ok() {
        run_mcp_server(app_state).await;
    } else {
        run_http_server(app_state).await;
    }
}
