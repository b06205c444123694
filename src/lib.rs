// src/lib.rs

use std::sync::Arc;

// Re-export commonly used types
pub use ethers::types::{Address, H256, U256, U64};

// Re-export modules
pub mod api;
pub mod blockchain;
pub mod config;
pub mod mcp;
pub mod utils;

use blockchain::{services::home::HomeFeed, SharedChain};

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: config::Config,
    /// Node API every view reads from
    pub chain: SharedChain,
    /// Periodically refreshed landing-page data
    pub home_feed: HomeFeed,
}

impl AppState {
    pub fn new(config: config::Config, chain: SharedChain) -> Self {
        let home_feed = HomeFeed::new(config.page_size, config.latest_tx_limit);
        Self {
            config,
            chain,
            home_feed,
        }
    }

    /// State over any [`blockchain::ChainApi`] implementation.
    pub fn with_chain<C: blockchain::ChainApi + 'static>(config: config::Config, chain: C) -> Self {
        Self::new(config, Arc::new(chain))
    }
}
