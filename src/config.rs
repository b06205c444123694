// src/config.rs

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use url::Url;

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

// A struct to hold all configuration, loaded once at startup from the .env file.
#[derive(Clone, Debug)]
pub struct Config {
    // Server settings
    pub port: u16,

    /// JSON-RPC endpoint of the node API. Either set directly with `RPC_URL`
    /// or derived from `ALCHEMY_API_KEY` and `ALCHEMY_NETWORK`.
    pub rpc_url: Url,
    pub rpc_timeout: Duration,

    // Paging
    pub page_size: u64,
    pub max_page_size: u64,

    // Account view
    pub transfer_max_count: u64,
    pub account_recent_limit: usize,

    // Home view
    pub latest_tx_limit: usize,
    pub home_refresh: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rpc_url: Url::parse(DEFAULT_RPC_URL).expect("default RPC URL is valid"),
            rpc_timeout: Duration::from_secs(15),
            page_size: 10,
            max_page_size: 100,
            transfer_max_count: 1000,
            account_recent_limit: 20,
            latest_tx_limit: 10,
            home_refresh: Duration::from_secs(12),
        }
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number", name)),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load variables from the .env file into the environment
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        let rpc_url = match (env::var("RPC_URL"), env::var("ALCHEMY_API_KEY")) {
            (Ok(url), _) => Url::parse(&url).context("RPC_URL must be a valid URL")?,
            (Err(_), Ok(key)) => {
                let network =
                    env::var("ALCHEMY_NETWORK").unwrap_or_else(|_| "eth-mainnet".to_string());
                Url::parse(&format!("https://{}.g.alchemy.com/v2/{}", network, key))
                    .context("ALCHEMY_NETWORK produced an invalid URL")?
            }
            (Err(_), Err(_)) => bail!("Either RPC_URL or ALCHEMY_API_KEY must be set"),
        };

        let config = Config {
            port: parse_var("PORT", defaults.port)?,
            rpc_url,
            rpc_timeout: Duration::from_secs(parse_var("RPC_TIMEOUT_SECS", 15u64)?),
            page_size: parse_var("PAGE_SIZE", defaults.page_size)?,
            max_page_size: parse_var("MAX_PAGE_SIZE", defaults.max_page_size)?,
            transfer_max_count: parse_var("TRANSFER_MAX_COUNT", defaults.transfer_max_count)?,
            account_recent_limit: parse_var("ACCOUNT_RECENT_LIMIT", defaults.account_recent_limit)?,
            latest_tx_limit: parse_var("LATEST_TX_LIMIT", defaults.latest_tx_limit)?,
            home_refresh: Duration::from_secs(parse_var("HOME_REFRESH_SECS", 12u64)?),
        };

        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the server cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 || self.page_size > self.max_page_size {
            bail!(
                "PAGE_SIZE must be between 1 and MAX_PAGE_SIZE ({})",
                self.max_page_size
            );
        }
        if self.home_refresh.is_zero() {
            bail!("HOME_REFRESH_SECS must be at least 1");
        }
        if self.rpc_timeout.is_zero() {
            bail!("RPC_TIMEOUT_SECS must be at least 1");
        }
        Ok(())
    }
}
