// src/blockchain/services/home.rs

use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info};

use crate::blockchain::{
    client::{ChainApi, SharedChain},
    models::{ExplorerResult, HomeSnapshot},
    services::blocks::{block_summary, fetch_page, latest_transactions, BlockPage, PageWindow},
    view_slot::ViewSlot,
};

const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Data behind the landing page: chain head, newest blocks, newest transactions.
#[derive(Clone)]
pub struct HomeFeed {
    slot: ViewSlot<HomeSnapshot>,
    page_size: u64,
    tx_limit: usize,
}

impl HomeFeed {
    pub fn new(page_size: u64, tx_limit: usize) -> Self {
        Self {
            slot: ViewSlot::new(),
            page_size,
            tx_limit,
        }
    }

    pub async fn snapshot(&self) -> Option<HomeSnapshot> {
        self.slot.current().await
    }

    /// Fetches a fresh snapshot and stores it unless a newer refresh got there first.
    pub async fn refresh(&self, api: &dyn ChainApi) -> ExplorerResult<HomeSnapshot> {
        let generation = self.slot.issue();
        let now = Utc::now();

        let head = api.block_number().await?;
        let window = PageWindow::new(head, 1, self.page_size)?;
        let (fetches, latest) = tokio::join!(
            fetch_page(api, &window),
            latest_transactions(api, self.tx_limit, now)
        );
        let page = BlockPage::from_fetches(fetches);

        let snapshot = HomeSnapshot {
            head,
            blocks: page.blocks.iter().map(|b| block_summary(b, now)).collect(),
            latest_transactions: latest?,
            refreshed_at: now,
        };

        if !self.slot.commit(generation, snapshot.clone()).await {
            debug!("Discarding superseded home refresh {:?}", generation);
        }
        Ok(snapshot)
    }

    /// Refreshes every `interval`, at most once a second. Each tick runs in
    /// its own task so a slow refresh does not delay the next one.
    pub fn spawn_refresher(&self, api: SharedChain, interval: Duration) -> tokio::task::JoinHandle<()> {
        let interval = interval.max(MIN_REFRESH_INTERVAL);
        let feed = self.clone();
        info!("Refreshing home feed every {:?}", interval);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let feed = feed.clone();
                let api = api.clone();
                tokio::spawn(async move {
                    if let Err(e) = feed.refresh(api.as_ref()).await {
                        error!("Home feed refresh failed: {}", e);
                    }
                });
            }
        })
    }
}
