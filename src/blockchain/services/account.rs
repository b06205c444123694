// src/blockchain/services/account.rs

use ethers::types::Address;
use tracing::info;

use crate::blockchain::{
    client::ChainApi,
    models::{
        AccountOverview, AssetTransfer, ExplorerResult, TransferCategory, TransferDirection,
        TransferQuery, TransferRow,
    },
};
use crate::utils::{format_ether, format_units_fixed, short_address, short_hash};

/// Combined, newest-first transfer history of one account.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferAggregate {
    /// The newest transfers, at most the display limit.
    pub recent: Vec<AssetTransfer>,
    /// Number of transfers across both directions before truncation.
    pub total: usize,
    /// Block of the newest transfer.
    pub last_activity_block: Option<u64>,
}

/// Merges outgoing and incoming transfers, newest block first.
///
/// The sort is stable, so transfers in the same block keep concatenation
/// order: outgoing before incoming.
pub fn aggregate_transfers(
    outgoing: Vec<AssetTransfer>,
    incoming: Vec<AssetTransfer>,
    display_limit: usize,
) -> TransferAggregate {
    let mut all: Vec<AssetTransfer> = outgoing.into_iter().chain(incoming).collect();
    all.sort_by(|a, b| b.block_number().cmp(&a.block_number()));

    let total = all.len();
    let last_activity_block = all.first().map(AssetTransfer::block_number);
    all.truncate(display_limit);

    TransferAggregate {
        recent: all,
        total,
        last_activity_block,
    }
}

/// Display amount of a transfer with its unit.
pub fn format_transfer_value(transfer: &AssetTransfer) -> String {
    let raw = transfer.raw_value();
    if transfer.category == TransferCategory::Erc20 {
        if let Some(decimals) = transfer.decimals() {
            let asset = transfer.asset.as_deref().unwrap_or("Tokens");
            return format!("{} {}", format_units_fixed(raw, decimals, 4), asset);
        }
    }
    let decimals = transfer
        .decimals()
        .unwrap_or(if transfer.category.is_native() { 18 } else { 0 });
    let asset = transfer.asset.as_deref().unwrap_or("ETH");
    format!("{} {}", format_units_fixed(raw, decimals, 4), asset)
}

pub fn transfer_direction(transfer: &AssetTransfer, account: &str) -> TransferDirection {
    match transfer.to.as_deref() {
        Some(to) if to.eq_ignore_ascii_case(account) => TransferDirection::Received,
        _ => TransferDirection::Sent,
    }
}

fn transfer_row(transfer: &AssetTransfer, account: &str) -> TransferRow {
    TransferRow {
        hash: transfer.hash.clone(),
        hash_short: short_address(&transfer.hash),
        block_number: transfer.block_number(),
        from_short: short_address(&transfer.from),
        to_short: short_address(transfer.to.as_deref().unwrap_or("Unknown")),
        direction: transfer_direction(transfer, account),
        category: transfer.category.label().to_string(),
        value: format_transfer_value(transfer),
    }
}

/// Balance and transfer history of an account.
///
/// The balance and both transfer queries run concurrently; if any of them
/// fails the whole overview fails.
pub async fn account_overview(
    api: &dyn ChainApi,
    address: &str,
    parsed: Address,
    max_count: u64,
    display_limit: usize,
) -> ExplorerResult<AccountOverview> {
    let outgoing_query = TransferQuery::outgoing(address, max_count);
    let incoming_query = TransferQuery::incoming(address, max_count);

    let (balance, outgoing, incoming) = tokio::try_join!(
        api.balance(parsed),
        api.asset_transfers(&outgoing_query),
        api.asset_transfers(&incoming_query),
    )?;
    info!(
        "Account {}: {} outgoing, {} incoming transfers",
        short_hash(address),
        outgoing.len(),
        incoming.len()
    );

    let aggregate = aggregate_transfers(outgoing, incoming, display_limit);
    Ok(AccountOverview {
        address: address.to_string(),
        balance_wei: balance.to_string(),
        balance: format!("{} ETH", format_ether(balance, 4)),
        total_transfers: aggregate.total,
        last_activity_block: aggregate.last_activity_block,
        transfers: aggregate
            .recent
            .iter()
            .map(|t| transfer_row(t, address))
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::memory::InMemoryChain;
    use crate::blockchain::models::{ExplorerError, RawContract};
    use ethers::types::U256;
    use std::str::FromStr;

    const ME: &str = "0x742d35Cc6634C0532925a3b844Bc454e4438f44e";
    const OTHER: &str = "0x1111111111111111111111111111111111111111";

    fn transfer(hash: &str, block: u64, from: &str, to: &str) -> AssetTransfer {
        AssetTransfer {
            block_num: Some(format!("{:#x}", block)),
            hash: hash.to_string(),
            from: from.to_string(),
            to: Some(to.to_string()),
            category: TransferCategory::External,
            asset: Some("ETH".to_string()),
            raw_contract: RawContract {
                value: Some("0x14d1120d7b160000".to_string()),
                address: None,
                decimal: Some("0x12".to_string()),
            },
        }
    }

    #[test]
    fn test_merge_sorts_descending_and_keeps_tie_order() {
        let outgoing = vec![transfer("out5", 5, ME, OTHER), transfer("out3", 3, ME, OTHER)];
        let incoming = vec![transfer("in4", 4, OTHER, ME), transfer("in3", 3, OTHER, ME)];

        let agg = aggregate_transfers(outgoing, incoming, 20);
        let order: Vec<(&str, u64)> = agg
            .recent
            .iter()
            .map(|t| (t.hash.as_str(), t.block_number()))
            .collect();

        assert_eq!(order, vec![("out5", 5), ("in4", 4), ("out3", 3), ("in3", 3)]);
        assert_eq!(agg.total, 4);
        assert_eq!(agg.last_activity_block, Some(5));
    }

    #[test]
    fn test_truncates_but_reports_full_total() {
        let outgoing: Vec<_> = (0..15)
            .map(|i| transfer(&format!("o{}", i), i, ME, OTHER))
            .collect();
        let incoming: Vec<_> = (0..15)
            .map(|i| transfer(&format!("i{}", i), i, OTHER, ME))
            .collect();

        let agg = aggregate_transfers(outgoing, incoming, 20);
        assert_eq!(agg.recent.len(), 20);
        assert_eq!(agg.total, 30);
        assert_eq!(agg.recent[0].block_number(), 14);
    }

    #[test]
    fn test_empty_history() {
        let agg = aggregate_transfers(vec![], vec![], 20);
        assert!(agg.recent.is_empty());
        assert_eq!(agg.total, 0);
        assert_eq!(agg.last_activity_block, None);
    }

    #[test]
    fn test_format_transfer_values() {
        let mut usdc = transfer("t", 1, ME, OTHER);
        usdc.category = TransferCategory::Erc20;
        usdc.asset = Some("USDC".to_string());
        usdc.raw_contract = RawContract {
            value: Some(format!("{:#x}", 1_000_000u64)),
            address: Some(OTHER.to_string()),
            decimal: Some("0x6".to_string()),
        };
        assert_eq!(format_transfer_value(&usdc), "1.0000 USDC");

        usdc.asset = None;
        assert_eq!(format_transfer_value(&usdc), "1.0000 Tokens");

        let native = transfer("n", 1, ME, OTHER);
        assert_eq!(format_transfer_value(&native), "1.5000 ETH");

        let mut no_decimal = transfer("n", 1, ME, OTHER);
        no_decimal.raw_contract.decimal = None;
        no_decimal.asset = None;
        assert_eq!(format_transfer_value(&no_decimal), "1.5000 ETH");

        let mut nft = transfer("n", 1, ME, OTHER);
        nft.category = TransferCategory::Erc721;
        nft.asset = Some("PUNK".to_string());
        nft.raw_contract = RawContract::default();
        assert_eq!(format_transfer_value(&nft), "0.0000 PUNK");
    }

    #[test]
    fn test_direction_is_case_insensitive() {
        let incoming = transfer("t", 1, OTHER, &ME.to_lowercase());
        assert_eq!(transfer_direction(&incoming, ME), TransferDirection::Received);
        let outgoing = transfer("t", 1, ME, OTHER);
        assert_eq!(transfer_direction(&outgoing, ME), TransferDirection::Sent);
    }

    #[tokio::test]
    async fn test_account_overview() {
        let chain = InMemoryChain::new();
        let parsed = Address::from_str(ME).unwrap();
        chain.set_balance(parsed, U256::from(2_500_000_000_000_000_000u64));
        chain.push_transfer(transfer("out5", 5, ME, OTHER));
        chain.push_transfer(transfer("in4", 4, OTHER, ME));

        let overview = account_overview(&chain, ME, parsed, 1000, 20).await.unwrap();
        assert_eq!(overview.balance, "2.5000 ETH");
        assert_eq!(overview.total_transfers, 2);
        assert_eq!(overview.last_activity_block, Some(5));
        assert_eq!(overview.transfers[0].direction, TransferDirection::Sent);
        assert_eq!(overview.transfers[1].direction, TransferDirection::Received);
        assert_eq!(overview.transfers[1].value, "1.5000 ETH");
    }

    #[tokio::test]
    async fn test_account_overview_fails_as_a_whole() {
        let chain = InMemoryChain::new();
        let parsed = Address::from_str(ME).unwrap();
        chain.push_transfer(transfer("out5", 5, ME, OTHER));
        chain.fail_transfers(true);

        let result = account_overview(&chain, ME, parsed, 1000, 20).await;
        assert!(matches!(result, Err(ExplorerError::Rpc { .. })));
    }
}
