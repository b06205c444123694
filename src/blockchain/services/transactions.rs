// src/blockchain/services/transactions.rs

use ethers::types::{Transaction, TransactionReceipt, H256, U256};

use crate::blockchain::{
    client::ChainApi,
    models::{ExplorerError, ExplorerResult, TransactionDetail, TransactionStatus},
    services::blocks::hex_string,
};
use crate::utils::format_ether;

fn status_of(receipt: Option<&TransactionReceipt>) -> TransactionStatus {
    match receipt.and_then(|r| r.status) {
        Some(status) if status.as_u64() == 1 => TransactionStatus::Success,
        Some(_) => TransactionStatus::Failed,
        None if receipt.is_some() => TransactionStatus::Success,
        None => TransactionStatus::Pending,
    }
}

/// Fee paid: gas used times the effective price, or the transaction's own price for legacy receipts.
fn fee_paid(tx: &Transaction, receipt: &TransactionReceipt) -> Option<U256> {
    let gas_used = receipt.gas_used?;
    let price = receipt.effective_gas_price.or(tx.gas_price)?;
    gas_used.checked_mul(price)
}

pub fn build_detail(tx: Transaction, receipt: Option<TransactionReceipt>) -> TransactionDetail {
    let status = status_of(receipt.as_ref());
    let gas_used = receipt
        .as_ref()
        .and_then(|r| r.gas_used)
        .map(|g| g.to_string())
        .unwrap_or_else(|| "N/A".to_string());
    let fee = receipt
        .as_ref()
        .and_then(|r| fee_paid(&tx, r))
        .map(|f| format!("{} ETH", format_ether(f, 9)))
        .unwrap_or_else(|| "N/A".to_string());

    TransactionDetail {
        hash: hex_string(&tx.hash),
        status,
        block_number: tx.block_number.map(|n| n.as_u64()),
        block_hash: tx.block_hash.as_ref().map(hex_string),
        from: hex_string(&tx.from),
        to: tx.to.as_ref().map(hex_string),
        contract_address: receipt
            .as_ref()
            .and_then(|r| r.contract_address.as_ref())
            .map(hex_string),
        value: format!("{} ETH", format_ether(tx.value, 4)),
        gas_price: tx
            .gas_price
            .map(|p| format!("{} ETH", format_ether(p, 9)))
            .unwrap_or_else(|| "N/A".to_string()),
        gas_limit: tx.gas.to_string(),
        gas_used,
        fee,
        nonce: tx.nonce.to_string(),
        transaction_index: tx.transaction_index.map(|i| i.as_u64()),
        input_size: tx.input.len(),
    }
}

/// Transaction and receipt, fetched together.
pub async fn transaction_detail(api: &dyn ChainApi, hash: H256) -> ExplorerResult<TransactionDetail> {
    let (tx, receipt) = tokio::try_join!(api.transaction(hash), api.transaction_receipt(hash))?;
    let tx = tx.ok_or_else(|| ExplorerError::NotFound(format!("transaction {:#x}", hash)))?;
    Ok(build_detail(tx, receipt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::memory::InMemoryChain;
    use ethers::types::{Address, Block, U64};

    fn sample_tx() -> Transaction {
        Transaction {
            hash: H256::from_low_u64_be(0xabc),
            block_number: Some(U64::from(12)),
            from: Address::from_low_u64_be(1),
            to: Some(Address::from_low_u64_be(2)),
            value: U256::from(1_500_000_000_000_000_000u64),
            gas_price: Some(U256::from(20_000_000_000u64)),
            gas: U256::from(21_000u64),
            ..Default::default()
        }
    }

    fn receipt(status: Option<u64>) -> TransactionReceipt {
        TransactionReceipt {
            transaction_hash: H256::from_low_u64_be(0xabc),
            status: status.map(U64::from),
            gas_used: Some(U256::from(21_000u64)),
            effective_gas_price: Some(U256::from(10_000_000_000u64)),
            ..Default::default()
        }
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_of(Some(&receipt(Some(1)))), TransactionStatus::Success);
        assert_eq!(status_of(Some(&receipt(Some(0)))), TransactionStatus::Failed);
        assert_eq!(status_of(None), TransactionStatus::Pending);
    }

    #[test]
    fn test_detail_values() {
        let detail = build_detail(sample_tx(), Some(receipt(Some(1))));
        assert_eq!(detail.value, "1.5000 ETH");
        assert_eq!(detail.gas_price, "0.000000020 ETH");
        // 21000 * 10 gwei
        assert_eq!(detail.fee, "0.000210000 ETH");
        assert_eq!(detail.gas_used, "21000");
        assert_eq!(detail.block_number, Some(12));
    }

    #[test]
    fn test_fee_falls_back_to_tx_gas_price() {
        let mut legacy = receipt(Some(1));
        legacy.effective_gas_price = None;
        let detail = build_detail(sample_tx(), Some(legacy));
        assert_eq!(detail.fee, "0.000420000 ETH");
    }

    #[tokio::test]
    async fn test_transaction_detail_lookup() {
        let chain = InMemoryChain::new();
        chain.insert_block(Block {
            number: Some(U64::from(12)),
            transactions: vec![sample_tx()],
            ..Default::default()
        });
        chain.insert_receipt(receipt(Some(0)));

        let detail = transaction_detail(&chain, H256::from_low_u64_be(0xabc))
            .await
            .unwrap();
        assert_eq!(detail.status, TransactionStatus::Failed);

        let missing = transaction_detail(&chain, H256::from_low_u64_be(0xdef)).await;
        assert!(matches!(missing, Err(ExplorerError::NotFound(_))));
    }
}
