use alloy_primitives::{Address, U256};
use beacon_miner_primitives::{Block, Receipt};
use tracing::error;

use crate::error::CurrencyError;

/// Total native-equivalent fees earned by the fee recipient of `block`.
///
/// With `currency_base_fee` the tip is computed over the gas price minimum of
/// the fee currency, otherwise it is the full priority fee. Transactions whose
/// fees cannot be converted are logged and counted as zero.
///
/// # Panics
///
/// If there are fewer receipts than transactions.
pub fn total_fees<B, C>(
    block: &Block,
    receipts: &[Receipt],
    base_fee_fn: B,
    to_native: C,
    currency_base_fee: bool,
) -> U256
where
    B: Fn(Option<Address>) -> U256,
    C: Fn(U256, Option<Address>) -> Result<U256, CurrencyError>,
{
    let txs = block.transactions();
    assert!(
        receipts.len() >= txs.len(),
        "{} receipts for {} transactions",
        receipts.len(),
        txs.len()
    );

    let mut total = U256::ZERO;
    for (tx, receipt) in txs.iter().zip(receipts) {
        let base_fee = currency_base_fee.then(|| base_fee_fn(tx.fee_currency()));
        let fee = U256::from(receipt.gas_used).saturating_mul(tx.effective_gas_tip(base_fee));
        match to_native(fee, tx.fee_currency()) {
            Ok(fee) => total = total.saturating_add(fee),
            Err(err) => {
                error!(target: "miner", hash = %tx.hash(), %err, "could not convert fees for transaction");
            }
        }
    }
    total
}
