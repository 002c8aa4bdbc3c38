use alloy_primitives::{Address, Bytes, U256};
use beacon_miner_primitives::Transaction;

use crate::DEV_CHAIN_ID;

/// A replay protected transfer with both fee caps set to `gas_price` unless
/// `max_fee_per_gas` is given.
#[bon::builder]
pub fn tx(
    #[builder(start_fn)] signer: Address,
    #[builder(default)] nonce: u64,
    #[builder(default = 30_000)] gas_limit: u64,
    #[builder(default = 10)] gas_price: u64,
    max_fee_per_gas: Option<u64>,
    fee_currency: Option<Address>,
    gateway_fee_recipient: Option<Address>,
    #[builder(default)] gateway_fee: u64,
    #[builder(default = true)] protected: bool,
    to: Option<Address>,
    #[builder(default)] value: u64,
    #[builder(into, default)] input: Bytes,
) -> Transaction {
    Transaction {
        signer,
        chain_id: protected.then_some(DEV_CHAIN_ID),
        nonce,
        gas_limit,
        max_fee_per_gas: U256::from(max_fee_per_gas.unwrap_or(gas_price)),
        max_priority_fee_per_gas: U256::from(gas_price),
        fee_currency,
        gateway_fee_recipient,
        gateway_fee: U256::from(gateway_fee),
        to,
        value: U256::from(value),
        input,
    }
}
