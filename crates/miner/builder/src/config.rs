use std::collections::HashMap;

use alloy_primitives::{Address, Bytes};

/// Default share of the block gas limit a whitelisted fee currency may use.
pub const DEFAULT_FEE_CURRENCY_LIMIT: f64 = 0.5;

/// Miner settings shared between the block builder and whoever reconfigures
/// it at runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct MinerConfig {
    /// Signs blocks and takes part in the randomness beacon.
    pub validator: Address,
    /// Receives transaction fees.
    pub tx_fee_recipient: Address,
    /// Header extra data.
    pub extra: Bytes,
    pub fee_currency_default: f64,
    /// Per-currency overrides of [`Self::fee_currency_default`].
    pub fee_currency_limits: HashMap<Address, f64>,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            validator: Address::ZERO,
            tx_fee_recipient: Address::ZERO,
            extra: Bytes::new(),
            fee_currency_default: DEFAULT_FEE_CURRENCY_LIMIT,
            fee_currency_limits: HashMap::new(),
        }
    }
}
