use std::collections::HashMap;

use alloy_primitives::Address;

use crate::error::ResourceError;

/// Gas still available to transactions of the block being built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GasPool(u64);

impl GasPool {
    pub const fn new(gas: u64) -> Self {
        Self(gas)
    }

    pub const fn gas(&self) -> u64 {
        self.0
    }

    pub fn add_gas(&mut self, amount: u64) -> &mut Self {
        self.0 = self.0.saturating_add(amount);
        self
    }

    /// Deducts `amount`, leaving the pool untouched if it cannot be covered.
    pub fn sub_gas(&mut self, amount: u64) -> Result<(), ResourceError> {
        if self.0 < amount {
            return Err(ResourceError::GasLimitReached {
                have: self.0,
                want: amount,
            });
        }
        self.0 -= amount;
        Ok(())
    }
}

/// Transaction bytes still available in the block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BytesBlock(u64);

impl BytesBlock {
    pub const fn with_limit(limit: u64) -> Self {
        Self(limit)
    }

    pub const fn bytes_left(&self) -> u64 {
        self.0
    }

    pub fn sub_bytes(&mut self, amount: u64) -> Result<(), ResourceError> {
        if self.0 < amount {
            return Err(ResourceError::BytesLimitReached {
                have: self.0,
                want: amount,
            });
        }
        self.0 -= amount;
        Ok(())
    }
}

/// Block gas split by the currency fees are paid in.
///
/// Every whitelisted currency gets its own pool sized as a fraction of the
/// block gas limit. The native currency, and any currency that is not
/// whitelisted, draws from a pool holding the full block gas limit.
#[derive(Debug, Clone)]
pub struct MultiGasPool {
    pools: HashMap<Address, GasPool>,
    native: GasPool,
}

impl MultiGasPool {
    pub fn new(
        block_gas_limit: u64,
        whitelist: &[Address],
        default_limit: f64,
        limits: &HashMap<Address, f64>,
    ) -> Self {
        let pools = whitelist
            .iter()
            .map(|currency| {
                let fraction = limits.get(currency).copied().unwrap_or(default_limit);
                (*currency, GasPool::new(fraction_of(block_gas_limit, fraction)))
            })
            .collect();

        Self {
            pools,
            native: GasPool::new(block_gas_limit),
        }
    }

    pub fn pool_for(&self, currency: Option<Address>) -> &GasPool {
        currency
            .and_then(|currency| self.pools.get(&currency))
            .unwrap_or(&self.native)
    }

    pub fn pool_for_mut(&mut self, currency: Option<Address>) -> &mut GasPool {
        match currency.and_then(|currency| self.pools.get_mut(&currency)) {
            Some(pool) => pool,
            None => &mut self.native,
        }
    }
}

fn fraction_of(gas: u64, fraction: f64) -> u64 {
    (gas as f64 * fraction.clamp(0.0, 1.0)) as u64
}
