use std::collections::HashMap;

use alloy_consensus::Header;
use alloy_primitives::{Address, U256};

use crate::traits::ParamsOracle;

/// Protocol parameters read once per block from an isolated copy of the state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SysContractCallCtx {
    whitelisted_currencies: Vec<Address>,
    /// Gas price minimum per currency, `None` keyed for the native currency.
    gas_price_minimums: HashMap<Option<Address>, U256>,
}

impl SysContractCallCtx {
    pub fn new<S, P>(header: &Header, state: &S, params: &P) -> Self
    where
        P: ParamsOracle<S> + ?Sized,
    {
        let whitelisted_currencies = params.whitelisted_currencies(header, state);
        let gas_price_minimums = std::iter::once(None)
            .chain(whitelisted_currencies.iter().copied().map(Some))
            .map(|currency| (currency, params.gas_price_minimum(header, state, currency)))
            .collect();

        Self {
            whitelisted_currencies,
            gas_price_minimums,
        }
    }

    pub fn whitelisted_currencies(&self) -> &[Address] {
        &self.whitelisted_currencies
    }

    /// Gas price minimum of `currency`. Currencies that are not whitelisted
    /// fall back to the native minimum.
    pub fn gas_price_minimum(&self, currency: Option<Address>) -> U256 {
        self.gas_price_minimums
            .get(&currency)
            .or_else(|| self.gas_price_minimums.get(&None))
            .copied()
            .unwrap_or_default()
    }
}
