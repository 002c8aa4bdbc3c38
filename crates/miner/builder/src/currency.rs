//! Conversion of fee amounts between whitelisted currencies and the native
//! currency.

use std::{collections::HashMap, sync::Arc};

use alloy_consensus::Header;
use alloy_primitives::{Address, U256};

use crate::{error::CurrencyError, sys_ctx::SysContractCallCtx, traits::ParamsOracle};

/// `native` units of the native currency are worth `token` units of the
/// currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeRate {
    pub native: U256,
    pub token: U256,
}

impl ExchangeRate {
    pub const fn new(native: U256, token: U256) -> Self {
        Self { native, token }
    }

    pub fn to_native(&self, amount: U256) -> Result<U256, CurrencyError> {
        if self.token.is_zero() {
            return Err(CurrencyError::Overflow);
        }
        amount
            .checked_mul(self.native)
            .map(|scaled| scaled / self.token)
            .ok_or(CurrencyError::Overflow)
    }
}

/// Exchange rates of every whitelisted currency, read once per block.
#[derive(Debug, Clone, Default)]
pub struct CurrencyManager {
    rates: HashMap<Address, Result<ExchangeRate, CurrencyError>>,
}

impl CurrencyManager {
    pub fn new<S, P>(params: &P, header: &Header, state: &S, currencies: &[Address]) -> Self
    where
        P: ParamsOracle<S> + ?Sized,
    {
        let rates = currencies
            .iter()
            .map(|currency| {
                let rate = params
                    .exchange_rate(header, state, *currency)
                    .and_then(|rate| {
                        if rate.native.is_zero() || rate.token.is_zero() {
                            Err(CurrencyError::InvalidRate(*currency))
                        } else {
                            Ok(rate)
                        }
                    });
                (*currency, rate)
            })
            .collect();
        Self { rates }
    }

    /// Converts `amount` of `currency` to the native currency. The native
    /// currency converts to itself.
    pub fn to_native(&self, amount: U256, currency: Option<Address>) -> Result<U256, CurrencyError> {
        let Some(currency) = currency else {
            return Ok(amount);
        };
        match self.rates.get(&currency) {
            Some(Ok(rate)) => rate.to_native(amount),
            Some(Err(err)) => Err(err.clone()),
            None => Err(CurrencyError::Unregistered(currency)),
        }
    }
}

/// Builds the per-currency base fee lookup and the to-native conversion used
/// to rank transactions and account fees.
///
/// Both closures own what they need, so they do not borrow the block state.
pub fn create_conversion_functions<S, P>(
    sys_ctx: &Arc<SysContractCallCtx>,
    params: &P,
    header: &Header,
    state: &S,
) -> (
    impl Fn(Option<Address>) -> U256 + Clone,
    impl Fn(U256, Option<Address>) -> Result<U256, CurrencyError> + Clone,
)
where
    P: ParamsOracle<S> + ?Sized,
{
    let ctx = Arc::clone(sys_ctx);
    let base_fee_fn = move |currency: Option<Address>| ctx.gas_price_minimum(currency);

    let manager = Arc::new(CurrencyManager::new(
        params,
        header,
        state,
        sys_ctx.whitelisted_currencies(),
    ));
    let to_native = move |amount: U256, currency: Option<Address>| manager.to_native(amount, currency);

    (base_fee_fn, to_native)
}
