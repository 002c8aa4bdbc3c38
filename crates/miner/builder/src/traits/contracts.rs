use alloy_consensus::Header;
use alloy_primitives::{Address, B256, U256};
use auto_impl::auto_impl;

use crate::{
    currency::ExchangeRate,
    error::{ContractError, CurrencyError, LedgerError},
};

/// Protocol parameters stored on chain.
#[auto_impl(&, Arc)]
pub trait ParamsOracle<S>: Send + Sync {
    /// Block gas limit, `None` if the parameter is not set.
    fn block_gas_limit(&self, header: &Header, state: &S) -> Option<u64>;

    /// Alternate currencies fees may be paid in.
    fn whitelisted_currencies(&self, header: &Header, state: &S) -> Vec<Address>;

    /// Gas price minimum for `currency`, `None` being the native currency.
    fn gas_price_minimum(&self, header: &Header, state: &S, currency: Option<Address>) -> U256;

    fn exchange_rate(
        &self,
        header: &Header,
        state: &S,
        currency: Address,
    ) -> Result<ExchangeRate, CurrencyError>;

    /// Base fee of the child of `parent`, read from the state at the end of
    /// `parent`.
    fn base_fee(&self, parent: &Header, state: &S) -> u64;
}

/// The on-chain randomness beacon contract.
#[auto_impl(&, Arc)]
pub trait RandomContract<S>: Send + Sync {
    fn is_running(&self, header: &Header, state: &S) -> bool;

    /// The last commitment made by `validator`, zero if there is none.
    fn last_commitment(
        &self,
        header: &Header,
        state: &S,
        validator: Address,
    ) -> Result<B256, ContractError>;

    fn reveal_and_commit(
        &self,
        header: &Header,
        state: &mut S,
        randomness: B256,
        commitment: B256,
        validator: Address,
    ) -> Result<(), ContractError>;
}

/// Maps a randomness commitment to the parent hash it was generated from.
#[auto_impl(&, Arc)]
pub trait CommitmentCache: Send + Sync {
    fn read(&self, commitment: B256) -> Option<B256>;

    /// Replays history from `parent_hash` backwards to repopulate the entry
    /// for `commitment`. Succeeding does not guarantee the entry was found.
    fn recover(&self, commitment: B256, parent_hash: B256) -> Result<(), LedgerError>;
}
