use std::{
    collections::HashMap,
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

use alloy_consensus::Header;
use alloy_primitives::{Address, B256, U256};
use beacon_miner::{
    currency::ExchangeRate,
    error::{ContractError, CurrencyError, LedgerError},
    traits::{CommitmentCache, ParamsOracle, RandomContract},
};
use parking_lot::RwLock;

use crate::{state::MockState, CUSD};

/// Protocol parameters. `CUSD` is whitelisted and worth half the native
/// currency.
#[derive(Debug)]
pub struct MockParams {
    gas_limit: RwLock<Option<u64>>,
    whitelist: RwLock<Vec<Address>>,
    minimums: RwLock<HashMap<Option<Address>, U256>>,
    rates: RwLock<HashMap<Address, ExchangeRate>>,
    base_fee: RwLock<u64>,
}

impl Default for MockParams {
    fn default() -> Self {
        Self {
            gas_limit: RwLock::new(None),
            whitelist: RwLock::new(vec![CUSD]),
            minimums: RwLock::new(HashMap::from([(None, U256::from(1))])),
            rates: RwLock::new(HashMap::from([(
                CUSD,
                ExchangeRate::new(U256::from(1), U256::from(2)),
            )])),
            base_fee: RwLock::new(1),
        }
    }
}

impl MockParams {
    pub fn set_gas_limit(&self, gas_limit: Option<u64>) {
        *self.gas_limit.write() = gas_limit;
    }

    pub fn set_whitelist(&self, whitelist: Vec<Address>) {
        *self.whitelist.write() = whitelist;
    }

    pub fn set_gas_price_minimum(&self, currency: Option<Address>, minimum: u64) {
        self.minimums.write().insert(currency, U256::from(minimum));
    }

    pub fn set_exchange_rate(&self, currency: Address, rate: Option<ExchangeRate>) {
        match rate {
            Some(rate) => self.rates.write().insert(currency, rate),
            None => self.rates.write().remove(&currency),
        };
    }

    pub fn set_base_fee(&self, base_fee: u64) {
        *self.base_fee.write() = base_fee;
    }
}

impl ParamsOracle<MockState> for MockParams {
    fn block_gas_limit(&self, _header: &Header, _state: &MockState) -> Option<u64> {
        *self.gas_limit.read()
    }

    fn whitelisted_currencies(&self, _header: &Header, _state: &MockState) -> Vec<Address> {
        self.whitelist.read().clone()
    }

    fn gas_price_minimum(
        &self,
        _header: &Header,
        _state: &MockState,
        currency: Option<Address>,
    ) -> U256 {
        let minimums = self.minimums.read();
        minimums
            .get(&currency)
            .or_else(|| minimums.get(&None))
            .copied()
            .unwrap_or_default()
    }

    fn exchange_rate(
        &self,
        _header: &Header,
        _state: &MockState,
        currency: Address,
    ) -> Result<ExchangeRate, CurrencyError> {
        self.rates
            .read()
            .get(&currency)
            .copied()
            .ok_or(CurrencyError::Unregistered(currency))
    }

    fn base_fee(&self, _parent: &Header, _state: &MockState) -> u64 {
        *self.base_fee.read()
    }
}

/// The randomness beacon, keeping commitments in the state.
#[derive(Debug)]
pub struct MockRandom {
    running: AtomicBool,
    reveal_error: RwLock<Option<ContractError>>,
    reveals: RwLock<Vec<(B256, B256)>>,
}

impl Default for MockRandom {
    fn default() -> Self {
        Self {
            running: AtomicBool::new(true),
            reveal_error: RwLock::new(None),
            reveals: RwLock::new(Vec::new()),
        }
    }
}

impl MockRandom {
    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }

    pub fn fail_reveal(&self, err: Option<ContractError>) {
        *self.reveal_error.write() = err;
    }

    /// Every `(randomness, commitment)` pair revealed so far.
    pub fn reveals(&self) -> Vec<(B256, B256)> {
        self.reveals.read().clone()
    }
}

impl RandomContract<MockState> for MockRandom {
    fn is_running(&self, _header: &Header, _state: &MockState) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn last_commitment(
        &self,
        _header: &Header,
        state: &MockState,
        validator: Address,
    ) -> Result<B256, ContractError> {
        Ok(state.commitment(validator))
    }

    fn reveal_and_commit(
        &self,
        _header: &Header,
        state: &mut MockState,
        randomness: B256,
        commitment: B256,
        validator: Address,
    ) -> Result<(), ContractError> {
        if let Some(err) = self.reveal_error.read().clone() {
            return Err(err);
        }
        state.set_commitment(validator, commitment);
        self.reveals.write().push((randomness, commitment));
        Ok(())
    }
}

/// Commitment to parent hash cache with a history to recover entries from.
#[derive(Debug, Default)]
pub struct MockCommitmentCache {
    entries: RwLock<HashMap<B256, B256>>,
    history: RwLock<HashMap<B256, B256>>,
    recover_error: RwLock<Option<LedgerError>>,
    recoveries: AtomicUsize,
}

impl MockCommitmentCache {
    pub fn insert(&self, commitment: B256, parent_hash: B256) {
        self.entries.write().insert(commitment, parent_hash);
    }

    /// Makes `commitment` recoverable without caching it.
    pub fn insert_history(&self, commitment: B256, parent_hash: B256) {
        self.history.write().insert(commitment, parent_hash);
    }

    pub fn fail_recovery(&self, err: Option<LedgerError>) {
        *self.recover_error.write() = err;
    }

    pub fn recoveries(&self) -> usize {
        self.recoveries.load(Ordering::SeqCst)
    }
}

impl CommitmentCache for MockCommitmentCache {
    fn read(&self, commitment: B256) -> Option<B256> {
        self.entries.read().get(&commitment).copied()
    }

    fn recover(&self, commitment: B256, _parent_hash: B256) -> Result<(), LedgerError> {
        self.recoveries.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.recover_error.read().clone() {
            return Err(err);
        }
        if let Some(parent_hash) = self.history.read().get(&commitment).copied() {
            self.insert(commitment, parent_hash);
        }
        Ok(())
    }
}
