use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use alloy_primitives::{keccak256, Address, Log, B256, U256};
use beacon_miner::traits::{SnapshotId, StateDb};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Account {
    pub nonce: u64,
    pub balance: U256,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Contents {
    accounts: BTreeMap<Address, Account>,
    commitments: BTreeMap<Address, B256>,
    /// Logs tagged with the hash of the transaction that emitted them.
    logs: Vec<(B256, Log)>,
}

/// Counts prefetchers started and stopped across every copy of a state.
#[derive(Debug, Clone, Default)]
pub struct PrefetchTracker {
    started: Arc<AtomicUsize>,
    stopped: Arc<AtomicUsize>,
}

impl PrefetchTracker {
    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn stopped(&self) -> usize {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Prefetchers still running.
    pub fn active(&self) -> usize {
        self.started() - self.stopped()
    }
}

/// A journaled in-memory ledger.
#[derive(Debug, Default)]
pub struct MockState {
    contents: Contents,
    journal: Vec<Contents>,
    tx_hash: B256,
    tx_index: usize,
    prefetching: bool,
    tracker: PrefetchTracker,
}

impl MockState {
    /// A state where every account in `accounts` holds 1000 ether.
    pub fn funded(accounts: &[Address]) -> Self {
        let mut state = Self::default();
        for account in accounts {
            state.add_balance(*account, U256::from(10).pow(U256::from(21)));
        }
        state
    }

    pub fn tracker(&self) -> &PrefetchTracker {
        &self.tracker
    }

    pub fn account(&self, address: Address) -> Account {
        self.contents.accounts.get(&address).copied().unwrap_or_default()
    }

    pub fn nonce(&self, address: Address) -> u64 {
        self.account(address).nonce
    }

    pub fn balance(&self, address: Address) -> U256 {
        self.account(address).balance
    }

    pub fn set_nonce(&mut self, address: Address, nonce: u64) {
        self.contents.accounts.entry(address).or_default().nonce = nonce;
    }

    pub fn increment_nonce(&mut self, address: Address) {
        let account = self.contents.accounts.entry(address).or_default();
        account.nonce += 1;
    }

    pub fn add_balance(&mut self, address: Address, amount: U256) {
        let account = self.contents.accounts.entry(address).or_default();
        account.balance = account.balance.saturating_add(amount);
    }

    pub fn sub_balance(&mut self, address: Address, amount: U256) {
        let account = self.contents.accounts.entry(address).or_default();
        account.balance = account.balance.saturating_sub(amount);
    }

    pub fn commitment(&self, validator: Address) -> B256 {
        self.contents
            .commitments
            .get(&validator)
            .copied()
            .unwrap_or_default()
    }

    pub fn set_commitment(&mut self, validator: Address, commitment: B256) {
        self.contents.commitments.insert(validator, commitment);
    }

    /// Emits `log` on behalf of the current transaction.
    pub fn add_log(&mut self, log: Log) {
        self.contents.logs.push((self.tx_hash, log));
    }

    /// Logs of the current transaction.
    pub fn current_logs(&self) -> Vec<Log> {
        self.logs(self.tx_hash, B256::ZERO)
    }

    pub const fn tx_index(&self) -> usize {
        self.tx_index
    }

    /// Hash over the full contents of the state.
    pub fn root(&self) -> B256 {
        let mut buf = Vec::new();
        for (address, account) in &self.contents.accounts {
            buf.extend_from_slice(address.as_slice());
            buf.extend_from_slice(&account.nonce.to_be_bytes());
            buf.extend_from_slice(&account.balance.to_be_bytes::<32>());
        }
        for (validator, commitment) in &self.contents.commitments {
            buf.extend_from_slice(validator.as_slice());
            buf.extend_from_slice(commitment.as_slice());
        }
        for (tx_hash, log) in &self.contents.logs {
            buf.extend_from_slice(tx_hash.as_slice());
            buf.extend_from_slice(log.address.as_slice());
            for topic in log.topics() {
                buf.extend_from_slice(topic.as_slice());
            }
            buf.extend_from_slice(&log.data.data);
        }
        keccak256(buf)
    }
}

impl StateDb for MockState {
    fn snapshot(&mut self) -> SnapshotId {
        self.journal.push(self.contents.clone());
        self.journal.len() - 1
    }

    fn revert_to_snapshot(&mut self, id: SnapshotId) {
        self.contents = self.journal[id].clone();
        self.journal.truncate(id);
    }

    fn intermediate_root(&mut self, _delete_empty_objects: bool) -> B256 {
        self.root()
    }

    fn prepare(&mut self, tx_hash: B256, index: usize) {
        self.tx_hash = tx_hash;
        self.tx_index = index;
    }

    fn logs(&self, tx_hash: B256, _block_hash: B256) -> Vec<Log> {
        self.contents
            .logs
            .iter()
            .filter(|(hash, _)| *hash == tx_hash)
            .map(|(_, log)| log.clone())
            .collect()
    }

    fn start_prefetcher(&mut self, _namespace: &str) {
        if !self.prefetching {
            self.prefetching = true;
            self.tracker.started.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn stop_prefetcher(&mut self) {
        if self.prefetching {
            self.prefetching = false;
            self.tracker.stopped.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn copy(&self) -> Self {
        Self {
            contents: self.contents.clone(),
            tracker: self.tracker.clone(),
            ..Default::default()
        }
    }
}
