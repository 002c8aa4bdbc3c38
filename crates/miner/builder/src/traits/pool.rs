use std::collections::BTreeMap;

use alloy_primitives::Address;
use auto_impl::auto_impl;
use beacon_miner_primitives::Transaction;

use crate::error::PoolError;

/// Executable transactions grouped by sender, each group ordered by nonce.
pub type PendingTransactions = BTreeMap<Address, Vec<Transaction>>;

#[auto_impl(&, Arc)]
pub trait TransactionPool: Send + Sync {
    fn pending(&self, enforce_tips: bool) -> Result<PendingTransactions, PoolError>;

    /// Accounts whose transactions are treated as local.
    fn locals(&self) -> Vec<Address>;
}
