use alloy_primitives::Address;
use beacon_miner::{
    error::PoolError,
    traits::{PendingTransactions, TransactionPool},
};
use beacon_miner_primitives::Transaction;
use parking_lot::RwLock;

#[derive(Debug, Default)]
pub struct MockPool {
    pending: RwLock<PendingTransactions>,
    locals: RwLock<Vec<Address>>,
    error: RwLock<Option<PoolError>>,
}

impl MockPool {
    pub fn add(&self, tx: Transaction) {
        self.pending.write().entry(tx.signer).or_default().push(tx);
    }

    pub fn extend(&self, txs: impl IntoIterator<Item = Transaction>) {
        for tx in txs {
            self.add(tx);
        }
    }

    pub fn add_local(&self, account: Address) {
        self.locals.write().push(account);
    }

    pub fn fail(&self, err: Option<PoolError>) {
        *self.error.write() = err;
    }
}

impl TransactionPool for MockPool {
    fn pending(&self, _enforce_tips: bool) -> Result<PendingTransactions, PoolError> {
        if let Some(err) = self.error.read().clone() {
            return Err(err);
        }
        Ok(self.pending.read().clone())
    }

    fn locals(&self) -> Vec<Address> {
        self.locals.read().clone()
    }
}
