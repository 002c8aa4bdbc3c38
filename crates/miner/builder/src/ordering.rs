use std::{
    cmp::Ordering,
    collections::{BinaryHeap, VecDeque},
};

use alloy_primitives::{Address, U256};
use beacon_miner_primitives::Transaction;
use tracing::trace;

use crate::{error::CurrencyError, traits::PendingTransactions};

/// Head transaction of one account, ranked by its native-equivalent tip.
#[derive(Debug, PartialEq, Eq)]
struct Head {
    price: U256,
    account: usize,
}

impl Ord for Head {
    fn cmp(&self, other: &Self) -> Ordering {
        // Equal prices go to the account that sorts first.
        self.price
            .cmp(&other.price)
            .then_with(|| other.account.cmp(&self.account))
    }
}

impl PartialOrd for Head {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Streams transactions across accounts by descending effective tip while
/// keeping every account's transactions in nonce order.
pub struct TransactionsByPriceAndNonce<B, C> {
    queues: Vec<VecDeque<Transaction>>,
    heads: BinaryHeap<Head>,
    base_fee_fn: B,
    to_native: C,
}

impl<B, C> TransactionsByPriceAndNonce<B, C>
where
    B: Fn(Option<Address>) -> U256,
    C: Fn(U256, Option<Address>) -> Result<U256, CurrencyError>,
{
    pub fn new(txs: PendingTransactions, base_fee_fn: B, to_native: C) -> Self {
        let queues: Vec<VecDeque<Transaction>> = txs
            .into_values()
            .filter(|txs| !txs.is_empty())
            .map(|mut txs| {
                txs.sort_by_key(Transaction::nonce);
                txs.into()
            })
            .collect();

        let mut this = Self {
            heads: BinaryHeap::with_capacity(queues.len()),
            queues,
            base_fee_fn,
            to_native,
        };
        for account in 0..this.queues.len() {
            this.push_head(account);
        }
        this
    }

    /// The best transaction, without removing it.
    pub fn peek(&self) -> Option<&Transaction> {
        let head = self.heads.peek()?;
        self.queues[head.account].front()
    }

    /// Native-equivalent tip the best transaction is ranked by.
    pub fn peek_price(&self) -> Option<U256> {
        self.heads.peek().map(|head| head.price)
    }

    /// Replaces the best transaction with the next one of the same account.
    pub fn shift(&mut self) {
        if let Some(head) = self.heads.pop() {
            self.queues[head.account].pop_front();
            self.push_head(head.account);
        }
    }

    /// Drops the best transaction and every later one of the same account.
    pub fn pop(&mut self) {
        if let Some(head) = self.heads.pop() {
            self.queues[head.account].clear();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.heads.is_empty()
    }

    fn push_head(&mut self, account: usize) {
        if let Some(tx) = self.queues[account].front() {
            let price = self.price_of(tx);
            self.heads.push(Head { price, account });
        }
    }

    fn price_of(&self, tx: &Transaction) -> U256 {
        let currency = tx.fee_currency();
        let tip = tx.effective_gas_tip(Some((self.base_fee_fn)(currency)));
        (self.to_native)(tip, currency).unwrap_or_else(|err| {
            trace!(target: "miner", sender = %tx.signer(), %err, "could not rank transaction");
            U256::ZERO
        })
    }
}

impl<B, C> std::fmt::Debug for TransactionsByPriceAndNonce<B, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionsByPriceAndNonce")
            .field("accounts", &self.heads.len())
            .finish_non_exhaustive()
    }
}
