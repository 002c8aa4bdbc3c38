use std::collections::BTreeMap;

use alloy_primitives::{Address, Log, U256};
use beacon_miner_primitives::{constants::TX_GAS, Fork};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace, warn};

use crate::{
    block_state::BlockState,
    error::{ApplyError, BlockBuildError, CurrencyError},
    ordering::TransactionsByPriceAndNonce,
    traits::{PendingTransactions, StateDb, TransactionPool},
    worker::{MinerComponents, Worker},
};

/// Where the commit loop stands after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum CommitLoopState {
    Running,
    /// Not even a plain transfer fits in the remaining block gas.
    StoppedGasExhausted,
    /// A transaction priced below the gas price minimum was reached. Every
    /// remaining candidate is priced no higher.
    StoppedPriceFloor,
    Cancelled,
    /// The candidate stream is exhausted.
    Done,
}

impl<S: StateDb> BlockState<S> {
    /// Fills the block from the pending pool, local accounts first, and
    /// returns the state the last commit pass ended in.
    ///
    /// Failing to fetch pending transactions leaves the block empty. A price
    /// floor reached among the locals also holds for the remotes.
    pub fn select_and_apply_transactions<N>(
        &mut self,
        cancel: &CancellationToken,
        worker: &Worker<N>,
    ) -> Result<CommitLoopState, BlockBuildError>
    where
        N: MinerComponents<State = S>,
    {
        let pending = match worker.pool.pending(true) {
            Ok(pending) => pending,
            Err(err) => {
                error!(target: "miner", %err, "failed to fetch pending transactions");
                return Ok(CommitLoopState::Done);
            }
        };
        if pending.is_empty() {
            return Ok(CommitLoopState::Done);
        }

        let (local, remote) = split_locals(pending, &worker.pool.locals());
        let mut outcome = CommitLoopState::Done;

        for (origin, txs) in [("local", local), ("remote", remote)] {
            if txs.is_empty() {
                continue;
            }
            let (base_fee_fn, to_native) = self.conversion_functions(&worker.params);
            let txs = TransactionsByPriceAndNonce::new(txs, base_fee_fn, to_native);

            match self.commit_transactions(cancel, worker, txs)? {
                CommitLoopState::Cancelled => {
                    debug!(target: "miner", origin, "cancelled while committing transactions");
                    return Err(BlockBuildError::Cancelled);
                }
                state => {
                    trace!(target: "miner", origin, %state, txs = self.tcount, "committed transactions");
                    outcome = state;
                }
            }
        }
        Ok(outcome)
    }

    /// Runs the commit loop over `txs` until it stops.
    pub(crate) fn commit_transactions<N, B, C>(
        &mut self,
        cancel: &CancellationToken,
        worker: &Worker<N>,
        mut txs: TransactionsByPriceAndNonce<B, C>,
    ) -> Result<CommitLoopState, BlockBuildError>
    where
        N: MinerComponents<State = S>,
        B: Fn(Option<Address>) -> U256,
        C: Fn(U256, Option<Address>) -> Result<U256, CurrencyError>,
    {
        let mut coalesced_logs = Vec::new();
        let mut state = CommitLoopState::Running;
        while state == CommitLoopState::Running {
            state = self.commit_next(cancel, worker, &mut txs, &mut coalesced_logs)?;
        }

        if state != CommitLoopState::Cancelled && !worker.is_running() && !coalesced_logs.is_empty() {
            worker.publish_pending_logs(coalesced_logs);
        }
        Ok(state)
    }

    /// One iteration of the commit loop.
    fn commit_next<N, B, C>(
        &mut self,
        cancel: &CancellationToken,
        worker: &Worker<N>,
        txs: &mut TransactionsByPriceAndNonce<B, C>,
        coalesced_logs: &mut Vec<Log>,
    ) -> Result<CommitLoopState, BlockBuildError>
    where
        N: MinerComponents<State = S>,
        B: Fn(Option<Address>) -> U256,
        C: Fn(U256, Option<Address>) -> Result<U256, CurrencyError>,
    {
        if cancel.is_cancelled() {
            return Ok(CommitLoopState::Cancelled);
        }

        if self.gas_pool.gas() < TX_GAS {
            trace!(target: "miner", have = self.gas_pool.gas(), want = TX_GAS, "not enough gas for further transactions");
            return Ok(CommitLoopState::StoppedGasExhausted);
        }

        let (Some(tx), Some(price)) = (txs.peek().cloned(), txs.peek_price()) else {
            return Ok(CommitLoopState::Done);
        };
        let sender = tx.signer();

        if self.price_floor.is_some_and(|floor| price <= floor) {
            trace!(target: "miner", %sender, %price, "ignoring transaction priced at or below the price floor");
            worker.metrics.inc_skipped_transactions();
            txs.pop();
            return Ok(CommitLoopState::Running);
        }

        let number = self.header.number;
        let chain_config = &worker.chain_config;

        let currency_gas = self.multi_gas_pool.pool_for(tx.fee_currency()).gas();
        if currency_gas < tx.gas_limit() {
            trace!(
                target: "miner",
                currency = ?tx.fee_currency(),
                have = currency_gas,
                want = tx.gas_limit(),
                "skipping transaction, fee currency block space exhausted"
            );
            worker.metrics.inc_skipped_transactions();
            txs.pop();
            return Ok(CommitLoopState::Running);
        }

        if self.gas_pool.gas() < tx.gas_limit() {
            trace!(target: "miner", have = self.gas_pool.gas(), want = tx.gas_limit(), "not enough gas for transaction");
            worker.metrics.inc_skipped_transactions();
            txs.pop();
            return Ok(CommitLoopState::Running);
        }

        if let Some(bytes) = &self.bytes_block {
            if bytes.bytes_left() < tx.size() {
                trace!(target: "miner", have = bytes.bytes_left(), want = tx.size(), "not enough block bytes for transaction");
                worker.metrics.inc_skipped_transactions();
                txs.pop();
                return Ok(CommitLoopState::Running);
            }
        }

        let replay_protection = chain_config.is_active(Fork::ReplayProtection, number);
        if tx.is_protected() != replay_protection {
            trace!(
                target: "miner",
                %sender,
                protected = tx.is_protected(),
                replay_protection,
                "ignoring transaction with mismatched replay protection"
            );
            worker.metrics.inc_skipped_transactions();
            txs.pop();
            return Ok(CommitLoopState::Running);
        }

        if tx.gateway_set() && chain_config.is_active(Fork::BaseFee, number) {
            trace!(target: "miner", %sender, "ignoring transaction with gateway fee, no longer supported");
            worker.metrics.inc_skipped_transactions();
            txs.pop();
            return Ok(CommitLoopState::Running);
        }

        match self.commit_transaction(&worker.client, &tx) {
            Ok(logs) => {
                coalesced_logs.extend(logs);
                let gas_used = self.receipts.last().map_or(0, |receipt| receipt.gas_used);
                self.tcount += 1;

                if let Some(bytes) = self.bytes_block.as_mut() {
                    bytes.sub_bytes(tx.size()).inspect_err(|err| {
                        warn!(target: "miner", %err, "block bytes could not cover an applied transaction");
                    })?;
                }
                self.multi_gas_pool
                    .pool_for_mut(tx.fee_currency())
                    .sub_gas(gas_used)
                    .inspect_err(|err| {
                        warn!(target: "miner", %err, "fee currency gas could not cover an applied transaction");
                    })?;

                worker.metrics.inc_committed_transactions();
                txs.shift();
            }
            Err(ApplyError::GasLimitReached) => {
                trace!(target: "miner", %sender, "gas limit exceeded for current block");
                worker.metrics.inc_skipped_transactions();
                txs.pop();
            }
            Err(err @ ApplyError::NonceTooLow { .. }) => {
                trace!(target: "miner", %sender, %err, "skipping transaction with low nonce");
                worker.metrics.inc_skipped_transactions();
                txs.shift();
            }
            Err(err @ ApplyError::NonceTooHigh { .. }) => {
                trace!(target: "miner", %sender, %err, "skipping account with high nonce");
                worker.metrics.inc_skipped_transactions();
                txs.pop();
            }
            Err(ApplyError::GasPriceDoesNotExceedMinimum) => {
                trace!(target: "miner", %sender, %price, "transaction does not meet the gas price minimum, stopping");
                self.price_floor = Some(self.price_floor.map_or(price, |floor| floor.max(price)));
                return Ok(CommitLoopState::StoppedPriceFloor);
            }
            Err(
                err @ (ApplyError::InsufficientFunds
                | ApplyError::IntrinsicGas
                | ApplyError::Execution(_)),
            ) => {
                // Only this transaction is skipped, the account may still have
                // later ones that apply.
                debug!(target: "miner", %sender, hash = %tx.hash(), %err, "transaction failed, account skipped");
                worker.metrics.inc_skipped_transactions();
                txs.shift();
            }
        }
        Ok(CommitLoopState::Running)
    }
}

/// Moves the accounts in `locals` out of `pending`.
fn split_locals(
    mut pending: PendingTransactions,
    locals: &[Address],
) -> (PendingTransactions, PendingTransactions) {
    let mut local = BTreeMap::new();
    for account in locals {
        if let Some(txs) = pending.remove(account) {
            if !txs.is_empty() {
                local.insert(*account, txs);
            }
        }
    }
    (local, pending)
}
