use alloy_consensus::Header;
use alloy_primitives::{Address, Log, B256};
use auto_impl::auto_impl;
use beacon_miner_primitives::{Receipt, SealedHeader, Transaction};

use crate::{
    error::{ApplyError, LedgerError},
    gas_pool::GasPool,
    sys_ctx::SysContractCallCtx,
};

/// Identifies a revision of a [`StateDb`] to roll back to.
pub type SnapshotId = usize;

/// Mutable ledger state opened at some state root.
pub trait StateDb: Send {
    /// Records the current revision.
    fn snapshot(&mut self) -> SnapshotId;

    /// Restores the state exactly as it was when `id` was taken.
    fn revert_to_snapshot(&mut self, id: SnapshotId);

    /// Finalises pending changes and returns the resulting root.
    fn intermediate_root(&mut self, delete_empty_objects: bool) -> B256;

    /// Sets the transaction that subsequently emitted logs belong to.
    fn prepare(&mut self, tx_hash: B256, index: usize);

    /// Logs emitted under `tx_hash`. The zero hash holds logs emitted outside
    /// of any transaction, e.g. during block finalization.
    fn logs(&self, tx_hash: B256, block_hash: B256) -> Vec<Log>;

    /// Starts warming likely needed state in the background.
    fn start_prefetcher(&mut self, namespace: &str);

    /// Stops the prefetcher. Calling it when none is running is a no-op.
    fn stop_prefetcher(&mut self);

    /// An isolated copy. Neither side observes the other's later writes.
    fn copy(&self) -> Self
    where
        Self: Sized;
}

/// Everything the ledger needs to apply one transaction of the block.
#[derive(Debug)]
pub struct TxEnv<'a, S> {
    pub header: &'a Header,
    pub state: &'a mut S,
    pub gas_pool: &'a mut GasPool,
    pub fee_recipient: Address,
    pub sys_ctx: &'a SysContractCallCtx,
}

/// Read access to the canonical chain plus the transaction executor.
#[auto_impl(&, Arc)]
pub trait ChainProvider: Send + Sync {
    type State: StateDb;

    /// The current chain head.
    fn current_block(&self) -> SealedHeader;

    fn state_at(&self, root: B256) -> Result<Self::State, LedgerError>;

    /// Applies `tx` on `env.state`, drawing gas from `env.gas_pool`.
    ///
    /// The returned receipt's cumulative gas is `env.header.gas_used` plus the
    /// gas used by `tx`. On error the state may be left partially modified.
    fn apply_transaction(
        &self,
        env: TxEnv<'_, Self::State>,
        tx: &Transaction,
    ) -> Result<Receipt, ApplyError>;
}
