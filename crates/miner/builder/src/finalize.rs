use alloy_primitives::{B256, U256};
use beacon_miner_primitives::{Block, Receipt};
use tracing::error;

use crate::{
    block_state::BlockState,
    error::BlockBuildError,
    traits::{ConsensusEngine, StateDb},
    worker::{MinerComponents, Worker},
};

/// A fully executed block ready to be sealed by consensus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltBlock {
    pub block: Block,
    /// One receipt per transaction, followed by the block receipt if the
    /// finalization emitted logs.
    pub receipts: Vec<Receipt>,
    /// Fees paid to the fee recipient, in native wei.
    pub fees: U256,
}

impl<S: StateDb> BlockState<S> {
    /// Hands the block over to the consensus engine for final state changes
    /// and assembly.
    pub fn finalize_and_assemble<N>(&mut self, worker: &Worker<N>) -> Result<Block, BlockBuildError>
    where
        N: MinerComponents<State = S>,
    {
        let mut block = worker
            .engine
            .finalize_and_assemble(
                &self.header,
                &mut self.state,
                &self.txs,
                &self.receipts,
                &self.randomness,
            )
            .inspect_err(|err| {
                error!(target: "miner", %err, "unable to finalize block");
            })?;

        if let Some(engine) = worker.engine.validator_engine() {
            engine
                .update_val_set_diff(&mut block.header, &self.state)
                .inspect_err(|err| {
                    error!(target: "miner", %err, "unable to update the validator set diff");
                })?;
        }

        add_block_receipt(&mut self.receipts, &self.state, block.hash());
        Ok(block)
    }
}

/// Appends a receipt for the logs emitted outside of any transaction, such as
/// during block finalization. Nothing is appended if there are none.
pub fn add_block_receipt<S: StateDb + ?Sized>(
    receipts: &mut Vec<Receipt>,
    state: &S,
    block_hash: B256,
) {
    let logs = state.logs(B256::ZERO, block_hash);
    if logs.is_empty() {
        return;
    }
    let cumulative_gas_used = receipts.last().map_or(0, |receipt| receipt.cumulative_gas_used);
    receipts.push(Receipt::new(block_hash, true, 0, cumulative_gas_used, logs));
}
