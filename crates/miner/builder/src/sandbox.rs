use alloy_primitives::Log;
use beacon_miner_primitives::Transaction;

use crate::{
    block_state::BlockState,
    error::ApplyError,
    traits::{ChainProvider, StateDb, TxEnv},
};

impl<S: StateDb> BlockState<S> {
    /// Applies `tx` on top of the block, all or nothing.
    ///
    /// On failure the state and the block gas pool are restored to what they
    /// were before the call. On success the transaction and its receipt are
    /// appended and the logs it emitted are returned.
    pub fn commit_transaction<C>(&mut self, client: &C, tx: &Transaction) -> Result<Vec<Log>, ApplyError>
    where
        C: ChainProvider<State = S> + ?Sized,
    {
        self.state.prepare(tx.hash(), self.tcount);
        let snapshot = self.state.snapshot();
        let gas_pool = self.gas_pool;

        let env = TxEnv {
            header: &self.header,
            state: &mut self.state,
            gas_pool: &mut self.gas_pool,
            fee_recipient: self.tx_fee_recipient,
            sys_ctx: self.sys_ctx.as_ref(),
        };

        match client.apply_transaction(env, tx) {
            Ok(receipt) => {
                self.header.gas_used = receipt.cumulative_gas_used;
                let logs = receipt.logs.clone();
                self.txs.push(tx.clone());
                self.receipts.push(receipt);
                Ok(logs)
            }
            Err(err) => {
                self.state.revert_to_snapshot(snapshot);
                self.gas_pool = gas_pool;
                Err(err)
            }
        }
    }
}
