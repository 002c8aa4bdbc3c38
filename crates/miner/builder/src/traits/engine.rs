use alloy_consensus::Header;
use alloy_primitives::B256;
use auto_impl::auto_impl;
use beacon_miner_primitives::{Block, Randomness, Receipt, Transaction};

use crate::{error::EngineError, traits::StateDb};

/// Capabilities only validator based engines provide.
pub trait ValidatorEngine<S>: Send + Sync {
    /// Returns `(randomness, commitment)` derived from `parent_hash`.
    fn generate_randomness(&self, parent_hash: B256) -> Result<(B256, B256), EngineError>;

    /// Writes the validator set diff into the header of an epoch's last block.
    fn update_val_set_diff(&self, header: &mut Header, state: &S) -> Result<(), EngineError>;
}

#[auto_impl(&, Arc)]
pub trait ConsensusEngine<S: StateDb>: Send + Sync {
    /// Fills in the consensus specific header fields.
    fn prepare(&self, header: &mut Header) -> Result<(), EngineError>;

    /// Runs post-transaction state changes and assembles the block.
    fn finalize_and_assemble(
        &self,
        header: &Header,
        state: &mut S,
        txs: &[Transaction],
        receipts: &[Receipt],
        randomness: &Randomness,
    ) -> Result<Block, EngineError>;

    fn validator_engine(&self) -> Option<&dyn ValidatorEngine<S>> {
        None
    }
}
