//! Commit-reveal participation in the on-chain randomness beacon.

use alloy_primitives::{Address, B256};
use beacon_miner_primitives::Randomness;
use tracing::{error, trace, warn};

use crate::{
    block_state::BlockState,
    error::{BlockBuildError, RandomnessError},
    traits::{CommitmentCache, ConsensusEngine, RandomContract, StateDb},
    worker::{MinerComponents, Worker},
};

/// Reveals the randomness committed to in this validator's previous block and
/// commits to the value revealed in its next one.
///
/// Does nothing when the worker is not running or the beacon contract is not
/// active, recording [`Randomness::EMPTY`].
pub(crate) fn participate<N: MinerComponents>(
    worker: &Worker<N>,
    block: &mut BlockState<N::State>,
    validator: Address,
) -> Result<(), BlockBuildError> {
    if !worker.is_running() || !worker.random.is_running(&block.header, &block.state) {
        block.randomness = Randomness::EMPTY;
        return Ok(());
    }

    let Some(engine) = worker.engine.validator_engine() else {
        error!(target: "miner", "the randomness beacon requires a validator consensus engine");
        return Err(BlockBuildError::Fatal(
            "randomness beacon requires a validator consensus engine",
        ));
    };

    let last_commitment = worker
        .random
        .last_commitment(&block.header, &block.state, validator)
        .map_err(RandomnessError::LastCommitment)?;

    let mut last_randomness = B256::ZERO;
    if !last_commitment.is_zero() {
        let parent_hash = match worker.cache.read(last_commitment) {
            Some(parent_hash) => parent_hash,
            None => {
                warn!(
                    target: "miner",
                    commitment = %last_commitment,
                    "randomness cache miss, attempting to recover"
                );
                worker
                    .cache
                    .recover(last_commitment, block.header.parent_hash)
                    .map_err(RandomnessError::Recovery)?;
                worker
                    .cache
                    .read(last_commitment)
                    .ok_or(RandomnessError::CacheMiss(last_commitment))?
            }
        };

        (last_randomness, _) = engine
            .generate_randomness(parent_hash)
            .map_err(RandomnessError::Generate)?;
    }

    let (_, new_commitment) = engine
        .generate_randomness(block.header.parent_hash)
        .map_err(RandomnessError::Generate)?;

    worker
        .random
        .reveal_and_commit(
            &block.header,
            &mut block.state,
            last_randomness,
            new_commitment,
            validator,
        )
        .map_err(RandomnessError::RevealAndCommit)?;

    // Captures the reveal in the state before any transaction is applied.
    block.state.intermediate_root(true);

    trace!(
        target: "miner",
        revealed = %last_randomness,
        committed = %new_commitment,
        "participated in the randomness beacon"
    );
    block.randomness = Randomness::new(last_randomness, new_commitment);
    Ok(())
}
