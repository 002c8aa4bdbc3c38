use std::sync::atomic::{AtomicUsize, Ordering};

use alloy_consensus::Header;
use alloy_primitives::{keccak256, Address, Bytes, Log, B256, U256};
use beacon_miner::{
    error::EngineError,
    traits::{ConsensusEngine, StateDb, ValidatorEngine},
};
use beacon_miner_primitives::{Block, Randomness, Receipt, Transaction};
use parking_lot::RwLock;

use crate::state::MockState;

pub const VAL_SET_DIFF: Bytes = Bytes::from_static(b"val-set-diff");

/// Derives randomness from a fixed secret.
#[derive(Debug)]
pub struct MockValidatorEngine {
    secret: B256,
    epoch_size: u64,
    diffs: AtomicUsize,
}

impl MockValidatorEngine {
    pub fn new(secret: B256, epoch_size: u64) -> Self {
        Self {
            secret,
            epoch_size,
            diffs: AtomicUsize::new(0),
        }
    }

    pub fn randomness(&self, parent_hash: B256) -> (B256, B256) {
        let revealed = keccak256([self.secret.as_slice(), parent_hash.as_slice()].concat());
        (revealed, keccak256(revealed))
    }

    /// Number of validator set diffs written into headers.
    pub fn diffs(&self) -> usize {
        self.diffs.load(Ordering::SeqCst)
    }
}

impl ValidatorEngine<MockState> for MockValidatorEngine {
    fn generate_randomness(&self, parent_hash: B256) -> Result<(B256, B256), EngineError> {
        Ok(self.randomness(parent_hash))
    }

    fn update_val_set_diff(&self, header: &mut Header, _state: &MockState) -> Result<(), EngineError> {
        if header.number % self.epoch_size == 0 {
            header.extra_data = VAL_SET_DIFF;
            self.diffs.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct MockEngine {
    validator: Option<MockValidatorEngine>,
    prepare_error: RwLock<Option<EngineError>>,
    block_reward: RwLock<Option<(Address, U256)>>,
    finalized: AtomicUsize,
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEngine {
    /// An engine with the validator capability.
    pub fn new() -> Self {
        Self::with_epoch_size(100)
    }

    /// An engine with the validator capability, ending an epoch every
    /// `epoch_size` blocks.
    pub fn with_epoch_size(epoch_size: u64) -> Self {
        Self::with_validator(Some(MockValidatorEngine::new(
            B256::with_last_byte(0x5e),
            epoch_size,
        )))
    }

    pub fn without_validator() -> Self {
        Self::with_validator(None)
    }

    fn with_validator(validator: Option<MockValidatorEngine>) -> Self {
        Self {
            validator,
            prepare_error: RwLock::new(None),
            block_reward: RwLock::new(None),
            finalized: AtomicUsize::new(0),
        }
    }

    pub fn validator(&self) -> Option<&MockValidatorEngine> {
        self.validator.as_ref()
    }

    pub fn fail_prepare(&self, err: Option<EngineError>) {
        *self.prepare_error.write() = err;
    }

    /// Credits `amount` to `beneficiary` during finalization and logs it.
    pub fn set_block_reward(&self, reward: Option<(Address, U256)>) {
        *self.block_reward.write() = reward;
    }

    pub fn finalized(&self) -> usize {
        self.finalized.load(Ordering::SeqCst)
    }
}

impl ConsensusEngine<MockState> for MockEngine {
    fn prepare(&self, header: &mut Header) -> Result<(), EngineError> {
        if let Some(err) = self.prepare_error.read().clone() {
            return Err(err);
        }
        header.difficulty = U256::from(1);
        Ok(())
    }

    fn finalize_and_assemble(
        &self,
        header: &Header,
        state: &mut MockState,
        txs: &[Transaction],
        _receipts: &[Receipt],
        randomness: &Randomness,
    ) -> Result<Block, EngineError> {
        if let Some((beneficiary, amount)) = *self.block_reward.read() {
            state.prepare(B256::ZERO, txs.len());
            state.add_balance(beneficiary, amount);
            state.add_log(Log::new_unchecked(
                beneficiary,
                vec![keccak256("BlockReward")],
                Bytes::from(amount.to_be_bytes::<32>().to_vec()),
            ));
        }

        let mut header = header.clone();
        header.state_root = state.intermediate_root(true);
        self.finalized.fetch_add(1, Ordering::SeqCst);

        Ok(Block {
            header,
            transactions: txs.to_vec(),
            randomness: *randomness,
        })
    }

    fn validator_engine(&self) -> Option<&dyn ValidatorEngine<MockState>> {
        self.validator
            .as_ref()
            .map(|engine| engine as &dyn ValidatorEngine<MockState>)
    }
}
