use std::sync::Arc;

use alloy_primitives::Address;
use beacon_miner::{
    BlockBuildError, BlockState, BuiltBlock, CommitLoopState, Components, MinerComponents,
    MinerConfig, Worker,
};
use beacon_miner_primitives::ChainConfig;
use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;

use crate::{
    chain::MockChain,
    contracts::{MockCommitmentCache, MockParams, MockRandom},
    engine::MockEngine,
    pool::MockPool,
    state::MockState,
    ALICE, BOB, CAROL, DAVE, DEV_CHAIN_ID, FEE_RECIPIENT, VALIDATOR,
};

/// Wires the mocks into a [`Worker`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MockNode;

impl MinerComponents for MockNode {
    type State = MockState;
    type Client = Arc<MockChain>;
    type Engine = Arc<MockEngine>;
    type Pool = Arc<MockPool>;
    type Params = Arc<MockParams>;
    type Random = Arc<MockRandom>;
    type Cache = Arc<MockCommitmentCache>;
}

pub fn miner_config() -> MinerConfig {
    MinerConfig {
        validator: VALIDATOR,
        tx_fee_recipient: FEE_RECIPIENT,
        ..Default::default()
    }
}

/// A running worker over fresh mocks, with handles to every mock.
#[derive(Debug)]
pub struct TestHarness {
    pub chain: Arc<MockChain>,
    pub engine: Arc<MockEngine>,
    pub pool: Arc<MockPool>,
    pub params: Arc<MockParams>,
    pub random: Arc<MockRandom>,
    pub cache: Arc<MockCommitmentCache>,
    pub config: Arc<RwLock<MinerConfig>>,
    pub worker: Worker<MockNode>,
}

#[bon::bon]
impl TestHarness {
    #[builder]
    pub fn new(
        #[builder(default = ChainConfig::all_active(DEV_CHAIN_ID))] chain_config: ChainConfig,
        #[builder(default = MockState::funded(&[ALICE, BOB, CAROL, DAVE]))] genesis: MockState,
        #[builder(default)] engine: MockEngine,
        #[builder(default = miner_config())] config: MinerConfig,
        #[builder(default = true)] running: bool,
        gas_limit: Option<u64>,
    ) -> Self {
        let chain = Arc::new(MockChain::new(genesis));
        let engine = Arc::new(engine);
        let pool = Arc::new(MockPool::default());
        let params = Arc::new(MockParams::default());
        params.set_gas_limit(gas_limit);
        let random = Arc::new(MockRandom::default());
        let cache = Arc::new(MockCommitmentCache::default());
        let config = Arc::new(RwLock::new(config));

        let worker = Worker::new(
            Arc::new(chain_config),
            Arc::clone(&config),
            Components {
                client: Arc::clone(&chain),
                engine: Arc::clone(&engine),
                pool: Arc::clone(&pool),
                params: Arc::clone(&params),
                random: Arc::clone(&random),
                cache: Arc::clone(&cache),
            },
        );
        if running {
            worker.start();
        }

        Self {
            chain,
            engine,
            pool,
            params,
            random,
            cache,
            config,
            worker,
        }
    }

    pub fn build(&self) -> Result<BuiltBlock, BlockBuildError> {
        self.worker.build_block(&CancellationToken::new())
    }

    /// Prepares a block and runs the commit loop over the pool, without
    /// finalizing.
    pub fn fill(&self) -> Result<BlockState<MockState>, BlockBuildError> {
        self.commit().map(|(block, _)| block)
    }

    /// Like [`Self::fill`], also returning where the commit loop stopped.
    pub fn commit(&self) -> Result<(BlockState<MockState>, CommitLoopState), BlockBuildError> {
        let mut block = self.worker.prepare_block()?;
        let state = block.select_and_apply_transactions(&CancellationToken::new(), &self.worker)?;
        Ok((block, state))
    }

    /// Senders and nonces of `block`'s transactions, in order.
    pub fn included(block: &BlockState<MockState>) -> Vec<(Address, u64)> {
        block
            .transactions()
            .iter()
            .map(|tx| (tx.signer, tx.nonce))
            .collect()
    }
}
