use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use alloy_primitives::{utils::format_ether, Log};
use beacon_miner_primitives::{ChainConfig, Fork};
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::{
    block_state::BlockState,
    config::MinerConfig,
    error::BlockBuildError,
    fees::total_fees,
    finalize::BuiltBlock,
    metrics::BlockBuilderMetrics,
    traits::{
        ChainProvider, CommitmentCache, ConsensusEngine, ParamsOracle, RandomContract, StateDb,
        TransactionPool,
    },
};

/// Capacity of the pending log channel.
const PENDING_LOGS_CAPACITY: usize = 16;

/// The collaborators a [`Worker`] builds blocks with.
pub trait MinerComponents: Send + Sync + 'static {
    type State: StateDb;
    type Client: ChainProvider<State = Self::State>;
    type Engine: ConsensusEngine<Self::State>;
    type Pool: TransactionPool;
    type Params: ParamsOracle<Self::State>;
    type Random: RandomContract<Self::State>;
    type Cache: CommitmentCache;
}

/// Instances of every [`MinerComponents`] type.
pub struct Components<N: MinerComponents> {
    pub client: N::Client,
    pub engine: N::Engine,
    pub pool: N::Pool,
    pub params: N::Params,
    pub random: N::Random,
    pub cache: N::Cache,
}

/// Builds candidate blocks on top of the current chain head.
pub struct Worker<N: MinerComponents> {
    pub(crate) chain_config: Arc<ChainConfig>,
    pub(crate) config: Arc<RwLock<MinerConfig>>,
    pub(crate) client: N::Client,
    pub(crate) engine: N::Engine,
    pub(crate) pool: N::Pool,
    pub(crate) params: N::Params,
    pub(crate) random: N::Random,
    pub(crate) cache: N::Cache,
    running: AtomicBool,
    pending_logs: broadcast::Sender<Vec<Log>>,
    pub(crate) metrics: BlockBuilderMetrics,
}

impl<N: MinerComponents> Worker<N> {
    pub fn new(
        chain_config: Arc<ChainConfig>,
        config: Arc<RwLock<MinerConfig>>,
        components: Components<N>,
    ) -> Self {
        let Components {
            client,
            engine,
            pool,
            params,
            random,
            cache,
        } = components;
        let (pending_logs, _) = broadcast::channel(PENDING_LOGS_CAPACITY);

        Self {
            chain_config,
            config,
            client,
            engine,
            pool,
            params,
            random,
            cache,
            running: AtomicBool::new(false),
            pending_logs,
            metrics: BlockBuilderMetrics::default(),
        }
    }

    /// Marks the worker as actively producing blocks.
    pub fn start(&self) {
        self.running.store(true, Ordering::SeqCst);
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn chain_config(&self) -> &ChainConfig {
        &self.chain_config
    }

    /// Shared miner configuration. Changes apply to the next block.
    pub fn config(&self) -> &Arc<RwLock<MinerConfig>> {
        &self.config
    }

    /// Logs of transactions applied while the worker is not producing blocks.
    pub fn subscribe_pending_logs(&self) -> broadcast::Receiver<Vec<Log>> {
        self.pending_logs.subscribe()
    }

    pub(crate) fn publish_pending_logs(&self, logs: Vec<Log>) {
        // Nobody listening is fine.
        let _ = self.pending_logs.send(logs);
    }

    /// Opens a new block on top of the current head.
    pub fn prepare_block(&self) -> Result<BlockState<N::State>, BlockBuildError> {
        BlockState::prepare(self)
    }

    /// Builds one block: prepares it, fills it from the pool and finalizes it.
    ///
    /// A [`BlockBuildError::Fatal`] error also stops the worker.
    pub fn build_block(&self, cancel: &CancellationToken) -> Result<BuiltBlock, BlockBuildError> {
        self.metrics.inc_initiated_builds();

        let result = self.try_build_block(cancel);
        match &result {
            Ok(built) => {
                self.metrics
                    .record_block_metrics(built.block.header.gas_used, built.block.transactions.len());
            }
            Err(err) if err.is_cancelled() => {
                self.metrics.inc_cancelled_builds();
                warn!(target: "miner", "block building cancelled");
            }
            Err(err) if err.is_fatal() => {
                self.metrics.inc_failed_builds();
                error!(target: "miner", %err, "stopping block production");
                self.stop();
            }
            Err(err) => {
                self.metrics.inc_failed_builds();
                error!(target: "miner", %err, "failed to build block");
            }
        }
        result
    }

    fn try_build_block(&self, cancel: &CancellationToken) -> Result<BuiltBlock, BlockBuildError> {
        let mut block_state = self.prepare_block()?;
        block_state.select_and_apply_transactions(cancel, self)?;
        let block = block_state.finalize_and_assemble(self)?;

        let (base_fee_fn, to_native) = block_state.conversion_functions(&self.params);
        let fees = total_fees(
            &block,
            block_state.receipts(),
            base_fee_fn,
            to_native,
            self.chain_config.is_active(Fork::CurrencyBaseFee, block.number()),
        );

        info!(
            target: "miner",
            number = block.number(),
            hash = %block.hash(),
            txs = block.transactions.len(),
            gas_used = block.header.gas_used,
            fees = %format_ether(fees),
            "built new block"
        );

        Ok(BuiltBlock {
            block,
            receipts: block_state.receipts().to_vec(),
            fees,
        })
    }
}

impl<N: MinerComponents> std::fmt::Debug for Worker<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("chain_config", &self.chain_config)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}
