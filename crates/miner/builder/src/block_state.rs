use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use alloy_consensus::{Header, EMPTY_OMMER_ROOT_HASH};
use alloy_primitives::{Address, B256, B64, U256};
use beacon_miner_primitives::{
    constants::{DEFAULT_GAS_LIMIT, MAX_TX_DATA_PER_BLOCK, PREFETCHER_NAMESPACE},
    Fork, Randomness, Receipt, Transaction,
};
use tracing::{debug, error, warn};

use crate::{
    currency::create_conversion_functions,
    error::{BlockBuildError, CurrencyError},
    gas_pool::{BytesBlock, GasPool, MultiGasPool},
    randomness,
    sys_ctx::SysContractCallCtx,
    traits::{ChainProvider, ConsensusEngine, ParamsOracle, StateDb},
    worker::{MinerComponents, Worker},
};

/// The mutable context of one block under construction.
///
/// Owns the ledger snapshot the block executes against. Dropping it stops the
/// ledger prefetcher, whichever way the build ends.
#[derive(Debug)]
pub struct BlockState<S: StateDb> {
    pub(crate) state: S,
    pub(crate) tcount: usize,
    pub(crate) gas_limit: u64,
    pub(crate) gas_pool: GasPool,
    pub(crate) bytes_block: Option<BytesBlock>,
    pub(crate) multi_gas_pool: MultiGasPool,
    pub(crate) sys_ctx: Arc<SysContractCallCtx>,
    pub(crate) header: Header,
    pub(crate) txs: Vec<Transaction>,
    pub(crate) receipts: Vec<Receipt>,
    pub(crate) randomness: Randomness,
    pub(crate) tx_fee_recipient: Address,
    /// Highest ranking price a transaction was rejected at for paying below
    /// the gas price minimum.
    pub(crate) price_floor: Option<U256>,
}

impl<S: StateDb> BlockState<S> {
    /// Opens a new block on top of the current chain head.
    pub(crate) fn prepare<N>(worker: &Worker<N>) -> Result<Self, BlockBuildError>
    where
        N: MinerComponents<State = S>,
    {
        let config = worker.config.read();

        let parent = worker.client.current_block();
        let timestamp = unix_now().max(parent.timestamp + 1);
        let number = parent.number + 1;

        let mut header = Header {
            parent_hash: parent.hash(),
            number,
            extra_data: config.extra.clone(),
            timestamp,
            ..Default::default()
        };

        let mut tx_fee_recipient = config.tx_fee_recipient;
        if !worker.chain_config.is_active(Fork::SplitFeeRecipient, number)
            && tx_fee_recipient != config.validator
        {
            tx_fee_recipient = config.validator;
            warn!(
                target: "miner",
                validator = %config.validator,
                "fee recipient cannot differ from the validator before the split fee recipient fork, using the validator"
            );
        }

        if worker.is_running() {
            if tx_fee_recipient == Address::ZERO {
                error!(target: "miner", "refusing to mine without fee recipient");
                return Err(BlockBuildError::MissingFeeRecipient);
            }
            header.beneficiary = tx_fee_recipient;
        }

        worker.engine.prepare(&mut header).inspect_err(|err| {
            error!(target: "miner", %err, "failed to prepare header for mining");
        })?;

        let mut state = worker.client.state_at(parent.state_root).inspect_err(|err| {
            error!(target: "miner", %err, "failed to get the block state");
        })?;
        state.start_prefetcher(PREFETCHER_NAMESPACE);

        let mut block = Self {
            state,
            tcount: 0,
            gas_limit: 0,
            gas_pool: GasPool::default(),
            bytes_block: None,
            multi_gas_pool: MultiGasPool::new(0, &[], 0.0, &Default::default()),
            sys_ctx: Arc::default(),
            header,
            txs: Vec::new(),
            receipts: Vec::new(),
            randomness: Randomness::EMPTY,
            tx_fee_recipient,
            price_floor: None,
        };

        let gas_limit = worker
            .params
            .block_gas_limit(&block.header, &block.state)
            .unwrap_or(DEFAULT_GAS_LIMIT);
        block.gas_limit = gas_limit;
        block.gas_pool = GasPool::new(gas_limit);

        if worker.chain_config.is_active(Fork::BaseFee, number) {
            block.header.gas_limit = gas_limit;
            block.header.difficulty = U256::ZERO;
            block.header.nonce = B64::ZERO;
            block.header.ommers_hash = EMPTY_OMMER_ROOT_HASH;
            block.header.mix_hash = B256::ZERO;
            let base_fee = worker
                .params
                .base_fee(parent.header(), &block.state.copy());
            block.header.base_fee_per_gas = Some(base_fee);
        }

        if worker.chain_config.is_active(Fork::TxBytesLimit, number) {
            block.bytes_block = Some(BytesBlock::with_limit(MAX_TX_DATA_PER_BLOCK));
        }

        block.sys_ctx = Arc::new(SysContractCallCtx::new(
            &block.header,
            &block.state.copy(),
            &worker.params,
        ));
        block.multi_gas_pool = MultiGasPool::new(
            gas_limit,
            block.sys_ctx.whitelisted_currencies(),
            config.fee_currency_default,
            &config.fee_currency_limits,
        );

        randomness::participate(worker, &mut block, config.validator)?;

        debug!(
            target: "miner",
            number,
            gas_limit,
            fee_recipient = %block.tx_fee_recipient,
            "prepared block"
        );
        Ok(block)
    }

    pub const fn header(&self) -> &Header {
        &self.header
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.txs
    }

    /// Receipts of the applied transactions, plus the block receipt once the
    /// block has been finalized.
    pub fn receipts(&self) -> &[Receipt] {
        &self.receipts
    }

    /// Receipts of the applied transactions only.
    pub fn transaction_receipts(&self) -> &[Receipt] {
        &self.receipts[..self.txs.len().min(self.receipts.len())]
    }

    pub const fn randomness(&self) -> &Randomness {
        &self.randomness
    }

    pub const fn tx_count(&self) -> usize {
        self.tcount
    }

    pub const fn tx_fee_recipient(&self) -> Address {
        self.tx_fee_recipient
    }

    pub const fn price_floor(&self) -> Option<U256> {
        self.price_floor
    }

    pub const fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    pub const fn gas_pool(&self) -> &GasPool {
        &self.gas_pool
    }

    pub const fn bytes_block(&self) -> Option<&BytesBlock> {
        self.bytes_block.as_ref()
    }

    pub const fn multi_gas_pool(&self) -> &MultiGasPool {
        &self.multi_gas_pool
    }

    pub const fn sys_ctx(&self) -> &Arc<SysContractCallCtx> {
        &self.sys_ctx
    }

    pub const fn state(&self) -> &S {
        &self.state
    }

    pub(crate) fn conversion_functions<P>(
        &self,
        params: &P,
    ) -> (
        impl Fn(Option<Address>) -> U256 + Clone,
        impl Fn(U256, Option<Address>) -> Result<U256, CurrencyError> + Clone,
    )
    where
        P: ParamsOracle<S> + ?Sized,
    {
        create_conversion_functions(&self.sys_ctx, params, &self.header, &self.state)
    }
}

impl<S: StateDb> Drop for BlockState<S> {
    fn drop(&mut self) {
        self.state.stop_prefetcher();
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
