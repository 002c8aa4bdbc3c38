use std::{cmp::Ordering, collections::HashMap};

use alloy_consensus::Header;
use alloy_primitives::{Log, B256, U256};
use beacon_miner::{
    error::{ApplyError, LedgerError},
    traits::{ChainProvider, StateDb, TxEnv},
};
use beacon_miner_primitives::{constants::TX_GAS, Receipt, SealedHeader, Transaction};
use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;

use crate::{
    state::{MockState, PrefetchTracker},
    REVERTING_CONTRACT,
};

/// Gas charged per byte of input.
pub const TX_DATA_GAS: u64 = 16;

pub fn intrinsic_gas(tx: &Transaction) -> u64 {
    TX_GAS + TX_DATA_GAS * tx.input.len() as u64
}

/// A chain holding a single head block and the states it knows about.
#[derive(Debug)]
pub struct MockChain {
    head: RwLock<SealedHeader>,
    states: RwLock<HashMap<B256, MockState>>,
    tracker: PrefetchTracker,
    /// Cancelled once the given number of transactions applied successfully.
    cancel_after: RwLock<Option<(usize, CancellationToken)>>,
}

impl MockChain {
    /// A chain whose head at height 0 commits to `genesis`.
    pub fn new(genesis: MockState) -> Self {
        let header = Header {
            number: 0,
            timestamp: 1_000,
            state_root: genesis.root(),
            ..Default::default()
        };
        let tracker = genesis.tracker().clone();
        Self {
            head: RwLock::new(SealedHeader::seal(header)),
            states: RwLock::new(HashMap::from([(genesis.root(), genesis)])),
            tracker,
            cancel_after: RwLock::new(None),
        }
    }

    /// Cancels `cancel` right after the `applied`th successful transaction.
    pub fn cancel_after(&self, applied: usize, cancel: CancellationToken) {
        *self.cancel_after.write() = Some((applied, cancel));
    }

    pub fn head(&self) -> SealedHeader {
        self.head.read().clone()
    }

    /// Replaces the head. Its state root need not be known.
    pub fn set_head(&self, header: Header) {
        *self.head.write() = SealedHeader::seal(header);
    }

    pub fn tracker(&self) -> &PrefetchTracker {
        &self.tracker
    }

    /// The state a fresh block would be built on.
    pub fn head_state(&self) -> MockState {
        self.states
            .read()
            .get(&self.head().state_root)
            .map(StateDb::copy)
            .unwrap_or_default()
    }
}

impl ChainProvider for MockChain {
    type State = MockState;

    fn current_block(&self) -> SealedHeader {
        self.head()
    }

    fn state_at(&self, root: B256) -> Result<MockState, LedgerError> {
        self.states
            .read()
            .get(&root)
            .map(StateDb::copy)
            .ok_or(LedgerError::MissingState(root))
    }

    fn apply_transaction(
        &self,
        env: TxEnv<'_, MockState>,
        tx: &Transaction,
    ) -> Result<Receipt, ApplyError> {
        let TxEnv {
            header,
            state,
            gas_pool,
            fee_recipient,
            sys_ctx,
        } = env;

        if gas_pool.gas() < tx.gas_limit {
            return Err(ApplyError::GasLimitReached);
        }

        let account = state.account(tx.signer);
        match tx.nonce.cmp(&account.nonce) {
            Ordering::Less => {
                return Err(ApplyError::NonceTooLow {
                    address: tx.signer,
                    tx: tx.nonce,
                    state: account.nonce,
                })
            }
            Ordering::Greater => {
                return Err(ApplyError::NonceTooHigh {
                    address: tx.signer,
                    tx: tx.nonce,
                    state: account.nonce,
                })
            }
            Ordering::Equal => {}
        }

        let minimum = sys_ctx.gas_price_minimum(tx.fee_currency);
        if tx.max_fee_per_gas < minimum {
            return Err(ApplyError::GasPriceDoesNotExceedMinimum);
        }

        let gas_used = intrinsic_gas(tx);
        if gas_used > tx.gas_limit {
            return Err(ApplyError::IntrinsicGas);
        }

        let max_cost = U256::from(tx.gas_limit)
            .saturating_mul(tx.max_fee_per_gas)
            .saturating_add(tx.value);
        if account.balance < max_cost {
            return Err(ApplyError::InsufficientFunds);
        }

        gas_pool
            .sub_gas(tx.gas_limit)
            .map_err(|_| ApplyError::GasLimitReached)?;

        let tx_hash = tx.hash();
        let tip = tx.effective_gas_tip(Some(minimum));
        state.increment_nonce(tx.signer);
        state.sub_balance(tx.signer, U256::from(gas_used) * (minimum + tip) + tx.value);
        state.add_balance(fee_recipient, U256::from(gas_used) * tip);
        state.add_log(Log::new_unchecked(
            tx.to.unwrap_or(tx.signer),
            vec![tx_hash],
            tx.input.clone(),
        ));

        if tx.to == Some(REVERTING_CONTRACT) {
            return Err(ApplyError::Execution("execution reverted".to_string()));
        }

        if let Some(to) = tx.to {
            state.add_balance(to, tx.value);
        }
        gas_pool.add_gas(tx.gas_limit - gas_used);

        if let Some((remaining, cancel)) = self.cancel_after.write().as_mut() {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                cancel.cancel();
            }
        }

        Ok(Receipt::new(
            tx_hash,
            true,
            gas_used,
            header.gas_used + gas_used,
            state.current_logs(),
        ))
    }
}
