use alloy_primitives::{Address, B256};

/// Failure to open or read ledger state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("missing state for root {0}")]
    MissingState(B256),
    #[error("missing block {0}")]
    MissingBlock(B256),
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("not an elected validator")]
    Unauthorized,
    #[error("{0}")]
    Other(String),
}

/// Why the ledger refused to apply a transaction. The commit loop dispatches
/// on every variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplyError {
    #[error("gas limit reached")]
    GasLimitReached,
    #[error("nonce too low: address {address}, tx: {tx} state: {state}")]
    NonceTooLow { address: Address, tx: u64, state: u64 },
    #[error("nonce too high: address {address}, tx: {tx} state: {state}")]
    NonceTooHigh { address: Address, tx: u64, state: u64 },
    #[error("gasprice is less than gas price minimum")]
    GasPriceDoesNotExceedMinimum,
    #[error("insufficient funds for gas * price + value")]
    InsufficientFunds,
    #[error("intrinsic gas too low")]
    IntrinsicGas,
    #[error("execution failed: {0}")]
    Execution(String),
}

/// A block budget cannot cover the requested amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ResourceError {
    #[error("gas limit reached: have {have}, want {want}")]
    GasLimitReached { have: u64, want: u64 },
    #[error("block bytes limit reached: have {have}, want {want}")]
    BytesLimitReached { have: u64, want: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CurrencyError {
    #[error("unregistered fee currency {0}")]
    Unregistered(Address),
    #[error("invalid exchange rate for {0}")]
    InvalidRate(Address),
    #[error("conversion overflow")]
    Overflow,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractError {
    #[error("contract call reverted: {0}")]
    Reverted(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("transaction pool unavailable: {0}")]
    Unavailable(String),
}

/// Steps of the randomness beacon that can fail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RandomnessError {
    #[error("failed to get last commitment: {0}")]
    LastCommitment(ContractError),
    #[error("failed to recover the randomness cache after miss: {0}")]
    Recovery(LedgerError),
    #[error("failed to get last randomness cache entry for {0} and failed to recover")]
    CacheMiss(B256),
    #[error("failed to generate randomness: {0}")]
    Generate(EngineError),
    #[error("failed to reveal and commit randomness: {0}")]
    RevealAndCommit(ContractError),
}

/// Reasons a block build attempt ends without a block.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BlockBuildError {
    #[error("refusing to mine without fee recipient")]
    MissingFeeRecipient,
    #[error("consensus engine: {0}")]
    Engine(#[from] EngineError),
    #[error("ledger: {0}")]
    Ledger(#[from] LedgerError),
    #[error("randomness unavailable: {0}")]
    RandomnessUnavailable(#[from] RandomnessError),
    #[error("block resources exhausted: {0}")]
    ResourceExhausted(#[from] ResourceError),
    #[error("block building cancelled")]
    Cancelled,
    /// The node is misconfigured; block production has to stop.
    #[error("fatal miner misconfiguration: {0}")]
    Fatal(&'static str),
}

impl BlockBuildError {
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }

    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
