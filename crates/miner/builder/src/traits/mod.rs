//! Contracts the block builder expects from the rest of the node.

pub mod chain;
pub mod contracts;
pub mod engine;
pub mod pool;

pub use chain::{ChainProvider, SnapshotId, StateDb, TxEnv};
pub use contracts::{CommitmentCache, ParamsOracle, RandomContract};
pub use engine::{ConsensusEngine, ValidatorEngine};
pub use pool::{PendingTransactions, TransactionPool};
