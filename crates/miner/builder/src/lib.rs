//! Builds candidate blocks: admission of pending transactions under the block
//! budgets, participation in the randomness beacon and handoff to the
//! consensus engine.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

pub mod args;
pub mod block_state;
pub mod commit;
pub mod config;
pub mod currency;
pub mod error;
pub mod fees;
pub mod finalize;
pub mod gas_pool;
pub mod metrics;
pub mod ordering;
pub mod randomness;
pub mod sandbox;
pub mod sys_ctx;
pub mod traits;
pub mod worker;

pub use block_state::BlockState;
pub use commit::CommitLoopState;
pub use config::MinerConfig;
pub use error::BlockBuildError;
pub use finalize::BuiltBlock;
pub use worker::{Components, MinerComponents, Worker};
