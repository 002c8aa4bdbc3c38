//! Primitive types shared by the block builder and its collaborators.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

pub mod block;
pub mod chain_config;
pub mod constants;
pub mod randomness;
pub mod receipt;
pub mod transaction;

pub use block::{Block, SealedHeader};
pub use chain_config::{ChainConfig, Fork};
pub use randomness::Randomness;
pub use receipt::Receipt;
pub use transaction::Transaction;

/// Re-exported so downstream crates agree on the header type.
pub use alloy_consensus::Header;
