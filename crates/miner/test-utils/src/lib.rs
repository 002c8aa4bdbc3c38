//! In-memory collaborators for exercising the block builder.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

use alloy_primitives::{address, Address};

pub const DEV_CHAIN_ID: u64 = 44787;

pub const ALICE: Address = address!("00000000000000000000000000000000000a11ce");
pub const BOB: Address = address!("0000000000000000000000000000000000000b0b");
pub const CAROL: Address = address!("00000000000000000000000000000000000ca201");
pub const DAVE: Address = address!("000000000000000000000000000000000000da7e");

pub const VALIDATOR: Address = address!("000000000000000000000000000000000000a11d");
pub const FEE_RECIPIENT: Address = address!("000000000000000000000000000000000000fee0");

/// A whitelisted fee currency.
pub const CUSD: Address = address!("765de816845861e75a25fca122bb6898b8b1282a");

/// Calls to this address change the state and then fail.
pub const REVERTING_CONTRACT: Address = address!("00000000000000000000000000000000000dead0");

pub mod chain;
pub mod contracts;
pub mod engine;
pub mod node;
pub mod pool;
pub mod state;
pub mod tx;
