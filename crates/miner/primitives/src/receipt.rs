use alloy_primitives::{Bloom, Log, B256};

/// Outcome of applying one transaction to the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Receipt {
    /// Transaction hash, or the block hash for the block receipt.
    pub tx_hash: B256,
    pub status: bool,
    pub gas_used: u64,
    /// Gas used by this and every preceding transaction of the block.
    pub cumulative_gas_used: u64,
    pub logs: Vec<Log>,
    pub logs_bloom: Bloom,
}

impl Receipt {
    pub fn new(
        tx_hash: B256,
        status: bool,
        gas_used: u64,
        cumulative_gas_used: u64,
        logs: Vec<Log>,
    ) -> Self {
        let mut logs_bloom = Bloom::ZERO;
        for log in &logs {
            logs_bloom.accrue_log(log);
        }
        Self {
            tx_hash,
            status,
            gas_used,
            cumulative_gas_used,
            logs,
            logs_bloom,
        }
    }
}
