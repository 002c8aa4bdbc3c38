use metrics::{Counter, Histogram};
use metrics_derive::Metrics;

/// Block builder metrics
#[derive(Clone, Metrics)]
#[metrics(scope = "miner")]
pub struct BlockBuilderMetrics {
    /// Total number of initiated block builds.
    pub(crate) initiated_builds: Counter,
    /// Total number of block builds that ended with an error.
    pub(crate) failed_builds: Counter,
    /// Total number of block builds that were cancelled.
    pub(crate) cancelled_builds: Counter,
    /// Total number of transactions committed to a block.
    pub(crate) committed_transactions: Counter,
    /// Total number of transactions that were skipped or failed to apply.
    pub(crate) skipped_transactions: Counter,
    /// Histogram of block gas usage.
    pub(crate) block_gas_used: Histogram,
    /// Histogram of block transaction count.
    pub(crate) block_transaction_count: Histogram,
}

impl BlockBuilderMetrics {
    pub(crate) fn inc_initiated_builds(&self) {
        self.initiated_builds.increment(1);
    }

    pub(crate) fn inc_failed_builds(&self) {
        self.failed_builds.increment(1);
    }

    pub(crate) fn inc_cancelled_builds(&self) {
        self.cancelled_builds.increment(1);
    }

    pub(crate) fn inc_committed_transactions(&self) {
        self.committed_transactions.increment(1);
    }

    pub(crate) fn inc_skipped_transactions(&self) {
        self.skipped_transactions.increment(1);
    }

    /// Record block metrics (gas, transaction count)
    pub(crate) fn record_block_metrics(&self, gas_used: u64, tx_count: usize) {
        self.block_gas_used.record(gas_used as f64);
        self.block_transaction_count.record(tx_count as f64);
    }
}
