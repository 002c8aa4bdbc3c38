/// Gas charged for a plain value transfer. Nothing cheaper can be included.
pub const TX_GAS: u64 = 21_000;

/// Block gas limit used when the on-chain parameter is not set.
pub const DEFAULT_GAS_LIMIT: u64 = 20_000_000;

/// Cap on the summed encoded size of all transactions in a block once the
/// bytes limit is active.
pub const MAX_TX_DATA_PER_BLOCK: u64 = 5 * 1024 * 1024;

/// Maximum size of the header extra data the miner is allowed to set.
pub const MAX_EXTRA_DATA_SIZE: usize = 32;

/// Namespace passed to the ledger prefetcher.
pub const PREFETCHER_NAMESPACE: &str = "miner";
