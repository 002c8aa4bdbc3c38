use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

/// The commit-reveal pair this block contributes to the randomness beacon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Randomness {
    /// Preimage of the commitment made in this validator's previous block.
    pub revealed: B256,
    /// Commitment for the value revealed in this validator's next block.
    pub committed: B256,
}

impl Randomness {
    /// Recorded by blocks that do not take part in the beacon.
    pub const EMPTY: Self = Self {
        revealed: B256::ZERO,
        committed: B256::ZERO,
    };

    pub const fn new(revealed: B256, committed: B256) -> Self {
        Self {
            revealed,
            committed,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }
}
