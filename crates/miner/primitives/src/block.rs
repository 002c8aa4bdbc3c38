use alloy_consensus::Header;
use alloy_primitives::B256;

use crate::{Randomness, Transaction};

/// A header together with its hash.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Deref)]
pub struct SealedHeader {
    #[deref]
    header: Header,
    hash: B256,
}

impl SealedHeader {
    pub fn seal(header: Header) -> Self {
        let hash = header.hash_slow();
        Self { header, hash }
    }

    pub const fn hash(&self) -> B256 {
        self.hash
    }

    pub const fn header(&self) -> &Header {
        &self.header
    }

    pub fn into_header(self) -> Header {
        self.header
    }
}

/// A block as assembled by the consensus engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    pub header: Header,
    pub transactions: Vec<Transaction>,
    pub randomness: Randomness,
}

impl Block {
    /// Hash of the current header. The validator set diff may still change it,
    /// so this is never cached.
    pub fn hash(&self) -> B256 {
        self.header.hash_slow()
    }

    pub const fn number(&self) -> u64 {
        self.header.number
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }
}
