//! Chain-tip access.
//!
//! Consensus only ever needs the current committed header (plus its hash)
//! and the genesis header; everything else about storage is someone else's
//! problem. The trait is the seam, `InMemoryBlockchain` the implementation
//! used by nodes and tests alike — persistence sits behind whatever feeds
//! `set_current`.

use crate::{BlockHeader, Hash};
use parking_lot::RwLock;

/// Read access to the chain tip.
pub trait Blockchain: Send + Sync {
    /// The latest committed header, if any block has been committed yet.
    fn current_header(&self) -> Option<BlockHeader>;

    /// Hash of the latest committed header.
    fn current_header_hash(&self) -> Option<Hash>;

    /// The genesis header.
    fn genesis_header(&self) -> BlockHeader;

    /// Hash of the genesis header.
    fn genesis_header_hash(&self) -> Hash;
}

/// In-memory chain tip.
pub struct InMemoryBlockchain {
    genesis: BlockHeader,
    genesis_hash: Hash,
    current: RwLock<Option<(BlockHeader, Hash)>>,
}

impl InMemoryBlockchain {
    /// Create a chain with only the genesis header committed.
    pub fn new(genesis: BlockHeader, genesis_hash: Hash) -> Self {
        InMemoryBlockchain {
            genesis,
            genesis_hash,
            current: RwLock::new(None),
        }
    }

    /// Record a newly committed header as the chain tip.
    pub fn set_current(&self, header: BlockHeader, hash: Hash) {
        *self.current.write() = Some((header, hash));
    }
}

impl Blockchain for InMemoryBlockchain {
    fn current_header(&self) -> Option<BlockHeader> {
        self.current.read().as_ref().map(|(h, _)| h.clone())
    }

    fn current_header_hash(&self) -> Option<Hash> {
        self.current.read().as_ref().map(|(_, h)| *h)
    }

    fn genesis_header(&self) -> BlockHeader {
        self.genesis.clone()
    }

    fn genesis_header_hash(&self) -> Hash {
        self.genesis_hash
    }
}
