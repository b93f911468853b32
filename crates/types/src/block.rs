//! Block header and body.

use crate::{ChainId, Hash, ShardId};
use sbor::prelude::BasicSbor;

/// A block header.
///
/// Chained record: `prev_hash` commits to the previous header, and
/// `rand_seed` is the leader's signature over `prev_rand_seed`, giving every
/// round a verifiable source of randomness for the next leader election.
///
/// Payload commitments (`root_hash`) are opaque to consensus; the block
/// processor fills them in during block creation.
#[derive(Debug, Clone, PartialEq, Eq, BasicSbor)]
pub struct BlockHeader {
    /// Sequence number, one above the previous committed header (1 at genesis).
    pub nonce: u64,
    /// Hash of the previous committed header.
    pub prev_hash: Hash,
    /// Rand seed of the previous committed header.
    pub prev_rand_seed: Vec<u8>,
    /// Leader's signature over `prev_rand_seed`.
    pub rand_seed: Vec<u8>,
    /// Round this header was proposed in.
    pub round: u64,
    /// Shard this header belongs to.
    pub shard_id: ShardId,
    /// Round start timestamp, seconds since the unix epoch.
    pub timestamp: u64,
    /// Chain this header belongs to.
    pub chain_id: ChainId,
    /// Payload commitment, filled by the block processor.
    pub root_hash: Hash,
}

impl BlockHeader {
    /// A genesis header for the given shard and chain.
    ///
    /// Nonce zero, no parent, and an explicit initial rand seed that boots
    /// the rand-seed chain.
    pub fn genesis(shard_id: ShardId, chain_id: ChainId, rand_seed: Vec<u8>) -> Self {
        BlockHeader {
            nonce: 0,
            prev_hash: Hash::ZERO,
            prev_rand_seed: Vec::new(),
            rand_seed,
            round: 0,
            shard_id,
            timestamp: 0,
            chain_id,
            root_hash: Hash::ZERO,
        }
    }
}

/// A block body: the mini-blocks carrying transaction hashes.
#[derive(Debug, Clone, Default, PartialEq, Eq, BasicSbor)]
pub struct BlockBody {
    /// Per shard-pair transaction batches.
    pub mini_blocks: Vec<MiniBlock>,
}

impl BlockBody {
    /// An empty body.
    pub fn empty() -> Self {
        BlockBody::default()
    }

    /// Whether this body carries no mini-blocks.
    pub fn is_empty(&self) -> bool {
        self.mini_blocks.is_empty()
    }

    /// Total number of transaction hashes across all mini-blocks.
    pub fn tx_count(&self) -> usize {
        self.mini_blocks.iter().map(|mb| mb.tx_hashes.len()).sum()
    }
}

/// A batch of transactions flowing between two shards.
#[derive(Debug, Clone, PartialEq, Eq, BasicSbor)]
pub struct MiniBlock {
    /// Shard the transactions originate from.
    pub sender_shard: ShardId,
    /// Shard the transactions are destined for.
    pub receiver_shard: ShardId,
    /// Hashes of the included transactions.
    pub tx_hashes: Vec<Hash>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genesis_header_shape() {
        let genesis = BlockHeader::genesis(ShardId(0), ChainId::new(b"chain".as_slice()), b"seed".to_vec());
        assert_eq!(genesis.nonce, 0);
        assert_eq!(genesis.prev_hash, Hash::ZERO);
        assert!(genesis.prev_rand_seed.is_empty());
        assert_eq!(genesis.rand_seed, b"seed");
    }

    #[test]
    fn test_body_tx_count() {
        let body = BlockBody {
            mini_blocks: vec![
                MiniBlock {
                    sender_shard: ShardId(0),
                    receiver_shard: ShardId(0),
                    tx_hashes: vec![Hash::from_bytes(b"a"), Hash::from_bytes(b"b")],
                },
                MiniBlock {
                    sender_shard: ShardId(0),
                    receiver_shard: ShardId(1),
                    tx_hashes: vec![Hash::from_bytes(b"c")],
                },
            ],
        };
        assert_eq!(body.tx_count(), 3);
        assert!(!body.is_empty());
        assert!(BlockBody::empty().is_empty());
    }
}
