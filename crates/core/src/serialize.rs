//! Default serialization and hashing services.

use crate::{Hasher, Marshalizer};
use sha2::{Digest, Sha256};
use shardline_messages::CodecError;
use shardline_types::{BlockBody, BlockHeader, Hash};

/// SBOR-backed marshalizer.
#[derive(Debug, Default, Clone, Copy)]
pub struct SborMarshalizer;

impl Marshalizer for SborMarshalizer {
    fn marshal_header(&self, header: &BlockHeader) -> Result<Vec<u8>, CodecError> {
        sbor::basic_encode(header).map_err(|e| CodecError::Encode(format!("{:?}", e)))
    }

    fn marshal_body(&self, body: &BlockBody) -> Result<Vec<u8>, CodecError> {
        sbor::basic_encode(body).map_err(|e| CodecError::Encode(format!("{:?}", e)))
    }

    fn unmarshal_header(&self, bytes: &[u8]) -> Result<BlockHeader, CodecError> {
        sbor::basic_decode(bytes).map_err(|e| CodecError::Decode(format!("{:?}", e)))
    }

    fn unmarshal_body(&self, bytes: &[u8]) -> Result<BlockBody, CodecError> {
        sbor::basic_decode(bytes).map_err(|e| CodecError::Decode(format!("{:?}", e)))
    }
}

/// SHA-256 hasher.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256Hasher;

impl Hasher for Sha256Hasher {
    fn compute(&self, data: &[u8]) -> Hash {
        Hash::new(Sha256::digest(data).into())
    }
}

/// Hash of a header: `compute(marshal(header))`.
///
/// This is the hash every consensus message refers to, so leader and
/// validators must derive it through the same marshalizer and hasher.
pub fn header_hash(
    marshalizer: &dyn Marshalizer,
    hasher: &dyn Hasher,
    header: &BlockHeader,
) -> Result<Hash, CodecError> {
    Ok(hasher.compute(&marshalizer.marshal_header(header)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shardline_types::{ChainId, MiniBlock, ShardId};

    fn make_header() -> BlockHeader {
        BlockHeader {
            nonce: 3,
            prev_hash: Hash::from_bytes(b"prev"),
            prev_rand_seed: b"prs".to_vec(),
            rand_seed: b"rs".to_vec(),
            round: 3,
            shard_id: ShardId(1),
            timestamp: 12,
            chain_id: ChainId::new(b"c".as_slice()),
            root_hash: Hash::ZERO,
        }
    }

    #[test]
    fn test_header_roundtrip() {
        let m = SborMarshalizer;
        let header = make_header();
        let bytes = m.marshal_header(&header).unwrap();
        assert_eq!(m.unmarshal_header(&bytes).unwrap(), header);
    }

    #[test]
    fn test_body_roundtrip() {
        let m = SborMarshalizer;
        let body = BlockBody {
            mini_blocks: vec![MiniBlock {
                sender_shard: ShardId(0),
                receiver_shard: ShardId(1),
                tx_hashes: vec![Hash::from_bytes(b"tx")],
            }],
        };
        let bytes = m.marshal_body(&body).unwrap();
        assert_eq!(m.unmarshal_body(&bytes).unwrap(), body);
    }

    #[test]
    fn test_sha256_known_vector() {
        let h = Sha256Hasher.compute(b"");
        assert_eq!(
            h.to_string(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_header_hash_is_stable() {
        let m = SborMarshalizer;
        let h = Sha256Hasher;
        let a = header_hash(&m, &h, &make_header()).unwrap();
        let b = header_hash(&m, &h, &make_header()).unwrap();
        assert_eq!(a, b);

        let mut changed = make_header();
        changed.nonce += 1;
        assert_ne!(a, header_hash(&m, &h, &changed).unwrap());
    }
}
