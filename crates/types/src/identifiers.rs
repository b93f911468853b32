//! Identifier newtypes.

use sbor::prelude::BasicSbor;
use std::fmt;

/// Round index as seen by the round clock.
///
/// Signed: the clock can report a negative index before genesis time.
pub type RoundIndex = i64;

/// Shard identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, BasicSbor)]
pub struct ShardId(pub u32);

impl fmt::Display for ShardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shard-{}", self.0)
    }
}

/// Chain identifier carried in every header and consensus message.
///
/// Opaque bytes; nodes on different chains never accept each other's
/// messages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, BasicSbor)]
pub struct ChainId(pub Vec<u8>);

impl ChainId {
    /// Create a chain id from raw bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        ChainId(bytes.into())
    }

    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&[u8]> for ChainId {
    fn from(bytes: &[u8]) -> Self {
        ChainId(bytes.to_vec())
    }
}
