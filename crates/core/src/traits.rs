//! The capability traits consensus consumes.
//!
//! Each trait is a seam: production wires in the real service, tests wire in
//! mocks. All are object-safe so drivers can hold them as `Arc<dyn Trait>`.

use crate::{CryptoError, ProcessError, TransportError};
use shardline_messages::{CodecError, ConsensusMessage};
use shardline_types::{BlockBody, BlockHeader, Hash, KeyPair, PublicKey, RoundIndex, Signature};
use std::time::Duration;

/// The round clock: monotone round index plus intra-round time arithmetic.
///
/// All times are durations since the unix epoch; the clock owns "now" so
/// that tests and simulations can drive time explicitly.
pub trait Rounder: Send + Sync {
    /// Index of the current round.
    fn index(&self) -> RoundIndex;

    /// Start timestamp of the current round.
    fn time_stamp(&self) -> Duration;

    /// Total duration of one round.
    fn time_duration(&self) -> Duration;

    /// Current time.
    fn now(&self) -> Duration;

    /// Time remaining until `max` has elapsed since `start`, saturating at
    /// zero.
    fn remaining_time(&self, start: Duration, max: Duration) -> Duration {
        let elapsed = self.now().saturating_sub(start);
        max.saturating_sub(elapsed)
    }
}

/// Deterministic block creation and validation under a time budget.
///
/// `create_block` and `process_block` are expected to poll the supplied
/// predicate and return early when time runs out; the predicate is the only
/// back-pressure the caller applies.
pub trait BlockProcessor: Send + Sync {
    /// Allocate a fresh header for `round`. Chain linkage fields are filled
    /// in by the caller.
    fn create_new_header(&self, round: u64) -> BlockHeader;

    /// Populate a block for the given header, returning the final header and
    /// body. `have_time` returns false once the caller's window has closed.
    fn create_block(
        &self,
        header: BlockHeader,
        have_time: &dyn Fn() -> bool,
    ) -> Result<(BlockHeader, BlockBody), ProcessError>;

    /// Validate and execute a received block. `remaining_time` reports how
    /// much of the processing budget is left.
    fn process_block(
        &self,
        header: &BlockHeader,
        body: &BlockBody,
        remaining_time: &dyn Fn() -> Duration,
    ) -> Result<(), ProcessError>;
}

/// Detached single signing.
pub trait SingleSigner: Send + Sync {
    /// Sign `message` with `keypair`.
    fn sign(&self, keypair: &KeyPair, message: &[u8]) -> Result<Signature, CryptoError>;

    /// Verify `signature` over `message` under `public_key`.
    fn verify(
        &self,
        public_key: &PublicKey,
        message: &[u8],
        signature: &Signature,
    ) -> Result<(), CryptoError>;
}

/// Serialization seam for the artifacts consensus hashes and ships.
pub trait Marshalizer: Send + Sync {
    fn marshal_header(&self, header: &BlockHeader) -> Result<Vec<u8>, CodecError>;
    fn marshal_body(&self, body: &BlockBody) -> Result<Vec<u8>, CodecError>;
    fn unmarshal_header(&self, bytes: &[u8]) -> Result<BlockHeader, CodecError>;
    fn unmarshal_body(&self, bytes: &[u8]) -> Result<BlockBody, CodecError>;
}

/// Hashing seam.
pub trait Hasher: Send + Sync {
    /// Hash `data`.
    fn compute(&self, data: &[u8]) -> Hash;
}

/// Best-effort broadcast of a consensus message to the consensus group.
pub trait BroadcastMessenger: Send + Sync {
    fn broadcast_consensus_message(&self, message: &ConsensusMessage)
        -> Result<(), TransportError>;
}

/// Metrics sink.
pub trait AppStatusHandler: Send + Sync {
    /// Record an unsigned gauge value.
    fn set_u64(&self, name: &str, value: u64);
}
