//! Collaborator seams for the shardline consensus architecture.
//!
//! This crate defines the capabilities consensus consumes, and the default
//! implementations a node wires in:
//!
//! - [`Rounder`]: the round clock ([`RoundClock`] is the wall-clock impl)
//! - [`BlockProcessor`]: block creation and validation under a time budget
//! - [`SingleSigner`]: detached signing ([`Ed25519Signer`])
//! - [`Marshalizer`] / [`Hasher`]: serialization and hashing seams
//!   ([`SborMarshalizer`], [`Sha256Hasher`])
//! - [`BroadcastMessenger`]: best-effort consensus broadcast
//! - [`AppStatusHandler`]: metrics sink
//!
//! # Architecture
//!
//! Consensus drivers hold each collaborator as an `Arc<dyn Trait>` and call
//! them synchronously. Long-running collaborator work (block creation,
//! block processing) is bounded by caller-supplied time predicates rather
//! than by async cancellation: the callee polls the predicate and returns
//! early.

mod error;
mod round;
mod serialize;
mod signer;
mod status;
mod traits;

pub use error::{CryptoError, ProcessError, TransportError};
pub use round::RoundClock;
pub use serialize::{header_hash, SborMarshalizer, Sha256Hasher};
pub use signer::Ed25519Signer;
pub use status::{
    InMemoryStatusHandler, NoopStatusHandler, METRIC_CREATED_PROPOSED_BLOCK,
    METRIC_PROCESSED_PROPOSED_BLOCK,
};
pub use traits::{
    AppStatusHandler, BlockProcessor, BroadcastMessenger, Hasher, Marshalizer, Rounder,
    SingleSigner,
};
