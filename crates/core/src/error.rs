//! Error taxonomy for collaborator services.

use thiserror::Error;

/// Signing and verification failures.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("signing failed: {0}")]
    SignFailed(String),

    #[error("signature does not verify")]
    InvalidSignature,

    #[error("malformed public key")]
    MalformedPublicKey,
}

/// Broadcast transport failures. Recoverable from the subround's point of
/// view: the operation that hit one returns false and may be retried next
/// tick.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("broadcast failed: {0}")]
    BroadcastFailed(String),

    #[error(transparent)]
    Codec(#[from] shardline_messages::CodecError),
}

/// Block processor failures. A validation failure is fatal for the round.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("block creation failed: {0}")]
    CreateFailed(String),

    #[error("block validation failed: {0}")]
    InvalidBlock(String),

    #[error("time budget exhausted")]
    OutOfTime,
}
