//! Message encoding and decoding for network transport.
//!
//! # Wire Format
//!
//! ```text
//! [version: u8][payload: SBOR-encoded ConsensusMessage]
//! ```
//!
//! The type byte lives inside the message (`msg_type`), so a single topic
//! carries every consensus shape and the receiver dispatches after decoding.

use crate::ConsensusMessage;
use thiserror::Error;

/// Current wire format version.
pub const WIRE_VERSION: u8 = 1;

/// Errors that can occur during message encoding/decoding.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("unknown wire version: {0}")]
    UnknownVersion(u8),

    #[error("message too short")]
    MessageTooShort,

    #[error("SBOR decode error: {0}")]
    Decode(String),

    #[error("SBOR encode error: {0}")]
    Encode(String),
}

/// Encode a consensus message to wire format.
pub fn encode_consensus_message(message: &ConsensusMessage) -> Result<Vec<u8>, CodecError> {
    let payload =
        sbor::basic_encode(message).map_err(|e| CodecError::Encode(format!("{:?}", e)))?;

    let mut bytes = Vec::with_capacity(1 + payload.len());
    bytes.push(WIRE_VERSION);
    bytes.extend(payload);
    Ok(bytes)
}

/// Decode a consensus message from wire format.
pub fn decode_consensus_message(data: &[u8]) -> Result<ConsensusMessage, CodecError> {
    if data.is_empty() {
        return Err(CodecError::MessageTooShort);
    }

    let version = data[0];
    if version != WIRE_VERSION {
        return Err(CodecError::UnknownVersion(version));
    }

    sbor::basic_decode(&data[1..]).map_err(|e| CodecError::Decode(format!("{:?}", e)))
}
