//! The consensus message envelope.

use sbor::prelude::BasicSbor;
use shardline_types::{BlockBody, BlockHeader, ChainId, Hash, PublicKey, Signature};

/// Kind of consensus message, one per subround artifact.
///
/// The discriminant is the wire type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, BasicSbor)]
#[repr(u8)]
pub enum MessageType {
    /// Unrecognized type byte.
    Unknown = 0,
    /// Combined block body and header, sent when both fit one message.
    BlockBodyAndHeader = 1,
    /// Block body alone.
    BlockBody = 2,
    /// Block header alone.
    BlockHeader = 3,
    /// Signature share from the signing subrounds.
    Signature = 4,
}

impl MessageType {
    /// Human-readable name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            MessageType::Unknown => "unknown",
            MessageType::BlockBodyAndHeader => "block body and header",
            MessageType::BlockBody => "block body",
            MessageType::BlockHeader => "block header",
            MessageType::Signature => "signature",
        }
    }
}

/// A consensus message exchanged within the consensus group.
///
/// One envelope serves every subround; which fields are populated depends on
/// `msg_type`:
///
/// | type | populated |
/// |---|---|
/// | `BlockBodyAndHeader` | `header_hash`, `body`, `header` |
/// | `BlockBody` | `body` |
/// | `BlockHeader` | `header_hash`, `header` |
/// | `Signature` | `header_hash`, `signature_share` |
///
/// `sender`, `msg_type`, `round_index`, and `chain_id` are always set. The
/// body and header travel as typed fields, so a mis-routed payload fails to
/// decode instead of surfacing as a wrong downcast later.
#[derive(Debug, Clone, PartialEq, Eq, BasicSbor)]
pub struct ConsensusMessage {
    /// Hash of the marshaled header, when a header is carried or referenced.
    pub header_hash: Option<Hash>,
    /// Signature share, signing subrounds only.
    pub signature_share: Option<Signature>,
    /// Block body.
    pub body: Option<BlockBody>,
    /// Block header.
    pub header: Option<BlockHeader>,
    /// Public key of the sending node.
    pub sender: PublicKey,
    /// Sender's signature over the envelope, applied by the outer transport.
    pub signature: Option<Signature>,
    /// Message kind.
    pub msg_type: MessageType,
    /// Round the message belongs to.
    pub round_index: i64,
    /// Chain the message belongs to.
    pub chain_id: ChainId,
    /// Bitmap of signing validators, end-of-round only.
    pub pub_keys_bitmap: Option<Vec<u8>>,
    /// Aggregated quorum signature, end-of-round only.
    pub aggregated_signature: Option<Signature>,
    /// Leader's signature over the final header, end-of-round only.
    pub leader_signature: Option<Signature>,
}

impl ConsensusMessage {
    /// Combined body-and-header announcement from the round leader.
    pub fn block_body_and_header(
        header_hash: Hash,
        body: BlockBody,
        header: BlockHeader,
        sender: PublicKey,
        round_index: i64,
        chain_id: ChainId,
    ) -> Self {
        ConsensusMessage {
            header_hash: Some(header_hash),
            signature_share: None,
            body: Some(body),
            header: Some(header),
            sender,
            signature: None,
            msg_type: MessageType::BlockBodyAndHeader,
            round_index,
            chain_id,
            pub_keys_bitmap: None,
            aggregated_signature: None,
            leader_signature: None,
        }
    }

    /// Body-only announcement. Carries no header hash.
    pub fn block_body(
        body: BlockBody,
        sender: PublicKey,
        round_index: i64,
        chain_id: ChainId,
    ) -> Self {
        ConsensusMessage {
            header_hash: None,
            signature_share: None,
            body: Some(body),
            header: None,
            sender,
            signature: None,
            msg_type: MessageType::BlockBody,
            round_index,
            chain_id,
            pub_keys_bitmap: None,
            aggregated_signature: None,
            leader_signature: None,
        }
    }

    /// Header-only announcement.
    pub fn block_header(
        header_hash: Hash,
        header: BlockHeader,
        sender: PublicKey,
        round_index: i64,
        chain_id: ChainId,
    ) -> Self {
        ConsensusMessage {
            header_hash: Some(header_hash),
            signature_share: None,
            body: None,
            header: Some(header),
            sender,
            signature: None,
            msg_type: MessageType::BlockHeader,
            round_index,
            chain_id,
            pub_keys_bitmap: None,
            aggregated_signature: None,
            leader_signature: None,
        }
    }
}
