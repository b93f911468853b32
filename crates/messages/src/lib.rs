//! Network messages for the consensus protocol.

mod codec;
mod message;
mod size;

pub use codec::{decode_consensus_message, encode_consensus_message, CodecError, WIRE_VERSION};
pub use message::{ConsensusMessage, MessageType};
pub use size::{can_send_together, MAX_ALLOWED_SIZE_IN_BYTES, MEGABYTE_SIZE};
