//! Peer-to-peer wire messages.

use serde::{Deserialize, Serialize};
use shared_types::{Address, Block, Checkpoint, Hash};

/// Handshake payload carried by both `Ping` and `Pong`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Handshake {
    pub address: Address,
    pub height: u64,
    pub latest_block_hash: Hash,
    pub checkpoint_height: u64,
    pub checkpoint_hash: Hash,
    pub checkpoint_timestamp: u64,
    pub consensus_version: u16,
    pub consensus_hash: Hash,
}

/// Every message exchanged between peers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Message {
    Ping(Handshake),
    Pong(Handshake),
    /// Request blocks `[from_height, to_height]` inclusive.
    BlockRequest { from_height: u64, to_height: u64 },
    /// A batch of blocks answering a [`Message::BlockRequest`], in
    /// ascending height order.
    BlockBatch { blocks: Vec<Block> },
    /// A generated or forwarded checkpoint.
    Checkpoint(Checkpoint),
    /// The gzip-compressed state snapshot following a `Checkpoint`
    /// message, always sent as the very next message to the same peer.
    StateData { gzip_bytes: Vec<u8> },
}

/// Serialize a message for framing.
pub fn encode(message: &Message) -> Result<Vec<u8>, crate::errors::SyncError> {
    bincode::serialize(message).map_err(|e| crate::errors::SyncError::Malformed(e.to_string()))
}

/// Deserialize a message from framed bytes.
pub fn decode(bytes: &[u8]) -> Result<Message, crate::errors::SyncError> {
    bincode::deserialize(bytes).map_err(|e| crate::errors::SyncError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::hash::ZERO_HASH;

    fn handshake() -> Handshake {
        Handshake {
            address: Address::derive(b"peer"),
            height: 10,
            latest_block_hash: ZERO_HASH,
            checkpoint_height: 0,
            checkpoint_hash: ZERO_HASH,
            checkpoint_timestamp: 0,
            consensus_version: 1,
            consensus_hash: ZERO_HASH,
        }
    }

    #[test]
    fn ping_round_trips_through_encode_decode() {
        let msg = Message::Ping(handshake());
        let bytes = encode(&msg).unwrap();
        let back = decode(&bytes).unwrap();
        assert!(matches!(back, Message::Ping(_)));
    }

    #[test]
    fn block_request_round_trips() {
        let msg = Message::BlockRequest { from_height: 5, to_height: 10 };
        let back = decode(&encode(&msg).unwrap()).unwrap();
        assert!(matches!(back, Message::BlockRequest { from_height: 5, to_height: 10 }));
    }
}
