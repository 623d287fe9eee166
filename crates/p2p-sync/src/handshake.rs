//! Handshake gating: a peer whose `consensus_hash` doesn't match ours is on
//! a different network entirely and must be rejected before anything else
//! in the handshake is trusted.

use crate::errors::SyncError;
use crate::message::Handshake;
use shared_types::Hash;

/// Reject a handshake whose `consensus_hash` doesn't match ours.
pub fn check_consensus_hash(handshake: &Handshake, our_consensus_hash: Hash) -> Result<(), SyncError> {
    if handshake.consensus_hash != our_consensus_hash {
        return Err(SyncError::WrongNetwork);
    }
    Ok(())
}
