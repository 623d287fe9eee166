//! The peer registry: per-peer liveness and the height/checkpoint state
//! reported over Ping/Pong, used for best-peer selection and the
//! checkpoint-anchored fork comparisons in [`crate::reorg`].

use crate::message::Handshake;
use parking_lot::RwLock;
use shared_types::Hash;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Default peer liveness window, matching
/// [`shared_types::ConsensusConfig::peer_heartbeat_timeout_secs`]'s default.
pub const DEFAULT_LIVENESS: Duration = Duration::from_secs(90);

/// What's known about one connected peer, refreshed on every Pong.
#[derive(Debug, Clone)]
pub struct Peer {
    pub height: u64,
    pub checkpoint_height: u64,
    pub checkpoint_hash: Hash,
    pub checkpoint_timestamp: u64,
    pub is_active_validator: bool,
    last_heartbeat: Instant,
}

impl Peer {
    fn alive(&self, now: Instant, timeout: Duration) -> bool {
        now.saturating_duration_since(self.last_heartbeat) < timeout
    }
}

/// `host:port -> Peer`, guarded by a single lock (hot synchronous path:
/// every Pong and every best-peer lookup takes it briefly).
pub struct PeerRegistry {
    peers: RwLock<HashMap<String, Peer>>,
    /// Monotonic high-water mark of `checkpoint_height` across every Pong
    /// ever received, independent of which peers are still connected —
    /// this is what guards against following a peer whose checkpoint is
    /// below one this node has already seen elsewhere (§4.7).
    known_highest_checkpoint_height: AtomicU64,
}

impl PeerRegistry {
    pub fn new() -> Self {
        PeerRegistry { peers: RwLock::new(HashMap::new()), known_highest_checkpoint_height: AtomicU64::new(0) }
    }

    /// Refresh (or insert) a peer's state from a received Pong.
    pub fn record_pong(&self, host_port: &str, handshake: &Handshake, is_active_validator: bool, now: Instant) {
        let peer = Peer {
            height: handshake.height,
            checkpoint_height: handshake.checkpoint_height,
            checkpoint_hash: handshake.checkpoint_hash,
            checkpoint_timestamp: handshake.checkpoint_timestamp,
            is_active_validator,
            last_heartbeat: now,
        };
        self.peers.write().insert(host_port.to_string(), peer);
        self.known_highest_checkpoint_height.fetch_max(handshake.checkpoint_height, Ordering::SeqCst);
    }

    /// Drop a peer, e.g. on disconnect or consensus-hash mismatch.
    pub fn remove(&self, host_port: &str) {
        self.peers.write().remove(host_port);
    }

    /// Whether `host_port`'s last heartbeat is within `timeout` of `now`.
    pub fn is_alive(&self, host_port: &str, now: Instant, timeout: Duration) -> bool {
        self.peers.read().get(host_port).is_some_and(|p| p.alive(now, timeout))
    }

    /// Every peer currently considered alive.
    pub fn alive_peers(&self, now: Instant, timeout: Duration) -> Vec<(String, Peer)> {
        self.peers
            .read()
            .iter()
            .filter(|(_, p)| p.alive(now, timeout))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// The alive, active-validator peer with the greatest reported height.
    /// Non-validator peers (history-only nodes) can still serve sync data
    /// but never drive the production decision of which peer to follow.
    pub fn best_sync_peer(&self, now: Instant, timeout: Duration) -> Option<(String, Peer)> {
        self.alive_peers(now, timeout)
            .into_iter()
            .filter(|(_, p)| p.is_active_validator)
            .max_by_key(|(_, p)| p.height)
    }

    /// The remembered `known_highest_checkpoint_height`, maintained across
    /// pings regardless of whether the peer that reported it is still
    /// connected. Used so a node never follows a peer whose checkpoint is
    /// below the highest one it has ever observed (§4.7).
    pub fn known_highest_checkpoint_height(&self) -> u64 {
        self.known_highest_checkpoint_height.load(Ordering::SeqCst)
    }
}

impl Default for PeerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::hash::ZERO_HASH;
    use shared_types::Address;

    fn handshake(height: u64, checkpoint_height: u64) -> Handshake {
        Handshake {
            address: Address::derive(b"peer"),
            height,
            latest_block_hash: ZERO_HASH,
            checkpoint_height,
            checkpoint_hash: ZERO_HASH,
            checkpoint_timestamp: 0,
            consensus_version: 1,
            consensus_hash: ZERO_HASH,
        }
    }

    #[test]
    fn peer_goes_stale_after_the_liveness_window() {
        let registry = PeerRegistry::new();
        let t0 = Instant::now();
        registry.record_pong("a:1", &handshake(10, 0), true, t0);
        assert!(registry.is_alive("a:1", t0, DEFAULT_LIVENESS));
        let later = t0 + Duration::from_secs(91);
        assert!(!registry.is_alive("a:1", later, DEFAULT_LIVENESS));
    }

    #[test]
    fn best_sync_peer_ignores_non_validators_and_picks_greatest_height() {
        let registry = PeerRegistry::new();
        let now = Instant::now();
        registry.record_pong("a:1", &handshake(100, 0), false, now);
        registry.record_pong("b:1", &handshake(50, 0), true, now);
        registry.record_pong("c:1", &handshake(80, 0), true, now);
        let (addr, peer) = registry.best_sync_peer(now, DEFAULT_LIVENESS).unwrap();
        assert_eq!(addr, "c:1");
        assert_eq!(peer.height, 80);
    }

    #[test]
    fn known_highest_checkpoint_height_survives_peer_disconnect() {
        let registry = PeerRegistry::new();
        let now = Instant::now();
        registry.record_pong("a:1", &handshake(10, 500), true, now);
        registry.record_pong("b:1", &handshake(10, 300), true, now);
        registry.remove("a:1");
        assert_eq!(registry.known_highest_checkpoint_height(), 500);
    }
}
