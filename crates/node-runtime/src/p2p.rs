//! The peer accept loop and outbound seed-dial: Ping/Pong handshake
//! registration into [`p2p_sync::PeerRegistry`] using `p2p-sync`'s wire
//! framing and message types.
//!
//! This is deliberately the handshake-and-liveness slice of §5, not the
//! full reader/writer task pair per connected peer — block and checkpoint
//! propagation, backfill batches, and the heartbeat/reconnect/prune
//! tickers are `p2p-sync`'s pure decision functions (`sync`, `reorg`)
//! waiting on a fuller transport loop than this one drives yet.

use crate::node::Node;
use p2p_sync::{check_consensus_hash, decode, encode, wire, Message, PeerRegistry};
use shared_crypto::{Signer, VrfProver};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};

/// Bind `node.node_config.p2p_port` and accept connections forever,
/// handshaking each one on its own task. Returns only on a bind failure.
pub async fn run_accept_loop<S, V>(node: Arc<Node<S, V>>) -> std::io::Result<()>
where
    S: Signer + 'static,
    V: VrfProver + 'static,
{
    let listener = TcpListener::bind(("0.0.0.0", node.node_config.p2p_port)).await?;
    tracing::info!(port = node.node_config.p2p_port, "p2p accept loop listening");

    loop {
        let (stream, addr) = listener.accept().await?;
        let node = node.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_inbound(&node, stream, addr.to_string()).await {
                tracing::warn!(peer = %addr, error = %e, "inbound handshake failed");
            }
        });
    }
}

/// Dial every configured seed peer once and register it on success. The
/// scheduler loop is responsible for retrying on a timer; this call is
/// fire-and-forget for one attempt per seed.
pub async fn dial_seed_peers<S, V>(node: &Arc<Node<S, V>>)
where
    S: Signer + 'static,
    V: VrfProver + 'static,
{
    for seed in node.node_config.seed_peers.clone() {
        let node = node.clone();
        tokio::spawn(async move {
            if let Err(e) = dial_one(&node, &seed).await {
                tracing::warn!(peer = %seed, error = %e, "seed dial failed");
            }
        });
    }
}

async fn handle_inbound<S, V>(node: &Arc<Node<S, V>>, mut stream: TcpStream, peer_addr: String) -> Result<(), p2p_sync::SyncError>
where
    S: Signer,
    V: VrfProver,
{
    let frame = wire::read_frame(&mut stream).await?;
    let message = decode(&frame)?;
    let Message::Ping(handshake) = message else {
        return Err(p2p_sync::SyncError::Malformed("expected Ping as the first message".to_string()));
    };
    check_consensus_hash(&handshake, node.consensus_config.consensus_hash())?;

    let is_validator = node.is_active_validator(handshake.address.as_str());
    register_peer(&node.peer_registry, &peer_addr, &handshake, is_validator);

    let reply = Message::Pong(node.current_handshake());
    wire::write_frame(&mut stream, &encode(&reply)?).await?;
    Ok(())
}

async fn dial_one<S, V>(node: &Arc<Node<S, V>>, seed: &str) -> Result<(), p2p_sync::SyncError>
where
    S: Signer,
    V: VrfProver,
{
    let mut stream = TcpStream::connect(seed).await?;
    let ping = Message::Ping(node.current_handshake());
    wire::write_frame(&mut stream, &encode(&ping)?).await?;

    let frame = wire::read_frame(&mut stream).await?;
    let message = decode(&frame)?;
    let Message::Pong(handshake) = message else {
        return Err(p2p_sync::SyncError::Malformed("expected Pong in reply to Ping".to_string()));
    };
    check_consensus_hash(&handshake, node.consensus_config.consensus_hash())?;

    let is_validator = node.is_active_validator(handshake.address.as_str());
    register_peer(&node.peer_registry, seed, &handshake, is_validator);
    Ok(())
}

fn register_peer(registry: &Arc<PeerRegistry>, host_port: &str, handshake: &p2p_sync::Handshake, is_active_validator: bool) {
    registry.record_pong(host_port, handshake, is_active_validator, std::time::Instant::now());
}
