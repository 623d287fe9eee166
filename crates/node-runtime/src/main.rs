//! The Quantum-Chain node binary: load configuration, recover from any
//! unclean shutdown, wire every subsystem crate into one [`Node`], and run
//! the production scheduler and P2P accept loop until asked to stop.
//!
//! Transaction admission (the mempool) is out of core scope here — the
//! scheduler loop currently drives production with an empty pending pool,
//! leaving room for a real mempool to be wired in ahead of it later.

use anyhow::{Context, Result};
use node_runtime::{config, node::Node, p2p, scheduler, NodeConfig};
use shared_crypto::testing::{FakeSigner, FakeVrfProver};
use std::env;
use std::sync::Arc;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> Result<()> {
    quantum_telemetry::init_logging();

    let mut args = env::args().skip(1);
    let node_config_path = args.next().unwrap_or_else(|| "node.json".to_string());
    let consensus_config_path = args.next().unwrap_or_else(|| "consensus.json".to_string());

    let node_config = NodeConfig::load(&node_config_path)
        .with_context(|| format!("loading node config from {node_config_path}"))?;
    let consensus_config = config::load_consensus_config(&consensus_config_path)
        .with_context(|| format!("loading consensus config from {consensus_config_path}"))?;

    tracing::info!(
        chain_id = %consensus_config.chain_id,
        address = %node_config.address,
        "starting quantum-chain node"
    );

    // The real post-quantum signer and VRF-from-signature prover are
    // external collaborators (out of scope); this node is keyed by its
    // private-key-file bytes through the deterministic fakes until a real
    // implementation is wired in.
    let key_seed = std::fs::read(&node_config.private_key_file)
        .with_context(|| format!("reading private key file {:?}", node_config.private_key_file))?;
    let signer = FakeSigner::new(key_seed.clone());
    let vrf = FakeVrfProver::new(key_seed);

    let node = Arc::new(Node::new(node_config, consensus_config, signer, vrf)?);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    p2p::dial_seed_peers(&node).await;

    let accept_node = node.clone();
    let accept_task = tokio::spawn(async move {
        if let Err(e) = p2p::run_accept_loop(accept_node).await {
            tracing::error!(error = %e, "p2p accept loop exited");
        }
    });

    let scheduler_task = tokio::spawn(scheduler::run(node.clone(), Vec::new, shutdown_rx));

    tracing::info!("node is running, press Ctrl+C to stop");
    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down gracefully");

    shutdown_tx.send(true).ok();
    accept_task.abort();
    let _ = scheduler_task.await;

    Ok(())
}
