//! The production scheduler loop: repeatedly attempt one round of
//! [`Node::produce_next_block`] on a cadence well below `block_interval_ms`
//! (so failover/elder-brother waits are resolved promptly), until asked to
//! shut down.

use crate::node::Node;
use shared_crypto::{Signer, VrfProver};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// How often to poll the scheduler's gating conditions, independent of
/// the chain's own block interval.
const TICK: Duration = Duration::from_millis(500);

/// Run the scheduler loop until `shutdown` fires. `pending` is called once
/// per tick to collect the mempool's currently admissible transactions
/// (out of core scope; the caller owns mempool bookkeeping).
pub async fn run<S, V>(
    node: Arc<Node<S, V>>,
    mut pending: impl FnMut() -> Vec<shared_types::Transaction> + Send,
    mut shutdown: watch::Receiver<bool>,
) where
    S: Signer + 'static,
    V: VrfProver + 'static,
{
    let mut interval = tokio::time::interval(TICK);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                match node.produce_next_block(pending()) {
                    Ok(Some(block)) => {
                        tracing::info!(height = block.height(), "produced block");
                    }
                    Ok(None) => {}
                    Err(e) => tracing::error!(error = %e, "block production round failed"),
                }
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    tracing::info!("scheduler loop shutting down");
                    break;
                }
            }
        }
    }
}
