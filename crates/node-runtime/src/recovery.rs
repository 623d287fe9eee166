//! Startup crash-recovery orchestration: read the two height markers off
//! the concrete ledger store, decide the replay plan, and drive it — this
//! is the one place `state_engine::recovery`'s pure decision function
//! meets real I/O.

use crate::errors::RuntimeError;
use ledger_store::LedgerStore;
use shared_crypto::Signer;
use shared_types::Address;
use state_engine::{AccountCache, NullValidatorSetObserver, ReplayPlan, SupplyTracker, ValidatorSetObserver};
use std::sync::Arc;

/// Reconcile `ledger`'s `block_height` and `state_height` before the
/// producer loop or P2P layer starts. Returns the height the node should
/// consider itself caught up to locally (its starting chain head).
pub fn recover<S: Signer>(
    ledger: &Arc<LedgerStore>,
    cache: &mut AccountCache<LedgerStore>,
    tracker: &SupplyTracker,
    observer: &dyn ValidatorSetObserver,
    validator_stake_required: u64,
    genesis: Address,
) -> Result<u64, RuntimeError> {
    let block_height = ledger.latest_height()?.unwrap_or(0);
    let state_height = ledger.state_height()?;

    match state_engine::plan_recovery(block_height, state_height) {
        ReplayPlan::UpToDate => {
            tracing::info!(block_height, "no crash recovery needed");
        }
        ReplayPlan::CheckpointColdStart { advance_to } => {
            tracing::info!(advance_to, "cold start from a checkpoint snapshot, advancing state marker");
            cache.commit(advance_to)?;
        }
        ReplayPlan::Replay { from, to } => {
            tracing::warn!(from, to, "replaying blocks to recover from an unclean shutdown");
            state_engine::replay::<LedgerStore, LedgerStore, S>(
                cache,
                tracker,
                ledger.as_ref(),
                observer,
                validator_stake_required,
                genesis,
                from,
                to,
            )?;
        }
    }

    Ok(block_height)
}

/// A no-op observer suitable when recovery runs before consensus's live
/// validator registry is wired up (replay must not fire activation
/// callbacks twice — the registry is rebuilt wholesale from the post-
/// replay account set instead, see [`crate::node::Node::new`]).
pub fn silent_observer() -> NullValidatorSetObserver {
    NullValidatorSetObserver
}
