//! Crash-recovery replay: reconcile the chain store's `block_height`
//! against the account store's `state_height` marker on startup.

use crate::cache::AccountCache;
use crate::errors::StateError;
use crate::executor::TransactionExecutor;
use crate::ports::{AccountLedger, BlockSource, ValidatorSetObserver};
use crate::supply::SupplyTracker;
use shared_crypto::Signer;
use shared_types::Address;

/// What startup must do before normal operation resumes.
#[derive(Debug, PartialEq, Eq)]
pub enum ReplayPlan {
    /// `state_height == block_height`; nothing to do.
    UpToDate,
    /// `state_height == 0 ∧ block_height > 0`: a checkpoint-only cold
    /// start. The loaded state is trusted as-is; only the marker advances.
    CheckpointColdStart { advance_to: u64 },
    /// Ordinary crash recovery: re-execute blocks `(state_height, block_height]`.
    Replay { from: u64, to: u64 },
}

/// Decide what recovery action `block_height` vs. `state_height` implies.
pub fn plan_recovery(block_height: u64, state_height: u64) -> ReplayPlan {
    if block_height == state_height {
        ReplayPlan::UpToDate
    } else if state_height == 0 && block_height > 0 {
        ReplayPlan::CheckpointColdStart { advance_to: block_height }
    } else {
        ReplayPlan::Replay { from: state_height + 1, to: block_height }
    }
}

/// Re-execute every block in `from..=to` through the normal execution
/// pipeline, with strict-timestamp checks disabled (that check belongs to
/// block validation, which recovery does not repeat — these blocks were
/// already accepted once). Commits after each block, so a second crash
/// mid-replay resumes from the same marker discipline.
pub fn replay<L, B, S>(
    cache: &mut AccountCache<L>,
    tracker: &SupplyTracker,
    blocks: &B,
    observer: &dyn ValidatorSetObserver,
    validator_stake_required: u64,
    genesis: Address,
    from: u64,
    to: u64,
) -> Result<(), StateError>
where
    L: AccountLedger,
    B: BlockSource,
    S: Signer,
{
    for height in from..=to {
        let block = blocks.read_block(height)?.ok_or_else(|| {
            StateError::Storage(ledger_store::StorageError::NotFound(format!(
                "block at height {height} missing during crash-recovery replay"
            )))
        })?;
        if let Some(real) = block.as_real() {
            let mut executor =
                TransactionExecutor::new(cache, tracker, validator_stake_required, genesis.clone());
            for tx in &real.transactions {
                executor.execute::<S>(tx, observer)?;
            }
        }
        cache.commit(height)?;
    }
    Ok(())
}
