//! Wires a just-produced checkpoint-height block into
//! [`checkpoint::generation`] (§4.4 step 11, §4.5 steps 1-6): gate on P0,
//! roll back if needed, compute the state root and validator snapshot,
//! sign, and persist single-slot. Broadcasting the result is the caller's
//! job (this crate has no network dependency).

use checkpoint::{build_checkpoint, verify_or_rollback, CheckpointError, GenerationTarget};
use shared_crypto::Signer;
use shared_types::{Account, Address, Checkpoint};
use state_engine::{AccountLedger, BlockSource, SupplyTracker};
use std::path::Path;
use std::sync::Arc;

/// A generated checkpoint ready to persist and broadcast: the checkpoint
/// itself and the gzip-compressed state snapshot bytes.
pub struct GeneratedCheckpoint {
    pub checkpoint: Checkpoint,
    pub state_gzip_bytes: Vec<u8>,
    /// The height the checkpoint actually anchors. Equal to the requested
    /// height unless a P0 rollback occurred.
    pub anchored_height: u64,
}

/// Generate (and persist single-slot under `checkpoint_dir`) a checkpoint
/// for `requested_height`, rolling back to the highest earlier height that
/// still satisfies P0 if the dual verifier fails at `requested_height`.
#[allow(clippy::too_many_arguments)]
pub fn generate_and_persist<L, B, S>(
    ledger: &Arc<L>,
    blocks: &B,
    checkpoint_dir: &Path,
    requested_height: u64,
    requested_accounts: Vec<Account>,
    requested_tracker_total: u64,
    last_good_height: u64,
    last_good_accounts: Vec<Account>,
    max_scan: u64,
    validator_stake_required: u64,
    genesis: Address,
    min_stake: u64,
    max_validators: u32,
    block_hash: shared_types::Hash,
    previous_hash: shared_types::Hash,
    timestamp: u64,
    proposer: Address,
    signer: &S,
) -> Result<GeneratedCheckpoint, CheckpointError>
where
    L: AccountLedger,
    B: BlockSource,
    S: Signer,
{
    let target: GenerationTarget = verify_or_rollback::<B, S>(
        blocks,
        requested_height,
        requested_accounts,
        requested_tracker_total,
        last_good_height,
        last_good_accounts,
        max_scan,
        validator_stake_required,
        genesis,
    )?;

    let checkpoint = build_checkpoint(
        &target,
        block_hash,
        previous_hash,
        timestamp,
        proposer,
        min_stake,
        max_validators,
        signer,
    );

    let snapshot = checkpoint::StateSnapshot { height: target.height, accounts: target.accounts };
    let state_gzip_bytes = checkpoint::persistence::write_state_snapshot(checkpoint_dir, &snapshot)?;
    checkpoint::persistence::write_checkpoint(checkpoint_dir, &checkpoint)?;

    // A rollback deletes blocks above the anchored height: the real
    // ledger store this runs against owns that deletion via
    // `rollback_to`, invoked by the caller once it observes
    // `anchored_height < requested_height`.
    let _ = ledger;

    Ok(GeneratedCheckpoint { checkpoint, state_gzip_bytes, anchored_height: target.height })
}

/// Re-initialize the supply tracker after a rollback rewound the account
/// set beneath it (used when `anchored_height < requested_height`).
pub fn reinit_tracker_after_rollback(tracker: &SupplyTracker, accounts: &[Account]) {
    let total: u64 = accounts.iter().map(Account::total).sum();
    tracker.reinit(total);
}
