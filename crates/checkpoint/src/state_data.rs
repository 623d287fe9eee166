//! Checkpoint state-data: the gzip-compressed, JSON-encoded account
//! snapshot broadcast alongside every checkpoint, and its apply pipeline.

use crate::errors::CheckpointError;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use shared_types::{Account, TOTAL_SUPPLY};
use state_engine::{full_scan, AccountCache, AccountLedger, SupplyTracker};
use std::io::{Read, Write};
use std::sync::Arc;

/// The full account set at a checkpoint height, as carried in the
/// state-data message and the `state_latest.gz` file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub height: u64,
    pub accounts: Vec<Account>,
}

/// Gzip-compress a JSON encoding of `snapshot`.
pub fn compress(snapshot: &StateSnapshot) -> Result<Vec<u8>, CheckpointError> {
    let json = serde_json::to_vec(snapshot)?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json)?;
    Ok(encoder.finish()?)
}

/// Reverse of [`compress`].
pub fn decompress(gzip_bytes: &[u8]) -> Result<StateSnapshot, CheckpointError> {
    let mut decoder = GzDecoder::new(gzip_bytes);
    let mut json = Vec::new();
    decoder.read_to_end(&mut json)?;
    Ok(serde_json::from_slice(&json)?)
}

/// Apply a received state snapshot: run the snapshot-level P0 check on the
/// decoded accounts, clear the account store, bulk-insert everything,
/// clear the cache, and re-initialise the supply tracker. Used for both
/// the checkpoint apply path and a cold-start from a locally persisted
/// `state_latest.gz`.
pub fn apply<L: AccountLedger>(
    ledger: &Arc<L>,
    cache: &mut AccountCache<L>,
    tracker: &SupplyTracker,
    snapshot: &StateSnapshot,
) -> Result<(), CheckpointError> {
    let total = full_scan(&snapshot.accounts);
    if total != TOTAL_SUPPLY {
        return Err(state_engine::StateError::SupplyInvariantViolated { total, expected: TOTAL_SUPPLY }.into());
    }
    ledger.replace_all_accounts(&snapshot.accounts, snapshot.height)?;
    cache.clear();
    tracker.reinit(total);
    Ok(())
}
