//! Auxiliary lookup indices over the block chunk store: transaction hash,
//! block hash, and timestamp to height, plus the chain tip marker.
//!
//! These are derived data — always rebuildable from the chunk store — so
//! they live in their own rocksdb instance rather than inline with account
//! shards, keeping the account store's crash-recovery story (marker vs.
//! chunk store) uncomplicated by index bookkeeping.

use crate::errors::StorageError;
use shared_types::{Block, Hash};
use std::path::Path;

const LATEST_HEIGHT_KEY: &[u8] = b"__latest_height";

/// Column family names.
mod cf {
    pub const TX_HASH_TO_HEIGHT: &str = "tx_hash_to_height";
    pub const BLOCK_HASH_TO_HEIGHT: &str = "block_hash_to_height";
    pub const TIMESTAMP_TO_HEIGHT: &str = "timestamp_to_height";
    pub const META: &str = "index_meta";
}

/// Auxiliary chain indices, rebuildable from the chunk store.
pub struct ChainIndex {
    db: rocksdb::DB,
}

impl ChainIndex {
    /// Open (creating if absent) the index database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let names = [
            cf::TX_HASH_TO_HEIGHT,
            cf::BLOCK_HASH_TO_HEIGHT,
            cf::TIMESTAMP_TO_HEIGHT,
            cf::META,
        ];
        let mut opts = rocksdb::Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        let descriptors: Vec<_> = names
            .iter()
            .map(|n| rocksdb::ColumnFamilyDescriptor::new(*n, rocksdb::Options::default()))
            .collect();
        let db = rocksdb::DB::open_cf_descriptors(&opts, path, descriptors)?;
        Ok(ChainIndex { db })
    }

    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily, StorageError> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StorageError::Database(format!("missing column family {name}")))
    }

    /// Record every index entry implied by `block`, and advance the tip
    /// marker to its height. Called immediately after the block is durably
    /// appended to the chunk store.
    pub fn index_block(&self, block: &Block) -> Result<(), StorageError> {
        let height = block.height();
        let block_hash = block.hash();

        let block_hash_cf = self.cf(cf::BLOCK_HASH_TO_HEIGHT)?;
        self.db
            .put_cf(block_hash_cf, block_hash, height.to_be_bytes())?;

        let timestamp_cf = self.cf(cf::TIMESTAMP_TO_HEIGHT)?;
        self.db
            .put_cf(timestamp_cf, block.timestamp().to_be_bytes(), height.to_be_bytes())?;

        if let Some(real) = block.as_real() {
            let tx_cf = self.cf(cf::TX_HASH_TO_HEIGHT)?;
            let mut batch = rocksdb::WriteBatch::default();
            for tx in &real.transactions {
                batch.put_cf(tx_cf, tx.hash(), height.to_be_bytes());
            }
            self.db.write(batch)?;
        }

        let meta = self.cf(cf::META)?;
        self.db.put_cf(meta, LATEST_HEIGHT_KEY, height.to_be_bytes())?;
        Ok(())
    }

    /// Height at which `block_hash` was committed, if any.
    pub fn height_of_block_hash(&self, block_hash: &Hash) -> Result<Option<u64>, StorageError> {
        let cf = self.cf(cf::BLOCK_HASH_TO_HEIGHT)?;
        Ok(self
            .db
            .get_cf(cf, block_hash)?
            .map(|b| u64::from_be_bytes(b.as_slice().try_into().unwrap())))
    }

    /// Height at which a transaction with hash `tx_hash` was included, if
    /// any.
    pub fn height_of_transaction(&self, tx_hash: &Hash) -> Result<Option<u64>, StorageError> {
        let cf = self.cf(cf::TX_HASH_TO_HEIGHT)?;
        Ok(self
            .db
            .get_cf(cf, tx_hash)?
            .map(|b| u64::from_be_bytes(b.as_slice().try_into().unwrap())))
    }

    /// The height of the chain tip, as last recorded by [`Self::index_block`].
    pub fn latest_height(&self) -> Result<Option<u64>, StorageError> {
        let meta = self.cf(cf::META)?;
        Ok(self
            .db
            .get_cf(meta, LATEST_HEIGHT_KEY)?
            .map(|b| u64::from_be_bytes(b.as_slice().try_into().unwrap())))
    }

    /// Remove every index entry for `block`, e.g. during a reorg rollback.
    /// Leaves the tip marker to the caller, who should call this for every
    /// rolled-back height then set the marker explicitly.
    pub fn remove_block(&self, block: &Block) -> Result<(), StorageError> {
        let block_hash_cf = self.cf(cf::BLOCK_HASH_TO_HEIGHT)?;
        self.db.delete_cf(block_hash_cf, block.hash())?;

        let timestamp_cf = self.cf(cf::TIMESTAMP_TO_HEIGHT)?;
        self.db.delete_cf(timestamp_cf, block.timestamp().to_be_bytes())?;

        if let Some(real) = block.as_real() {
            let tx_cf = self.cf(cf::TX_HASH_TO_HEIGHT)?;
            let mut batch = rocksdb::WriteBatch::default();
            for tx in &real.transactions {
                batch.delete_cf(tx_cf, tx.hash());
            }
            self.db.write(batch)?;
        }
        Ok(())
    }

    /// Explicitly set the tip marker, e.g. after a rollback has removed the
    /// rolled-back heights' entries.
    pub fn set_latest_height(&self, height: u64) -> Result<(), StorageError> {
        let meta = self.cf(cf::META)?;
        self.db.put_cf(meta, LATEST_HEIGHT_KEY, height.to_be_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::block::{BlockHeader, RealBlock};
    use shared_types::{hash::ZERO_HASH, Address};

    fn sample(height: u64) -> Block {
        Block::Real(RealBlock {
            header: BlockHeader {
                height,
                previous_hash: ZERO_HASH,
                timestamp: 5000 + height,
                state_root: ZERO_HASH,
                tx_root: ZERO_HASH,
                proposer: Address::derive(b"p"),
                vrf_proof: vec![],
                vrf_output: ZERO_HASH,
                signature: vec![],
            },
            transactions: vec![],
            data: None,
        })
    }

    #[test]
    fn index_then_lookup_by_block_hash() {
        let dir = tempfile::tempdir().unwrap();
        let idx = ChainIndex::open(dir.path()).unwrap();
        let b = sample(3);
        idx.index_block(&b).unwrap();
        assert_eq!(idx.height_of_block_hash(&b.hash()).unwrap(), Some(3));
        assert_eq!(idx.latest_height().unwrap(), Some(3));
    }

    #[test]
    fn remove_block_clears_its_entries() {
        let dir = tempfile::tempdir().unwrap();
        let idx = ChainIndex::open(dir.path()).unwrap();
        let b = sample(1);
        idx.index_block(&b).unwrap();
        idx.remove_block(&b).unwrap();
        assert_eq!(idx.height_of_block_hash(&b.hash()).unwrap(), None);
    }
}
