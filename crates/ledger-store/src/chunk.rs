//! Append-only block chunk store.
//!
//! Blocks are partitioned into fixed 10,000-block chunks. Each chunk is two
//! files:
//!
//! - `chunk_<N>.dat`: `[block_bytes ‖ sha3(block_bytes)]` records, in write
//!   order.
//! - `chunk_<N>.idx`: one 16-byte entry per block, `(offset: u64,
//!   length: u32, height: u32)`, big-endian, at position `i` for the block
//!   at `chunk_start + i`.
//!
//! Reads are O(1): seek the index, then seek the data file. The verifying
//! reader recomputes the trailing hash; the trusting reader does not,
//! because chain validation already covered authenticity before the block
//! was written.

use crate::errors::StorageError;
use shared_types::{hash::sha3_256, Block, Hash};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Blocks per chunk.
pub const CHUNK_SIZE: u64 = 10_000;

const INDEX_ENTRY_LEN: u64 = 16;
const HASH_TRAILER_LEN: u64 = 32;

/// The append-only block chunk store.
pub struct ChunkStore {
    dir: PathBuf,
}

struct IndexEntry {
    offset: u64,
    length: u32,
    height: u32,
}

impl IndexEntry {
    fn to_bytes(&self) -> [u8; 16] {
        let mut buf = [0u8; 16];
        buf[0..8].copy_from_slice(&self.offset.to_be_bytes());
        buf[8..12].copy_from_slice(&self.length.to_be_bytes());
        buf[12..16].copy_from_slice(&self.height.to_be_bytes());
        buf
    }

    fn from_bytes(b: &[u8; 16]) -> Self {
        let offset = u64::from_be_bytes(b[0..8].try_into().unwrap());
        let length = u32::from_be_bytes(b[8..12].try_into().unwrap());
        let height = u32::from_be_bytes(b[12..16].try_into().unwrap());
        IndexEntry { offset, length, height }
    }
}

impl ChunkStore {
    /// Open (creating if absent) the chunk store rooted at `dir`, repairing
    /// any torn write left by a crash between appending data and appending
    /// its index entry.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        let store = ChunkStore { dir };
        store.repair_latest_chunk()?;
        Ok(store)
    }

    fn chunk_id(height: u64) -> u64 {
        height / CHUNK_SIZE
    }

    fn data_path(&self, chunk_id: u64) -> PathBuf {
        self.dir.join(format!("chunk_{chunk_id}.dat"))
    }

    fn idx_path(&self, chunk_id: u64) -> PathBuf {
        self.dir.join(format!("chunk_{chunk_id}.idx"))
    }

    fn existing_chunk_ids(&self) -> Result<Vec<u64>, StorageError> {
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if let Some(rest) = name.strip_prefix("chunk_").and_then(|r| r.strip_suffix(".dat")) {
                if let Ok(id) = rest.parse::<u64>() {
                    ids.push(id);
                }
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }

    /// Truncate the index to a whole number of entries, then truncate the
    /// data file down to exactly what the remaining index entries cover.
    /// This repairs the torn-write case where a crash landed between the
    /// data append and the index append.
    fn repair_latest_chunk(&self) -> Result<(), StorageError> {
        let Some(&latest) = self.existing_chunk_ids()?.last() else {
            return Ok(());
        };
        let idx_path = self.idx_path(latest);
        let data_path = self.data_path(latest);
        if !idx_path.exists() || !data_path.exists() {
            return Ok(());
        }

        let idx_len = std::fs::metadata(&idx_path)?.len();
        let whole_entries = idx_len / INDEX_ENTRY_LEN;
        let clean_idx_len = whole_entries * INDEX_ENTRY_LEN;
        if clean_idx_len != idx_len {
            let f = OpenOptions::new().write(true).open(&idx_path)?;
            f.set_len(clean_idx_len)?;
        }

        let expected_data_len = if whole_entries == 0 {
            0
        } else {
            let mut f = File::open(&idx_path)?;
            f.seek(SeekFrom::Start((whole_entries - 1) * INDEX_ENTRY_LEN))?;
            let mut buf = [0u8; 16];
            f.read_exact(&mut buf)?;
            let last = IndexEntry::from_bytes(&buf);
            last.offset + last.length as u64 + HASH_TRAILER_LEN
        };

        let actual_data_len = std::fs::metadata(&data_path)?.len();
        if actual_data_len > expected_data_len {
            tracing::warn!(
                chunk = latest,
                actual_data_len,
                expected_data_len,
                "repairing torn write in block chunk store"
            );
            let f = OpenOptions::new().write(true).open(&data_path)?;
            f.set_len(expected_data_len)?;
        }
        Ok(())
    }

    /// Append `block` at `height`. Returns the hash written to the trailer
    /// (`sha3(block_bytes)`), which is also the candidate block hash for a
    /// [`shared_types::RealBlock`].
    ///
    /// Blocks within a chunk must be appended contiguously, starting at the
    /// chunk's first height: `read_block` locates an entry by its position
    /// in the index file, which only lines up with `height % CHUNK_SIZE`
    /// when every lower block in the chunk was written first. Appending out
    /// of order (or skipping a height) makes later reads in that chunk
    /// return the wrong block or `None`.
    pub fn write_block(&self, height: u64, block: &Block) -> Result<Hash, StorageError> {
        let chunk_id = Self::chunk_id(height);
        let block_bytes = bincode::serialize(block)
            .map_err(|e| StorageError::Encoding(e.to_string()))?;
        let record_hash = sha3_256(&block_bytes);

        let mut data_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.data_path(chunk_id))?;
        let offset = data_file.metadata()?.len();
        data_file.write_all(&block_bytes)?;
        data_file.write_all(&record_hash)?;
        data_file.flush()?;
        data_file.sync_all()?;

        let entry = IndexEntry {
            offset,
            length: block_bytes.len() as u32,
            height: height as u32,
        };
        let mut idx_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.idx_path(chunk_id))?;
        idx_file.write_all(&entry.to_bytes())?;
        idx_file.flush()?;
        idx_file.sync_all()?;

        Ok(record_hash)
    }

    /// Read the block at `height`. `verify` recomputes and checks the
    /// trailing hash; without it the reader trusts the stored bytes.
    pub fn read_block(&self, height: u64, verify: bool) -> Result<Option<Block>, StorageError> {
        let chunk_id = Self::chunk_id(height);
        let local_index = height % CHUNK_SIZE;
        let idx_path = self.idx_path(chunk_id);
        if !idx_path.exists() {
            return Ok(None);
        }

        let mut idx_file = File::open(&idx_path)?;
        let entry_count = idx_file.metadata()?.len() / INDEX_ENTRY_LEN;
        if local_index >= entry_count {
            return Ok(None);
        }
        idx_file.seek(SeekFrom::Start(local_index * INDEX_ENTRY_LEN))?;
        let mut buf = [0u8; 16];
        idx_file.read_exact(&mut buf)?;
        let entry = IndexEntry::from_bytes(&buf);

        let mut data_file = File::open(self.data_path(chunk_id))?;
        data_file.seek(SeekFrom::Start(entry.offset))?;
        let mut block_bytes = vec![0u8; entry.length as usize];
        data_file.read_exact(&mut block_bytes)?;

        if verify {
            let mut trailer = [0u8; 32];
            data_file.read_exact(&mut trailer)?;
            if sha3_256(&block_bytes) != trailer {
                return Err(StorageError::ChecksumMismatch { height });
            }
        }

        let block: Block = bincode::deserialize(&block_bytes)
            .map_err(|e| StorageError::Encoding(e.to_string()))?;
        Ok(Some(block))
    }

    /// Delete every block strictly above `height`: truncate the index of
    /// the chunk containing `height` and drop all later chunks entirely.
    pub fn delete_above(&self, height: u64) -> Result<(), StorageError> {
        let keep_chunk = Self::chunk_id(height);
        let keep_local_index = height % CHUNK_SIZE;

        for id in self.existing_chunk_ids()? {
            if id < keep_chunk {
                continue;
            }
            if id > keep_chunk {
                let _ = std::fs::remove_file(self.data_path(id));
                let _ = std::fs::remove_file(self.idx_path(id));
                continue;
            }
            // id == keep_chunk: truncate index to keep_local_index + 1 entries.
            let idx_path = self.idx_path(id);
            let data_path = self.data_path(id);
            let keep_entries = keep_local_index + 1;
            let idx_file = OpenOptions::new().write(true).open(&idx_path)?;
            idx_file.set_len(keep_entries * INDEX_ENTRY_LEN)?;

            let mut reader = File::open(&idx_path)?;
            reader.seek(SeekFrom::Start((keep_entries - 1) * INDEX_ENTRY_LEN))?;
            let mut buf = [0u8; 16];
            reader.read_exact(&mut buf)?;
            let last = IndexEntry::from_bytes(&buf);
            let keep_data_len = last.offset + last.length as u64 + HASH_TRAILER_LEN;
            let data_file = OpenOptions::new().write(true).open(&data_path)?;
            data_file.set_len(keep_data_len)?;
        }
        Ok(())
    }

    /// Delete whole chunks entirely below `keep_from_height` (the start of
    /// the chunk that contains it is always preserved).
    pub fn prune_below(&self, keep_from_height: u64) -> Result<(), StorageError> {
        let keep_chunk = Self::chunk_id(keep_from_height);
        for id in self.existing_chunk_ids()? {
            if id < keep_chunk {
                std::fs::remove_file(self.data_path(id))?;
                std::fs::remove_file(self.idx_path(id))?;
            }
        }
        Ok(())
    }
}
