//! Sharded account store backed by an embedded KV engine.
//!
//! Accounts are distributed across 36 shards keyed by `address[1]` — the
//! character right after the `F` prefix, which ranges over the same Base36
//! alphabet used for address encoding. A commit writes every shard's dirty
//! accounts in one batch per shard, then advances the `state_height` marker
//! last: on crash recovery, a marker behind the ledger's head means the
//! commit never completed and must be replayed from the chunk store.

use crate::errors::StorageError;
use shared_types::Account;
use std::path::Path;
use std::sync::Arc;

const SHARD_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const STATE_HEIGHT_KEY: &[u8] = b"__state_height";

/// The sharded, rocksdb-backed account store.
pub struct AccountStore {
    db: Arc<rocksdb::DB>,
}

fn shard_char(address: &str) -> Result<char, StorageError> {
    address
        .as_bytes()
        .get(1)
        .map(|b| *b as char)
        .filter(|c| SHARD_ALPHABET.contains(&(*c as u8)))
        .ok_or_else(|| StorageError::Encoding(format!("address has no valid shard char: {address}")))
}

fn cf_name(shard: char) -> String {
    format!("shard_{shard}")
}

impl AccountStore {
    /// Open (creating if absent) the account store at `path`, with one
    /// column family per shard plus a metadata column family.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let mut cf_names: Vec<String> = SHARD_ALPHABET.iter().map(|b| cf_name(*b as char)).collect();
        cf_names.push("meta".to_string());

        let mut opts = rocksdb::Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<rocksdb::ColumnFamilyDescriptor> = cf_names
            .iter()
            .map(|name| rocksdb::ColumnFamilyDescriptor::new(name, rocksdb::Options::default()))
            .collect();

        let db = rocksdb::DB::open_cf_descriptors(&opts, path, cf_descriptors)?;
        Ok(AccountStore { db: Arc::new(db) })
    }

    fn shard_cf(&self, shard: char) -> Result<&rocksdb::ColumnFamily, StorageError> {
        self.db
            .cf_handle(&cf_name(shard))
            .ok_or_else(|| StorageError::Database(format!("missing column family for shard {shard}")))
    }

    fn meta_cf(&self) -> Result<&rocksdb::ColumnFamily, StorageError> {
        self.db
            .cf_handle("meta")
            .ok_or_else(|| StorageError::Database("missing meta column family".to_string()))
    }

    /// Look up a single account by address.
    pub fn get(&self, address: &str) -> Result<Option<Account>, StorageError> {
        let shard = shard_char(address)?;
        let cf = self.shard_cf(shard)?;
        match self.db.get_cf(cf, address.as_bytes())? {
            Some(bytes) => {
                let account = bincode::deserialize(&bytes)
                    .map_err(|e| StorageError::Encoding(e.to_string()))?;
                Ok(Some(account))
            }
            None => Ok(None),
        }
    }

    /// Atomically write every dirty account, grouped by shard, then advance
    /// the `state_height` marker. The marker advance is the crash-recovery
    /// anchor: if it lags the ledger head on restart, this commit must be
    /// replayed.
    pub fn commit(&self, dirty: &[Account], height: u64) -> Result<(), StorageError> {
        self.write_grouped_by_shard(dirty)?;
        let meta = self.meta_cf()?;
        self.db.put_cf(meta, STATE_HEIGHT_KEY, height.to_be_bytes())?;
        Ok(())
    }

    /// Group `accounts` by shard and write each shard's batch in one call.
    fn write_grouped_by_shard(&self, accounts: &[Account]) -> Result<(), StorageError> {
        use std::collections::BTreeMap;

        let mut by_shard: BTreeMap<char, Vec<(String, Vec<u8>)>> = BTreeMap::new();
        for account in accounts {
            let shard = shard_char(account.address.as_str())?;
            let bytes = bincode::serialize(account).map_err(|e| StorageError::Encoding(e.to_string()))?;
            by_shard
                .entry(shard)
                .or_default()
                .push((account.address.as_str().to_string(), bytes));
        }

        for (shard, entries) in by_shard {
            let cf = self.shard_cf(shard)?;
            let mut batch = rocksdb::WriteBatch::default();
            for (key, value) in &entries {
                batch.put_cf(cf, key.as_bytes(), value);
            }
            self.db.write(batch)?;
        }
        Ok(())
    }

    /// The height of the last fully committed account batch.
    pub fn state_height(&self) -> Result<u64, StorageError> {
        let meta = self.meta_cf()?;
        match self.db.get_cf(meta, STATE_HEIGHT_KEY)? {
            Some(bytes) if bytes.len() == 8 => Ok(u64::from_be_bytes(bytes.as_slice().try_into().unwrap())),
            _ => Ok(0),
        }
    }

    /// Iterate every account in the store, across all shards. Used by the
    /// full O(accounts) supply scan and by checkpoint state-root generation.
    pub fn all_accounts(&self) -> Result<Vec<Account>, StorageError> {
        let mut accounts = Vec::new();
        for &b in SHARD_ALPHABET {
            let cf = self.shard_cf(b as char)?;
            let iter = self.db.iterator_cf(cf, rocksdb::IteratorMode::Start);
            for item in iter {
                let (_, value) = item?;
                let account: Account =
                    bincode::deserialize(&value).map_err(|e| StorageError::Encoding(e.to_string()))?;
                accounts.push(account);
            }
        }
        Ok(accounts)
    }

    /// Drop every account in every shard. Used before a checkpoint
    /// state-data apply replaces the whole account set.
    pub fn clear_all(&self) -> Result<(), StorageError> {
        for &b in SHARD_ALPHABET {
            let shard = b as char;
            let cf = self.shard_cf(shard)?;
            let keys: Vec<Vec<u8>> = self
                .db
                .iterator_cf(cf, rocksdb::IteratorMode::Start)
                .filter_map(|item| item.ok().map(|(k, _)| k.to_vec()))
                .collect();
            let mut batch = rocksdb::WriteBatch::default();
            for key in keys {
                batch.delete_cf(cf, key);
            }
            self.db.write(batch)?;
        }
        Ok(())
    }

    /// Bulk-insert a full account set, e.g. genesis allocation or a
    /// checkpoint state-data apply. Does not itself move `state_height`;
    /// callers pair this with [`AccountStore::commit`] or set the marker
    /// directly as part of a larger atomic step.
    pub fn bulk_insert(&self, accounts: &[Account]) -> Result<(), StorageError> {
        self.write_grouped_by_shard(accounts)
    }

    /// Set the `state_height` marker directly, without touching account
    /// data. Used after [`AccountStore::bulk_insert`] during a checkpoint
    /// state-data apply.
    pub fn set_state_height(&self, height: u64) -> Result<(), StorageError> {
        let meta = self.meta_cf()?;
        self.db.put_cf(meta, STATE_HEIGHT_KEY, height.to_be_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{Address, NodeType};

    fn account(seed: &[u8], balance: u64) -> Account {
        let mut a = Account::new(Address::derive(seed));
        a.available_balance = balance;
        a
    }

    #[test]
    fn shard_char_derived_from_second_character() {
        let addr = Address::derive(b"shard-test");
        let s = addr.as_str();
        assert_eq!(shard_char(s).unwrap(), s.chars().nth(1).unwrap());
    }

    #[test]
    fn commit_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = AccountStore::open(dir.path()).unwrap();
        let a = account(b"alice", 500);
        store.commit(&[a.clone()], 1).unwrap();
        let back = store.get(a.address.as_str()).unwrap().unwrap();
        assert_eq!(back.available_balance, 500);
        assert_eq!(store.state_height().unwrap(), 1);
    }

    #[test]
    fn all_accounts_spans_every_shard() {
        let dir = tempfile::tempdir().unwrap();
        let store = AccountStore::open(dir.path()).unwrap();
        let accounts: Vec<Account> = (0..50)
            .map(|i| account(format!("seed-{i}").as_bytes(), i as u64))
            .collect();
        store.bulk_insert(&accounts).unwrap();
        let all = store.all_accounts().unwrap();
        assert_eq!(all.len(), 50);
    }

    #[test]
    fn clear_all_empties_every_shard() {
        let dir = tempfile::tempdir().unwrap();
        let store = AccountStore::open(dir.path()).unwrap();
        store.bulk_insert(&[account(b"bob", 10)]).unwrap();
        store.clear_all().unwrap();
        assert!(store.all_accounts().unwrap().is_empty());
    }
}
