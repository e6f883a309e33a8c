//! Key-value backend trait and the redb implementation.

use crate::constants::REDB_FILE_NAME;
use crate::error::StoreError;
use redb::{ReadableDatabase, TableDefinition};
use std::sync::Arc;

/// Single key-value table holding JSON documents by string key.
const KV: TableDefinition<&str, &[u8]> = TableDefinition::new("kv");

/// Minimal get/put backend the store adapter sits on.
///
/// The backend is schemaless: values are opaque bytes, interpretation
/// happens in [`crate::store::NavStore`].
pub trait KvBackend: Send + Sync {
    /// Read the raw value for `key`, `None` when absent.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
    /// Write the raw value for `key`.
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;
    /// Cheap connectivity check for health reporting.
    fn probe(&self) -> Result<(), StoreError>;
}

/// redb-backed [`KvBackend`].
pub struct RedbBackend {
    db: Arc<redb::Database>,
}

impl RedbBackend {
    /// Open (or create) the backend under the given directory.
    ///
    /// # Errors
    /// Returns an error when the database or its table cannot be opened.
    pub fn open(dir: &str) -> Result<Self, StoreError> {
        std::fs::create_dir_all(dir)
            .map_err(|err| StoreError::Backend(format!("create {dir}: {err}")))?;
        let path = std::path::Path::new(dir).join(REDB_FILE_NAME);
        let db = redb::Database::create(&path)?;
        // Create the table up front so reads never race table creation.
        let write_txn = db.begin_write()?;
        write_txn.open_table(KV)?;
        write_txn.commit()?;
        Ok(Self { db: Arc::new(db) })
    }
}

impl KvBackend for RedbBackend {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(KV)?;
        match table.get(key)? {
            Some(value) => Ok(Some(value.value().to_vec())),
            None => Ok(None),
        }
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(KV)?;
            table.insert(key, value)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn probe(&self) -> Result<(), StoreError> {
        self.db.begin_read()?;
        Ok(())
    }
}
