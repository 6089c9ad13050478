// Durable block store backed by a single sled tree
use crate::error::{BlockchainError, Result};
use crate::storage::{Store, WriteBatch};
use log::debug;
use sled::transaction::{abort, TransactionError};
use sled::{Db, Tree};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

/// Tree name for storing all blocks and the tip pointer
pub const BLOCKS_TREE: &str = "blocks";

pub struct SledStore {
    db: Db,
    blocks: Tree,
    path: PathBuf,
    fail_next: AtomicBool,
}

impl SledStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<SledStore> {
        let path = path.as_ref().to_path_buf();
        let db = sled::open(&path)
            .map_err(|e| BlockchainError::StoreOpen(format!("{}: {e}", path.display())))?;
        let blocks = db
            .open_tree(BLOCKS_TREE)
            .map_err(|e| BlockchainError::StoreOpen(format!("Failed to open blocks tree: {e}")))?;
        debug!("Opened block store at {}", path.display());

        Ok(SledStore {
            db,
            blocks,
            path,
            fail_next: AtomicBool::new(false),
        })
    }

    /// Arms a one-shot fault: the next commit aborts its sled transaction
    /// after the first write of the batch.
    pub fn fail_next_commit(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn get_path(&self) -> &Path {
        &self.path
    }
}

impl Store for SledStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let value = self
            .blocks
            .get(key)
            .map_err(|e| BlockchainError::Database(format!("Failed to read key: {e}")))?;
        Ok(value.map(|v| v.to_vec()))
    }

    fn commit(&self, batch: &WriteBatch) -> Result<()> {
        self.blocks
            .transaction(|tx_db| {
                for (applied, (key, value)) in batch.iter().enumerate() {
                    if applied > 0 && self.fail_next.swap(false, Ordering::SeqCst) {
                        return abort(format!(
                            "injected fault after {applied} of {} writes",
                            batch.len()
                        ));
                    }
                    tx_db.insert(key, value)?;
                }
                Ok(())
            })
            .map_err(|e: TransactionError<String>| {
                BlockchainError::Commit(format!("Failed to update blocks tree: {e}"))
            })?;

        self.blocks
            .flush()
            .map_err(|e| BlockchainError::Commit(format!("Failed to flush blocks tree: {e}")))?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_commit_and_read_back() {
        let dir = tempdir().unwrap();
        let store = SledStore::open(dir.path().join("store")).unwrap();

        let mut batch = WriteBatch::new();
        batch.put(b"k1", b"v1").put(b"k2", b"v2");
        store.commit(&batch).unwrap();

        assert_eq!(store.get(b"k1").unwrap(), Some(b"v1".to_vec()));
        assert_eq!(store.get(b"k2").unwrap(), Some(b"v2".to_vec()));
        assert_eq!(store.get(b"missing").unwrap(), None);
    }

    #[test]
    fn test_data_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store");
        {
            let store = SledStore::open(&path).unwrap();
            let mut batch = WriteBatch::new();
            batch.put(b"l", b"tip");
            store.commit(&batch).unwrap();
            store.flush().unwrap();
        }

        let store = SledStore::open(&path).unwrap();
        assert_eq!(store.get(b"l").unwrap(), Some(b"tip".to_vec()));
        assert_eq!(store.get_path(), path.as_path());
    }

    #[test]
    fn test_failed_commit_writes_nothing() {
        let dir = tempdir().unwrap();
        let store = SledStore::open(dir.path().join("store")).unwrap();

        store.fail_next_commit();
        let mut batch = WriteBatch::new();
        batch.put(b"block", b"data").put(b"l", b"block");
        let result = store.commit(&batch);

        assert!(matches!(result, Err(BlockchainError::Commit(_))));
        assert_eq!(store.get(b"block").unwrap(), None);
        assert_eq!(store.get(b"l").unwrap(), None);

        store.commit(&batch).unwrap();
        assert_eq!(store.get(b"l").unwrap(), Some(b"block".to_vec()));
    }

    #[test]
    fn test_open_on_a_file_fails() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("not_a_dir");
        std::fs::write(&file, b"occupied").unwrap();

        let result = SledStore::open(&file);
        assert!(matches!(result, Err(BlockchainError::StoreOpen(_))));
    }
}
