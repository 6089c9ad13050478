use crate::error::{BlockchainError, Result};
use crate::storage::{Store, WriteBatch};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

/// In-process store with the same commit semantics as [`super::SledStore`].
///
/// `fail_next_commit` arms a one-shot fault: the next commit applies part of
/// its batch to a scratch copy and then fails, leaving the visible state
/// untouched.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<Vec<u8>, Vec<u8>>>,
    fail_next: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    pub fn fail_next_commit(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Write a single key outside of a batch. Used to simulate corruption.
    pub fn put_raw(&self, key: &[u8], value: &[u8]) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_vec(), value.to_vec());
    }

    pub fn remove_raw(&self, key: &[u8]) -> Option<Vec<u8>> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn commit(&self, batch: &WriteBatch) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let mut staged = entries.clone();

        for (applied, (key, value)) in batch.iter().enumerate() {
            if applied > 0 && self.fail_next.swap(false, Ordering::SeqCst) {
                return Err(BlockchainError::Commit(format!(
                    "Injected fault after {applied} of {} writes",
                    batch.len()
                )));
            }
            staged.insert(key.to_vec(), value.to_vec());
        }
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(BlockchainError::Commit("Injected fault".to_string()));
        }

        *entries = staged;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_injected_fault_applies_nothing() {
        let store = MemoryStore::new();
        let mut batch = WriteBatch::new();
        batch.put(b"block", b"bytes").put(b"l", b"block");

        store.fail_next_commit();
        let result = store.commit(&batch);

        assert!(matches!(result, Err(BlockchainError::Commit(_))));
        assert!(store.is_empty());
        assert_eq!(store.get(b"block").unwrap(), None);
    }

    #[test]
    fn test_fault_is_one_shot() {
        let store = MemoryStore::new();
        let mut batch = WriteBatch::new();
        batch.put(b"a", b"1");

        store.fail_next_commit();
        assert!(store.commit(&batch).is_err());
        store.commit(&batch).unwrap();
        assert_eq!(store.get(b"a").unwrap(), Some(b"1".to_vec()));
    }

    #[test]
    fn test_raw_writes() {
        let store = MemoryStore::new();
        store.put_raw(b"x", b"y");
        assert_eq!(store.len(), 1);
        assert_eq!(store.remove_raw(b"x"), Some(b"y".to_vec()));
        assert!(store.is_empty());
    }
}
