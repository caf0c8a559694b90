use std::collections::HashMap;

use parking_lot::RwLock;

use crate::{LedgerResult, WalletStore};

/// In-process state store for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryWalletStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryWalletStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl WalletStore for MemoryWalletStore {
    fn get(&self, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> LedgerResult<()> {
        self.entries.write().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn contains(&self, key: &str) -> LedgerResult<bool> {
        Ok(self.entries.read().contains_key(key))
    }

    fn insert(&self, key: &str, value: &[u8]) -> LedgerResult<bool> {
        let mut entries = self.entries.write();
        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(key.to_string(), value.to_vec());
        Ok(true)
    }
}
