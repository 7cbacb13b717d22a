//! In-memory reference store.

use std::{collections::BTreeMap, ops::Bound, sync::Arc};

use parking_lot::RwLock;

use crate::{
    errors::{KvGraphError, Result},
    pattern::KeyPattern,
};

use super::{KeyStream, KvEntry, KvStore, paged_keys};

#[derive(Default)]
pub struct MemoryKvStore {
    inner: Arc<RwLock<MemoryState>>,
}

#[derive(Default)]
struct MemoryState {
    entries: BTreeMap<String, KvEntry>,
    revision: u64,
}

impl MemoryState {
    fn write(&mut self, key: &str, value: &[u8]) -> u64 {
        self.revision += 1;
        self.entries
            .insert(key.to_string(), KvEntry::new(value.to_vec(), self.revision));
        self.revision
    }

    fn page(&self, prefix: &str, after: Option<&str>, limit: usize) -> Vec<String> {
        let start = match after {
            Some(after) => Bound::Excluded(after.to_string()),
            None => Bound::Included(prefix.to_string()),
        };
        self.entries
            .range::<String, _>((start, Bound::Unbounded))
            .map(|(key, _)| key)
            .take_while(|key| key.starts_with(prefix))
            .take(limit)
            .cloned()
            .collect()
    }
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn revision(&self) -> u64 {
        self.inner.read().revision
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<KvEntry>> {
        Ok(self.inner.read().entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<u64> {
        Ok(self.inner.write().write(key, value))
    }

    fn update(&self, key: &str, value: &[u8]) -> Result<u64> {
        Ok(self.inner.write().write(key, value))
    }

    fn create(&self, key: &str, value: &[u8]) -> Result<u64> {
        let mut state = self.inner.write();
        if state.entries.contains_key(key) {
            return Err(KvGraphError::key_exists(key));
        }
        Ok(state.write(key, value))
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.inner.write().entries.remove(key);
        Ok(())
    }

    fn keys(&self, patterns: &[&str]) -> Result<KeyStream> {
        let patterns = KeyPattern::parse_all(patterns)?;
        let inner = Arc::clone(&self.inner);
        Ok(paged_keys(patterns, move |prefix, after, limit| {
            Ok(inner.read().page(prefix, after, limit))
        }))
    }
}
