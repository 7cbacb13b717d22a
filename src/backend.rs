//! Key-value backend contract consumed by the graph engine.
//!
//! A store is an ordered keyspace of dot-delimited keys. `keys()` accepts a
//! list of subject patterns (see [`crate::pattern`]); the result is their
//! deduplicated union, and an empty list selects every key. Revisions
//! returned by writes increase monotonically per store instance.

use std::{collections::VecDeque, sync::Arc};

use ahash::AHashSet;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{errors::Result, pattern::KeyPattern};

pub mod instrumented;
pub mod memory;
#[cfg(feature = "sqlite-backend")]
pub mod sqlite;

pub use instrumented::{InstrumentedStore, KvMetrics, KvMetricsSnapshot};
pub use memory::MemoryKvStore;
#[cfg(feature = "sqlite-backend")]
pub use sqlite::SqliteKvStore;

pub type KeyStream = Box<dyn Iterator<Item = Result<String>> + Send>;

pub const SCAN_PAGE_SIZE: usize = 256;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KvEntry {
    pub value: Vec<u8>,
    pub revision: u64,
}

impl KvEntry {
    pub fn new(value: Vec<u8>, revision: u64) -> Self {
        Self { value, revision }
    }

    pub fn string(&self) -> String {
        String::from_utf8_lossy(&self.value).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.value)?)
    }

    pub fn json_value(&self) -> Result<Value> {
        self.json()
    }
}

pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<KvEntry>>;
    fn put(&self, key: &str, value: &[u8]) -> Result<u64>;
    fn update(&self, key: &str, value: &[u8]) -> Result<u64>;
    /// Fails with [`crate::KvGraphError::KeyExists`] when the key is present.
    fn create(&self, key: &str, value: &[u8]) -> Result<u64>;
    /// Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> Result<()>;
    fn keys(&self, patterns: &[&str]) -> Result<KeyStream>;

    fn keys_matching(&self, pattern: &str) -> Result<KeyStream> {
        self.keys(&[pattern])
    }
}

impl<S> KvStore for &S
where
    S: KvStore + ?Sized,
{
    fn get(&self, key: &str) -> Result<Option<KvEntry>> {
        (*self).get(key)
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<u64> {
        (*self).put(key, value)
    }

    fn update(&self, key: &str, value: &[u8]) -> Result<u64> {
        (*self).update(key, value)
    }

    fn create(&self, key: &str, value: &[u8]) -> Result<u64> {
        (*self).create(key, value)
    }

    fn delete(&self, key: &str) -> Result<()> {
        (*self).delete(key)
    }

    fn keys(&self, patterns: &[&str]) -> Result<KeyStream> {
        (*self).keys(patterns)
    }
}

impl<S> KvStore for Arc<S>
where
    S: KvStore + ?Sized,
{
    fn get(&self, key: &str) -> Result<Option<KvEntry>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<u64> {
        (**self).put(key, value)
    }

    fn update(&self, key: &str, value: &[u8]) -> Result<u64> {
        (**self).update(key, value)
    }

    fn create(&self, key: &str, value: &[u8]) -> Result<u64> {
        (**self).create(key, value)
    }

    fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key)
    }

    fn keys(&self, patterns: &[&str]) -> Result<KeyStream> {
        (**self).keys(patterns)
    }
}

/// Walks the union of `patterns` one page at a time. `fetch(prefix, after,
/// limit)` returns up to `limit` keys starting with `prefix`, in key order,
/// strictly after `after` when given. No lock is held between pages.
pub(crate) fn paged_keys<F>(patterns: Vec<KeyPattern>, fetch: F) -> KeyStream
where
    F: Fn(&str, Option<&str>, usize) -> Result<Vec<String>> + Send + 'static,
{
    let prefixes: VecDeque<String> =
        if patterns.is_empty() || patterns.iter().any(KeyPattern::matches_everything) {
            VecDeque::from([String::new()])
        } else {
            patterns.iter().map(KeyPattern::literal_prefix).collect()
        };
    Box::new(PagedKeys {
        dedup: prefixes.len() > 1,
        patterns,
        prefixes,
        current: None,
        after: None,
        more: false,
        page: Vec::new().into_iter(),
        seen: AHashSet::new(),
        fetch,
    })
}

struct PagedKeys<F> {
    patterns: Vec<KeyPattern>,
    prefixes: VecDeque<String>,
    current: Option<String>,
    after: Option<String>,
    more: bool,
    page: std::vec::IntoIter<String>,
    dedup: bool,
    seen: AHashSet<String>,
    fetch: F,
}

impl<F> PagedKeys<F> {
    fn accepts(&mut self, key: &str) -> bool {
        let matched = self.patterns.is_empty() || self.patterns.iter().any(|p| p.matches(key));
        matched && (!self.dedup || self.seen.insert(key.to_string()))
    }
}

impl<F> Iterator for PagedKeys<F>
where
    F: Fn(&str, Option<&str>, usize) -> Result<Vec<String>>,
{
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(key) = self.page.next() {
                self.after = Some(key.clone());
                if self.accepts(&key) {
                    return Some(Ok(key));
                }
                continue;
            }
            if !self.more {
                self.current = Some(self.prefixes.pop_front()?);
                self.after = None;
            }
            let prefix = self.current.as_deref()?;
            match (self.fetch)(prefix, self.after.as_deref(), SCAN_PAGE_SIZE) {
                Ok(keys) => {
                    self.more = keys.len() == SCAN_PAGE_SIZE;
                    self.page = keys.into_iter();
                }
                Err(err) => {
                    self.prefixes.clear();
                    self.more = false;
                    return Some(Err(err));
                }
            }
        }
    }
}
