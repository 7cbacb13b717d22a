use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use crate::errors::Result;

use super::{KeyStream, KvEntry, KvStore};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KvMetricsSnapshot {
    pub gets: u64,
    pub puts: u64,
    pub updates: u64,
    pub creates: u64,
    pub deletes: u64,
    pub key_scans: u64,
    /// Keys actually pulled out of scan streams.
    pub keys_pulled: u64,
}

impl KvMetricsSnapshot {
    pub fn reads(&self) -> u64 {
        self.gets + self.key_scans
    }

    pub fn writes(&self) -> u64 {
        self.puts + self.updates + self.creates + self.deletes
    }

    pub fn total_calls(&self) -> u64 {
        self.reads() + self.writes()
    }
}

#[derive(Default)]
pub struct KvMetrics {
    gets: AtomicU64,
    puts: AtomicU64,
    updates: AtomicU64,
    creates: AtomicU64,
    deletes: AtomicU64,
    key_scans: AtomicU64,
    keys_pulled: AtomicU64,
}

impl KvMetrics {
    pub fn snapshot(&self) -> KvMetricsSnapshot {
        KvMetricsSnapshot {
            gets: self.gets.load(Ordering::Relaxed),
            puts: self.puts.load(Ordering::Relaxed),
            updates: self.updates.load(Ordering::Relaxed),
            creates: self.creates.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            key_scans: self.key_scans.load(Ordering::Relaxed),
            keys_pulled: self.keys_pulled.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.gets.store(0, Ordering::Relaxed);
        self.puts.store(0, Ordering::Relaxed);
        self.updates.store(0, Ordering::Relaxed);
        self.creates.store(0, Ordering::Relaxed);
        self.deletes.store(0, Ordering::Relaxed);
        self.key_scans.store(0, Ordering::Relaxed);
        self.keys_pulled.store(0, Ordering::Relaxed);
    }
}

pub struct InstrumentedStore<S> {
    inner: S,
    metrics: Arc<KvMetrics>,
}

impl<S: KvStore> InstrumentedStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            metrics: Arc::new(KvMetrics::default()),
        }
    }

    pub fn metrics(&self) -> Arc<KvMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: KvStore> KvStore for InstrumentedStore<S> {
    fn get(&self, key: &str) -> Result<Option<KvEntry>> {
        self.metrics.gets.fetch_add(1, Ordering::Relaxed);
        self.inner.get(key)
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<u64> {
        self.metrics.puts.fetch_add(1, Ordering::Relaxed);
        self.inner.put(key, value)
    }

    fn update(&self, key: &str, value: &[u8]) -> Result<u64> {
        self.metrics.updates.fetch_add(1, Ordering::Relaxed);
        self.inner.update(key, value)
    }

    fn create(&self, key: &str, value: &[u8]) -> Result<u64> {
        self.metrics.creates.fetch_add(1, Ordering::Relaxed);
        self.inner.create(key, value)
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.metrics.deletes.fetch_add(1, Ordering::Relaxed);
        self.inner.delete(key)
    }

    fn keys(&self, patterns: &[&str]) -> Result<KeyStream> {
        self.metrics.key_scans.fetch_add(1, Ordering::Relaxed);
        let stream = self.inner.keys(patterns)?;
        let metrics = Arc::clone(&self.metrics);
        Ok(Box::new(stream.inspect(move |_| {
            metrics.keys_pulled.fetch_add(1, Ordering::Relaxed);
        })))
    }
}
