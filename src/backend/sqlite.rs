//! SQLite-backed store. Several buckets can share one connection; each
//! bucket keeps its own revision counter.

use std::{path::Path, sync::Arc};

use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, ToSql, Transaction, params};

use crate::{
    errors::{KvGraphError, Result},
    pattern::KeyPattern,
    schema::ensure_schema,
};

use super::{KeyStream, KvEntry, KvStore, paged_keys};

pub type SharedConnection = Arc<Mutex<Connection>>;

pub struct SqliteKvStore {
    conn: SharedConnection,
    bucket: String,
}

impl SqliteKvStore {
    pub fn open<P: AsRef<Path>>(path: P, bucket: &str) -> Result<Self> {
        Ok(Self::with_connection(open_connection(path)?, bucket))
    }

    pub fn open_in_memory(bucket: &str) -> Result<Self> {
        Ok(Self::with_connection(open_in_memory_connection()?, bucket))
    }

    pub fn with_connection(conn: SharedConnection, bucket: &str) -> Self {
        Self {
            conn,
            bucket: bucket.to_string(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn write(&self, key: &str, value: &[u8], must_create: bool) -> Result<u64> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .map_err(|e| KvGraphError::storage(e.to_string()))?;
        if must_create && entry_exists(&tx, &self.bucket, key)? {
            return Err(KvGraphError::key_exists(key));
        }
        let revision = next_revision(&tx, &self.bucket)?;
        tx.execute(
            "INSERT INTO kv_entries(bucket, key, value, revision) VALUES(?1, ?2, ?3, ?4)
             ON CONFLICT(bucket, key) DO UPDATE SET value=excluded.value, revision=excluded.revision",
            params![self.bucket, key, value, revision as i64],
        )
        .map_err(|e| KvGraphError::storage(e.to_string()))?;
        tx.commit()
            .map_err(|e| KvGraphError::storage(e.to_string()))?;
        Ok(revision)
    }
}

impl KvStore for SqliteKvStore {
    fn get(&self, key: &str) -> Result<Option<KvEntry>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT value, revision FROM kv_entries WHERE bucket=?1 AND key=?2",
            params![self.bucket, key],
            |row| {
                Ok(KvEntry::new(
                    row.get::<_, Vec<u8>>(0)?,
                    row.get::<_, i64>(1)? as u64,
                ))
            },
        )
        .optional()
        .map_err(|e| KvGraphError::storage(e.to_string()))
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<u64> {
        self.write(key, value, false)
    }

    fn update(&self, key: &str, value: &[u8]) -> Result<u64> {
        self.write(key, value, false)
    }

    fn create(&self, key: &str, value: &[u8]) -> Result<u64> {
        self.write(key, value, true)
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.conn
            .lock()
            .execute(
                "DELETE FROM kv_entries WHERE bucket=?1 AND key=?2",
                params![self.bucket, key],
            )
            .map_err(|e| KvGraphError::storage(e.to_string()))?;
        Ok(())
    }

    fn keys(&self, patterns: &[&str]) -> Result<KeyStream> {
        let patterns = KeyPattern::parse_all(patterns)?;
        let conn = Arc::clone(&self.conn);
        let bucket = self.bucket.clone();
        Ok(paged_keys(patterns, move |prefix, after, limit| {
            scan_page(&conn, &bucket, prefix, after, limit)
        }))
    }
}

pub fn open_connection<P: AsRef<Path>>(path: P) -> Result<SharedConnection> {
    let conn = Connection::open(path).map_err(|e| KvGraphError::storage(e.to_string()))?;
    ensure_schema(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

pub fn open_in_memory_connection() -> Result<SharedConnection> {
    let conn = Connection::open_in_memory().map_err(|e| KvGraphError::storage(e.to_string()))?;
    ensure_schema(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

fn entry_exists(tx: &Transaction<'_>, bucket: &str, key: &str) -> Result<bool> {
    let found: Option<i64> = tx
        .query_row(
            "SELECT 1 FROM kv_entries WHERE bucket=?1 AND key=?2",
            params![bucket, key],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| KvGraphError::storage(e.to_string()))?;
    Ok(found.is_some())
}

fn next_revision(tx: &Transaction<'_>, bucket: &str) -> Result<u64> {
    let revision: i64 = tx
        .query_row(
            "INSERT INTO kv_buckets(bucket, revision) VALUES(?1, 1)
             ON CONFLICT(bucket) DO UPDATE SET revision = revision + 1
             RETURNING revision",
            params![bucket],
            |row| row.get(0),
        )
        .map_err(|e| KvGraphError::storage(e.to_string()))?;
    Ok(revision as u64)
}

fn scan_page(
    conn: &SharedConnection,
    bucket: &str,
    prefix: &str,
    after: Option<&str>,
    limit: usize,
) -> Result<Vec<String>> {
    let lower_op = if after.is_some() { ">" } else { ">=" };
    let lower = after.unwrap_or(prefix);
    let upper = (!prefix.is_empty()).then(|| prefix_upper_bound(prefix));
    let limit = limit as i64;
    let sql = match upper {
        Some(_) => format!(
            "SELECT key FROM kv_entries WHERE bucket=?1 AND key {lower_op} ?2 AND key < ?3 ORDER BY key LIMIT ?4"
        ),
        None => format!(
            "SELECT key FROM kv_entries WHERE bucket=?1 AND key {lower_op} ?2 ORDER BY key LIMIT ?3"
        ),
    };
    let mut args: Vec<&dyn ToSql> = Vec::with_capacity(4);
    args.push(&bucket);
    args.push(&lower);
    if let Some(upper) = &upper {
        args.push(upper);
    }
    args.push(&limit);

    let conn = conn.lock();
    let mut stmt = conn
        .prepare_cached(&sql)
        .map_err(|e| KvGraphError::storage(e.to_string()))?;
    let rows = stmt
        .query_map(args.as_slice(), |row| row.get::<_, String>(0))
        .map_err(|e| KvGraphError::storage(e.to_string()))?;
    let mut keys = Vec::new();
    for row in rows {
        keys.push(row.map_err(|e| KvGraphError::storage(e.to_string()))?);
    }
    Ok(keys)
}

/// A string greater than every string starting with `prefix`. Trailing
/// non-ASCII bytes are dropped first, which only widens the range.
fn prefix_upper_bound(prefix: &str) -> String {
    let mut bytes = prefix.as_bytes().to_vec();
    while let Some(last) = bytes.pop() {
        if last < 0x7f {
            bytes.push(last + 1);
            return String::from_utf8_lossy(&bytes).into_owned();
        }
    }
    String::from("\u{10ffff}")
}
