use rusqlite::Connection;

use crate::errors::{KvGraphError, Result};

pub const SCHEMA_VERSION: i64 = 1;

pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS kv_entries (
            bucket   TEXT NOT NULL,
            key      TEXT NOT NULL,
            value    BLOB NOT NULL,
            revision INTEGER NOT NULL,
            PRIMARY KEY (bucket, key)
        ) WITHOUT ROWID;
        CREATE TABLE IF NOT EXISTS kv_buckets (
            bucket   TEXT PRIMARY KEY,
            revision INTEGER NOT NULL DEFAULT 0
        );
        CREATE TABLE IF NOT EXISTS kv_meta (
            id             INTEGER PRIMARY KEY CHECK (id = 1),
            schema_version INTEGER NOT NULL
        );
        "#,
    )
    .map_err(|e| KvGraphError::storage(e.to_string()))?;
    conn.execute(
        "INSERT OR IGNORE INTO kv_meta(id, schema_version) VALUES(1, ?1)",
        [SCHEMA_VERSION],
    )
    .map_err(|e| KvGraphError::storage(e.to_string()))?;
    Ok(())
}

pub fn read_schema_version(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT schema_version FROM kv_meta WHERE id=1", [], |row| {
        row.get(0)
    })
    .map_err(|e| KvGraphError::storage(e.to_string()))
}
