use kvgraph::{
    ErrorCode, KvStore, MemoryKvStore,
    backend::{SCAN_PAGE_SIZE, SqliteKvStore},
};

fn collect(store: &dyn KvStore, patterns: &[&str]) -> Vec<String> {
    let mut keys: Vec<String> = store
        .keys(patterns)
        .expect("keys")
        .collect::<Result<_, _>>()
        .expect("stream");
    keys.sort();
    keys
}

fn seed(store: &dyn KvStore) {
    for key in ["a.b.c", "a.x.c", "a.b.d", "a.b", "b.a", "node.1.label"] {
        store.put(key, key.as_bytes()).expect("put");
    }
}

macro_rules! contract_suite {
    ($module:ident, $make:expr) => {
        mod $module {
            use super::*;

            fn store() -> Box<dyn KvStore> {
                Box::new($make)
            }

            #[test]
            fn test_get_missing_is_none() {
                let store = store();
                assert!(store.get("nothing.here").expect("get").is_none());
            }

            #[test]
            fn test_put_then_get_returns_value_and_revision() {
                let store = store();
                let rev = store.put("a.b", b"one").expect("put");
                let entry = store.get("a.b").expect("get").expect("present");
                assert_eq!(entry.value, b"one");
                assert_eq!(entry.revision, rev);
                assert_eq!(entry.string(), "one");
            }

            #[test]
            fn test_revisions_increase() {
                let store = store();
                let first = store.put("a.b", b"1").expect("put");
                let second = store.update("a.b", b"2").expect("update");
                let third = store.create("a.c", b"3").expect("create");
                assert!(first < second && second < third);
                assert_eq!(store.get("a.b").expect("get").expect("present").value, b"2");
            }

            #[test]
            fn test_create_fails_when_key_exists() {
                let store = store();
                store.create("a.b", b"1").expect("first create");
                let err = store.create("a.b", b"2").expect_err("duplicate");
                assert!(err.is_key_exists());
                assert_eq!(err.code(), ErrorCode::KvKeyExists);
                assert_eq!(store.get("a.b").expect("get").expect("present").value, b"1");
            }

            #[test]
            fn test_delete_removes_key_and_tolerates_missing() {
                let store = store();
                store.put("a.b", b"1").expect("put");
                store.delete("a.b").expect("delete");
                assert!(store.get("a.b").expect("get").is_none());
                store.delete("a.b").expect("second delete");
                store.create("a.b", b"again").expect("create after delete");
            }

            #[test]
            fn test_single_wildcard_scan() {
                let store = store();
                seed(store.as_ref());
                assert_eq!(collect(store.as_ref(), &["a.*.c"]), vec!["a.b.c", "a.x.c"]);
            }

            #[test]
            fn test_tail_wildcard_scan() {
                let store = store();
                seed(store.as_ref());
                assert_eq!(
                    collect(store.as_ref(), &["a.>"]),
                    vec!["a.b", "a.b.c", "a.b.d", "a.x.c"]
                );
            }

            #[test]
            fn test_pattern_union_is_deduplicated() {
                let store = store();
                seed(store.as_ref());
                assert_eq!(
                    collect(store.as_ref(), &["a.b.*", "a.*.c", "b.a"]),
                    vec!["a.b.c", "a.b.d", "a.x.c", "b.a"]
                );
            }

            #[test]
            fn test_empty_pattern_list_selects_everything() {
                let store = store();
                seed(store.as_ref());
                assert_eq!(collect(store.as_ref(), &[]).len(), 6);
                assert_eq!(collect(store.as_ref(), &[">"]).len(), 6);
            }

            #[test]
            fn test_exact_pattern() {
                let store = store();
                seed(store.as_ref());
                assert_eq!(collect(store.as_ref(), &["a.b"]), vec!["a.b"]);
                assert!(collect(store.as_ref(), &["a.q"]).is_empty());
            }

            #[test]
            fn test_invalid_pattern_is_rejected() {
                let store = store();
                let err = store.keys(&["a.>.b"]).err().expect("invalid pattern");
                assert_eq!(err.code(), ErrorCode::KvInvalidPattern);
            }

            #[test]
            fn test_scan_spans_several_pages_in_order() {
                let store = store();
                let total = SCAN_PAGE_SIZE * 2 + 7;
                for n in 0..total {
                    store.put(&format!("k.{n:05}"), b"").expect("put");
                }
                store.put("l.00000", b"").expect("put");
                let keys: Vec<String> = store
                    .keys(&["k.*"])
                    .expect("keys")
                    .collect::<Result<_, _>>()
                    .expect("stream");
                assert_eq!(keys.len(), total);
                assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
            }

            #[test]
            fn test_scan_reads_pages_as_it_goes() {
                let store = store();
                for n in 0..SCAN_PAGE_SIZE + 10 {
                    store.put(&format!("k.{n:05}"), b"").expect("put");
                }
                let mut stream = store.keys(&["k.>"]).expect("keys");
                assert_eq!(stream.next().expect("first").expect("key"), "k.00000");
                // Written behind the first page after the scan started.
                store.put("k.99999", b"").expect("late put");
                store.delete(&format!("k.{:05}", SCAN_PAGE_SIZE + 5)).expect("late delete");
                let rest: Vec<String> = stream.collect::<Result<_, _>>().expect("stream");
                assert_eq!(rest.len(), SCAN_PAGE_SIZE + 9);
                assert_eq!(rest.last().map(String::as_str), Some("k.99999"));
            }

            #[test]
            fn test_json_helpers() {
                let store = store();
                store.put("a.json", br#"["x","y"]"#).expect("put");
                let entry = store.get("a.json").expect("get").expect("present");
                let ids: Vec<String> = entry.json().expect("json");
                assert_eq!(ids, vec!["x", "y"]);
            }
        }
    };
}

contract_suite!(memory, MemoryKvStore::new());
contract_suite!(sqlite, SqliteKvStore::open_in_memory("contract").expect("sqlite"));

#[test]
fn test_sqlite_buckets_are_isolated() {
    let conn = kvgraph::backend::sqlite::open_in_memory_connection().expect("conn");
    let left = SqliteKvStore::with_connection(conn.clone(), "left");
    let right = SqliteKvStore::with_connection(conn, "right");
    left.put("k.1", b"l").expect("put");
    assert!(right.get("k.1").expect("get").is_none());
    assert_eq!(collect(&right, &[">"]).len(), 0);
    right.put("k.1", b"r").expect("put");
    assert_eq!(left.get("k.1").expect("get").expect("present").value, b"l");
    assert_eq!(right.bucket(), "right");
}

#[test]
fn test_sqlite_persists_across_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("kv.db");
    {
        let store = SqliteKvStore::open(&path, "graph").expect("open");
        store.put("node.a", b"a").expect("put");
    }
    let store = SqliteKvStore::open(&path, "graph").expect("reopen");
    assert_eq!(store.get("node.a").expect("get").expect("present").value, b"a");
    let rev = store.put("node.b", b"b").expect("put");
    assert!(rev > 1);
}

#[test]
fn test_memory_store_counts_entries() {
    let store = MemoryKvStore::new();
    assert!(store.is_empty());
    seed(&store);
    assert_eq!(store.len(), 6);
    assert_eq!(store.revision(), 6);
}

#[test]
fn test_sqlite_schema_is_versioned() {
    let conn = kvgraph::backend::sqlite::open_in_memory_connection().expect("conn");
    let version = kvgraph::schema::read_schema_version(&conn.lock()).expect("version");
    assert_eq!(version, kvgraph::schema::SCHEMA_VERSION);
    // Re-running the migration on an initialized database is a no-op.
    kvgraph::schema::ensure_schema(&conn.lock()).expect("idempotent");
}

#[test]
fn test_sqlite_scan_handles_non_ascii_tokens() {
    let store = SqliteKvStore::open_in_memory("unicode").expect("sqlite");
    store.put("node.ä.label", b"x").expect("put");
    store.put("node.äb.label", b"y").expect("put");
    store.put("node.b.label", b"z").expect("put");
    assert_eq!(collect(&store, &["node.ä.*"]), vec!["node.ä.label"]);
}
