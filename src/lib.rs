//! Embeddable graph database: Gremlin-style traversals executed lazily over a
//! key-value store.
//! Run Criterion benchmarks with `cargo bench` to inspect reports under `target/criterion`.

pub mod backend;
pub mod bench_utils;
pub mod client;
pub mod config;
pub mod connection;
pub mod diagnostics;
pub mod dsl;
pub mod errors;
pub mod grammar;
pub mod graph;
pub mod logging;
pub mod optimizer;
pub mod pattern;
pub mod pipeline;
pub mod schema;
pub mod steps;
pub mod traversal;

pub use crate::backend::{KvEntry, KvStore, MemoryKvStore};
pub use crate::config::{BackendKind, GraphConfig, SqliteConfig, open_graph};
pub use crate::connection::Connection;
pub use crate::errors::{ErrorCode, ErrorKind, KvGraphError, Result};
pub use crate::grammar::{OpName, ResultType};
pub use crate::graph::{ElementKind, Graph, RecordStore};
pub use crate::optimizer::{Optimizer, Plan, RewriteRule};
pub use crate::traversal::{Ids, Names, OpCall, Traversal};
