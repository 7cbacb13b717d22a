use std::path::PathBuf;

use crate::config::{BackendKind, GraphConfig, SqliteConfig};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandLineConfig {
    pub backend: String,
    pub database: String,
    pub bucket: String,
    pub optimize: bool,
    pub explain: bool,
    pub queries: Vec<String>,
}

impl CommandLineConfig {
    pub fn from_args(args: &[&str]) -> Result<Self, String> {
        let mut backend = String::from("memory");
        let mut database = String::from("memory");
        let mut bucket = String::from(crate::config::DEFAULT_BUCKET);
        let mut optimize = true;
        let mut explain = false;
        let mut queries = Vec::new();
        let mut iter = args.iter().skip(1);
        while let Some(arg) = iter.next() {
            match *arg {
                "--backend" => {
                    backend = iter
                        .next()
                        .ok_or_else(|| "--backend requires a value".to_string())?
                        .to_string();
                }
                "--db" | "--database" => {
                    database = iter
                        .next()
                        .ok_or_else(|| "--db requires a value".to_string())?
                        .to_string();
                }
                "--bucket" => {
                    bucket = iter
                        .next()
                        .ok_or_else(|| "--bucket requires a value".to_string())?
                        .to_string();
                }
                "--no-optimize" => optimize = false,
                "--explain" => explain = true,
                other if other.starts_with("--") => {
                    return Err(format!("unknown flag {other}"));
                }
                query => queries.push(query.to_string()),
            }
        }
        if queries.is_empty() {
            return Err("at least one query is required".into());
        }
        Ok(Self {
            backend,
            database,
            bucket,
            optimize,
            explain,
            queries,
        })
    }

    /// A `--db` path implies sqlite even when `--backend` is left at its default.
    pub fn graph_config(&self) -> Result<GraphConfig, String> {
        let mut kind = BackendKind::parse(&self.backend)
            .ok_or_else(|| format!("unsupported backend {}", self.backend))?;
        if self.database != "memory" {
            kind = BackendKind::Sqlite;
        }
        let sqlite = SqliteConfig {
            path: (self.database != "memory").then(|| PathBuf::from(&self.database)),
        };
        Ok(GraphConfig {
            backend: kind,
            bucket: self.bucket.clone(),
            optimize: self.optimize,
            sqlite,
        })
    }

    pub fn help() -> &'static str {
        "Usage: kvgraph [--backend memory|sqlite] [--db memory|PATH] [--bucket NAME] \
         [--no-optimize] [--explain] QUERY...\n\
         Each QUERY is a traversal such as \"g.V().has('name','Alice').count()\";\n\
         queries run in order against the same graph and print one JSON value per line.\n\
         Set KVGRAPH_LOG (e.g. KVGRAPH_LOG=debug) to control logging.\n"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_path_implies_sqlite() {
        let cfg = CommandLineConfig::from_args(&["kvgraph", "--db", "/tmp/g.db", "g.V()"])
            .expect("args");
        let graph = cfg.graph_config().expect("config");
        assert_eq!(graph.backend, BackendKind::Sqlite);
        assert_eq!(graph.sqlite.path, Some(PathBuf::from("/tmp/g.db")));
        assert!(graph.optimize);
    }

    #[test]
    fn test_flags_and_queries() {
        let cfg = CommandLineConfig::from_args(&[
            "kvgraph",
            "--bucket",
            "social",
            "--no-optimize",
            "--explain",
            "g.V()",
            "g.E()",
        ])
        .expect("args");
        assert_eq!(cfg.bucket, "social");
        assert!(!cfg.optimize);
        assert!(cfg.explain);
        assert_eq!(cfg.queries, vec!["g.V()", "g.E()"]);
        assert_eq!(cfg.graph_config().expect("config").backend, BackendKind::Memory);
    }

    #[test]
    fn test_rejects_missing_values_and_queries() {
        assert!(CommandLineConfig::from_args(&["kvgraph"]).is_err());
        assert!(CommandLineConfig::from_args(&["kvgraph", "--db"]).is_err());
        assert!(CommandLineConfig::from_args(&["kvgraph", "--what", "g.V()"]).is_err());
    }
}
