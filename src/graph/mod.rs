mod adjacency;
mod cascade;
pub mod keys;
pub mod records;

use std::sync::Arc;

use crate::{
    backend::{KvStore, MemoryKvStore},
    dsl,
    errors::Result,
    optimizer::Optimizer,
    traversal::{Ids, Traversal},
};

pub use keys::{Adjacent, Direction, ElementKind};
pub use records::{EdgeEndpoints, IdStream, RecordStore, new_element_id};

#[derive(Clone)]
pub struct Graph {
    records: RecordStore,
    optimizer: Arc<Optimizer>,
}

impl Graph {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            records: RecordStore::new(store),
            optimizer: Arc::new(Optimizer::default()),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryKvStore::new()))
    }

    pub fn with_optimizer(mut self, optimizer: Optimizer) -> Self {
        self.optimizer = Arc::new(optimizer);
        self
    }

    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    pub fn store(&self) -> &Arc<dyn KvStore> {
        self.records.store()
    }

    pub fn optimizer(&self) -> &Optimizer {
        &self.optimizer
    }

    pub fn traversal(&self) -> Traversal {
        Traversal::new(self)
    }

    pub fn v(&self, ids: impl Into<Ids>) -> Traversal {
        self.traversal().v(ids)
    }

    pub fn e(&self, ids: impl Into<Ids>) -> Traversal {
        self.traversal().e(ids)
    }

    pub fn add_v(&self, label: &str) -> Traversal {
        self.traversal().add_v(label)
    }

    pub fn add_e(&self, label: &str, from: &str, to: &str) -> Traversal {
        self.traversal().add_e(label, from, to)
    }

    pub fn drop(&self) -> Traversal {
        self.traversal().drop()
    }

    pub fn query(&self, text: &str) -> Result<Traversal> {
        Ok(Traversal::from_calls(self, dsl::parse_traversal(text)?))
    }
}
