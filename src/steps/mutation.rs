use serde_json::Value;

use crate::graph::RecordStore;

use super::{Traverser, Traversers, deferred, element_of, mismatch, none};

pub(super) fn property(records: &RecordStore, upstream: Traversers, key: &str, value: &Value) -> Traversers {
    let records = records.clone();
    let key = key.to_string();
    let value = value.clone();
    Box::new(upstream.map(move |item| {
        let traverser = item?;
        let (kind, id) = element_of(&traverser, "property")?;
        records.set_property(kind, id, &key, &value)?;
        Ok(traverser)
    }))
}

pub(super) fn drop(records: &RecordStore, upstream: Traversers) -> Traversers {
    let records = records.clone();
    deferred(move || {
        for item in upstream {
            match item? {
                Traverser::Vertex(id) => records.drop_vertex(&id)?,
                Traverser::Edge(id) => records.drop_edge(&id)?,
                other => return Err(mismatch("drop", "vertex or edge", &other)),
            }
        }
        Ok(none())
    })
}
