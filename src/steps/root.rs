use crate::graph::{RecordStore, keys::ElementKind};

use super::{IdSelector, Traverser, Traversers, deferred, mismatch, none, one};

pub(super) fn vertices(records: &RecordStore, parent: Traverser, ids: &IdSelector) -> Traversers {
    select(records, parent, ids, ElementKind::Vertex, "V")
}

pub(super) fn edges(records: &RecordStore, parent: Traverser, ids: &IdSelector) -> Traversers {
    select(records, parent, ids, ElementKind::Edge, "E")
}

fn wrap(kind: ElementKind) -> fn(String) -> Traverser {
    match kind {
        ElementKind::Vertex => Traverser::Vertex,
        ElementKind::Edge => Traverser::Edge,
    }
}

fn select(
    records: &RecordStore,
    parent: Traverser,
    ids: &IdSelector,
    kind: ElementKind,
    op: &'static str,
) -> Traversers {
    if parent != Traverser::Graph {
        return super::failed(mismatch(op, "graph", &parent));
    }
    let records = records.clone();
    let wrap = wrap(kind);
    match ids.clone() {
        IdSelector::All => deferred(move || {
            let stream: Traversers = Box::new(records.element_ids(kind)?.map(move |id| id.map(wrap)));
            Ok(stream)
        }),
        IdSelector::One(id) => deferred(move || {
            if records.exists(kind, &id)? {
                Ok(one(wrap(id)))
            } else {
                Ok(none())
            }
        }),
        // One existence check per pull, in the given order, duplicates kept.
        IdSelector::Many(ids) => Box::new(ids.into_iter().filter_map(move |id| {
            match records.exists(kind, &id) {
                Ok(true) => Some(Ok(wrap(id))),
                Ok(false) => None,
                Err(err) => Some(Err(err)),
            }
        })),
    }
}

pub(super) fn add_vertex(records: &RecordStore, parent: Traverser, label: &str) -> Traversers {
    if parent != Traverser::Graph {
        return super::failed(mismatch("addV", "graph", &parent));
    }
    let records = records.clone();
    let label = label.to_string();
    deferred(move || Ok(one(Traverser::Vertex(records.create_vertex(&label)?))))
}

pub(super) fn add_edge(
    records: &RecordStore,
    parent: Traverser,
    label: &str,
    from: &str,
    to: &str,
) -> Traversers {
    if parent != Traverser::Graph {
        return super::failed(mismatch("addE", "graph", &parent));
    }
    let records = records.clone();
    let (label, from, to) = (label.to_string(), from.to_string(), to.to_string());
    deferred(move || Ok(one(Traverser::Edge(records.create_edge(&label, &from, &to)?))))
}

pub(super) fn vertices_with_label(records: &RecordStore, parent: Traverser, label: &str) -> Traversers {
    if parent != Traverser::Graph {
        return super::failed(mismatch("V", "graph", &parent));
    }
    let records = records.clone();
    let label = label.to_string();
    deferred(move || {
        let stream: Traversers =
            Box::new(records.vertices_with_label(&label)?.map(|id| id.map(Traverser::Vertex)));
        Ok(stream)
    })
}

pub(super) fn drop_graph(records: &RecordStore, upstream: Traversers) -> Traversers {
    let records = records.clone();
    deferred(move || {
        for item in upstream {
            match item? {
                Traverser::Graph => records.drop_all()?,
                other => return Err(mismatch("drop", "graph", &other)),
            }
        }
        Ok(none())
    })
}
