//! Vertex-to-vertex, vertex-to-edge and edge-to-vertex moves.
//!
//! Results are deduplicated within one parent only; two parents that share a
//! neighbor each yield it.

use ahash::AHashSet;

use crate::graph::{
    EdgeEndpoints, RecordStore,
    keys::{Adjacent, Direction},
};

use super::{EdgeEnd, Traverser, Traversers, deferred, failed, ids_as, mismatch};

pub(super) fn adjacent(
    records: &RecordStore,
    parent: Traverser,
    direction: Direction,
    adjacent: Adjacent,
    labels: &[String],
) -> Traversers {
    let Traverser::Vertex(vertex) = parent else {
        let op = match (direction, adjacent) {
            (Direction::Out, Adjacent::Vertices) => "out",
            (Direction::In, Adjacent::Vertices) => "in",
            (Direction::Out, Adjacent::Edges) => "outE",
            (Direction::In, Adjacent::Edges) => "inE",
        };
        return failed(mismatch(op, "vertex", &parent));
    };
    let records = records.clone();
    let labels = labels.to_vec();
    deferred(move || {
        let mut seen = AHashSet::new();
        let ids = collect(&records, &vertex, direction, adjacent, &labels, &mut seen)?;
        Ok(ids_as(ids, wrapper(adjacent)))
    })
}

pub(super) fn both_edges(records: &RecordStore, parent: Traverser, labels: &[String]) -> Traversers {
    let Traverser::Vertex(vertex) = parent else {
        return failed(mismatch("bothE", "vertex", &parent));
    };
    let records = records.clone();
    let labels = labels.to_vec();
    deferred(move || {
        let mut seen = AHashSet::new();
        let mut ids = collect(&records, &vertex, Direction::Out, Adjacent::Edges, &labels, &mut seen)?;
        ids.extend(collect(&records, &vertex, Direction::In, Adjacent::Edges, &labels, &mut seen)?);
        Ok(ids_as(ids, Traverser::Edge))
    })
}

pub(super) fn edge_vertex(records: &RecordStore, parent: Traverser, end: &EdgeEnd) -> Traversers {
    let Traverser::Edge(edge) = parent else {
        return failed(mismatch("outV/inV/bothV/otherV", "edge", &parent));
    };
    let records = records.clone();
    let end = end.clone();
    deferred(move || {
        let EdgeEndpoints { from, to } = records.edge_endpoints(&edge)?;
        let ids: Vec<String> = match end {
            EdgeEnd::Out => to.into_iter().collect(),
            EdgeEnd::In => from.into_iter().collect(),
            EdgeEnd::Both if from == to => from.into_iter().collect(),
            EdgeEnd::Both => from.into_iter().chain(to).collect(),
            EdgeEnd::Other(known) => other_end(from, to, known.as_deref()).into_iter().collect(),
        };
        Ok(ids_as(ids, Traverser::Vertex))
    })
}

/// The endpoint opposite `known`, else `to`, else `from`.
fn other_end(from: Option<String>, to: Option<String>, known: Option<&str>) -> Option<String> {
    match (known, from, to) {
        (Some(known), Some(from), Some(to)) if from == known => Some(to),
        (Some(known), Some(from), Some(to)) if to == known => Some(from),
        (_, from, to) => to.or(from),
    }
}

/// Union over `labels` (or the unlabeled index when empty), skipping ids
/// already in `seen`.
fn collect(
    records: &RecordStore,
    vertex: &str,
    direction: Direction,
    adjacent: Adjacent,
    labels: &[String],
    seen: &mut AHashSet<String>,
) -> crate::errors::Result<Vec<String>> {
    let scopes: Vec<Option<&str>> = if labels.is_empty() {
        vec![None]
    } else {
        labels.iter().map(|label| Some(label.as_str())).collect()
    };
    let mut out = Vec::new();
    for scope in scopes {
        for id in records.adjacent_ids(vertex, direction, adjacent, scope)? {
            if seen.insert(id.clone()) {
                out.push(id);
            }
        }
    }
    Ok(out)
}

fn wrapper(adjacent: Adjacent) -> fn(String) -> Traverser {
    match adjacent {
        Adjacent::Vertices => Traverser::Vertex,
        Adjacent::Edges => Traverser::Edge,
    }
}
