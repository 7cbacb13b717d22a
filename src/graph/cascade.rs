//! Drop paths. Every delete here is best-effort: a failing key is logged and
//! the remaining keys are still attempted.

use crate::errors::Result;

use super::{
    RecordStore,
    adjacency::cleanup_failed,
    keys::{self, Adjacent, Direction, ElementKind, INDEX_TOKEN},
};

const GRAPH_PATTERNS: [&str; 4] = ["nodes.>", "edges.>", "node.>", "edge.>"];

impl RecordStore {
    pub fn drop_edge(&self, id: &str) -> Result<()> {
        let label = self.get_label(ElementKind::Edge, id).unwrap_or_else(|err| {
            cleanup_failed(&keys::label(ElementKind::Edge, id), &err);
            None
        });
        let from = self.read_string(&keys::edge_from(id));
        let to = self.read_string(&keys::edge_to(id));

        // Reverse of creation: the enumeration marker goes first.
        self.delete_quietly(&keys::enumeration(ElementKind::Edge, id));
        self.unlink_edge(id, label.as_deref(), from.as_deref(), to.as_deref());
        self.delete_children(ElementKind::Edge, id);
        self.delete_quietly(&keys::element(ElementKind::Edge, id));
        tracing::debug!(id, "edge dropped");
        Ok(())
    }

    pub fn drop_vertex(&self, id: &str) -> Result<()> {
        let incident = self.incident_edges(id).unwrap_or_else(|err| {
            cleanup_failed(&keys::element(ElementKind::Vertex, id), &err);
            Vec::new()
        });

        self.delete_quietly(&keys::enumeration(ElementKind::Vertex, id));
        for edge in &incident {
            if let Err(err) = self.drop_edge(edge) {
                cleanup_failed(&keys::element(ElementKind::Edge, edge), &err);
            }
        }
        self.clear_neighbor_markers(id);
        self.delete_children(ElementKind::Vertex, id);
        self.delete_quietly(&keys::element(ElementKind::Vertex, id));
        tracing::debug!(id, edges = incident.len(), "vertex dropped");
        Ok(())
    }

    pub fn drop_all(&self) -> Result<()> {
        let doomed: Vec<String> = self
            .store()
            .keys(&GRAPH_PATTERNS)?
            .filter_map(|key| match key {
                Ok(key) => Some(key),
                Err(err) => {
                    cleanup_failed("graph", &err);
                    None
                }
            })
            .collect();
        for key in &doomed {
            self.delete_quietly(key);
        }
        tracing::info!(keys = doomed.len(), "graph dropped");
        Ok(())
    }

    /// Neighbor-side markers that still point at `id` after its edges are
    /// gone. Normally none remain; this catches indices that went stale.
    fn clear_neighbor_markers(&self, id: &str) {
        for direction in [Direction::Out, Direction::In] {
            let reverse = direction.reverse();
            let unlabeled = keys::adjacency_pattern(id, direction, Adjacent::Vertices, None);
            for key in self.collect_quietly(&unlabeled) {
                let neighbor = keys::last_token(&key);
                if neighbor == INDEX_TOKEN {
                    continue;
                }
                self.forget_neighbor(neighbor, reverse, None, id);
            }
            let labeled = keys::labeled_adjacency_pattern(id, direction, Adjacent::Vertices);
            for key in self.collect_quietly(&labeled) {
                let (Some(label), Some(neighbor)) = (keys::token(&key, 3), keys::token(&key, 4)) else {
                    continue;
                };
                if neighbor == INDEX_TOKEN {
                    continue;
                }
                self.forget_neighbor(neighbor, reverse, Some(label), id);
            }
        }
    }

    fn forget_neighbor(&self, vertex: &str, direction: Direction, label: Option<&str>, gone: &str) {
        self.delete_quietly(&keys::adjacency_marker(
            vertex,
            direction,
            Adjacent::Vertices,
            label,
            gone,
        ));
        let index = keys::adjacency_index(vertex, direction, Adjacent::Vertices, label);
        if let Err(err) = self.remove_from_index(&index, gone, true) {
            cleanup_failed(&index, &err);
        }
    }

    fn delete_children(&self, kind: ElementKind, id: &str) {
        for key in self.collect_quietly(&keys::element_children(kind, id)) {
            self.delete_quietly(&key);
        }
    }

    fn collect_quietly(&self, pattern: &str) -> Vec<String> {
        match self.store().keys_matching(pattern) {
            Ok(stream) => stream
                .filter_map(|key| match key {
                    Ok(key) => Some(key),
                    Err(err) => {
                        cleanup_failed(pattern, &err);
                        None
                    }
                })
                .collect(),
            Err(err) => {
                cleanup_failed(pattern, &err);
                Vec::new()
            }
        }
    }

    fn read_string(&self, key: &str) -> Option<String> {
        match self.store().get(key) {
            Ok(entry) => entry.map(|entry| entry.string()),
            Err(err) => {
                cleanup_failed(key, &err);
                None
            }
        }
    }
}
