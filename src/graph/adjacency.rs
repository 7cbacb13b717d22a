//! Adjacency markers and compact index arrays.
//!
//! Edge-id arrays hold unique entries. Neighbor arrays hold one entry per
//! edge, so parallel edges between the same pair keep the neighbor listed
//! until the last of them is dropped.

use ahash::AHashSet;

use crate::{
    diagnostics::warn,
    errors::{ErrorCode, Result},
};

use super::{
    RecordStore,
    keys::{self, Adjacent, Direction, INDEX_TOKEN},
};

impl RecordStore {
    /// Ids adjacent to `vertex`, read from the compact index when present and
    /// from the marker keyspace otherwise. Neighbor lists may repeat ids.
    pub fn adjacent_ids(
        &self,
        vertex: &str,
        direction: Direction,
        adjacent: Adjacent,
        label: Option<&str>,
    ) -> Result<Vec<String>> {
        let index_key = keys::adjacency_index(vertex, direction, adjacent, label);
        if let Some(ids) = self.read_index(&index_key)? {
            return Ok(ids);
        }
        let pattern = keys::adjacency_pattern(vertex, direction, adjacent, label);
        let mut ids = Vec::new();
        for key in self.store().keys_matching(&pattern)? {
            let key = key?;
            let target = keys::last_token(&key);
            if target != INDEX_TOKEN {
                ids.push(target.to_string());
            }
        }
        Ok(ids)
    }

    /// Edge ids touching `vertex` in either direction, deduplicated (self-loops
    /// appear in both lists).
    pub fn incident_edges(&self, vertex: &str) -> Result<Vec<String>> {
        let mut seen = AHashSet::new();
        let mut out = Vec::new();
        for direction in [Direction::Out, Direction::In] {
            for id in self.adjacent_ids(vertex, direction, Adjacent::Edges, None)? {
                if seen.insert(id.clone()) {
                    out.push(id);
                }
            }
        }
        Ok(out)
    }

    pub(crate) fn link_edge(&self, edge: &str, label: &str, from: &str, to: &str) -> Result<()> {
        for (vertex, direction, other) in [(from, Direction::Out, to), (to, Direction::In, from)] {
            for scope in [None, Some(label)] {
                self.store().create(
                    &keys::adjacency_marker(vertex, direction, Adjacent::Edges, scope, edge),
                    b"",
                )?;
                self.store().put(
                    &keys::adjacency_marker(vertex, direction, Adjacent::Vertices, scope, other),
                    b"",
                )?;
                self.push_index(
                    &keys::adjacency_index(vertex, direction, Adjacent::Edges, scope),
                    edge,
                    true,
                )?;
                self.push_index(
                    &keys::adjacency_index(vertex, direction, Adjacent::Vertices, scope),
                    other,
                    false,
                )?;
            }
        }
        Ok(())
    }

    /// Exact inverse of [`RecordStore::link_edge`] for whatever parts of the
    /// edge are still known. Never fails; per-key errors are logged.
    pub(crate) fn unlink_edge(&self, edge: &str, label: Option<&str>, from: Option<&str>, to: Option<&str>) {
        let sides = [(from, Direction::Out, to), (to, Direction::In, from)];
        for (vertex, direction, other) in sides {
            let Some(vertex) = vertex else { continue };
            let mut scopes = vec![None];
            if let Some(label) = label {
                scopes.push(Some(label));
            }
            for scope in scopes {
                self.delete_quietly(&keys::adjacency_marker(
                    vertex,
                    direction,
                    Adjacent::Edges,
                    scope,
                    edge,
                ));
                let index = keys::adjacency_index(vertex, direction, Adjacent::Edges, scope);
                if let Err(err) = self.remove_from_index(&index, edge, true) {
                    cleanup_failed(&index, &err);
                }
                let Some(other) = other else { continue };
                let index = keys::adjacency_index(vertex, direction, Adjacent::Vertices, scope);
                let still_linked = match self.remove_from_index(&index, other, false) {
                    Ok(remaining) => remaining,
                    Err(err) => {
                        cleanup_failed(&index, &err);
                        false
                    }
                };
                if !still_linked {
                    self.delete_quietly(&keys::adjacency_marker(
                        vertex,
                        direction,
                        Adjacent::Vertices,
                        scope,
                        other,
                    ));
                }
            }
        }
    }

    /// `Ok(None)` when the array is absent. A corrupt array is reported and
    /// treated as absent so callers fall back to a key scan.
    pub(crate) fn read_index(&self, key: &str) -> Result<Option<Vec<String>>> {
        let Some(entry) = self.store().get(key)? else {
            return Ok(None);
        };
        match entry.json::<Vec<String>>() {
            Ok(ids) => Ok(Some(ids)),
            Err(err) => {
                warn(
                    ErrorCode::WarnCorruptIndex,
                    format!("index '{key}' is not a JSON array of ids: {err}"),
                );
                Ok(None)
            }
        }
    }

    fn push_index(&self, key: &str, id: &str, unique: bool) -> Result<()> {
        let mut ids = self.read_index(key)?.unwrap_or_default();
        if unique && ids.iter().any(|existing| existing == id) {
            return Ok(());
        }
        ids.push(id.to_string());
        self.store().update(key, &serde_json::to_vec(&ids)?)?;
        Ok(())
    }

    /// Removes one occurrence (or every occurrence with `all`) and reports
    /// whether `id` is still listed afterwards.
    pub(crate) fn remove_from_index(&self, key: &str, id: &str, all: bool) -> Result<bool> {
        let Some(mut ids) = self.read_index(key)? else {
            return Ok(false);
        };
        let before = ids.len();
        if all {
            ids.retain(|existing| existing != id);
        } else if let Some(pos) = ids.iter().position(|existing| existing == id) {
            ids.remove(pos);
        }
        if ids.len() != before {
            self.store().update(key, &serde_json::to_vec(&ids)?)?;
        }
        Ok(ids.iter().any(|existing| existing == id))
    }

    pub(crate) fn delete_quietly(&self, key: &str) {
        if let Err(err) = self.store().delete(key) {
            cleanup_failed(key, &err);
        }
    }
}

pub(crate) fn cleanup_failed(key: &str, err: &crate::KvGraphError) {
    warn(
        ErrorCode::WarnCleanupFailed,
        format!("could not clean up '{key}': {err}"),
    );
}
