//! Vertex and edge records on top of a [`KvStore`].

use std::sync::Arc;

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
    backend::KvStore,
    diagnostics::{require, warn},
    errors::{ErrorCode, KvGraphError, Result},
    pattern::is_valid_token,
};

use super::keys::{self, ElementKind, ID_KEY, LABEL_KEY};

pub type IdStream = Box<dyn Iterator<Item = Result<String>> + Send>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgeEndpoints {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Element ids are UUIDv7 in simple form: time ordered and sortable as strings.
pub fn new_element_id() -> String {
    Uuid::now_v7().simple().to_string()
}

#[derive(Clone)]
pub struct RecordStore {
    store: Arc<dyn KvStore>,
}

impl RecordStore {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn KvStore> {
        &self.store
    }

    pub fn create_vertex(&self, label: &str) -> Result<String> {
        validate_label(label)?;
        let id = new_element_id();
        let kind = ElementKind::Vertex;
        self.store.create(&keys::element(kind, &id), id.as_bytes())?;
        self.store.create(&keys::label(kind, &id), label.as_bytes())?;
        self.store
            .create(&keys::vertex_label_index(&id, label), b"")?;
        self.store.create(&keys::enumeration(kind, &id), b"")?;
        tracing::debug!(id = %id, label, "vertex created");
        Ok(id)
    }

    /// Both endpoints must exist before an id is allocated.
    pub fn create_edge(&self, label: &str, from: &str, to: &str) -> Result<String> {
        validate_label(label)?;
        validate_endpoint(from)?;
        validate_endpoint(to)?;
        for endpoint in [from, to] {
            if !self.exists(ElementKind::Vertex, endpoint)? {
                return Err(KvGraphError::precondition(
                    ErrorCode::DataEndpointMissing,
                    format!("edge endpoint vertex '{endpoint}' does not exist"),
                ));
            }
        }
        let id = new_element_id();
        let kind = ElementKind::Edge;
        self.store.create(&keys::element(kind, &id), b"")?;
        self.store.create(&keys::label(kind, &id), label.as_bytes())?;
        self.store.create(&keys::edge_from(&id), from.as_bytes())?;
        self.store.create(&keys::edge_to(&id), to.as_bytes())?;
        self.link_edge(&id, label, from, to)?;
        self.store.create(&keys::enumeration(kind, &id), b"")?;
        tracing::debug!(id = %id, label, from, to, "edge created");
        Ok(id)
    }

    pub fn set_property(&self, kind: ElementKind, id: &str, key: &str, value: &Value) -> Result<()> {
        validate_property_key(key)?;
        let encoded = serde_json::to_vec(value)?;
        self.store
            .update(&keys::property(kind, id, key), &encoded)?;
        Ok(())
    }

    pub fn get_property(&self, kind: ElementKind, id: &str, key: &str) -> Result<Option<Value>> {
        match self.store.get(&keys::property(kind, id, key))? {
            Some(entry) => Ok(Some(entry.json_value()?)),
            None => Ok(None),
        }
    }

    pub fn get_label(&self, kind: ElementKind, id: &str) -> Result<Option<String>> {
        Ok(self
            .store
            .get(&keys::label(kind, id))?
            .map(|entry| entry.string()))
    }

    /// All stored properties. `id` and `label` are not properties.
    pub fn properties(&self, kind: ElementKind, id: &str) -> Result<Map<String, Value>> {
        let mut out = Map::new();
        for key in self.store.keys_matching(&keys::property_pattern(kind, id))? {
            let key = key?;
            // Deleted between the scan and the read.
            let Some(entry) = self.store.get(&key)? else {
                continue;
            };
            out.insert(keys::last_token(&key).to_string(), entry.json_value()?);
        }
        Ok(out)
    }

    pub fn exists(&self, kind: ElementKind, id: &str) -> Result<bool> {
        Ok(self.store.get(&keys::element(kind, id))?.is_some())
    }

    /// Endpoint fields are read independently; a dangling edge may have one.
    pub fn edge_endpoints(&self, id: &str) -> Result<EdgeEndpoints> {
        let from = self.store.get(&keys::edge_from(id))?.map(|entry| entry.string());
        let to = self.store.get(&keys::edge_to(id))?.map(|entry| entry.string());
        if from.is_some() != to.is_some() {
            warn(
                ErrorCode::WarnDanglingRecord,
                format!("edge '{id}' has only one endpoint recorded"),
            );
        }
        Ok(EdgeEndpoints { from, to })
    }

    pub fn element_ids(&self, kind: ElementKind) -> Result<IdStream> {
        let stream = self
            .store
            .keys_matching(&keys::enumeration_pattern(kind))?;
        Ok(Box::new(stream.map(|key| {
            key.map(|key| keys::last_token(&key).to_string())
        })))
    }

    pub fn vertices_with_label(&self, label: &str) -> Result<IdStream> {
        let stream = self
            .store
            .keys_matching(&keys::vertex_label_scan(label))?;
        Ok(Box::new(stream.filter_map(|key| match key {
            Ok(key) => keys::token(&key, 1).map(|id| Ok(id.to_string())),
            Err(err) => Some(Err(err)),
        })))
    }
}

pub(crate) fn validate_label(label: &str) -> Result<()> {
    require(
        !label.is_empty(),
        ErrorCode::ArgLabelRequired,
        "label must be a non-empty string",
    )?;
    require(
        is_valid_token(label),
        ErrorCode::ArgInvalidToken,
        format!("label '{label}' must not contain '.', '*', '>' or whitespace"),
    )
}

pub(crate) fn validate_endpoint(id: &str) -> Result<()> {
    require(
        !id.is_empty(),
        ErrorCode::ArgEndpointRequired,
        "edge endpoints must be non-empty vertex ids",
    )?;
    validate_id(id)
}

pub(crate) fn validate_id(id: &str) -> Result<()> {
    require(
        is_valid_token(id),
        ErrorCode::ArgInvalidToken,
        format!("id '{id}' is not a valid key token"),
    )
}

pub(crate) fn validate_property_key(key: &str) -> Result<()> {
    require(
        !key.is_empty(),
        ErrorCode::ArgPropertyKeyRequired,
        "property key must be a non-empty string",
    )?;
    require(
        key != ID_KEY && key != LABEL_KEY,
        ErrorCode::ArgReservedProperty,
        format!("'{key}' is reserved and cannot be set as a property"),
    )?;
    require(
        is_valid_token(key),
        ErrorCode::ArgInvalidToken,
        format!("property key '{key}' must not contain '.', '*', '>' or whitespace"),
    )
}
