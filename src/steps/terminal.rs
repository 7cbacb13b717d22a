use serde_json::{Map, Value, json};

use crate::{
    diagnostics::warn,
    errors::{ErrorCode, Result},
    graph::{
        RecordStore,
        keys::{ElementKind, ID_KEY, LABEL_KEY},
    },
};

use super::{Traverser, Traversers, deferred, element_of, failed, one};

pub(super) fn id(upstream: Traversers) -> Traversers {
    Box::new(upstream.map(|item| {
        let traverser = item?;
        let (_, id) = element_of(&traverser, "id")?;
        Ok(Traverser::Value(Value::String(id.to_string())))
    }))
}

/// Elements whose label record is missing are skipped with a warning.
pub(super) fn label(records: &RecordStore, upstream: Traversers) -> Traversers {
    let records = records.clone();
    Box::new(upstream.filter_map(move |item| {
        let traverser = match item {
            Ok(traverser) => traverser,
            Err(err) => return Some(Err(err)),
        };
        let (kind, id) = match element_of(&traverser, "label") {
            Ok(element) => element,
            Err(err) => return Some(Err(err)),
        };
        match records.get_label(kind, id) {
            Ok(Some(label)) => Some(Ok(Traverser::Value(Value::String(label)))),
            Ok(None) => {
                warn(
                    ErrorCode::WarnDanglingRecord,
                    format!("{kind:?} '{id}' has no label record"),
                );
                None
            }
            Err(err) => Some(Err(err)),
        }
    }))
}

/// One `{"key", "value"}` object per property, in key order.
pub(super) fn properties(records: &RecordStore, upstream: Traversers, keys: &[String]) -> Traversers {
    let records = records.clone();
    let keys = keys.to_vec();
    Box::new(upstream.flat_map(move |item| {
        let traverser = match item {
            Ok(traverser) => traverser,
            Err(err) => return failed(err),
        };
        let records = records.clone();
        let keys = keys.clone();
        deferred(move || {
            let (kind, id) = element_of(&traverser, "properties")?;
            let entries = if keys.is_empty() {
                records.properties(kind, id)?
            } else {
                selected_properties(&records, kind, id, &keys)?
            };
            let out: Traversers = Box::new(
                entries
                    .into_iter()
                    .map(|(key, value)| Ok(Traverser::Value(json!({ "key": key, "value": value })))),
            );
            Ok(out)
        })
    }))
}

pub(super) fn value_map(records: &RecordStore, upstream: Traversers, keys: &[String]) -> Traversers {
    let records = records.clone();
    let keys = keys.to_vec();
    Box::new(upstream.map(move |item| {
        let traverser = item?;
        let (kind, id) = element_of(&traverser, "valueMap")?;
        let map = if keys.is_empty() {
            records.properties(kind, id)?
        } else {
            selected_properties(&records, kind, id, &keys)?
        };
        Ok(Traverser::Value(Value::Object(map)))
    }))
}

/// `id` and `label` are synthesized; keys without a stored value are left out.
fn selected_properties(
    records: &RecordStore,
    kind: ElementKind,
    id: &str,
    keys: &[String],
) -> Result<Map<String, Value>> {
    let mut map = Map::new();
    for key in keys {
        let value = match key.as_str() {
            ID_KEY => Some(Value::String(id.to_string())),
            LABEL_KEY => records.get_label(kind, id)?.map(Value::String),
            _ => records.get_property(kind, id, key)?,
        };
        if let Some(value) = value {
            map.insert(key.clone(), value);
        }
    }
    Ok(map)
}

pub(super) fn count(upstream: Traversers) -> Traversers {
    deferred(move || {
        let mut total: u64 = 0;
        for item in upstream {
            item?;
            total += 1;
        }
        Ok(one(Traverser::Value(Value::from(total))))
    })
}
