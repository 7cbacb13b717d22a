use serde_json::Value;

use crate::{
    errors::Result,
    graph::{
        RecordStore,
        keys::{ID_KEY, LABEL_KEY},
    },
};

use super::{Traverser, Traversers, element_of};

pub(super) fn has(records: &RecordStore, upstream: Traversers, key: &str, expected: &Value) -> Traversers {
    let records = records.clone();
    let key = key.to_string();
    let expected = expected.clone();
    Box::new(upstream.filter_map(move |item| {
        let traverser = match item {
            Ok(traverser) => traverser,
            Err(err) => return Some(Err(err)),
        };
        match matches(&records, &traverser, &key, &expected) {
            Ok(true) => Some(Ok(traverser)),
            Ok(false) => None,
            Err(err) => Some(Err(err)),
        }
    }))
}

fn matches(records: &RecordStore, traverser: &Traverser, key: &str, expected: &Value) -> Result<bool> {
    let (kind, id) = element_of(traverser, "has")?;
    match key {
        LABEL_KEY => Ok(records
            .get_label(kind, id)?
            .is_some_and(|label| expected.as_str() == Some(label.as_str()))),
        ID_KEY => Ok(expected.as_str() == Some(id)),
        _ => Ok(records
            .get_property(kind, id, key)?
            .is_some_and(|stored| scalar_eq(&stored, expected))),
    }
}

/// Strict equality on scalars. Objects and arrays never compare equal, not
/// even to themselves; numbers compare by value so `1` equals `1.0`.
pub fn scalar_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => a == b,
            _ => match (a.as_u64(), b.as_u64()) {
                (Some(a), Some(b)) => a == b,
                _ => a.as_f64() == b.as_f64(),
            },
        },
        (Value::Null, Value::Null) => true,
        _ => false,
    }
}

pub(super) fn limit(upstream: Traversers, n: usize) -> Traversers {
    Box::new(upstream.take(n))
}
