//! Positional argument decoding.

use ahash::AHashSet;
use serde_json::Value;

use crate::{
    diagnostics::require,
    errors::{ErrorCode, KvGraphError, Result},
    graph::{
        keys::{ID_KEY, LABEL_KEY},
        records::{validate_endpoint, validate_id, validate_label, validate_property_key},
    },
    pattern::is_valid_token,
};

use super::IdSelector;

pub(super) fn arity(op: &str, args: &[Value], max: usize) -> Result<()> {
    require(
        args.len() <= max,
        ErrorCode::ArgInvalid,
        format!("{op}() takes at most {max} argument(s), got {}", args.len()),
    )
}

pub(super) fn required<'a>(op: &str, arg: Option<&'a Value>, what: &str) -> Result<&'a Value> {
    arg.ok_or_else(|| {
        KvGraphError::precondition(ErrorCode::ArgInvalid, format!("{op}() requires a {what}"))
    })
}

/// `()`, `null`, one id, several ids, or a single array of ids.
pub(super) fn ids(op: &str, args: &[Value]) -> Result<IdSelector> {
    match args {
        [] | [Value::Null] => Ok(IdSelector::All),
        [Value::String(id)] => {
            check_id(op, id)?;
            Ok(IdSelector::One(id.clone()))
        }
        [Value::Array(items)] => Ok(IdSelector::Many(id_list(op, items)?)),
        many => Ok(IdSelector::Many(id_list(op, many)?)),
    }
}

fn id_list(op: &str, items: &[Value]) -> Result<Vec<String>> {
    items
        .iter()
        .map(|item| match item {
            Value::String(id) => {
                check_id(op, id)?;
                Ok(id.clone())
            }
            other => Err(KvGraphError::precondition(
                ErrorCode::ArgInvalid,
                format!("{op}() ids must be strings, got {other}"),
            )),
        })
        .collect()
}

fn check_id(op: &str, id: &str) -> Result<()> {
    require(
        !id.is_empty(),
        ErrorCode::ArgInvalid,
        format!("{op}() ids must be non-empty strings"),
    )?;
    validate_id(id)
}

/// Zero or more names, given inline or as one array. Duplicates collapse,
/// first occurrence wins.
pub(super) fn names(op: &str, args: &[Value]) -> Result<Vec<String>> {
    let items: &[Value] = match args {
        [Value::Array(items)] => items,
        other => other,
    };
    let mut seen = AHashSet::new();
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let Value::String(name) = item else {
            return Err(KvGraphError::precondition(
                ErrorCode::ArgInvalid,
                format!("{op}() arguments must be strings, got {item}"),
            ));
        };
        require(
            is_valid_token(name),
            ErrorCode::ArgInvalidToken,
            format!("{op}() argument '{name}' is not a valid key token"),
        )?;
        if seen.insert(name.clone()) {
            out.push(name.clone());
        }
    }
    Ok(out)
}

pub(super) fn label(op: &str, arg: Option<&Value>) -> Result<String> {
    match arg {
        Some(Value::String(label)) => {
            validate_label(label)?;
            Ok(label.clone())
        }
        _ => Err(KvGraphError::precondition(
            ErrorCode::ArgLabelRequired,
            format!("{op}() requires a non-empty string label"),
        )),
    }
}

pub(super) fn endpoint(op: &str, arg: Option<&Value>) -> Result<String> {
    match arg {
        Some(Value::String(id)) => {
            validate_endpoint(id)?;
            Ok(id.clone())
        }
        _ => Err(KvGraphError::precondition(
            ErrorCode::ArgEndpointRequired,
            format!("{op}() requires non-empty string endpoint ids"),
        )),
    }
}

pub(super) fn optional_id(op: &str, arg: Option<&Value>) -> Result<Option<String>> {
    match arg {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(id)) if id.is_empty() => Ok(None),
        Some(Value::String(id)) => Ok(Some(id.clone())),
        Some(other) => Err(KvGraphError::precondition(
            ErrorCode::ArgInvalid,
            format!("{op}() expects a vertex id, got {other}"),
        )),
    }
}

pub(super) fn has_key(op: &str, arg: Option<&Value>) -> Result<String> {
    let key = match arg {
        Some(Value::String(key)) if !key.is_empty() => key,
        _ => {
            return Err(KvGraphError::precondition(
                ErrorCode::ArgPropertyKeyRequired,
                format!("{op}() requires a non-empty string key"),
            ));
        }
    };
    if key != ID_KEY && key != LABEL_KEY {
        require(
            is_valid_token(key),
            ErrorCode::ArgInvalidToken,
            format!("{op}() key '{key}' is not a valid key token"),
        )?;
    }
    Ok(key.clone())
}

pub(super) fn property_key(op: &str, arg: Option<&Value>) -> Result<String> {
    match arg {
        Some(Value::String(key)) => {
            validate_property_key(key)?;
            Ok(key.clone())
        }
        _ => Err(KvGraphError::precondition(
            ErrorCode::ArgPropertyKeyRequired,
            format!("{op}() requires a non-empty string key"),
        )),
    }
}

pub(super) fn scalar(op: &str, arg: Option<&Value>) -> Result<Value> {
    match arg {
        Some(value @ (Value::String(_) | Value::Number(_) | Value::Bool(_))) => Ok(value.clone()),
        Some(other) => Err(KvGraphError::precondition(
            ErrorCode::ArgNonScalarValue,
            format!("{op}() compares against scalars only, got {other}"),
        )),
        None => Err(KvGraphError::precondition(
            ErrorCode::ArgNonScalarValue,
            format!("{op}() requires a value to compare against"),
        )),
    }
}

/// Non-negative integer. Whole floats such as `2.0` are accepted.
pub(super) fn limit(op: &str, arg: Option<&Value>) -> Result<usize> {
    let parsed = match arg {
        Some(Value::Number(n)) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        }),
        _ => None,
    };
    parsed
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| {
            KvGraphError::precondition(
                ErrorCode::ArgLimitInvalid,
                format!(
                    "{op}() requires a non-negative integer, got {}",
                    arg.map(Value::to_string).unwrap_or_else(|| "nothing".into())
                ),
            )
        })
}
