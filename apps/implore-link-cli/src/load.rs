//! Catalogue loading
//!
//! A catalogue is a JSON array of flat objects. `null` and blank strings
//! become missing values; booleans and nested values are kept as text.

use std::collections::BTreeMap;
use std::path::Path;

use implore_link::{EntityId, EntityStore, LinkError, Record, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid catalogue JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Catalogue must be a JSON array of objects (row {row} is not an object)")]
    NotAnObject { row: usize },

    #[error("Catalogue must be a JSON array of objects")]
    NotAnArray,

    #[error(transparent)]
    Store(#[from] LinkError),
}

/// Load a catalogue file
pub fn load_catalogue(path: impl AsRef<Path>) -> Result<EntityStore, LoadError> {
    let content = std::fs::read_to_string(path.as_ref())?;
    parse_catalogue(&content)
}

/// Parse catalogue JSON
///
/// The `id` field becomes the record id when every row carries a
/// non-negative integer id; otherwise rows are numbered by position.
pub fn parse_catalogue(json: &str) -> Result<EntityStore, LoadError> {
    let root: serde_json::Value = serde_json::from_str(json)?;
    let serde_json::Value::Array(rows) = root else {
        return Err(LoadError::NotAnArray);
    };

    let mut objects = Vec::with_capacity(rows.len());
    for (row, value) in rows.into_iter().enumerate() {
        match value {
            serde_json::Value::Object(map) => objects.push(map),
            _ => return Err(LoadError::NotAnObject { row }),
        }
    }

    let ids: Option<Vec<EntityId>> = objects
        .iter()
        .map(|obj| obj.get("id").and_then(|v| v.as_u64()))
        .collect();

    match ids {
        Some(ids) if !ids.is_empty() => {
            let records = objects
                .into_iter()
                .zip(ids)
                .map(|(mut obj, id)| {
                    obj.remove("id");
                    Record {
                        id,
                        attributes: to_attributes(obj),
                    }
                })
                .collect();
            Ok(EntityStore::new(records)?)
        }
        _ => {
            tracing::debug!("No usable id column, numbering rows");
            Ok(EntityStore::from_rows(objects.into_iter().map(to_attributes)))
        }
    }
}

fn to_attributes(obj: serde_json::Map<String, serde_json::Value>) -> BTreeMap<String, Value> {
    obj.into_iter()
        .map(|(name, value)| (name, to_value(value)))
        .collect()
}

fn to_value(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Missing,
        serde_json::Value::Number(n) => n.as_f64().map(Value::Number).unwrap_or_default(),
        serde_json::Value::String(s) if s.trim().is_empty() => Value::Missing,
        serde_json::Value::String(s) => Value::Text(s),
        other => Value::Text(other.to_string()),
    }
}

/// Parse a `--range` argument of the form `attr=low:high`
pub fn parse_range(arg: &str) -> Result<(String, f64, f64), String> {
    let (attribute, bounds) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected attr=low:high, got '{arg}'"))?;
    let (low, high) = bounds
        .split_once(':')
        .ok_or_else(|| format!("expected low:high, got '{bounds}'"))?;

    let low: f64 = low
        .trim()
        .parse()
        .map_err(|_| format!("invalid lower bound '{low}'"))?;
    let high: f64 = high
        .trim()
        .parse()
        .map_err(|_| format!("invalid upper bound '{high}'"))?;

    Ok((attribute.trim().to_string(), low, high))
}
