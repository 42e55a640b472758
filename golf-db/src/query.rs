//! Document filters and `$set` updates.
//!
//! Matching follows document-database equality: dotted paths walk into
//! nested objects, arrays met along the way are searched element-wise, and
//! integers compare equal to floats of the same value.

use serde_json::{Map, Value};

use crate::error::{DbError, Result};
use crate::models::{Document, ID_FIELD};

/// Selects documents within a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
  /// Every document.
  All,
  /// Documents whose value at `path` equals `value`.
  /// A `None` value stands for a key that failed to parse and matches nothing.
  Eq { path: String, value: Option<i64> },
}

impl Filter {
  pub fn eq(path: impl Into<String>, value: Option<i64>) -> Self {
    Filter::Eq {
      path: path.into(),
      value,
    }
  }

  /// Check whether a document satisfies this filter.
  pub fn matches(&self, doc: &Document) -> bool {
    match self {
      Filter::All => true,
      Filter::Eq { value: None, .. } => false,
      Filter::Eq {
        path,
        value: Some(key),
      } => {
        let segments: Vec<&str> = path.split('.').collect();
        match segments.split_first() {
          Some((field, rest)) => doc
            .get(*field)
            .is_some_and(|value| path_matches(value, rest, *key)),
          None => false,
        }
      }
    }
  }
}

fn path_matches(value: &Value, path: &[&str], key: i64) -> bool {
  match (path.split_first(), value) {
    (None, Value::Array(items)) => items.iter().any(|item| number_equals(item, key)),
    (None, leaf) => number_equals(leaf, key),
    (Some((field, rest)), Value::Object(map)) => map
      .get(*field)
      .is_some_and(|value| path_matches(value, rest, key)),
    (Some(_), Value::Array(items)) => items.iter().any(|item| path_matches(item, path, key)),
    (Some(_), _) => false,
  }
}

fn number_equals(value: &Value, key: i64) -> bool {
  let Value::Number(number) = value else {
    return false;
  };
  match number.as_i64() {
    Some(int) => int == key,
    None => number.as_f64().is_some_and(|float| float == key as f64),
  }
}

/// Apply a `$set` document in place. Returns whether anything changed.
///
/// Dotted keys address nested fields; missing intermediate objects are
/// created. A numeric segment indexes into an array, padding it with nulls
/// when the index is past the end. The `_id` field can never be set.
pub(crate) fn apply_set(doc: &mut Document, set: Document) -> Result<bool> {
  if set
    .keys()
    .any(|key| key == ID_FIELD || key.starts_with("_id."))
  {
    return Err(DbError::ImmutableField);
  }

  let mut modified = false;
  for (key, value) in set {
    modified |= set_path(doc, &key, value)?;
  }
  Ok(modified)
}

fn set_path(doc: &mut Document, path: &str, value: Value) -> Result<bool> {
  let segments: Vec<&str> = path.split('.').collect();
  if segments.iter().any(|segment| segment.is_empty()) {
    return Err(DbError::EmptyFieldName(path.to_string()));
  }
  set_in_object(doc, &segments, value, path)
}

fn set_in_object(map: &mut Document, segments: &[&str], value: Value, path: &str) -> Result<bool> {
  let Some((field, rest)) = segments.split_first() else {
    return Ok(false);
  };

  if rest.is_empty() {
    if map.get(*field) == Some(&value) {
      return Ok(false);
    }
    map.insert(field.to_string(), value);
    return Ok(true);
  }

  let child = map
    .entry(field.to_string())
    .or_insert_with(|| Value::Object(Map::new()));
  set_in_value(child, field, rest, value, path)
}

/// Continue a `$set` below `target`, the value stored under `name`.
fn set_in_value(
  target: &mut Value,
  name: &str,
  segments: &[&str],
  value: Value,
  path: &str,
) -> Result<bool> {
  let conflict = || DbError::PathConflict {
    field: path.to_string(),
    parent: name.to_string(),
  };

  match target {
    Value::Object(map) => set_in_object(map, segments, value, path),
    Value::Array(items) => {
      let Some((field, rest)) = segments.split_first() else {
        return Ok(false);
      };
      let index: usize = field.parse().map_err(|_| conflict())?;

      if rest.is_empty() {
        if items.get(index) == Some(&value) {
          return Ok(false);
        }
        if index < items.len() {
          items[index] = value;
        } else {
          items.resize(index, Value::Null);
          items.push(value);
        }
        return Ok(true);
      }

      if index >= items.len() {
        items.resize(index, Value::Null);
        items.push(Value::Object(Map::new()));
      }
      set_in_value(&mut items[index], field, rest, value, path)
    }
    _ => Err(conflict()),
  }
}
