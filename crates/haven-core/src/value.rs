//! Scalar values and rows exchanged with a store.
//!
//! Both stores speak SQLite's type system, so a [`Value`] mirrors its five
//! storage classes. Rows keep the column order the store reported.

use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::{Error, Result};

// ─── Value ───────────────────────────────────────────────────────────────────

/// A single positional parameter or result cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
  Null,
  Integer(i64),
  Real(f64),
  Text(String),
  Blob(Vec<u8>),
}

impl Value {
  /// Storage-class name, used in error messages.
  pub fn type_name(&self) -> &'static str {
    match self {
      Value::Null => "null",
      Value::Integer(_) => "integer",
      Value::Real(_) => "real",
      Value::Text(_) => "text",
      Value::Blob(_) => "blob",
    }
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Value::Text(s) => Some(s),
      _ => None,
    }
  }
}

impl From<serde_json::Value> for Value {
  fn from(v: serde_json::Value) -> Self {
    match v {
      serde_json::Value::Null => Value::Null,
      serde_json::Value::Bool(b) => Value::Integer(i64::from(b)),
      serde_json::Value::Number(n) => match n.as_i64() {
        Some(i) => Value::Integer(i),
        None => Value::Real(n.as_f64().unwrap_or_default()),
      },
      serde_json::Value::String(s) => Value::Text(s),
      other => Value::Text(other.to_string()),
    }
  }
}

impl Serialize for Value {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    match self {
      Value::Null => serializer.serialize_none(),
      Value::Integer(i) => serializer.serialize_i64(*i),
      Value::Real(f) => serializer.serialize_f64(*f),
      Value::Text(s) => serializer.serialize_str(s),
      Value::Blob(b) => b.serialize(serializer),
    }
  }
}

impl From<&str> for Value {
  fn from(s: &str) -> Self { Value::Text(s.to_owned()) }
}

impl From<String> for Value {
  fn from(s: String) -> Self { Value::Text(s) }
}

impl From<&String> for Value {
  fn from(s: &String) -> Self { Value::Text(s.clone()) }
}

impl From<i64> for Value {
  fn from(i: i64) -> Self { Value::Integer(i) }
}

impl From<bool> for Value {
  fn from(b: bool) -> Self { Value::Integer(i64::from(b)) }
}

impl From<f64> for Value {
  fn from(f: f64) -> Self { Value::Real(f) }
}

impl<T: Into<Value>> From<Option<T>> for Value {
  fn from(v: Option<T>) -> Self { v.map_or(Value::Null, Into::into) }
}

/// Build a `Vec<Value>` from heterogeneous scalars.
///
/// ```
/// let p = haven_core::params!["T", 3_i64, true];
/// assert_eq!(p.len(), 3);
/// ```
#[macro_export]
macro_rules! params {
  () => { ::std::vec::Vec::<$crate::Value>::new() };
  ($($v:expr),+ $(,)?) => { vec![$($crate::Value::from($v)),+] };
}

// ─── Row ─────────────────────────────────────────────────────────────────────

/// One result row: `(column, value)` pairs in store order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
  cells: Vec<(String, Value)>,
}

impl Row {
  pub fn new() -> Self { Self::default() }

  pub fn push(&mut self, column: impl Into<String>, value: Value) {
    self.cells.push((column.into(), value));
  }

  /// Look up a cell by column name (exact match).
  pub fn get(&self, column: &str) -> Option<&Value> {
    self
      .cells
      .iter()
      .find(|(name, _)| name == column)
      .map(|(_, v)| v)
  }

  pub fn columns(&self) -> impl Iterator<Item = &str> {
    self.cells.iter().map(|(name, _)| name.as_str())
  }

  pub fn len(&self) -> usize { self.cells.len() }

  pub fn is_empty(&self) -> bool { self.cells.is_empty() }

  // ── Typed accessors ─────────────────────────────────────────────────────

  /// Required integer column (row ids).
  pub fn id(&self, column: &'static str) -> Result<i64> {
    match self.get(column) {
      None | Some(Value::Null) => Err(Error::MissingColumn(column)),
      Some(Value::Integer(i)) => Ok(*i),
      Some(Value::Text(s)) => s.trim().parse().map_err(|_| type_err(column, "integer", "text")),
      Some(other) => Err(type_err(column, "integer", other.type_name())),
    }
  }

  /// Required text column (natural keys).
  pub fn key(&self, column: &'static str) -> Result<String> {
    match self.get(column) {
      None | Some(Value::Null) => Err(Error::MissingColumn(column)),
      Some(_) => self.text(column),
    }
  }

  /// Optional text column. Missing or NULL reads as `""`; numbers are
  /// rendered, since columns added by later migrations may have been filled
  /// by a looser writer.
  pub fn text(&self, column: &'static str) -> Result<String> {
    match self.get(column) {
      None | Some(Value::Null) => Ok(String::new()),
      Some(Value::Text(s)) => Ok(s.clone()),
      Some(Value::Integer(i)) => Ok(i.to_string()),
      Some(Value::Real(f)) => Ok(f.to_string()),
      Some(Value::Blob(_)) => Err(type_err(column, "text", "blob")),
    }
  }

  /// Optional boolean flag stored as 0/1. Missing or NULL reads as `false`.
  pub fn flag(&self, column: &'static str) -> Result<bool> {
    match self.get(column) {
      None | Some(Value::Null) => Ok(false),
      Some(Value::Integer(i)) => Ok(*i != 0),
      Some(Value::Real(f)) => Ok(*f != 0.0),
      Some(Value::Text(s)) => match s.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" | "off" => Ok(false),
        "1" | "true" | "yes" | "on" => Ok(true),
        _ => Err(type_err(column, "flag", "text")),
      },
      Some(Value::Blob(_)) => Err(type_err(column, "flag", "blob")),
    }
  }

  /// Optional counter column. Missing or NULL reads as `0`.
  pub fn count(&self, column: &'static str) -> Result<i64> {
    match self.get(column) {
      None | Some(Value::Null) => Ok(0),
      Some(Value::Integer(i)) => Ok(*i),
      Some(Value::Real(f)) => Ok(*f as i64),
      Some(Value::Text(s)) if s.trim().is_empty() => Ok(0),
      Some(Value::Text(s)) => s.trim().parse().map_err(|_| type_err(column, "integer", "text")),
      Some(Value::Blob(_)) => Err(type_err(column, "integer", "blob")),
    }
  }
}

fn type_err(column: &'static str, expected: &'static str, found: &'static str) -> Error {
  Error::ColumnType { column, expected, found }
}

impl FromIterator<(String, Value)> for Row {
  fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
    Self { cells: iter.into_iter().collect() }
  }
}

impl From<serde_json::Map<String, serde_json::Value>> for Row {
  fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
    map.into_iter().map(|(k, v)| (k, Value::from(v))).collect()
  }
}

impl Serialize for Row {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(self.cells.len()))?;
    for (k, v) in &self.cells {
      map.serialize_entry(k, v)?;
    }
    map.end()
  }
}
