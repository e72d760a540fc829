//! D1 response envelope decoding.

use haven_core::Row;
use serde::Deserialize;
use serde_json::Value as Json;

use crate::{Error, Result};

#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
  #[serde(default)]
  pub success: bool,
  #[serde(default)]
  pub result:  Json,
  #[serde(default)]
  pub errors:  Json,
}

impl Envelope {
  /// Human-readable summary of the `errors` array.
  pub fn error_summary(&self) -> String {
    match &self.errors {
      Json::Array(items) if !items.is_empty() => items
        .iter()
        .map(|e| match e.get("message").and_then(Json::as_str) {
          Some(msg) => msg.to_owned(),
          None => e.to_string(),
        })
        .collect::<Vec<_>>()
        .join("; "),
      Json::Null | Json::Array(_) => "no error detail".to_owned(),
      other => other.to_string(),
    }
  }
}

/// Unwrap the `result` member of a successful D1 response into rows.
///
/// D1 wraps rows as `[{"results": [...], "meta": ...}]`; some proxies return
/// the row array directly. `null` means no rows.
pub fn rows_from_result(result: Json) -> Result<Vec<Row>> {
  match result {
    Json::Null => Ok(Vec::new()),
    Json::Array(mut items) => {
      let wrapped = items
        .first()
        .and_then(Json::as_object)
        .is_some_and(|o| o.contains_key("results"));
      if wrapped {
        let mut first = items.swap_remove(0);
        rows_from_array(first.get_mut("results").map(Json::take).unwrap_or_default())
      } else {
        rows_from_array(Json::Array(items))
      }
    }
    Json::Object(mut obj) if obj.contains_key("results") => {
      rows_from_array(obj.remove("results").unwrap_or_default())
    }
    other => Err(Error::Shape(format!("result is {}", json_kind(&other)))),
  }
}

fn rows_from_array(rows: Json) -> Result<Vec<Row>> {
  match rows {
    Json::Null => Ok(Vec::new()),
    Json::Array(items) => items
      .into_iter()
      .map(|item| match item {
        Json::Object(map) => Ok(Row::from(map)),
        other => Err(Error::Shape(format!("row is {}", json_kind(&other)))),
      })
      .collect(),
    other => Err(Error::Shape(format!("results is {}", json_kind(&other)))),
  }
}

fn json_kind(v: &Json) -> &'static str {
  match v {
    Json::Null => "null",
    Json::Bool(_) => "a boolean",
    Json::Number(_) => "a number",
    Json::String(_) => "a string",
    Json::Array(_) => "an array",
    Json::Object(_) => "an object",
  }
}
