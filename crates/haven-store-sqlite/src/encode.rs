//! Conversions between [`haven_core::Value`] and rusqlite's value types, and
//! the single-statement runner used by every query.

use haven_core::{Row, Value};
use rusqlite::types::{Value as SqlValue, ValueRef};

pub fn encode_value(v: &Value) -> SqlValue {
  match v {
    Value::Null => SqlValue::Null,
    Value::Integer(i) => SqlValue::Integer(*i),
    Value::Real(f) => SqlValue::Real(*f),
    Value::Text(s) => SqlValue::Text(s.clone()),
    Value::Blob(b) => SqlValue::Blob(b.clone()),
  }
}

pub fn decode_value(v: ValueRef<'_>) -> Value {
  match v {
    ValueRef::Null => Value::Null,
    ValueRef::Integer(i) => Value::Integer(i),
    ValueRef::Real(f) => Value::Real(f),
    ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
    ValueRef::Blob(b) => Value::Blob(b.to_vec()),
  }
}

/// Prepare and run one statement, collecting rows if it produces any.
pub fn run_statement(
  conn:   &rusqlite::Connection,
  sql:    &str,
  params: Vec<SqlValue>,
) -> rusqlite::Result<Vec<Row>> {
  let mut stmt = conn.prepare(sql)?;

  if stmt.column_count() == 0 {
    stmt.execute(rusqlite::params_from_iter(params))?;
    return Ok(Vec::new());
  }

  let names: Vec<String> = stmt
    .column_names()
    .into_iter()
    .map(str::to_owned)
    .collect();

  let mut rows = stmt.query(rusqlite::params_from_iter(params))?;
  let mut out = Vec::new();
  while let Some(row) = rows.next()? {
    let mut decoded = Row::new();
    for (i, name) in names.iter().enumerate() {
      decoded.push(name.clone(), decode_value(row.get_ref(i)?));
    }
    out.push(decoded);
  }
  Ok(out)
}
