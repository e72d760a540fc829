use chrono::Utc;

use super::{fetch, fetch_one};
use crate::{Error, Result, SqlExecutor, Value, contact::ContactMessage, encode::encode_dt};

pub struct Contacts<'a, E> {
  exec: &'a E,
}

impl<'a, E: SqlExecutor> Contacts<'a, E> {
  pub fn new(exec: &'a E) -> Self { Self { exec } }

  pub async fn submit(&self, msg: ContactMessage) -> Result<ContactMessage> {
    msg.validate()?;
    let params = [
      Value::from(msg.name.trim()),
      Value::from(msg.email.trim()),
      Value::from(msg.message.trim()),
      Value::from(encode_dt(msg.created_at.unwrap_or_else(Utc::now))),
    ];
    fetch_one(
      self.exec,
      "INSERT INTO contacts (name, email, message, created_at)
       VALUES (?1, ?2, ?3, ?4) RETURNING *",
      &params,
      ContactMessage::from_row,
    )
    .await?
    .ok_or_else(|| Error::not_found("contact message", "new"))
  }

  /// Newest first.
  pub async fn list(&self) -> Result<Vec<ContactMessage>> {
    fetch(
      self.exec,
      "SELECT * FROM contacts ORDER BY id DESC",
      &[],
      ContactMessage::from_row,
    )
    .await
  }
}
