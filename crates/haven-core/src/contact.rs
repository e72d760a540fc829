//! Messages submitted through the site's contact form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, Row, encode::decode_dt};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactMessage {
  pub id:         Option<i64>,
  pub name:       String,
  pub email:      String,
  pub message:    String,
  pub created_at: Option<DateTime<Utc>>,
}

impl ContactMessage {
  pub fn from_row(row: &Row) -> Result<Self> {
    Ok(Self {
      id:         Some(row.id("id")?),
      name:       row.text("name")?,
      email:      row.text("email")?,
      message:    row.text("message")?,
      created_at: decode_dt(&row.text("created_at")?)?,
    })
  }

  pub fn validate(&self) -> Result<()> {
    if self.message.trim().is_empty() {
      return Err(Error::Invalid { entity: "contact message", reason: "message is required".into() });
    }
    Ok(())
  }
}
