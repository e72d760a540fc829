//! Per-slug engagement counters (activity completions, page views).

use serde::{Deserialize, Serialize};

use crate::{Result, Row};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
  pub slug:        String,
  #[serde(default)]
  pub completions: i64,
  #[serde(default)]
  pub views:       i64,
}

/// Which counter column to bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterField {
  Completions,
  Views,
}

impl CounterField {
  pub fn column(self) -> &'static str {
    match self {
      CounterField::Completions => "completions",
      CounterField::Views => "views",
    }
  }
}

impl Counter {
  pub fn new(slug: impl Into<String>) -> Self {
    Self { slug: slug.into(), ..Self::default() }
  }

  pub fn from_row(row: &Row) -> Result<Self> {
    Ok(Self {
      slug:        row.key("slug")?,
      completions: row.count("completions")?,
      views:       row.count("views")?,
    })
  }
}
