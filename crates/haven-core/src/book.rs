//! Recommended books with affiliate links and engagement counters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result, Row, Value,
  dedup::{Dedupe, first_non_empty, key_part},
  encode::{decode_dt, encode_key, encode_opt_dt},
  url::{normalize_link, normalize_url},
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Book {
  pub id:            Option<i64>,
  pub title:         String,
  pub author:        String,
  pub description:   String,
  pub affiliate_url: String,
  pub cover_url:     String,
  pub view_count:    i64,
  pub scroll_count:  i64,
  pub created_at:    Option<DateTime<Utc>>,
}

pub const INSERT_COLUMNS: &str = "title, author, description, affiliate_url, cover_url, \
   view_count, scroll_count, created_at, dedup_key";

impl Book {
  pub fn new(
    title: impl Into<String>,
    author: impl Into<String>,
    affiliate_url: impl Into<String>,
  ) -> Self {
    Self {
      title: title.into(),
      author: author.into(),
      affiliate_url: affiliate_url.into(),
      ..Self::default()
    }
  }

  pub fn from_row(row: &Row) -> Result<Self> {
    Ok(Self {
      id:            Some(row.id("id")?),
      title:         row.text("title")?,
      author:        row.text("author")?,
      description:   row.text("description")?,
      affiliate_url: row.text("affiliate_url")?,
      cover_url:     row.text("cover_url")?,
      view_count:    row.count("view_count")?,
      scroll_count:  row.count("scroll_count")?,
      created_at:    decode_dt(&row.text("created_at")?)?,
    })
  }

  pub fn normalized(self) -> Self {
    Self {
      title:         self.title.trim().to_owned(),
      author:        self.author.trim().to_owned(),
      description:   self.description.trim().to_owned(),
      affiliate_url: normalize_url(&self.affiliate_url),
      cover_url:     normalize_link(&self.cover_url),
      ..self
    }
  }

  pub fn validate(&self) -> Result<()> {
    if self.title.trim().is_empty() {
      return Err(Error::Invalid { entity: "book", reason: "title is required".into() });
    }
    if self.view_count < 0 || self.scroll_count < 0 {
      return Err(Error::Invalid { entity: "book", reason: "counters must not be negative".into() });
    }
    Ok(())
  }

  pub fn key_string(&self) -> String {
    let (title, author, url) = self.dedup_key();
    encode_key(&[&title, &author, &url])
  }

  pub fn insert_params(&self) -> Vec<Value> {
    crate::params![
      &self.title,
      &self.author,
      &self.description,
      &self.affiliate_url,
      &self.cover_url,
      self.view_count,
      self.scroll_count,
      encode_opt_dt(self.created_at),
      self.key_string(),
    ]
  }
}

impl Dedupe for Book {
  type Key = (String, String, String);

  fn dedup_key(&self) -> Self::Key {
    (key_part(&self.title), key_part(&self.author), key_part(&self.affiliate_url))
  }

  fn absorb(&mut self, other: Self) {
    self.view_count = self.view_count.saturating_add(other.view_count);
    self.scroll_count = self.scroll_count.saturating_add(other.scroll_count);
    first_non_empty(&mut self.cover_url, other.cover_url);
    first_non_empty(&mut self.description, other.description);
    if self.created_at.is_none() {
      self.created_at = other.created_at;
    }
  }

  fn row_id(&self) -> Option<i64> { self.id }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::dedup::dedupe;

  fn book(id: i64, views: i64) -> Book {
    Book {
      id: Some(id),
      view_count: views,
      ..Book::new("Reasons to Stay Alive", "Matt Haig", "https://amzn.to/x")
    }
  }

  #[test]
  fn duplicate_counters_are_summed() {
    let mut a = book(1, 3);
    a.scroll_count = 2;
    let mut b = book(2, 5);
    b.title = " reasons to stay alive".into();
    b.scroll_count = 1;

    let out = dedupe(vec![a, b]);
    assert_eq!(out.records.len(), 1);
    assert_eq!(out.records[0].view_count, 8);
    assert_eq!(out.records[0].scroll_count, 3);
    assert_eq!(out.dropped, [2]);
  }

  #[test]
  fn huge_counters_saturate() {
    let a = book(1, i64::MAX - 1);
    let b = book(2, 10);
    assert_eq!(dedupe(vec![a, b]).records[0].view_count, i64::MAX);
  }

  #[test]
  fn missing_cover_backfilled_from_duplicate() {
    let a = book(1, 0);
    let mut b = book(2, 0);
    b.cover_url = "https://covers.example/haig.jpg".into();

    let out = dedupe(vec![a, b]);
    assert_eq!(out.records[0].cover_url, "https://covers.example/haig.jpg");
  }

  #[test]
  fn different_affiliate_links_are_distinct() {
    let a = book(1, 0);
    let mut b = book(2, 0);
    b.affiliate_url = "https://bookshop.org/x".into();
    assert_eq!(dedupe(vec![a, b]).records.len(), 2);
  }

  #[test]
  fn negative_counters_rejected() {
    let mut b = book(1, 0);
    b.view_count = -1;
    assert!(b.validate().is_err());
  }

  #[test]
  fn normalized_adds_scheme() {
    let b = Book::new("T", "A", "amzn.to/abc").normalized();
    assert_eq!(b.affiliate_url, "https://amzn.to/abc");
  }
}
