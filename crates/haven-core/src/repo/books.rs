//! [`Books`]: reads, keyed upserts, counters and self-healing loads.

use std::collections::HashSet;

use chrono::Utc;

use super::{assignments, ensure_key_free, fetch_one, placeholders, run};
use crate::{
  Error, Result, SqlExecutor, Value,
  book::{Book, INSERT_COLUMNS},
  dedup::dedupe,
};

pub struct Books<'a, E> {
  exec: &'a E,
}

impl<'a, E: SqlExecutor> Books<'a, E> {
  pub fn new(exec: &'a E) -> Self { Self { exec } }

  /// Load every book, deduplicated, writing any cleanup back to the store.
  pub async fn list(&self) -> Result<Vec<Book>> {
    let rows = run(self.exec, "SELECT * FROM books ORDER BY id", &[]).await?;

    let mut stale = HashSet::new();
    let mut loaded = Vec::with_capacity(rows.len());
    for row in &rows {
      let b = Book::from_row(row)?;
      if row.text("dedup_key")? != b.key_string()
        && let Some(id) = b.id
      {
        stale.insert(id);
      }
      loaded.push(b);
    }

    let out = dedupe(loaded);
    if !out.changed() && stale.is_empty() {
      return Ok(out.records);
    }

    for id in &out.dropped {
      run(self.exec, "DELETE FROM books WHERE id = ?1", &[Value::Integer(*id)]).await?;
    }
    for b in &out.records {
      if let Some(id) = b.id
        && (out.absorbers.contains(&id) || stale.contains(&id))
      {
        self.write(id, b).await?;
      }
    }

    tracing::info!(
      loaded = rows.len(),
      kept = out.records.len(),
      rekeyed = stale.len(),
      "healed books table"
    );
    Ok(out.records)
  }

  pub async fn get(&self, id: i64) -> Result<Option<Book>> {
    fetch_one(
      self.exec,
      "SELECT * FROM books WHERE id = ?1",
      &[Value::Integer(id)],
      Book::from_row,
    )
    .await
  }

  /// Insert a book, or merge it into the row with the same dedup key:
  /// counters are summed and a blank cover or description is filled in.
  pub async fn upsert(&self, book: Book) -> Result<Book> {
    let mut book = book.normalized();
    book.validate()?;
    book.created_at.get_or_insert_with(Utc::now);

    let sql = format!(
      "INSERT INTO books ({INSERT_COLUMNS}) VALUES ({})
       ON CONFLICT(dedup_key) WHERE dedup_key <> '' DO UPDATE SET
         view_count   = coalesce(books.view_count, 0) + excluded.view_count,
         scroll_count = coalesce(books.scroll_count, 0) + excluded.scroll_count,
         cover_url    = CASE WHEN coalesce(books.cover_url, '') = ''
                          THEN excluded.cover_url ELSE books.cover_url END,
         description  = CASE WHEN coalesce(books.description, '') = ''
                          THEN excluded.description ELSE books.description END
       RETURNING *",
      placeholders(9),
    );

    fetch_one(self.exec, &sql, &book.insert_params(), Book::from_row)
      .await?
      .ok_or_else(|| Error::not_found("book", &book.title))
  }

  /// Replace the editable fields of the book with primary key `id`.
  /// Counters are preserved unless the caller supplies non-zero values.
  pub async fn update(&self, id: i64, book: Book) -> Result<Book> {
    let existing = self
      .get(id)
      .await?
      .ok_or_else(|| Error::not_found("book", id))?;

    let mut book = book.normalized();
    book.validate()?;
    book.id = Some(id);
    book.created_at = book.created_at.or(existing.created_at);
    if book.view_count == 0 {
      book.view_count = existing.view_count;
    }
    if book.scroll_count == 0 {
      book.scroll_count = existing.scroll_count;
    }

    ensure_key_free(self.exec, "books", "book", &book.key_string(), id).await?;
    self.write(id, &book).await
  }

  pub async fn delete(&self, id: i64) -> Result<bool> {
    let rows = run(
      self.exec,
      "DELETE FROM books WHERE id = ?1 RETURNING id",
      &[Value::Integer(id)],
    )
    .await?;
    Ok(!rows.is_empty())
  }

  pub async fn record_view(&self, id: i64) -> Result<Book> {
    self.bump(id, "UPDATE books SET view_count = view_count + 1 WHERE id = ?1 RETURNING *").await
  }

  pub async fn record_scroll(&self, id: i64) -> Result<Book> {
    self
      .bump(id, "UPDATE books SET scroll_count = scroll_count + 1 WHERE id = ?1 RETURNING *")
      .await
  }

  pub async fn import(&self, batch: Vec<Book>) -> Result<Vec<Book>> {
    let batch = dedupe(batch.into_iter().map(Book::normalized)).records;
    let mut stored = Vec::with_capacity(batch.len());
    for b in batch {
      stored.push(self.upsert(b).await?);
    }
    Ok(stored)
  }

  async fn bump(&self, id: i64, sql: &str) -> Result<Book> {
    fetch_one(self.exec, sql, &[Value::Integer(id)], Book::from_row)
      .await?
      .ok_or_else(|| Error::not_found("book", id))
  }

  async fn write(&self, id: i64, book: &Book) -> Result<Book> {
    let sql = format!(
      "UPDATE books SET {} WHERE id = ?10 RETURNING *",
      assignments(INSERT_COLUMNS)
    );
    let mut params = book.insert_params();
    params.push(Value::Integer(id));

    fetch_one(self.exec, &sql, &params, Book::from_row)
      .await?
      .ok_or_else(|| Error::not_found("book", id))
  }
}
