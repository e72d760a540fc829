//! Collapse records that describe the same real-world entity.
//!
//! Two records are duplicates when their [`Dedupe::dedup_key`] matches. The
//! first record seen survives and absorbs the later ones through
//! [`Dedupe::absorb`]; output order follows first appearance.

use std::{collections::HashMap, hash::Hash};

/// A record type that can be deduplicated.
pub trait Dedupe {
  type Key: Eq + Hash;

  fn dedup_key(&self) -> Self::Key;

  /// Merge a later duplicate into `self`.
  fn absorb(&mut self, other: Self);

  /// Store row id, if the record has been persisted.
  fn row_id(&self) -> Option<i64>;
}

/// Result of [`dedupe`].
#[derive(Debug, Clone, PartialEq)]
pub struct Deduped<T> {
  pub records:   Vec<T>,
  /// Row ids of records that were merged away.
  pub dropped:   Vec<i64>,
  /// Row ids of survivors that absorbed at least one duplicate.
  pub absorbers: Vec<i64>,
}

impl<T> Deduped<T> {
  pub fn changed(&self) -> bool { !self.dropped.is_empty() || !self.absorbers.is_empty() }
}

pub fn dedupe<T: Dedupe>(items: impl IntoIterator<Item = T>) -> Deduped<T> {
  let mut records: Vec<T> = Vec::new();
  let mut index: HashMap<T::Key, usize> = HashMap::new();
  let mut dropped = Vec::new();
  let mut absorbers = Vec::new();

  for item in items {
    let key = item.dedup_key();
    match index.get(&key).copied() {
      Some(slot) => {
        if let Some(id) = item.row_id() {
          dropped.push(id);
        }
        let survivor = &mut records[slot];
        if let Some(id) = survivor.row_id()
          && !absorbers.contains(&id)
        {
          absorbers.push(id);
        }
        survivor.absorb(item);
      }
      None => {
        index.insert(key, records.len());
        records.push(item);
      }
    }
  }

  Deduped { records, dropped, absorbers }
}

/// Lowercase and trim one key component.
pub fn key_part(s: &str) -> String { s.trim().to_lowercase() }

/// Keep `current` unless it is blank, in which case take `candidate`.
pub fn first_non_empty(current: &mut String, candidate: String) {
  if current.trim().is_empty() && !candidate.trim().is_empty() {
    *current = candidate;
  }
}
