//! Duplicate detection by composite identity.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::row::Row;

/// Identity of a row: the values of the key columns, kept as separate
/// fields so separator characters inside values cannot collide.
///
/// Absent cells are `None`, distinct from an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DuplicateKey(Vec<Option<String>>);

impl DuplicateKey {
    #[must_use]
    pub fn from_row(row: &Row, key_columns: &[String]) -> Self {
        Self(
            key_columns
                .iter()
                .map(|column| row.get(column).map(str::to_owned))
                .collect(),
        )
    }
}

/// Tracks keys seen so far in one run. Build a fresh detector per table.
#[derive(Debug)]
pub struct DuplicateDetector<'a> {
    key_columns: &'a [String],
    first_seen: HashMap<DuplicateKey, usize>,
}

impl<'a> DuplicateDetector<'a> {
    #[must_use]
    pub fn new(key_columns: &'a [String]) -> Self {
        Self {
            key_columns,
            first_seen: HashMap::new(),
        }
    }

    /// Record the row at input index `idx`.
    ///
    /// Returns `Some(first_idx)` when an earlier row had the same key,
    /// `None` when this is the first occurrence (which is then registered).
    pub fn observe(&mut self, idx: usize, row: &Row) -> Option<usize> {
        match self.first_seen.entry(DuplicateKey::from_row(row, self.key_columns)) {
            Entry::Occupied(first) => Some(*first.get()),
            Entry::Vacant(slot) => {
                slot.insert(idx);
                None
            }
        }
    }
}
