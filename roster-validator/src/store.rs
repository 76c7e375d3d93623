//! In-memory store of saved valid records.
//!
//! Append-only and process-local: nothing is written to disk. Appends are
//! serialised by a mutex and readers get a cloned snapshot.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::StoreError;
use crate::row::Row;

#[derive(Debug, Default)]
pub struct SavedRecords {
    rows: Mutex<Vec<Row>>,
}

impl SavedRecords {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `rows` (the valid rows of a report) and return the new total.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NothingToSave`] when `rows` is empty.
    pub fn append(&self, rows: &[Row]) -> Result<usize, StoreError> {
        if rows.is_empty() {
            return Err(StoreError::NothingToSave);
        }
        let mut saved = self.lock();
        saved.extend_from_slice(rows);
        tracing::info!(added = rows.len(), total = saved.len(), "saved valid records");
        Ok(saved.len())
    }

    /// A copy of every saved row, in the order they were appended.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Row> {
        self.lock().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic while holding the lock cannot leave a partial append behind,
    // so a poisoned guard is still consistent.
    fn lock(&self) -> MutexGuard<'_, Vec<Row>> {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn named(name: &str) -> Row {
        [("Name", name)].into_iter().collect()
    }

    #[test]
    fn test_append_grows_in_order() {
        let store = SavedRecords::new();
        assert!(store.is_empty());
        assert_eq!(store.append(&[named("Asha"), named("Ravi")]), Ok(2));
        assert_eq!(store.append(&[named("Meera")]), Ok(3));

        let names: Vec<_> = store
            .snapshot()
            .iter()
            .filter_map(|r| r.get("Name").map(str::to_owned))
            .collect();
        assert_eq!(names, vec!["Asha", "Ravi", "Meera"]);
    }

    #[test]
    fn test_append_nothing_fails() {
        let store = SavedRecords::new();
        let err = store.append(&[]).unwrap_err();
        assert_eq!(err.to_string(), "No valid records to save.");
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_concurrent_appends_are_not_lost() {
        let store = Arc::new(SavedRecords::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    store.append(&[named(&format!("s{i}"))]).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.len(), 8);
    }
}
