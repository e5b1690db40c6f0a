//! Row Store - working rows, pristine snapshot, modified set.
//!
//! Key invariants:
//! - The pristine snapshot is captured once per load and never mutated.
//! - `reset()` replaces the working rows with a fresh copy of the snapshot
//!   and clears the modified set.
//! - A row id enters the modified set on the first edit and is never removed
//!   by further edits; edits are not compared back to the snapshot value.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::row::{Row, RowId, Schema};

/// Authoritative working copy of the dataset for one session.
#[derive(Debug, Clone, Default)]
pub struct RowStore {
    schema: Schema,
    rows: Vec<Row>,
    pristine: Vec<Row>,
    modified: FxHashSet<RowId>,
    /// RowId -> position in `rows`. Positions are stable: the store never
    /// reorders or removes rows, only rewrites cell values.
    index: FxHashMap<RowId, usize>,
}

impl RowStore {
    /// Empty store: zero rows is a valid, renderable state.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Replace the store wholesale with freshly ingested rows, capturing the
    /// pristine snapshot.
    pub fn load(schema: Schema, rows: Vec<Row>) -> Self {
        let index = rows
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id(), i))
            .collect();
        Self {
            schema,
            pristine: rows.clone(),
            rows,
            modified: FxHashSet::default(),
            index,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, idx: usize) -> Option<&Row> {
        self.rows.get(idx)
    }

    pub fn find(&self, id: RowId) -> Option<&Row> {
        self.index.get(&id).map(|&i| &self.rows[i])
    }

    pub fn contains(&self, id: RowId) -> bool {
        self.index.contains_key(&id)
    }

    /// Replace a cell value unconditionally and mark the row modified, even
    /// when the new value equals the old one.
    ///
    /// Returns false when no row with this id exists (the edit is dropped).
    pub fn set_cell(&mut self, id: RowId, column: &str, value: String) -> bool {
        let Some(&idx) = self.index.get(&id) else {
            return false;
        };
        self.rows[idx].set(column, value);
        self.modified.insert(id);
        true
    }

    pub fn modified(&self) -> &FxHashSet<RowId> {
        &self.modified
    }

    pub fn modified_count(&self) -> usize {
        self.modified.len()
    }

    pub fn is_modified(&self, id: RowId) -> bool {
        self.modified.contains(&id)
    }

    /// Restore the pristine snapshot and clear the modified set.
    pub fn reset(&mut self) {
        self.rows = self.pristine.clone();
        self.modified.clear();
    }

    #[cfg(test)]
    pub(crate) fn pristine(&self) -> &[Row] {
        &self.pristine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::Column;

    fn store_with(values: &[(u64, &str)]) -> RowStore {
        let schema = Schema::new(vec![Column::text("Title")]);
        let rows = values
            .iter()
            .map(|&(id, title)| {
                Row::with_fields(RowId(id), [("Title".to_string(), title.to_string())])
            })
            .collect();
        RowStore::load(schema, rows)
    }

    #[test]
    fn load_captures_pristine_snapshot() {
        let mut store = store_with(&[(1, "a"), (2, "b")]);
        store.set_cell(RowId(1), "Title", "edited".to_string());
        assert_eq!(store.find(RowId(1)).unwrap().get("Title"), "edited");
        // Snapshot untouched by the edit
        assert_eq!(store.pristine()[0].get("Title"), "a");
    }

    #[test]
    fn set_cell_marks_modified_even_when_value_unchanged() {
        let mut store = store_with(&[(1, "a")]);
        assert!(store.set_cell(RowId(1), "Title", "a".to_string()));
        assert!(store.is_modified(RowId(1)));
        assert_eq!(store.modified_count(), 1);
    }

    #[test]
    fn set_cell_unknown_row_is_dropped() {
        let mut store = store_with(&[(1, "a")]);
        assert!(!store.set_cell(RowId(99), "Title", "x".to_string()));
        assert_eq!(store.modified_count(), 0);
    }

    #[test]
    fn double_edit_keeps_single_membership() {
        let mut store = store_with(&[(1, "a"), (2, "b")]);
        store.set_cell(RowId(2), "Title", "x".to_string());
        store.set_cell(RowId(2), "Title", "y".to_string());
        assert_eq!(store.modified_count(), 1);
        assert!(store.is_modified(RowId(2)));
    }

    #[test]
    fn reset_restores_content_and_clears_modified() {
        let mut store = store_with(&[(1, "a"), (2, "b")]);
        store.set_cell(RowId(1), "Title", "edited".to_string());
        store.reset();
        assert_eq!(store.find(RowId(1)).unwrap().get("Title"), "a");
        assert!(store.modified().is_empty());
    }

    #[test]
    fn reset_is_idempotent() {
        let mut store = store_with(&[(1, "a")]);
        store.set_cell(RowId(1), "Title", "x".to_string());
        store.reset();
        let first: Vec<String> = store.rows().iter().map(|r| r.get("Title").to_string()).collect();
        store.reset();
        let second: Vec<String> = store.rows().iter().map(|r| r.get("Title").to_string()).collect();
        assert_eq!(first, second);
        assert!(store.modified().is_empty());
    }

    #[test]
    fn empty_store_is_valid() {
        let store = RowStore::empty();
        assert!(store.is_empty());
        assert_eq!(store.rows().len(), 0);
        assert!(store.modified().is_empty());
    }
}
