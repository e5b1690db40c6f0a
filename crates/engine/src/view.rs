//! Derivation pipeline - the filtered, sorted projection of the row store.
//!
//! `derive` is the view layer between canonical storage and the rendering
//! surface. It maps the working rows to an ordered list of data indices.
//!
//! Key invariants:
//! - Pure and deterministic: identical inputs produce identical output.
//! - Filter first, then sort; ties preserve the filtered order (stable sort).
//! - An all-empty filter set with no sort column is the identity projection.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::row::{Row, Schema};

// =============================================================================
// FilterSet
// =============================================================================

/// Per-column substring patterns, matched case-insensitively.
///
/// Empty or whitespace-only patterns impose no constraint. A row passes the
/// set iff it satisfies every non-empty entry.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    patterns: FxHashMap<String, String>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or clear, with an empty pattern) the filter for one column.
    pub fn set(&mut self, column: &str, pattern: String) {
        if pattern.trim().is_empty() {
            self.patterns.remove(column);
        } else {
            self.patterns.insert(column.to_string(), pattern);
        }
    }

    /// Current pattern for a column, empty when unset.
    pub fn get(&self, column: &str) -> &str {
        self.patterns.get(column).map(|s| s.as_str()).unwrap_or("")
    }

    pub fn clear(&mut self) {
        self.patterns.clear();
    }

    /// Any non-empty entry active?
    pub fn is_active(&self) -> bool {
        !self.patterns.is_empty()
    }

    /// Does this row satisfy every non-empty pattern?
    pub fn matches(&self, row: &Row) -> bool {
        self.patterns.iter().all(|(column, pattern)| {
            row.get(column)
                .to_lowercase()
                .contains(&pattern.to_lowercase())
        })
    }
}

// =============================================================================
// SortSpec
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// At most one active sort column. Re-selecting the column toggles direction;
/// selecting a new column starts ascending (see `Session::toggle_sort`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn ascending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Ascending,
        }
    }
}

/// Integer sort key for numeric columns; unparsable cells count as 0.
fn numeric_key(value: &str) -> i64 {
    value.trim().parse().unwrap_or(0)
}

// =============================================================================
// Derivation
// =============================================================================

/// Apply filter set then sort spec to the working rows, producing the ordered
/// data indices of the derived view.
///
/// Safe to call on every state change; the result is never cached across
/// mutations, only recomputed.
pub fn derive(
    rows: &[Row],
    schema: &Schema,
    filters: &FilterSet,
    sort: Option<&SortSpec>,
) -> Vec<usize> {
    let mut view: Vec<usize> = rows
        .iter()
        .enumerate()
        .filter(|(_, row)| filters.matches(row))
        .map(|(idx, _)| idx)
        .collect();

    if let Some(spec) = sort {
        let numeric = schema.is_numeric(&spec.column);
        // Stable sort; Equal on ties keeps the filtered order in both
        // directions (reverse the key ordering, not the slice).
        view.sort_by(|&a, &b| {
            let av = rows[a].get(&spec.column);
            let bv = rows[b].get(&spec.column);
            let ord = if numeric {
                numeric_key(av).cmp(&numeric_key(bv))
            } else {
                av.cmp(bv)
            };
            match spec.direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        });
    }

    view
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::{Column, RowId};

    fn book(id: u64, title: &str, year: &str) -> Row {
        Row::with_fields(
            RowId(id),
            [
                ("Title".to_string(), title.to_string()),
                ("PublishedYear".to_string(), year.to_string()),
            ],
        )
    }

    fn schema() -> Schema {
        Schema::new(vec![Column::text("Title"), Column::numeric("PublishedYear")])
    }

    #[test]
    fn empty_filters_no_sort_is_identity() {
        let rows = vec![book(1, "b", "2001"), book(2, "a", "1999"), book(3, "c", "2010")];
        let view = derive(&rows, &schema(), &FilterSet::new(), None);
        assert_eq!(view, vec![0, 1, 2]);
    }

    #[test]
    fn derive_is_deterministic() {
        let rows = vec![book(1, "b", "2001"), book(2, "a", "2001"), book(3, "c", "1999")];
        let mut filters = FilterSet::new();
        filters.set("Title", "a".to_string());
        let sort = SortSpec::ascending("PublishedYear");
        let first = derive(&rows, &schema(), &filters, Some(&sort));
        let second = derive(&rows, &schema(), &filters, Some(&sort));
        assert_eq!(first, second);
    }

    #[test]
    fn filter_is_case_insensitive_substring() {
        let rows = vec![book(1, "The Trial", "1925"), book(2, "Dune", "1965")];
        let mut filters = FilterSet::new();
        filters.set("Title", "TRIAL".to_string());
        assert_eq!(derive(&rows, &schema(), &filters, None), vec![0]);
        filters.set("Title", "un".to_string());
        assert_eq!(derive(&rows, &schema(), &filters, None), vec![1]);
    }

    #[test]
    fn whitespace_pattern_imposes_no_constraint() {
        let rows = vec![book(1, "a", "1"), book(2, "b", "2")];
        let mut filters = FilterSet::new();
        filters.set("Title", "   ".to_string());
        assert!(!filters.is_active());
        assert_eq!(derive(&rows, &schema(), &filters, None), vec![0, 1]);
    }

    #[test]
    fn all_entries_must_match() {
        let rows = vec![book(1, "Dune", "1965"), book(2, "Dune Messiah", "1969")];
        let mut filters = FilterSet::new();
        filters.set("Title", "dune".to_string());
        filters.set("PublishedYear", "69".to_string());
        assert_eq!(derive(&rows, &schema(), &filters, None), vec![1]);
    }

    #[test]
    fn missing_field_reads_empty_and_fails_nonempty_pattern() {
        let rows = vec![Row::with_fields(RowId(1), [("Title".to_string(), "x".to_string())])];
        let mut filters = FilterSet::new();
        filters.set("PublishedYear", "19".to_string());
        assert_eq!(derive(&rows, &schema(), &filters, None), Vec::<usize>::new());
    }

    #[test]
    fn numeric_sort_parses_integers() {
        // Lexicographic would order "900" after "1999"
        let rows = vec![book(1, "a", "900"), book(2, "b", "1999"), book(3, "c", "25")];
        let sort = SortSpec::ascending("PublishedYear");
        let view = derive(&rows, &schema(), &FilterSet::new(), Some(&sort));
        assert_eq!(view, vec![2, 0, 1]);
    }

    #[test]
    fn numeric_sort_unparsable_counts_as_zero() {
        let rows = vec![book(1, "a", "1999"), book(2, "b", "n/a"), book(3, "c", "-5")];
        let sort = SortSpec::ascending("PublishedYear");
        let view = derive(&rows, &schema(), &FilterSet::new(), Some(&sort));
        assert_eq!(view, vec![2, 1, 0]);
    }

    #[test]
    fn text_sort_is_lexicographic() {
        let rows = vec![book(1, "banana", ""), book(2, "apple", ""), book(3, "cherry", "")];
        let sort = SortSpec::ascending("Title");
        let view = derive(&rows, &schema(), &FilterSet::new(), Some(&sort));
        assert_eq!(view, vec![1, 0, 2]);
    }

    #[test]
    fn stable_sort_preserves_filtered_order_on_ties() {
        // Scenario A: years 1999, 2005, 1999
        let rows = vec![book(1, "first", "1999"), book(2, "mid", "2005"), book(3, "second", "1999")];
        let asc = SortSpec::ascending("PublishedYear");
        let view = derive(&rows, &schema(), &FilterSet::new(), Some(&asc));
        assert_eq!(view, vec![0, 2, 1]);

        let desc = SortSpec {
            column: "PublishedYear".to_string(),
            direction: SortDirection::Descending,
        };
        let view = derive(&rows, &schema(), &FilterSet::new(), Some(&desc));
        // Descending: 2005 first, then the two 1999 rows in filtered order
        assert_eq!(view, vec![1, 0, 2]);
    }

    #[test]
    fn toggle_and_toggle_back_restores_duplicate_order() {
        let rows = vec![book(1, "a", "1999"), book(2, "b", "1999"), book(3, "c", "2005")];
        let asc = SortSpec::ascending("PublishedYear");
        let before = derive(&rows, &schema(), &FilterSet::new(), Some(&asc));
        let desc = SortSpec {
            column: "PublishedYear".to_string(),
            direction: SortDirection::Descending,
        };
        let _ = derive(&rows, &schema(), &FilterSet::new(), Some(&desc));
        let after = derive(&rows, &schema(), &FilterSet::new(), Some(&asc));
        assert_eq!(before, after);
    }

    #[test]
    fn filter_then_sort_composes() {
        let rows = vec![
            book(1, "Dune", "1965"),
            book(2, "Emma", "1815"),
            book(3, "Dune Messiah", "1969"),
        ];
        let mut filters = FilterSet::new();
        filters.set("Title", "dune".to_string());
        let desc = SortSpec {
            column: "PublishedYear".to_string(),
            direction: SortDirection::Descending,
        };
        let view = derive(&rows, &schema(), &filters, Some(&desc));
        assert_eq!(view, vec![2, 0]);
    }
}
