//! Session controller - one owner for all mutable view state.
//!
//! The renderer never pokes fields directly; every mutation funnels through a
//! named operation here so the invariants hold at a single choke point:
//!
//! - filter/sort changes reset the reveal window to its floor and cancel any
//!   in-flight advance, synchronously, before the next render
//! - every mutation re-derives the view and re-clamps the window
//! - at most one advance is in flight; a second trigger is a no-op
//! - dropping the session discards the pending advance with it

use std::time::{Duration, Instant};

use crate::reveal::RevealWindow;
use crate::row::{Row, RowId, Schema};
use crate::store::RowStore;
use crate::view::{derive, FilterSet, SortDirection, SortSpec};

/// Delay between a reveal trigger and the window actually growing. While the
/// advance is pending, `is_loading` reads true and the trigger will not
/// re-fire.
pub const DEFAULT_ADVANCE_DELAY: Duration = Duration::from_millis(1000);

/// The cell currently open for text input; exclusive across the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditCursor {
    pub row: RowId,
    pub column: String,
}

#[derive(Debug, Clone, Copy)]
struct PendingAdvance {
    due: Instant,
}

/// Counters for the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub filtered: usize,
    pub modified: usize,
    pub shown: usize,
}

pub struct Session {
    store: RowStore,
    filters: FilterSet,
    sort: Option<SortSpec>,
    window: RevealWindow,
    edit: Option<EditCursor>,
    pending: Option<PendingAdvance>,
    advance_delay: Duration,
    derived: Vec<usize>,
    notice: Option<String>,
}

impl Session {
    pub fn new(window: RevealWindow, advance_delay: Duration) -> Self {
        Self {
            store: RowStore::empty(),
            filters: FilterSet::new(),
            sort: None,
            window,
            edit: None,
            pending: None,
            advance_delay,
            derived: Vec::new(),
            notice: None,
        }
    }

    /// Recompute the derived view from current inputs and re-fit the window.
    /// Runs on every mutating operation, including each filter keystroke.
    fn reindex(&mut self) {
        self.derived = derive(
            self.store.rows(),
            self.store.schema(),
            &self.filters,
            self.sort.as_ref(),
        );
        self.window.clamp(self.derived.len());
    }

    // -------------------------------------------------------------------------
    // Load / reset
    // -------------------------------------------------------------------------

    /// Replace the dataset wholesale (upload or generate). Clears filters,
    /// sort, edit cursor, modified set, and any in-flight advance.
    pub fn load(&mut self, schema: Schema, rows: Vec<Row>) {
        self.store = RowStore::load(schema, rows);
        self.filters.clear();
        self.sort = None;
        self.edit = None;
        self.pending = None;
        self.window.reset();
        self.reindex();
    }

    /// Restore the pristine snapshot. Filters and sort stay; the window
    /// re-clamps through the normal recomputation path.
    pub fn reset(&mut self) {
        self.store.reset();
        self.edit = None;
        self.pending = None;
        self.reindex();
    }

    // -------------------------------------------------------------------------
    // Filters / sort
    // -------------------------------------------------------------------------

    pub fn set_filter(&mut self, column: &str, pattern: String) {
        self.filters.set(column, pattern);
        self.pending = None;
        self.window.reset();
        self.reindex();
    }

    /// Header click: same column toggles direction, new column starts
    /// ascending.
    pub fn toggle_sort(&mut self, column: &str) {
        self.sort = match self.sort.take() {
            Some(mut spec) if spec.column == column => {
                spec.direction = spec.direction.toggled();
                Some(spec)
            }
            _ => Some(SortSpec::ascending(column)),
        };
        self.pending = None;
        self.window.reset();
        self.reindex();
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    pub fn sort_indicator(&self, column: &str) -> Option<SortDirection> {
        self.sort
            .as_ref()
            .filter(|s| s.column == column)
            .map(|s| s.direction)
    }

    // -------------------------------------------------------------------------
    // Edits
    // -------------------------------------------------------------------------

    /// Open a cell for text input. Replaces any previously open editor.
    /// Returns false (and leaves the cursor unset) for unknown rows/columns.
    pub fn begin_edit(&mut self, row: RowId, column: &str) -> bool {
        if !self.store.contains(row) || !self.store.schema().contains(column) {
            return false;
        }
        self.edit = Some(EditCursor {
            row,
            column: column.to_string(),
        });
        true
    }

    pub fn edit(&self) -> Option<&EditCursor> {
        self.edit.as_ref()
    }

    /// Commit the open editor with the given text (Enter, Escape, and blur
    /// all land here) and close it.
    pub fn commit_edit(&mut self, value: String) {
        if let Some(cursor) = self.edit.take() {
            self.set_cell(cursor.row, &cursor.column, value);
        }
    }

    /// Direct cell write; marks the row modified even when the value is
    /// unchanged, then re-derives (edits can move rows in or out of filter
    /// matches, which re-clamps the window).
    pub fn set_cell(&mut self, row: RowId, column: &str, value: String) -> bool {
        let applied = self.store.set_cell(row, column, value);
        if applied {
            self.reindex();
        }
        applied
    }

    // -------------------------------------------------------------------------
    // Reveal window
    // -------------------------------------------------------------------------

    /// Derived-view indices currently exposed to the renderer.
    pub fn visible(&self) -> &[usize] {
        &self.derived[..self.window.len().min(self.derived.len())]
    }

    pub fn derived(&self) -> &[usize] {
        &self.derived
    }

    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    pub fn has_more(&self) -> bool {
        self.window.has_more(self.derived.len())
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Schedule one advance, applied after the configured delay. No-op while
    /// an advance is already in flight or nothing remains to reveal.
    pub fn request_advance(&mut self, now: Instant) -> bool {
        if self.pending.is_some() || !self.has_more() {
            return false;
        }
        self.pending = Some(PendingAdvance {
            due: now + self.advance_delay,
        });
        true
    }

    /// Apply a due advance. Returns true when the window grew this tick.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.pending {
            Some(p) if now >= p.due => {
                self.pending = None;
                let before = self.window.len();
                self.window.advance(self.derived.len());
                self.window.len() > before
            }
            _ => false,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn store(&self) -> &RowStore {
        &self.store
    }

    pub fn schema(&self) -> &Schema {
        self.store.schema()
    }

    pub fn is_modified(&self, id: RowId) -> bool {
        self.store.is_modified(id)
    }

    pub fn stats(&self) -> Stats {
        Stats {
            total: self.store.len(),
            filtered: self.derived.len(),
            modified: self.store.modified_count(),
            shown: self.visible().len(),
        }
    }

    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(RevealWindow::default(), DEFAULT_ADVANCE_DELAY)
    }
}

// =============================================================================
// Tests
// =============================================================================
