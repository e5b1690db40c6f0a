//! Rows and the column schema.
//!
//! A row is a bag of string cells keyed by column name plus a stable
//! identifier assigned at ingestion. Column order (and the numeric flag used
//! by the sort comparator) lives in the schema, not in the rows themselves.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Stable row identifier, unique within one store and never reassigned.
///
/// Distinct from any business key: parsed input uses the 1-based data line
/// position, generated input uses 1..=n.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowId(pub u64);

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One record of the dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    id: RowId,
    fields: FxHashMap<String, String>,
}

impl Row {
    pub fn new(id: RowId) -> Self {
        Self {
            id,
            fields: FxHashMap::default(),
        }
    }

    pub fn with_fields<I>(id: RowId, fields: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self {
            id,
            fields: fields.into_iter().collect(),
        }
    }

    pub fn id(&self) -> RowId {
        self.id
    }

    /// Cell value for a column; absent fields read as empty.
    pub fn get(&self, column: &str) -> &str {
        self.fields.get(column).map(|s| s.as_str()).unwrap_or("")
    }

    /// Replace a cell value unconditionally (no validation, no coercion).
    pub fn set(&mut self, column: &str, value: String) {
        self.fields.insert(column.to_string(), value);
    }
}

/// Column descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    /// Numeric columns sort by integer value (unparsable cells count as 0).
    pub numeric: bool,
}

impl Column {
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            numeric: false,
        }
    }

    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            numeric: true,
        }
    }
}

/// Ordered column list. Owns the fixed display/export order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// All-text schema from header names, in order.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: names.into_iter().map(Column::text).collect(),
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Column> {
        self.columns.get(idx)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    pub fn is_numeric(&self, name: &str) -> bool {
        self.columns
            .iter()
            .any(|c| c.name == name && c.numeric)
    }
}
