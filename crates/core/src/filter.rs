//! Backend-neutral query descriptions
//!
//! The engine translates agent `where`/`options`/`data` objects into these
//! types after checking them against a Definition; backends only ever see
//! typed values and known columns.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::value::Value;

/// Reference to a column, or to a top-level key inside a JSON column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRef {
    /// Column name
    pub column: String,
    /// Key inside the column's JSON object, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl FieldRef {
    /// Whole column.
    pub fn column(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            key: None,
        }
    }

    /// Key inside a JSON column.
    pub fn json_key(column: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            key: Some(key.into()),
        }
    }
}

/// Per-field match predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    /// Exact equality with a typed value
    Equals(Value),
    /// Case-insensitive pattern (`%` any run, `_` any single char)
    ILike(String),
}

/// One field condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Field being tested
    pub target: FieldRef,
    /// Test applied to it
    pub predicate: Predicate,
}

/// Conjunction of conditions. An empty filter matches every record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// Conditions, AND-combined
    pub conditions: Vec<Condition>,
}

impl Filter {
    /// Filter matching everything.
    pub fn all() -> Self {
        Self::default()
    }

    /// Add an equality condition.
    pub fn eq(mut self, target: FieldRef, value: Value) -> Self {
        self.conditions.push(Condition {
            target,
            predicate: Predicate::Equals(value),
        });
        self
    }

    /// Add a case-insensitive pattern condition.
    pub fn ilike(mut self, target: FieldRef, pattern: impl Into<String>) -> Self {
        self.conditions.push(Condition {
            target,
            predicate: Predicate::ILike(pattern.into()),
        });
        self
    }

    /// True when the filter has no conditions.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Ascending
    #[default]
    Asc,
    /// Descending
    Desc,
}

/// One sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    /// Field sorted on
    pub target: FieldRef,
    /// Direction
    pub direction: Direction,
}

/// Pagination and ordering for `find`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindOptions {
    /// Maximum rows returned
    pub limit: Option<u64>,
    /// Rows skipped after ordering
    pub offset: Option<u64>,
    /// Sort keys, most significant first
    pub order: Vec<OrderBy>,
}

/// Change applied to one column by `update_where`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PatchOp {
    /// Replace the column value
    Set(Value),
    /// Shallow-merge keys into the column's JSON object
    MergeJson(Map<String, JsonValue>),
}

/// Column changes applied to every matching record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    /// Operations in application order
    pub ops: Vec<(String, PatchOp)>,
}

impl Patch {
    /// Empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace `column` with `value`.
    pub fn set(mut self, column: impl Into<String>, value: Value) -> Self {
        self.ops.push((column.into(), PatchOp::Set(value)));
        self
    }

    /// Merge `entries` into the JSON object stored in `column`.
    pub fn merge_json(mut self, column: impl Into<String>, entries: Map<String, JsonValue>) -> Self {
        self.ops.push((column.into(), PatchOp::MergeJson(entries)));
        self
    }

    /// True when nothing would change.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Columns touched by this patch.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().map(|(c, _)| c.as_str())
    }
}
