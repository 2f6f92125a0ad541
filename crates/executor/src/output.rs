//! Output enum for command execution results.
//!
//! Each action maps to exactly one variant:
//!
//! | Action | Output |
//! |--------|--------|
//! | `define_entity` | `Defined` |
//! | `create` | `Record` |
//! | `read` | `Records` |
//! | `update` | `Updated` |
//! | `delete` | `Deleted` |

use protean_core::Record;
use serde::Serialize;
use serde_json::{json, Value as JsonValue};

/// Successful command execution results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Output {
    /// Entity definition resolved
    Defined {
        /// Normalized entity name
        entity: String,
        /// Column names in definition order
        columns: Vec<String>,
        /// True when this command created the entity
        created: bool,
    },
    /// The stored record, generated columns included
    Record(Record),
    /// Matching records
    Records(Vec<Record>),
    /// Number of records updated
    Updated(u64),
    /// Number of records deleted
    Deleted(u64),
}

impl Output {
    /// Confirmation sentence for a defined entity.
    pub fn confirmation(entity: &str) -> String {
        format!("Entidad '{}' definida y sincronizada.", entity)
    }

    /// Client-facing JSON result.
    ///
    /// Records become plain objects; counts become `{"updated": n}` /
    /// `{"deleted": n}`.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Output::Defined {
                entity,
                columns,
                created,
            } => json!({
                "message": Output::confirmation(entity),
                "entity": entity,
                "columns": columns,
                "created": created,
            }),
            Output::Record(record) => record.to_json(),
            Output::Records(records) => JsonValue::Array(records.iter().map(Record::to_json).collect()),
            Output::Updated(n) => json!({ "updated": n }),
            Output::Deleted(n) => json!({ "deleted": n }),
        }
    }
}
