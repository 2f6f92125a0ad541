//! Runtime entity schemas
//!
//! A [`Definition`] is the synthesized, registered description of an entity's
//! storage columns. Definitions are immutable once created: the engine hands
//! them out behind `Arc` and never mutates them.
//!
//! ## System columns
//!
//! Every Definition starts with three system columns, in this order:
//!
//! | Column | Kind | Notes |
//! |--------|------|-------|
//! | `id` | Uuid | primary key, generated on insert |
//! | `createdAt` | Date | set on insert |
//! | `updatedAt` | Date | set on insert, refreshed on update |
//!
//! Declared fields follow in declaration order.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::types::EntityName;
use crate::value::Value;

/// Primary key column.
pub const ID_COLUMN: &str = "id";
/// Creation timestamp column.
pub const CREATED_AT_COLUMN: &str = "createdAt";
/// Last-update timestamp column.
pub const UPDATED_AT_COLUMN: &str = "updatedAt";
/// Reserved system column names, in definition order.
pub const SYSTEM_COLUMNS: [&str; 3] = [ID_COLUMN, CREATED_AT_COLUMN, UPDATED_AT_COLUMN];

/// True when `field` names a system column and cannot be declared.
pub fn is_reserved(field: &str) -> bool {
    SYSTEM_COLUMNS.contains(&field)
}

/// Concrete storage column kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Short string
    String,
    /// Unbounded text
    Text,
    /// 64-bit integer
    Integer,
    /// Double precision float
    Float,
    /// Decimal number (carried as f64)
    Decimal,
    /// Boolean
    Boolean,
    /// UTC timestamp
    Date,
    /// UUID
    Uuid,
    /// Structured JSON payload
    Json,
}

impl ColumnKind {
    /// Name of the abstract type this kind is declared with.
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::String => "string",
            ColumnKind::Text => "text",
            ColumnKind::Integer => "integer",
            ColumnKind::Float => "float",
            ColumnKind::Decimal => "decimal",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Date => "date",
            ColumnKind::Uuid => "uuid",
            ColumnKind::Json => "json",
        }
    }

    /// True for kinds holding free text.
    pub fn is_textual(&self) -> bool {
        matches!(self, ColumnKind::String | ColumnKind::Text)
    }
}

/// Concrete column descriptor inside a [`Definition`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    /// Column name as declared
    pub name: String,
    /// Storage kind
    pub kind: ColumnKind,
    /// Whether `null` may be stored
    pub allow_null: bool,
    /// Whether values must be distinct across rows (nulls excepted)
    pub unique: bool,
    /// Primary key flag (only `id`)
    pub primary_key: bool,
    /// Value applied on insert when the field is omitted, already coerced to `kind`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    /// Opaque validation rules passed through to the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validate: Option<JsonValue>,
    /// True for `id`, `createdAt`, `updatedAt`
    pub system: bool,
}

impl ColumnDescriptor {
    /// Nullable, non-unique, non-system column of the given kind.
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
            allow_null: true,
            unique: false,
            primary_key: false,
            default_value: None,
            validate: None,
            system: false,
        }
    }

    /// Set nullability.
    pub fn allow_null(mut self, allow: bool) -> Self {
        self.allow_null = allow;
        self
    }

    /// Set the unique constraint.
    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    /// Set the default value.
    pub fn default_value(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Attach opaque validation rules.
    pub fn validate(mut self, rules: JsonValue) -> Self {
        self.validate = Some(rules);
        self
    }

    /// Mark as primary key.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.unique = true;
        self.allow_null = false;
        self
    }

    /// Mark as a system column.
    pub fn system(mut self) -> Self {
        self.system = true;
        self
    }
}

/// How a Definition came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionKind {
    /// Synthesized from a `define_entity` schema
    Declared,
    /// Fallback with a single open payload column
    Loose,
}

impl DefinitionKind {
    /// Lowercase label, as serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            DefinitionKind::Declared => "declared",
            DefinitionKind::Loose => "loose",
        }
    }
}

/// Registered description of an entity's storage columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    name: EntityName,
    kind: DefinitionKind,
    columns: Vec<ColumnDescriptor>,
}

impl Definition {
    /// Assemble a definition. Column order is preserved.
    pub fn new(name: EntityName, kind: DefinitionKind, columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            name,
            kind,
            columns,
        }
    }

    /// Normalized entity name (also the table name).
    pub fn name(&self) -> &EntityName {
        &self.name
    }

    /// Declared or loose.
    pub fn kind(&self) -> DefinitionKind {
        self.kind
    }

    /// True for loose definitions.
    pub fn is_loose(&self) -> bool {
        self.kind == DefinitionKind::Loose
    }

    /// All columns in definition order.
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column names in definition order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Non-system columns in definition order.
    pub fn declared_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(|c| !c.system)
    }

    /// The open payload column of a loose definition.
    pub fn payload_column(&self) -> Option<&ColumnDescriptor> {
        if self.is_loose() {
            self.declared_columns().next()
        } else {
            None
        }
    }
}

/// Abstract field specification as supplied by the agent.
///
/// Every attribute is optional at this level; the engine rejects a missing
/// `type` when it synthesizes the definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    /// Abstract type name (`string`, `integer`, …)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Nullability, default true
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_null: Option<bool>,
    /// Unique constraint, default false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique: Option<bool>,
    /// Default applied on insert
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<JsonValue>,
    /// Opaque validation rules
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validate: Option<JsonValue>,
}

impl FieldSpec {
    /// Spec with only a type.
    pub fn of_type(type_name: impl Into<String>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            ..Self::default()
        }
    }

    /// Set nullability.
    pub fn allow_null(mut self, allow: bool) -> Self {
        self.allow_null = Some(allow);
        self
    }

    /// Set the unique constraint.
    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = Some(unique);
        self
    }

    /// Set the default value.
    pub fn default_value(mut self, value: JsonValue) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Read a field spec leniently from agent JSON.
    ///
    /// `type` is kept only when it is a string, `allowNull`/`unique` only when
    /// boolean, `validate` only when an object. `defaultValue` is kept whenever
    /// the key is present, `null` included. A non-object spec yields an empty
    /// spec, which later fails for its missing type.
    pub fn from_json(json: &JsonValue) -> Self {
        let Some(obj) = json.as_object() else {
            return Self::default();
        };
        Self {
            type_name: obj.get("type").and_then(|t| t.as_str()).map(str::to_string),
            allow_null: obj.get("allowNull").and_then(JsonValue::as_bool),
            unique: obj.get("unique").and_then(JsonValue::as_bool),
            default_value: obj.get("defaultValue").cloned(),
            validate: obj.get("validate").filter(|v| v.is_object()).cloned(),
        }
    }
}

/// Ordered field name → spec mapping.
pub type Schema = Vec<(String, FieldSpec)>;
