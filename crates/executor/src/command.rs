//! Command wire model.
//!
//! A [`Command`] is the structured instruction an agent embeds in its reply:
//!
//! ```json
//! {"isCommand": true, "action": "create", "entity": "cliente",
//!  "data": {"nombre": "Ana"}}
//! ```
//!
//! Every field is optional on the wire. `action` stays a raw string until
//! dispatch so that an unknown action can be reported as such rather than
//! failing to parse; `data`, `where`, `schema` and `options` stay raw JSON
//! until they are checked against the target entity's Definition.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use protean_core::Action;

/// A structured instruction extracted from agent output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    /// Explicit command marker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_command: Option<bool>,
    /// Raw action name (`create`, `read`, `update`, `delete`, `define_entity`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Human-supplied entity name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    /// Field values for create/update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
    /// Field conditions for read/update/delete
    #[serde(rename = "where", default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<JsonValue>,
    /// Field specs for define_entity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<JsonValue>,
    /// `limit`, `offset`, `order` for read
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<JsonValue>,
}

impl Command {
    /// Command with an action and an entity.
    pub fn new(action: Action, entity: impl Into<String>) -> Self {
        Self {
            is_command: Some(true),
            action: Some(action.as_str().to_string()),
            entity: Some(entity.into()),
            ..Self::default()
        }
    }

    /// `define_entity` with a schema object.
    pub fn define(entity: impl Into<String>, schema: JsonValue) -> Self {
        Self::new(Action::DefineEntity, entity).with_schema(schema)
    }

    /// `create` with a payload.
    pub fn create(entity: impl Into<String>, data: JsonValue) -> Self {
        Self::new(Action::Create, entity).with_data(data)
    }

    /// Unfiltered `read`.
    pub fn read(entity: impl Into<String>) -> Self {
        Self::new(Action::Read, entity)
    }

    /// `update` of records matching `conditions`.
    pub fn update(entity: impl Into<String>, data: JsonValue, conditions: JsonValue) -> Self {
        Self::new(Action::Update, entity)
            .with_data(data)
            .with_where(conditions)
    }

    /// `delete` of records matching `conditions`.
    pub fn delete(entity: impl Into<String>, conditions: JsonValue) -> Self {
        Self::new(Action::Delete, entity).with_where(conditions)
    }

    /// Set `data`.
    pub fn with_data(mut self, data: JsonValue) -> Self {
        self.data = Some(data);
        self
    }

    /// Set `where`.
    pub fn with_where(mut self, conditions: JsonValue) -> Self {
        self.conditions = Some(conditions);
        self
    }

    /// Set `schema`.
    pub fn with_schema(mut self, schema: JsonValue) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Set `options`.
    pub fn with_options(mut self, options: JsonValue) -> Self {
        self.options = Some(options);
        self
    }

    /// Read a command out of a JSON object, keeping only well-typed fields.
    ///
    /// `isCommand` is kept when boolean, `action`/`entity` when strings;
    /// the JSON-valued fields are kept whenever present and not `null`.
    pub fn from_object(obj: &Map<String, JsonValue>) -> Self {
        let raw = |key: &str| obj.get(key).filter(|v| !v.is_null()).cloned();
        let text = |key: &str| obj.get(key).and_then(JsonValue::as_str).map(str::to_string);
        Self {
            is_command: obj.get("isCommand").and_then(JsonValue::as_bool),
            action: text("action"),
            entity: text("entity"),
            data: raw("data"),
            conditions: raw("where"),
            schema: raw("schema"),
            options: raw("options"),
        }
    }
}
