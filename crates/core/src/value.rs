//! Value types for Protean
//!
//! This module defines:
//! - Value: Tagged enum for every field of a runtime-defined record
//!
//! ## Value Model
//!
//! The Value enum has exactly 8 variants:
//! - Null, Bool, Int, Float, String, Date, Uuid, Json
//!
//! ### Type Rules
//!
//! - No implicit type coercions between variants; coercion from agent JSON
//!   happens once, at the engine boundary, against a column kind
//! - `Int(1) != Float(1.0)` for equality, but both sort on the numeric line
//! - Float uses IEEE-754 equality: `NaN != NaN`, `-0.0 == 0.0`
//! - `Date` is always UTC; `Json` holds any structured payload verbatim

use std::cmp::Ordering;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Canonical value type for every record field.
///
/// Different variants are NEVER equal, even if they contain the same "value":
/// - `Int(1) != Float(1.0)`
/// - `String("…uuid…") != Uuid(…)`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point (IEEE-754); also carries `decimal` columns
    Float(f64),
    /// UTF-8 string (`string` and `text` columns)
    String(String),
    /// UTC timestamp
    Date(DateTime<Utc>),
    /// UUID
    Uuid(Uuid),
    /// Arbitrary structured payload
    Json(JsonValue),
}

// Custom PartialEq implementation for IEEE-754 float semantics
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Uuid(a), Value::Uuid(b)) => a == b,
            (Value::Json(a), Value::Json(b)) => a == b,
            _ => false,
        }
    }
}

impl Value {
    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::Date(_) => "Date",
            Value::Uuid(_) => "Uuid",
            Value::Json(_) => "Json",
        }
    }

    /// Check if this is a null value
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get as bool if this is a Bool value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as i64 if this is an Int value
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as f64 if this is a Float value
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get as &str if this is a String value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as Uuid if this is a Uuid value
    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Value::Uuid(u) => Some(*u),
            _ => None,
        }
    }

    /// Get as timestamp if this is a Date value
    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Get the JSON payload if this is a Json value
    pub fn as_json(&self) -> Option<&JsonValue> {
        match self {
            Value::Json(j) => Some(j),
            _ => None,
        }
    }

    /// Render the value the way a client sees it.
    ///
    /// Dates become RFC 3339 strings (millisecond precision, `Z` suffix) and
    /// UUIDs their hyphenated form. Non-finite floats become `null`.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Int(i) => JsonValue::Number((*i).into()),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::String(s) => JsonValue::String(s.clone()),
            Value::Date(d) => JsonValue::String(d.to_rfc3339_opts(SecondsFormat::Millis, true)),
            Value::Uuid(u) => JsonValue::String(u.hyphenated().to_string()),
            Value::Json(j) => j.clone(),
        }
    }

    /// Lift a JSON scalar found inside a structured payload.
    ///
    /// Strings, numbers, booleans and null map onto their native variants;
    /// arrays and objects stay wrapped as `Json`.
    pub fn from_json_scalar(json: &JsonValue) -> Value {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(*b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            JsonValue::String(s) => Value::String(s.clone()),
            other => Value::Json(other.clone()),
        }
    }

    /// Textual form used by case-insensitive pattern matching.
    ///
    /// Returns `None` for `Null`, which never matches a pattern.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            Value::Json(JsonValue::String(s)) => Some(s.clone()),
            Value::Json(JsonValue::Null) => None,
            other => match other.to_json() {
                JsonValue::String(s) => Some(s),
                json => Some(json.to_string()),
            },
        }
    }

    /// Total ordering used when sorting query results.
    ///
    /// Nulls sort first. Int and Float compare on the numeric line; other
    /// variants compare within their own kind and by a fixed rank across kinds.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        fn rank(v: &Value) -> u8 {
            match v {
                Value::Null => 0,
                Value::Bool(_) => 1,
                Value::Int(_) | Value::Float(_) => 2,
                Value::String(_) => 3,
                Value::Date(_) => 4,
                Value::Uuid(_) => 5,
                Value::Json(_) => 6,
            }
        }

        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b).unwrap_or(Ordering::Equal),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)).unwrap_or(Ordering::Equal),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            (Value::Uuid(a), Value::Uuid(b)) => a.cmp(b),
            (Value::Json(a), Value::Json(b)) => match (a, b) {
                (JsonValue::String(x), JsonValue::String(y)) => x.cmp(y),
                _ => Value::from_json_scalar(a)
                    .partial_scalar_cmp(&Value::from_json_scalar(b))
                    .unwrap_or_else(|| a.to_string().cmp(&b.to_string())),
            },
            _ => rank(self).cmp(&rank(other)),
        }
    }

    fn partial_scalar_cmp(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Json(_), _) | (_, Value::Json(_)) => None,
            _ => Some(self.sort_cmp(other)),
        }
    }
}

// ============================================================================
// From implementations for ergonomic API usage
// ============================================================================

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<Uuid> for Value {
    fn from(u: Uuid) -> Self {
        Value::Uuid(u)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(d: DateTime<Utc>) -> Self {
        Value::Date(d)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl From<Value> for JsonValue {
    fn from(v: Value) -> Self {
        match v {
            Value::Json(j) => j,
            Value::String(s) => JsonValue::String(s),
            other => other.to_json(),
        }
    }
}
