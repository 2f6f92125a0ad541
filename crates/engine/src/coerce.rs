//! Agent JSON → typed values, filters, records and patches
//!
//! This is the boundary where loosely-typed agent output meets a
//! Definition. Declared entities get strict checking: unknown keys, system
//! columns in payloads, type mismatches and forbidden nulls are all
//! validation errors. Loose entities accept any payload object and address
//! its top-level keys from `where` and `order`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use protean_core::{
    is_reserved, Action, ColumnDescriptor, ColumnKind, Definition, Direction, Error, FieldRef,
    Filter, FindOptions, OrderBy, Patch, Record, Result, ValidationKind, Value, CREATED_AT_COLUMN,
    ID_COLUMN, UPDATED_AT_COLUMN,
};
use serde_json::{Map, Value as JsonValue};
use tracing::debug;
use uuid::Uuid;

/// Parse a date column value: RFC 3339, `YYYY-MM-DDTHH:MM:SS[.f]` (UTC) or
/// `YYYY-MM-DD` (midnight UTC).
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn json_kind(json: &JsonValue) -> &'static str {
    match json {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

/// Convert `json` to the native value for `kind`, ignoring nullability.
///
/// Returns `None` when the JSON value cannot represent that kind.
pub fn to_kind(kind: ColumnKind, json: &JsonValue) -> Option<Value> {
    if json.is_null() {
        return Some(Value::Null);
    }
    match kind {
        ColumnKind::String | ColumnKind::Text => json.as_str().map(Value::from),
        ColumnKind::Integer => match json.as_i64() {
            Some(i) => Some(Value::Int(i)),
            None => json
                .as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                .map(|f| Value::Int(f as i64)),
        },
        ColumnKind::Float | ColumnKind::Decimal => json.as_f64().map(Value::Float),
        ColumnKind::Boolean => json.as_bool().map(Value::Bool),
        ColumnKind::Date => json.as_str().and_then(parse_date).map(Value::Date),
        ColumnKind::Uuid => json
            .as_str()
            .and_then(|s| Uuid::parse_str(s.trim()).ok())
            .map(Value::Uuid),
        ColumnKind::Json => Some(Value::Json(json.clone())),
    }
}

/// True for a string value that should match as a pattern.
fn as_pattern(json: &JsonValue) -> Option<&str> {
    json.as_str().filter(|s| s.contains('%'))
}

/// Translates agent JSON against one Definition for one action.
#[derive(Debug, Clone, Copy)]
pub struct Boundary<'a> {
    definition: &'a Definition,
    action: Action,
}

impl<'a> Boundary<'a> {
    /// Boundary for `action` on `definition`.
    pub fn new(definition: &'a Definition, action: Action) -> Self {
        Self { definition, action }
    }

    fn entity(&self) -> &str {
        self.definition.name().as_str()
    }

    fn invalid(&self, kind: ValidationKind, reason: impl Into<String>) -> Error {
        Error::validation(kind, self.entity(), self.action.as_str(), reason)
    }

    fn invalid_field(&self, kind: ValidationKind, field: &str, reason: impl Into<String>) -> Error {
        Error::field_validation(kind, self.entity(), self.action.as_str(), field, reason)
    }

    /// Coerce a value written to `column`, honoring nullability.
    ///
    /// # Errors
    ///
    /// `NullNotAllowed` for `null` on a non-null column, `TypeMismatch` when
    /// the value does not fit the column kind.
    pub fn coerce(&self, column: &ColumnDescriptor, json: &JsonValue) -> Result<Value> {
        if json.is_null() && !column.allow_null {
            return Err(self.invalid_field(
                ValidationKind::NullNotAllowed,
                &column.name,
                format!("field '{}' does not allow null", column.name),
            ));
        }
        to_kind(column.kind, json).ok_or_else(|| {
            self.invalid_field(
                ValidationKind::TypeMismatch,
                &column.name,
                format!(
                    "field '{}' expects {}, got {}",
                    column.name,
                    column.kind.as_str(),
                    json_kind(json)
                ),
            )
        })
    }

    /// Resolve a `where`/`order` key to the field it addresses.
    ///
    /// On loose entities every non-system key addresses a key inside the
    /// payload column.
    fn target(&self, key: &str) -> Option<(FieldRef, Option<&'a ColumnDescriptor>)> {
        let definition = self.definition;
        match definition.payload_column() {
            Some(payload) if !is_reserved(key) => {
                Some((FieldRef::json_key(payload.name.clone(), key), None))
            }
            _ => definition
                .column(key)
                .map(|column| (FieldRef::column(key), Some(column))),
        }
    }

    /// Translate a `where` object into a filter.
    ///
    /// String values containing `%` become case-insensitive pattern
    /// conditions; everything else an equality on the coerced value.
    ///
    /// # Errors
    ///
    /// `UnknownField` for keys that are not columns of a declared entity,
    /// `TypeMismatch` for values that do not fit their column.
    pub fn filter(&self, conditions: &Map<String, JsonValue>) -> Result<Filter> {
        let mut filter = Filter::all();
        for (key, json) in conditions {
            let Some((target, column)) = self.target(key) else {
                return Err(self.invalid_field(
                    ValidationKind::UnknownField,
                    key,
                    format!("'{}' is not a field of {}", key, self.entity()),
                ));
            };
            if let Some(pattern) = as_pattern(json) {
                filter = filter.ilike(target, pattern);
                continue;
            }
            let value = match column {
                Some(column) => to_kind(column.kind, json).ok_or_else(|| {
                    self.invalid_field(
                        ValidationKind::TypeMismatch,
                        key,
                        format!(
                            "filter on '{}' expects {}, got {}",
                            key,
                            column.kind.as_str(),
                            json_kind(json)
                        ),
                    )
                })?,
                None => Value::from_json_scalar(json),
            };
            filter = filter.eq(target, value);
        }
        Ok(filter)
    }

    /// Translate an `options` object into find options.
    ///
    /// Malformed entries are dropped one by one; this never fails.
    /// `limit` is capped at `max_limit`.
    pub fn find_options(&self, options: Option<&JsonValue>, max_limit: u64) -> FindOptions {
        let mut out = FindOptions {
            limit: Some(max_limit),
            ..FindOptions::default()
        };
        let Some(options) = options.and_then(JsonValue::as_object) else {
            if options.is_some_and(|o| !o.is_null()) {
                debug!(target: "protean::crud", entity = %self.entity(), "Ignoring non-object options");
            }
            return out;
        };

        match options.get("limit").map(|v| (v, non_negative(v))) {
            Some((_, Some(limit))) => out.limit = Some(limit.min(max_limit)),
            Some((raw, None)) => {
                debug!(target: "protean::crud", entity = %self.entity(), limit = %raw, "Ignoring malformed limit")
            }
            None => {}
        }
        match options.get("offset").map(|v| (v, non_negative(v))) {
            Some((_, Some(offset))) => out.offset = Some(offset),
            Some((raw, None)) => {
                debug!(target: "protean::crud", entity = %self.entity(), offset = %raw, "Ignoring malformed offset")
            }
            None => {}
        }
        if let Some(order) = options.get("order") {
            match order.as_array() {
                Some(entries) => {
                    out.order = entries.iter().filter_map(|e| self.order_entry(e)).collect();
                }
                None => {
                    debug!(target: "protean::crud", entity = %self.entity(), "Ignoring non-array order")
                }
            }
        }
        out
    }

    fn order_entry(&self, entry: &JsonValue) -> Option<OrderBy> {
        let (field, direction) = match entry {
            JsonValue::String(field) => (field.as_str(), Some(Direction::Asc)),
            JsonValue::Array(pair) => match pair.as_slice() {
                [JsonValue::String(field)] => (field.as_str(), Some(Direction::Asc)),
                [JsonValue::String(field), JsonValue::String(dir)] => {
                    (field.as_str(), parse_direction(dir))
                }
                _ => ("", None),
            },
            _ => ("", None),
        };
        let resolved = direction.and_then(|direction| {
            self.target(field)
                .map(|(target, _)| OrderBy { target, direction })
        });
        if resolved.is_none() {
            debug!(target: "protean::crud", entity = %self.entity(), entry = %entry, "Ignoring malformed order entry");
        }
        resolved
    }

    fn check_payload_key(&self, key: &str) -> Result<()> {
        if is_reserved(key) {
            return Err(self.invalid_field(
                ValidationKind::ReservedField,
                key,
                format!("'{}' is managed by the engine and cannot be written", key),
            ));
        }
        Ok(())
    }

    /// Open payload for a loose entity.
    ///
    /// The whole `data` object is the payload, unless its only key is the
    /// payload column itself holding an object, which is then used directly.
    fn loose_payload(&self, payload_field: &str, data: &Map<String, JsonValue>) -> Result<Map<String, JsonValue>> {
        let payload = match data.get(payload_field) {
            Some(JsonValue::Object(inner)) if data.len() == 1 => inner.clone(),
            _ => data.clone(),
        };
        for key in payload.keys() {
            self.check_payload_key(key)?;
        }
        Ok(payload)
    }

    /// Build a complete record for insertion.
    ///
    /// System columns are generated; omitted declared fields take their
    /// default, or `null` when allowed.
    ///
    /// # Errors
    ///
    /// `ReservedField`, `UnknownField`, `TypeMismatch` or `NullNotAllowed`.
    pub fn new_record(&self, data: &Map<String, JsonValue>, now: DateTime<Utc>) -> Result<Record> {
        let definition = self.definition;
        let mut record = Record::with_capacity(definition.columns().len());
        record.set(ID_COLUMN, Value::Uuid(Uuid::new_v4()));
        record.set(CREATED_AT_COLUMN, Value::Date(now));
        record.set(UPDATED_AT_COLUMN, Value::Date(now));

        if let Some(payload) = definition.payload_column() {
            let object = self.loose_payload(&payload.name, data)?;
            record.set(payload.name.clone(), Value::Json(JsonValue::Object(object)));
            return Ok(record);
        }

        for key in data.keys() {
            self.check_payload_key(key)?;
            if definition.column(key).is_none() {
                return Err(self.invalid_field(
                    ValidationKind::UnknownField,
                    key,
                    format!("'{}' is not a field of {}", key, self.entity()),
                ));
            }
        }
        for column in definition.declared_columns() {
            let value = match data.get(&column.name) {
                Some(json) => self.coerce(column, json)?,
                None => match &column.default_value {
                    Some(default) => default.clone(),
                    None if column.allow_null => Value::Null,
                    None => {
                        return Err(self.invalid_field(
                            ValidationKind::NullNotAllowed,
                            &column.name,
                            format!("field '{}' is required", column.name),
                        ))
                    }
                },
            };
            record.set(column.name.clone(), value);
        }
        Ok(record)
    }

    /// Build the patch applied by an update; always refreshes `updatedAt`.
    ///
    /// # Errors
    ///
    /// `ReservedField`, `UnknownField`, `TypeMismatch` or `NullNotAllowed`.
    pub fn patch(&self, data: &Map<String, JsonValue>, now: DateTime<Utc>) -> Result<Patch> {
        let definition = self.definition;
        let mut patch = Patch::new();
        if let Some(payload) = definition.payload_column() {
            let entries = self.loose_payload(&payload.name, data)?;
            patch = patch.merge_json(payload.name.clone(), entries);
        } else {
            for (key, json) in data {
                self.check_payload_key(key)?;
                let column = definition.column(key).ok_or_else(|| {
                    self.invalid_field(
                        ValidationKind::UnknownField,
                        key,
                        format!("'{}' is not a field of {}", key, self.entity()),
                    )
                })?;
                patch = patch.set(key.clone(), self.coerce(column, json)?);
            }
        }
        Ok(patch.set(UPDATED_AT_COLUMN, Value::Date(now)))
    }

    /// Require `value` to be a non-empty object.
    pub(crate) fn non_empty_object<'j>(
        &self,
        value: Option<&'j JsonValue>,
        kind: ValidationKind,
        what: &str,
    ) -> Result<&'j Map<String, JsonValue>> {
        require_object(self.entity(), self.action, value, kind, what)
    }

    /// Optional `where` for reads: absent, `null` or `{}` match everything.
    pub(crate) fn optional_filter(&self, value: Option<&JsonValue>) -> Result<Filter> {
        match value {
            None | Some(JsonValue::Null) => Ok(Filter::all()),
            Some(JsonValue::Object(obj)) => self.filter(obj),
            Some(other) => Err(self.invalid(
                ValidationKind::InvalidFilter,
                format!("'where' must be an object, got {}", json_kind(other)),
            )),
        }
    }
}

/// Require `value` to be a non-empty object, failing with `kind`.
///
/// # Errors
///
/// Returns a `kind` validation error naming `what` when `value` is absent,
/// not an object, or empty.
pub fn require_object<'j>(
    entity: &str,
    action: Action,
    value: Option<&'j JsonValue>,
    kind: ValidationKind,
    what: &str,
) -> Result<&'j Map<String, JsonValue>> {
    value
        .and_then(JsonValue::as_object)
        .filter(|obj| !obj.is_empty())
        .ok_or_else(|| {
            Error::validation(
                kind,
                entity,
                action.as_str(),
                format!("'{}' must be a non-empty object", what),
            )
        })
}

fn non_negative(json: &JsonValue) -> Option<u64> {
    json.as_u64().or_else(|| {
        json.as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f < u64::MAX as f64)
            .map(|f| f as u64)
    })
}

fn parse_direction(raw: &str) -> Option<Direction> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "ASC" => Some(Direction::Asc),
        "DESC" => Some(Direction::Desc),
        _ => None,
    }
}
