//! Schema synthesis
//!
//! Turns an abstract field schema into a concrete [`Definition`]: the three
//! system columns first, then every declared field in declaration order.
//! Synthesis is pure; provisioning is the registry's job.

use std::collections::HashSet;

use protean_core::{
    is_reserved, Action, ColumnDescriptor, ColumnKind, Definition, DefinitionKind, EntityName,
    Error, FieldSpec, Result, Schema, ValidationKind, Value, CREATED_AT_COLUMN, ID_COLUMN,
    UPDATED_AT_COLUMN,
};
use serde_json::{Map, Value as JsonValue};

use crate::coerce::to_kind;
use crate::type_mapper::map_type;

/// `id`, `createdAt`, `updatedAt`, in that order.
pub fn system_columns() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor::new(ID_COLUMN, ColumnKind::Uuid).primary_key().system(),
        ColumnDescriptor::new(CREATED_AT_COLUMN, ColumnKind::Date)
            .allow_null(false)
            .system(),
        ColumnDescriptor::new(UPDATED_AT_COLUMN, ColumnKind::Date)
            .allow_null(false)
            .system(),
    ]
}

fn define_error(entity: &EntityName, kind: ValidationKind, field: &str, reason: String) -> Error {
    Error::field_validation(kind, entity.as_str(), Action::DefineEntity.as_str(), field, reason)
}

/// Read a `schema` object into an ordered schema.
///
/// `null` or an absent schema is an empty schema.
///
/// # Errors
///
/// Returns `InvalidSchema` when `schema` is present but not an object.
pub fn schema_from_json(entity: &EntityName, schema: Option<&JsonValue>) -> Result<Schema> {
    match schema {
        None | Some(JsonValue::Null) => Ok(Schema::new()),
        Some(JsonValue::Object(fields)) => Ok(fields
            .iter()
            .map(|(name, spec)| (name.clone(), FieldSpec::from_json(spec)))
            .collect()),
        Some(_) => Err(Error::validation(
            ValidationKind::InvalidSchema,
            entity.as_str(),
            Action::DefineEntity.as_str(),
            "'schema' must be an object of field specs",
        )),
    }
}

/// Synthesize a declared Definition.
///
/// Every field is checked before anything is returned, so a bad field type
/// never reaches storage.
///
/// # Errors
///
/// `ReservedField` for system column names, `InvalidSchema` for empty or
/// repeated field names, `MissingType`/`UnsupportedType` for bad types, and
/// `TypeMismatch`/`NullNotAllowed` for defaults that do not fit the column.
pub fn synthesize(name: EntityName, schema: &Schema) -> Result<Definition> {
    let mut columns = system_columns();
    let mut seen = HashSet::with_capacity(schema.len());

    for (field, spec) in schema {
        if field.trim().is_empty() {
            return Err(define_error(
                &name,
                ValidationKind::InvalidSchema,
                field,
                "field names must not be empty".into(),
            ));
        }
        if is_reserved(field) {
            return Err(define_error(
                &name,
                ValidationKind::ReservedField,
                field,
                format!("field \"{}\" is a system column of entity \"{}\"", field, name),
            ));
        }
        if !seen.insert(field.as_str()) {
            return Err(define_error(
                &name,
                ValidationKind::InvalidSchema,
                field,
                format!("field \"{}\" is declared twice", field),
            ));
        }
        let type_name = spec.type_name.as_deref().ok_or_else(|| {
            define_error(
                &name,
                ValidationKind::MissingType,
                field,
                format!("field \"{}\" of entity \"{}\" has no type", field, name),
            )
        })?;
        let kind = map_type(name.as_str(), field, type_name)?;

        let mut column = ColumnDescriptor::new(field.clone(), kind)
            .allow_null(spec.allow_null.unwrap_or(true))
            .unique(spec.unique.unwrap_or(false));
        if let Some(default) = &spec.default_value {
            let value = coerce_default(&name, &column, default)?;
            column = column.default_value(value);
        }
        if let Some(rules) = &spec.validate {
            column = column.validate(rules.clone());
        }
        columns.push(column);
    }

    Ok(Definition::new(name, DefinitionKind::Declared, columns))
}

fn coerce_default(entity: &EntityName, column: &ColumnDescriptor, default: &JsonValue) -> Result<Value> {
    if default.is_null() && !column.allow_null {
        return Err(define_error(
            entity,
            ValidationKind::NullNotAllowed,
            &column.name,
            format!("default of non-null field \"{}\" cannot be null", column.name),
        ));
    }
    to_kind(column.kind, default).ok_or_else(|| {
        define_error(
            entity,
            ValidationKind::TypeMismatch,
            &column.name,
            format!(
                "default {} of field \"{}\" is not a valid {}",
                default,
                column.name,
                column.kind.as_str()
            ),
        )
    })
}

/// Synthesize the loose fallback: system columns plus one non-null JSON
/// payload column defaulting to `{}`.
pub fn synthesize_loose(name: EntityName, payload_field: &str) -> Definition {
    let mut columns = system_columns();
    columns.push(
        ColumnDescriptor::new(payload_field, ColumnKind::Json)
            .allow_null(false)
            .default_value(Value::Json(JsonValue::Object(Map::new()))),
    );
    Definition::new(name, DefinitionKind::Loose, columns)
}
