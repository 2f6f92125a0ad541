//! Abstract field type → storage column kind
//!
//! The table is closed and fixed at compile time; there is no way to
//! register additional types at runtime.

use protean_core::{Action, ColumnKind, Error, Result, ValidationKind};

/// Supported abstract types and the column kind each maps to.
pub const TYPE_TABLE: [(&str, ColumnKind); 9] = [
    ("string", ColumnKind::String),
    ("text", ColumnKind::Text),
    ("integer", ColumnKind::Integer),
    ("float", ColumnKind::Float),
    ("decimal", ColumnKind::Decimal),
    ("boolean", ColumnKind::Boolean),
    ("date", ColumnKind::Date),
    ("uuid", ColumnKind::Uuid),
    ("json", ColumnKind::Json),
];

/// Column kind for an abstract type name, matched case-insensitively.
pub fn lookup(type_name: &str) -> Option<ColumnKind> {
    let lowered = type_name.trim().to_ascii_lowercase();
    TYPE_TABLE
        .iter()
        .find(|(name, _)| *name == lowered)
        .map(|(_, kind)| *kind)
}

/// Map `type_name` declared for `field` of `entity`.
///
/// # Errors
///
/// Returns `UnsupportedType` naming the field, the entity and the type when
/// the name is not in [`TYPE_TABLE`].
pub fn map_type(entity: &str, field: &str, type_name: &str) -> Result<ColumnKind> {
    lookup(type_name).ok_or_else(|| {
        Error::field_validation(
            ValidationKind::UnsupportedType,
            entity,
            Action::DefineEntity.as_str(),
            field,
            format!(
                "unsupported type \"{}\" for field \"{}\" of entity \"{}\"",
                type_name, field, entity
            ),
        )
    })
}
