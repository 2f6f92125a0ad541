//! Error types for the Protean engine
//!
//! This module defines all error types used by the core and engine crates.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Taxonomy:
//! - `Validation`: malformed command fields, unsupported field types,
//!   missing payload or filter on mutating operations
//! - `UnsupportedAction`: an action string outside the five known actions
//! - `Storage`: backend failure during provisioning or execution
//!
//! Every variant names the entity and the action it concerns, so the
//! conversational layer can relay the message verbatim.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Result type alias for storage backend operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Cause of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationKind {
    /// No action given and none could be inferred
    MissingAction,
    /// No entity name given
    MissingEntity,
    /// `data` absent, not an object, or empty
    MissingPayload,
    /// `where` absent, not an object, or empty on update/delete
    MissingFilter,
    /// `where` present on read but not an object
    InvalidFilter,
    /// Field spec without a `type`
    MissingType,
    /// Field type outside the supported set
    UnsupportedType,
    /// Declared field collides with a system column
    ReservedField,
    /// Field not declared on the entity
    UnknownField,
    /// Value does not fit the column kind
    TypeMismatch,
    /// `null` (or an omitted required field) on a non-null column
    NullNotAllowed,
    /// `schema` present but not an object
    InvalidSchema,
}

impl ValidationKind {
    /// Stable snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationKind::MissingAction => "missing_action",
            ValidationKind::MissingEntity => "missing_entity",
            ValidationKind::MissingPayload => "missing_payload",
            ValidationKind::MissingFilter => "missing_filter",
            ValidationKind::InvalidFilter => "invalid_filter",
            ValidationKind::MissingType => "missing_type",
            ValidationKind::UnsupportedType => "unsupported_type",
            ValidationKind::ReservedField => "reserved_field",
            ValidationKind::UnknownField => "unknown_field",
            ValidationKind::TypeMismatch => "type_mismatch",
            ValidationKind::NullNotAllowed => "null_not_allowed",
            ValidationKind::InvalidSchema => "invalid_schema",
        }
    }
}

impl fmt::Display for ValidationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engine errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Malformed or incomplete input
    #[error("{action} on '{entity}' rejected: {reason}")]
    Validation {
        /// Cause
        kind: ValidationKind,
        /// Entity concerned (normalized when known)
        entity: String,
        /// Action concerned
        action: String,
        /// Field concerned, if any
        field: Option<String>,
        /// Human-readable reason
        reason: String,
    },

    /// Action string outside the known set
    #[error("unsupported action '{action}' on '{entity}'")]
    UnsupportedAction {
        /// Entity concerned
        entity: String,
        /// The unrecognized action
        action: String,
    },

    /// Backend failure
    #[error("storage failure during {action} on '{entity}': {message}")]
    Storage {
        /// Entity concerned
        entity: String,
        /// Action concerned
        action: String,
        /// Backend message
        message: String,
    },
}

impl Error {
    /// Validation error without a field.
    pub fn validation(
        kind: ValidationKind,
        entity: impl Into<String>,
        action: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Error::Validation {
            kind,
            entity: entity.into(),
            action: action.into(),
            field: None,
            reason: reason.into(),
        }
    }

    /// Validation error concerning one field.
    pub fn field_validation(
        kind: ValidationKind,
        entity: impl Into<String>,
        action: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Error::Validation {
            kind,
            entity: entity.into(),
            action: action.into(),
            field: Some(field.into()),
            reason: reason.into(),
        }
    }

    /// Wrap a backend failure.
    pub fn storage(entity: impl Into<String>, action: impl Into<String>, err: StorageError) -> Self {
        Error::Storage {
            entity: entity.into(),
            action: action.into(),
            message: err.to_string(),
        }
    }

    /// Validation cause, if this is a validation error.
    pub fn validation_kind(&self) -> Option<ValidationKind> {
        match self {
            Error::Validation { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// True for validation errors.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }

    /// Entity the error concerns.
    pub fn entity(&self) -> &str {
        match self {
            Error::Validation { entity, .. }
            | Error::UnsupportedAction { entity, .. }
            | Error::Storage { entity, .. } => entity,
        }
    }

    /// Action the error concerns.
    pub fn action(&self) -> &str {
        match self {
            Error::Validation { action, .. }
            | Error::UnsupportedAction { action, .. }
            | Error::Storage { action, .. } => action,
        }
    }
}

/// Failures reported by a storage backend.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StorageError {
    /// Table was never provisioned
    #[error("table {0} is not provisioned")]
    TableNotProvisioned(String),

    /// Unique constraint violated
    #[error("unique constraint violated on {table}.{column}")]
    UniqueViolation {
        /// Table name
        table: String,
        /// Column name
        column: String,
    },

    /// Any other backend failure
    #[error("{0}")]
    Backend(String),
}
