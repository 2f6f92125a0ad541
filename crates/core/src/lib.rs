//! Core types and traits for Protean
//!
//! This crate defines the foundational types used throughout the system:
//! - Value: tagged value enum stored in every record field
//! - EntityName: normalized entity names and the normalization function
//! - Action: the five command actions
//! - Definition / ColumnDescriptor / FieldSpec: runtime entity schemas
//! - Record: ordered field → value mapping conforming to one Definition
//! - Filter / FindOptions / Patch: backend-neutral query descriptions
//! - Error: engine error taxonomy (validation, unsupported action, storage)
//! - Storage: the trait every storage backend implements

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod filter;
pub mod record;
pub mod schema;
pub mod traits;
pub mod types;
pub mod value;

pub use error::{Error, Result, StorageError, StorageResult, ValidationKind};
pub use filter::{Condition, Direction, FieldRef, Filter, FindOptions, OrderBy, Patch, PatchOp, Predicate};
pub use record::Record;
pub use schema::{
    is_reserved, ColumnDescriptor, ColumnKind, Definition, DefinitionKind, FieldSpec, Schema,
    CREATED_AT_COLUMN, ID_COLUMN, SYSTEM_COLUMNS, UPDATED_AT_COLUMN,
};
pub use traits::Storage;
pub use types::{normalize_name, normalize_name_or, Action, EntityName, PLACEHOLDER_ENTITY_NAME};
pub use value::Value;
