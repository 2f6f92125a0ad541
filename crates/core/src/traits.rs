//! Core trait for the storage backend
//!
//! This module defines the Storage trait that lets the engine run against
//! any backend (the in-process `MemoryStore`, a SQL database, …) without
//! changes to the registry or the CRUD executor.

use crate::error::StorageResult;
use crate::filter::{Filter, FindOptions, Patch};
use crate::record::Record;
use crate::schema::Definition;
use crate::types::EntityName;

/// Storage abstraction used by the engine.
///
/// Thread safety: All methods must be safe to call concurrently from
/// multiple threads (requires Send + Sync). Row-level consistency for
/// concurrent writes to the same table is the backend's responsibility.
pub trait Storage: Send + Sync {
    /// Create the table for `definition` if it does not exist yet.
    ///
    /// Must be idempotent: provisioning an existing table keeps its rows and
    /// its original columns. Returns true when the table was created.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot create the table.
    fn provision_table(&self, definition: &Definition) -> StorageResult<bool>;

    /// Insert one fully-formed record and return it as stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the table is missing or a constraint is violated.
    fn insert(&self, table: &EntityName, record: Record) -> StorageResult<Record>;

    /// Return records matching `filter`, ordered and paginated per `options`.
    ///
    /// # Errors
    ///
    /// Returns an error if the table is missing.
    fn find(&self, table: &EntityName, filter: &Filter, options: &FindOptions) -> StorageResult<Vec<Record>>;

    /// Apply `patch` to every record matching `filter`; returns the count.
    ///
    /// # Errors
    ///
    /// Returns an error if the table is missing or a constraint is violated,
    /// in which case no record is changed.
    fn update_where(&self, table: &EntityName, patch: &Patch, filter: &Filter) -> StorageResult<u64>;

    /// Destroy every record matching `filter`; returns the count.
    ///
    /// # Errors
    ///
    /// Returns an error if the table is missing.
    fn delete_where(&self, table: &EntityName, filter: &Filter) -> StorageResult<u64>;
}
