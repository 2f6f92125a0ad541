//! Generic CRUD against any resolved Definition
//!
//! Each operation validates its inputs against the Definition first, then
//! issues exactly one backend call. Validation failures never reach the
//! backend.

use std::sync::Arc;

use chrono::Utc;
use protean_core::{Action, Definition, Error, Record, Result, Storage, ValidationKind};
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::coerce::{require_object, Boundary};
use crate::config::EngineConfig;

/// Executes create/read/update/delete for runtime-defined entities.
pub struct CrudExecutor {
    storage: Arc<dyn Storage>,
    max_read_limit: u64,
}

impl std::fmt::Debug for CrudExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrudExecutor")
            .field("max_read_limit", &self.max_read_limit)
            .finish()
    }
}

fn backend(definition: &Definition, action: Action) -> impl FnOnce(protean_core::StorageError) -> Error + '_ {
    move |e| {
        warn!(target: "protean::crud", entity = %definition.name(), %action, error = %e, "Backend call failed");
        Error::storage(definition.name().as_str(), action.as_str(), e)
    }
}

/// Check the shape of a CRUD request before any entity is resolved.
///
/// `create` needs a non-empty `data` object, `update` non-empty `data` and
/// `where` objects (in that order), `delete` a non-empty `where`, and `read`
/// an object `where` when one is given. Field-level checks need the
/// Definition and happen in [`CrudExecutor`].
///
/// # Errors
///
/// `MissingPayload`, `MissingFilter` or `InvalidFilter`.
pub fn check_shape(
    entity: &str,
    action: Action,
    data: Option<&JsonValue>,
    conditions: Option<&JsonValue>,
) -> Result<()> {
    let payload = || require_object(entity, action, data, ValidationKind::MissingPayload, "data");
    let filter = || require_object(entity, action, conditions, ValidationKind::MissingFilter, "where");
    match action {
        Action::Create => payload().map(drop),
        Action::Update => payload().and_then(|_| filter()).map(drop),
        Action::Delete => filter().map(drop),
        Action::Read => match conditions {
            None | Some(JsonValue::Null) | Some(JsonValue::Object(_)) => Ok(()),
            Some(_) => Err(Error::validation(
                ValidationKind::InvalidFilter,
                entity,
                action.as_str(),
                "'where' must be an object",
            )),
        },
        Action::DefineEntity => Ok(()),
    }
}

impl CrudExecutor {
    /// Executor over `storage`.
    pub fn new(storage: Arc<dyn Storage>, config: &EngineConfig) -> Self {
        Self {
            storage,
            max_read_limit: config.max_read_limit,
        }
    }

    /// Insert one record built from `data`.
    ///
    /// # Errors
    ///
    /// `MissingPayload` unless `data` is a non-empty object; field errors
    /// from the boundary; storage errors (e.g. unique violations).
    pub fn create(&self, definition: &Definition, data: Option<&JsonValue>) -> Result<Record> {
        let boundary = Boundary::new(definition, Action::Create);
        let data = boundary.non_empty_object(data, ValidationKind::MissingPayload, "data")?;
        let record = boundary.new_record(data, Utc::now())?;
        debug!(target: "protean::crud", entity = %definition.name(), fields = record.len(), "create");
        self.storage
            .insert(definition.name(), record)
            .map_err(backend(definition, Action::Create))
    }

    /// Query records. `where` and `options` are both optional.
    ///
    /// # Errors
    ///
    /// `InvalidFilter` for a non-object `where`, field errors from the
    /// boundary, storage errors.
    pub fn read(
        &self,
        definition: &Definition,
        conditions: Option<&JsonValue>,
        options: Option<&JsonValue>,
    ) -> Result<Vec<Record>> {
        let boundary = Boundary::new(definition, Action::Read);
        let filter = boundary.optional_filter(conditions)?;
        let options = boundary.find_options(options, self.max_read_limit);
        debug!(
            target: "protean::crud",
            entity = %definition.name(),
            conditions = filter.conditions.len(),
            limit = ?options.limit,
            offset = ?options.offset,
            "read"
        );
        self.storage
            .find(definition.name(), &filter, &options)
            .map_err(backend(definition, Action::Read))
    }

    /// Apply `data` to every record matching `where`; returns the count.
    ///
    /// # Errors
    ///
    /// `MissingPayload` / `MissingFilter` unless both are non-empty objects
    /// (checked in that order), field errors, storage errors.
    pub fn update(
        &self,
        definition: &Definition,
        data: Option<&JsonValue>,
        conditions: Option<&JsonValue>,
    ) -> Result<u64> {
        let boundary = Boundary::new(definition, Action::Update);
        let data = boundary.non_empty_object(data, ValidationKind::MissingPayload, "data")?;
        let conditions = boundary.non_empty_object(conditions, ValidationKind::MissingFilter, "where")?;
        let filter = boundary.filter(conditions)?;
        let patch = boundary.patch(data, Utc::now())?;
        let affected = self
            .storage
            .update_where(definition.name(), &patch, &filter)
            .map_err(backend(definition, Action::Update))?;
        debug!(target: "protean::crud", entity = %definition.name(), affected, "update");
        Ok(affected)
    }

    /// Destroy every record matching `where`; returns the count.
    ///
    /// # Errors
    ///
    /// `MissingFilter` unless `where` is a non-empty object, field errors,
    /// storage errors.
    pub fn delete(&self, definition: &Definition, conditions: Option<&JsonValue>) -> Result<u64> {
        let boundary = Boundary::new(definition, Action::Delete);
        let conditions = boundary.non_empty_object(conditions, ValidationKind::MissingFilter, "where")?;
        let filter = boundary.filter(conditions)?;
        let affected = self
            .storage
            .delete_where(definition.name(), &filter)
            .map_err(backend(definition, Action::Delete))?;
        debug!(target: "protean::crud", entity = %definition.name(), affected, "delete");
        Ok(affected)
    }
}
