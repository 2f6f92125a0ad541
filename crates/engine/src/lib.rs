//! Entity engine for Protean
//!
//! This crate turns abstract entity schemas into live storage and runs
//! generic CRUD against them:
//! - Type Mapper: closed abstract type → column kind table
//! - Synthesizer: system columns + declared fields → Definition
//! - EntityRegistry: per-name single-flight provisioning, first definition wins
//! - CrudExecutor: create/read/update/delete with boundary typing
//! - EngineConfig: `protean.toml` settings
//!
//! The engine only talks to storage through [`protean_core::Storage`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod coerce;
pub mod config;
pub mod crud;
pub mod registry;
pub mod synthesizer;
pub mod type_mapper;

use std::sync::Arc;

use protean_core::Storage;

pub use config::{ConfigError, EngineConfig, CONFIG_FILE_NAME};
pub use crud::{check_shape, CrudExecutor};
pub use registry::{EntityRegistry, Resolution};
pub use synthesizer::{schema_from_json, synthesize, synthesize_loose, system_columns};
pub use type_mapper::{map_type, TYPE_TABLE};

/// Registry and CRUD executor over one storage backend.
#[derive(Debug)]
pub struct Engine {
    registry: Arc<EntityRegistry>,
    crud: CrudExecutor,
}

impl Engine {
    /// Engine over `storage` with `config`.
    pub fn new(storage: Arc<dyn Storage>, config: EngineConfig) -> Self {
        let crud = CrudExecutor::new(Arc::clone(&storage), &config);
        Self {
            registry: Arc::new(EntityRegistry::new(storage, config)),
            crud,
        }
    }

    /// The entity registry.
    pub fn registry(&self) -> &Arc<EntityRegistry> {
        &self.registry
    }

    /// The CRUD executor.
    pub fn crud(&self) -> &CrudExecutor {
        &self.crud
    }

    /// Configuration in effect.
    pub fn config(&self) -> &EngineConfig {
        self.registry.config()
    }
}
