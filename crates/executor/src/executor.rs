//! The Executor - single entry point for agent commands.
//!
//! The Executor routes each [`Command`] to its handler: `define_entity` to
//! the registry, CRUD actions to the generic CRUD executor after resolving
//! (or lazily provisioning) the target entity.

use std::sync::Arc;

use protean_core::{Action, Definition, Error as CoreError, Storage, ValidationKind};
use protean_engine::{Engine, EngineConfig};
use protean_storage::MemoryStore;
use tracing::{debug, warn};

use crate::classifier::{classify, Classified};
use crate::handlers;
use crate::{Command, Error, Output, Reply, Result};

/// The command executor.
///
/// Owns one [`Engine`]; all shared state lives in its entity registry.
///
/// # Thread Safety
///
/// Executor is `Send + Sync` and can be shared across threads behind `Arc`.
///
/// # Example
///
/// ```
/// use protean_executor::{Command, Executor, Output};
/// use serde_json::json;
///
/// let executor = Executor::in_memory();
/// executor
///     .execute(Command::define("cliente", json!({"nombre": {"type": "string"}})))
///     .unwrap();
/// let out = executor
///     .execute(Command::create("Cliente", json!({"nombre": "Ana"})))
///     .unwrap();
/// assert!(matches!(out, Output::Record(_)));
/// ```
#[derive(Debug)]
pub struct Executor {
    engine: Engine,
}

impl Executor {
    /// Executor over `storage`.
    pub fn new(storage: Arc<dyn Storage>, config: EngineConfig) -> Self {
        Self {
            engine: Engine::new(storage, config),
        }
    }

    /// Executor over a fresh in-process store with default configuration.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), EngineConfig::default())
    }

    /// Execute a single command.
    ///
    /// `action` must be present (`MissingAction`) and name one of the five
    /// actions (`UnsupportedAction`); `entity` must be a non-blank string
    /// (`MissingEntity`).
    #[doc(alias = "dispatch")]
    pub fn execute(&self, cmd: Command) -> Result<Output> {
        let raw_entity = cmd.entity.as_deref().map(str::trim).unwrap_or_default();

        let Some(raw_action) = cmd.action.as_deref().map(str::trim).filter(|a| !a.is_empty()) else {
            return Err(CoreError::validation(
                ValidationKind::MissingAction,
                raw_entity,
                "",
                "command has no action",
            )
            .into());
        };
        if raw_entity.is_empty() {
            return Err(CoreError::validation(
                ValidationKind::MissingEntity,
                "",
                raw_action,
                "command has no entity",
            )
            .into());
        }
        let action: Action = raw_action.parse().map_err(|_| Error::UnsupportedAction {
            entity: self.engine.registry().normalize(raw_entity).to_string(),
            action: raw_action.to_string(),
        })?;

        debug!(target: "protean::router", %action, entity = raw_entity, "Dispatching command");
        let result = match action {
            Action::DefineEntity => {
                handlers::define::define_entity(&self.engine, raw_entity, cmd.schema.as_ref())
            }
            Action::Create => handlers::crud::create(&self.engine, raw_entity, &cmd),
            Action::Read => handlers::crud::read(&self.engine, raw_entity, &cmd),
            Action::Update => handlers::crud::update(&self.engine, raw_entity, &cmd),
            Action::Delete => handlers::crud::delete(&self.engine, raw_entity, &cmd),
        };
        if let Err(e) = &result {
            warn!(target: "protean::router", %action, entity = raw_entity, error = %e, "Command failed");
        }
        result
    }

    /// Execute multiple commands sequentially.
    ///
    /// Returns one result per command, in order. Execution continues after
    /// a failing command.
    pub fn execute_many(&self, cmds: Vec<Command>) -> Vec<Result<Output>> {
        cmds.into_iter().map(|cmd| self.execute(cmd)).collect()
    }

    /// Classify agent output with the configured inference setting.
    pub fn classify(&self, text: &str) -> Classified {
        classify(text, self.engine.config().infer_actions)
    }

    /// Classify agent output and execute it if it is a command.
    pub fn handle_reply(&self, text: &str) -> Reply {
        match self.classify(text) {
            Classified::Command(cmd) => Reply::from(self.execute(cmd)),
            Classified::PlainText(text) => Reply::text(text),
        }
    }

    /// Every resolved entity definition, sorted by name.
    pub fn definitions(&self) -> Vec<Arc<Definition>> {
        self.engine.registry().definitions()
    }

    /// The underlying engine.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }
}
