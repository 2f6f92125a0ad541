//! # Protean Executor
//!
//! Routes agent output through the entity engine.
//!
//! - [`Executor`] - classify, dispatch and execute commands
//! - [`Command`] - the structured instruction an agent emits
//! - [`Output`] / [`Reply`] - results, and the shape relayed back to chat
//! - [`Error`] - structured, serializable execution errors
//!
//! ## Quick Start
//!
//! ```
//! use protean_executor::Executor;
//!
//! let executor = Executor::in_memory();
//! let reply = executor.handle_reply(
//!     r#"{"isCommand": true, "action": "create", "entity": "nota", "data": {"texto": "hola"}}"#,
//! );
//! assert!(reply.is_success());
//!
//! let reply = executor.handle_reply("¡Listo! ¿Algo más?");
//! assert!(!reply.is_command);
//! ```

#![warn(missing_docs)]

mod classifier;
mod command;
mod convert;
mod error;
mod executor;
mod output;
mod reply;

// Handler modules
mod handlers;

// Test modules
#[cfg(test)]
mod tests;

pub use classifier::{classify, infer_action, Classified};
pub use command::Command;
pub use error::Error;
pub use executor::Executor;
pub use output::Output;
pub use reply::Reply;

// Re-export core types so users don't need protean-core directly
pub use protean_core::{Action, Definition, EntityName, Record, Storage, ValidationKind, Value};

// Re-export configuration and the reference backend
pub use protean_engine::{ConfigError, EngineConfig, CONFIG_FILE_NAME};
pub use protean_storage::MemoryStore;

/// Result type for executor operations
pub type Result<T> = std::result::Result<T, Error>;
