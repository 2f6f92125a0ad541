//! Protean - runtime-defined entities and generic CRUD for chat agents
//!
//! An agent describes entities in plain JSON ("a cliente has a nombre and
//! an email"); Protean synthesizes a storage definition, provisions it
//! exactly once, and runs create/read/update/delete against it. Anything
//! the agent says that is not a command passes through as text.
//!
//! # Quick Start
//!
//! ```
//! use protean::Executor;
//!
//! let executor = Executor::in_memory();
//! executor.handle_reply(
//!     r#"{"isCommand": true, "action": "define", "entity": "cliente",
//!         "schema": {"nombre": {"type": "string", "allowNull": false}}}"#,
//! );
//! let reply = executor.handle_reply(
//!     r#"{"action": "create", "entity": "cliente", "data": {"nombre": "Ana"}}"#,
//! );
//! assert!(reply.is_success());
//! ```
//!
//! # Architecture
//!
//! All operations go through the [`Executor`]. The [`Engine`] underneath it
//! owns the entity registry and the CRUD executor; storage is reached only
//! through the [`Storage`] trait, with [`MemoryStore`] as the in-process
//! backend.

// Re-export the public API from protean-executor
pub use protean_executor::*;

pub use protean_engine::{Engine, EntityRegistry, Resolution};
