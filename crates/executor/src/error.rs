//! Error types for command execution.
//!
//! All errors from command execution are represented by the [`Error`] enum.
//! These errors are:
//! - **Structured**: each variant names the entity and action concerned
//! - **Serializable**: internally tagged JSON (`{"kind": "validation", ...}`)
//!   so the conversational layer can relay them

use protean_core::ValidationKind;
use serde::{Deserialize, Serialize};

/// Command execution errors.
///
/// | Variant | Raised when |
/// |---------|-------------|
/// | `Validation` | malformed command fields, bad field types, missing `data`/`where` |
/// | `UnsupportedAction` | `action` is not one of the five known actions |
/// | `Storage` | the backend failed to provision or execute |
///
/// There is no "entity not found": CRUD on an unseen entity provisions a
/// loose one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Error {
    /// Malformed or incomplete input
    #[error("{action} on '{entity}' rejected: {reason}")]
    Validation {
        /// What was wrong
        cause: ValidationKind,
        /// Entity concerned
        entity: String,
        /// Action concerned
        action: String,
        /// Field concerned, if any
        #[serde(default, skip_serializing_if = "Option::is_none")]
        field: Option<String>,
        /// Human-readable reason
        reason: String,
    },

    /// Unknown action
    #[error("unsupported action '{action}' on '{entity}'")]
    UnsupportedAction {
        /// Entity concerned
        entity: String,
        /// The action as received
        action: String,
    },

    /// Backend failure
    #[error("storage failure during {action} on '{entity}': {reason}")]
    Storage {
        /// Entity concerned
        entity: String,
        /// Action concerned
        action: String,
        /// Backend message
        reason: String,
    },
}

impl Error {
    /// Validation cause, if this is a validation error.
    pub fn validation_kind(&self) -> Option<ValidationKind> {
        match self {
            Error::Validation { cause, .. } => Some(*cause),
            _ => None,
        }
    }

    /// Entity the error concerns.
    pub fn entity(&self) -> &str {
        match self {
            Error::Validation { entity, .. }
            | Error::UnsupportedAction { entity, .. }
            | Error::Storage { entity, .. } => entity,
        }
    }
}
