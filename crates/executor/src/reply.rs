//! Reply relayed to the conversational layer.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::{Error, Output, Result};

/// Outcome of handling one agent reply.
///
/// Serializes as one of:
/// - `{"isCommand": true, "success": true, "result": ...}`
/// - `{"isCommand": true, "success": false, "error": "...", "detail": {...}}`
/// - `{"isCommand": false, "text": "..."}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    /// Whether the reply was a command
    pub is_command: bool,
    /// Whether the command succeeded (commands only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    /// Command result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<JsonValue>,
    /// Error message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Structured error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Error>,
    /// Conversational text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Reply {
    /// Successful command.
    pub fn success(output: &Output) -> Self {
        Self {
            is_command: true,
            success: Some(true),
            result: Some(output.to_json()),
            error: None,
            detail: None,
            text: None,
        }
    }

    /// Failed command.
    pub fn failure(err: Error) -> Self {
        Self {
            is_command: true,
            success: Some(false),
            result: None,
            error: Some(err.to_string()),
            detail: Some(err),
            text: None,
        }
    }

    /// Plain conversational text.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            is_command: false,
            success: None,
            result: None,
            error: None,
            detail: None,
            text: Some(text.into()),
        }
    }

    /// True for commands that succeeded.
    pub fn is_success(&self) -> bool {
        self.success == Some(true)
    }
}

impl From<Result<Output>> for Reply {
    fn from(result: Result<Output>) -> Self {
        match result {
            Ok(output) => Reply::success(&output),
            Err(err) => Reply::failure(err),
        }
    }
}
