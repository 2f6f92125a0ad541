//! Reply → human/json string formatting.
//!
//! Two modes:
//! - **JSON** (default): the `Reply` as one compact JSON line
//! - **Human** (`--human`): short summaries, e.g. `(ok) 2 records`, `(error) ...`

use std::sync::Arc;

use protean_executor::{Definition, Reply};
use serde_json::Value as JsonValue;

/// Output formatting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

/// Format one reply.
pub fn format_reply(reply: &Reply, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => serde_json::to_string(reply)
            .unwrap_or_else(|e| format!("{{\"isCommand\":true,\"success\":false,\"error\":\"{}\"}}", e)),
        OutputMode::Human => format_reply_human(reply),
    }
}

fn format_reply_human(reply: &Reply) -> String {
    if !reply.is_command {
        return reply.text.clone().unwrap_or_default();
    }
    if !reply.is_success() {
        return format!("(error) {}", reply.error.as_deref().unwrap_or("unknown error"));
    }
    match &reply.result {
        Some(JsonValue::Array(rows)) => {
            let mut out = format!("(ok) {} record{}", rows.len(), if rows.len() == 1 { "" } else { "s" });
            for (i, row) in rows.iter().enumerate() {
                out.push_str(&format!("\n{}) {}", i + 1, row));
            }
            out
        }
        Some(JsonValue::Object(obj)) => {
            if let Some(message) = obj.get("message").and_then(JsonValue::as_str) {
                format!("(ok) {}", message)
            } else if let Some(n) = obj.get("updated") {
                format!("(ok) updated {}", n)
            } else if let Some(n) = obj.get("deleted") {
                format!("(ok) deleted {}", n)
            } else {
                format!("(ok) {}", JsonValue::Object(obj.clone()))
            }
        }
        Some(other) => format!("(ok) {}", other),
        None => "(ok)".to_string(),
    }
}

/// Format the registered definitions.
pub fn format_definitions(definitions: &[Arc<Definition>], mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => {
            let defs: Vec<&Definition> = definitions.iter().map(Arc::as_ref).collect();
            serde_json::to_string_pretty(&defs).unwrap_or_else(|e| format!("(error) {}", e))
        }
        OutputMode::Human => {
            if definitions.is_empty() {
                return "(empty)".to_string();
            }
            definitions
                .iter()
                .map(|def| {
                    let columns: Vec<String> = def
                        .columns()
                        .iter()
                        .map(|c| format!("{}:{}", c.name, c.kind.as_str()))
                        .collect();
                    format!("{} [{}] {}", def.name(), def.kind().as_str(), columns.join(", "))
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
    }
}
