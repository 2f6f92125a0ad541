//! Command classification.
//!
//! Decides whether a piece of agent output is a structured [`Command`] or
//! plain conversational text. Classification never fails: anything that is
//! not a well-formed command candidate is plain text, returned verbatim.

use protean_core::Action;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::Command;

/// Result of classifying agent output.
#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
    /// A command candidate; `action` may still be unresolved
    Command(Command),
    /// Conversational text, unmodified
    PlainText(String),
}

impl Classified {
    /// True for command candidates.
    pub fn is_command(&self) -> bool {
        matches!(self, Classified::Command(_))
    }
}

/// Keyword families, in inference priority order.
///
/// Keywords match whole words of the text. A trailing `*` makes the last
/// word a stem (`agrega*` matches `agregar`); a space separates words that
/// must appear consecutively.
const KEYWORDS: [(Action, &[&str]); 5] = [
    (
        Action::Create,
        &["crear", "crea", "agrega*", "nuevo", "nueva", "añadi*", "añade", "inserta*", "create", "add", "insert"],
    ),
    (
        Action::Read,
        &["mostra*", "muestra", "ver", "lista*", "busca*", "consulta*", "show", "list", "find", "search"],
    ),
    (
        Action::Update,
        &["modifica*", "actualiza*", "cambia*", "edita*", "update", "modify", "change", "edit"],
    ),
    (
        Action::Delete,
        &["elimina*", "borra*", "suprimi*", "delete", "remove"],
    ),
    (
        Action::DefineEntity,
        &["definir entidad", "crear entidad", "generar tabla", "crear tabla", "define entity", "create table"],
    ),
];

fn word_matches(pattern: &str, word: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(stem) => word.starts_with(stem),
        None => word == pattern,
    }
}

fn keyword_matches(keyword: &str, words: &[&str]) -> bool {
    let parts: Vec<&str> = keyword.split(' ').collect();
    words
        .windows(parts.len())
        .any(|window| parts.iter().zip(window).all(|(p, w)| word_matches(p, w)))
}

/// Best-effort action from keywords in `text`; the first matching family
/// wins.
pub fn infer_action(text: &str) -> Option<Action> {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| keyword_matches(k, &words)))
        .map(|(action, _)| *action)
}

/// Strip one surrounding Markdown code fence, with or without a language tag.
fn strip_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string on the opening line
    match body.find('\n') {
        Some(newline) => body[newline + 1..].trim(),
        None => body.trim(),
    }
}

/// Classify agent output.
///
/// A command candidate is a JSON object with a non-empty string `entity`
/// and either a string `action` or `isCommand: true`; `isCommand: false`
/// always means plain text. When `infer_actions` is set, a missing action is
/// inferred from keywords in the text.
pub fn classify(text: &str, infer_actions: bool) -> Classified {
    let plain = || Classified::PlainText(text.to_string());

    let parsed: JsonValue = match serde_json::from_str(strip_fence(text)) {
        Ok(json) => json,
        Err(_) => return plain(),
    };
    let Some(obj) = parsed.as_object() else {
        return plain();
    };

    let mut command = Command::from_object(obj);
    if command.is_command == Some(false) {
        return plain();
    }
    let has_entity = command.entity.as_deref().is_some_and(|e| !e.trim().is_empty());
    if command.action.as_deref().is_some_and(|a| a.trim().is_empty()) {
        command.action = None;
    }
    if !has_entity || (command.action.is_none() && command.is_command != Some(true)) {
        return plain();
    }

    if command.action.is_none() && infer_actions {
        command.action = infer_action(text).map(|a| a.as_str().to_string());
        debug!(target: "protean::classifier", inferred = ?command.action, "Inferred missing action");
    }
    debug!(
        target: "protean::classifier",
        action = ?command.action,
        entity = ?command.entity,
        "Classified command"
    );
    Classified::Command(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn command(text: &str) -> Command {
        match classify(text, true) {
            Classified::Command(cmd) => cmd,
            Classified::PlainText(t) => panic!("expected a command, got text: {}", t),
        }
    }

    #[test]
    fn test_plain_text_passes_through() {
        let text = "Hola, ¿en qué puedo ayudarte?";
        assert_eq!(classify(text, true), Classified::PlainText(text.to_string()));
    }

    #[test]
    fn test_explicit_command() {
        let cmd = command(r#"{"isCommand": true, "action": "create", "entity": "cliente", "data": {"nombre": "Ana"}}"#);
        assert_eq!(cmd.action.as_deref(), Some("create"));
        assert_eq!(cmd.entity.as_deref(), Some("cliente"));
        assert_eq!(cmd.data, Some(json!({"nombre": "Ana"})));
    }

    #[test]
    fn test_marker_is_optional_with_action() {
        let cmd = command(r#"{"action": "read", "entity": "cliente"}"#);
        assert_eq!(cmd.action.as_deref(), Some("read"));
    }

    #[test]
    fn test_marker_false_is_text() {
        let text = r#"{"isCommand": false, "action": "read", "entity": "cliente"}"#;
        assert!(!classify(text, true).is_command());
    }

    #[test]
    fn test_missing_entity_is_text() {
        assert!(!classify(r#"{"isCommand": true, "action": "read"}"#, true).is_command());
        assert!(!classify(r#"{"action": "read", "entity": "  "}"#, true).is_command());
        assert!(!classify(r#"{"action": "read", "entity": 5}"#, true).is_command());
    }

    #[test]
    fn test_non_object_json_is_text() {
        assert!(!classify("[1, 2, 3]", true).is_command());
        assert!(!classify("42", true).is_command());
        assert!(!classify("\"crear cliente\"", true).is_command());
    }

    #[test]
    fn test_action_without_marker_required() {
        // Neither an action nor the marker: not a command
        assert!(!classify(r#"{"entity": "cliente", "data": {}}"#, true).is_command());
    }

    #[test]
    fn test_fenced_json() {
        let text = "```json\n{\"isCommand\": true, \"action\": \"delete\", \"entity\": \"nota\", \"where\": {\"id\": 1}}\n```";
        let cmd = command(text);
        assert_eq!(cmd.action.as_deref(), Some("delete"));
        assert_eq!(strip_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_fence("{}"), "{}");
    }

    #[test]
    fn test_inference_from_keywords() {
        let cmd = command(r#"{"isCommand": true, "entity": "cliente", "data": {"nota": "agregar nuevo cliente"}}"#);
        assert_eq!(cmd.action.as_deref(), Some("create"));

        let cmd = command(r#"{"isCommand": true, "entity": "factura", "data": {"nota": "eliminar"}}"#);
        assert_eq!(cmd.action.as_deref(), Some("delete"));
    }

    #[test]
    fn test_inference_can_be_disabled() {
        let text = r#"{"isCommand": true, "entity": "cliente", "data": {"nota": "crear"}}"#;
        match classify(text, false) {
            Classified::Command(cmd) => assert_eq!(cmd.action, None),
            other => panic!("expected command, got {:?}", other),
        }
    }

    #[test]
    fn test_unresolved_inference_leaves_action_empty() {
        let cmd = command(r#"{"isCommand": true, "entity": "cliente"}"#);
        assert_eq!(cmd.action, None);
    }

    #[test]
    fn test_keywords_do_not_match_inside_words() {
        let cmd = command(r#"{"isCommand": true, "entity": "credito"}"#);
        assert_eq!(cmd.action, None);

        let cmd = command(r#"{"isCommand": true, "entity": "contacto", "where": {"address": "%calle%"}}"#);
        assert_eq!(cmd.action, None);

        assert_eq!(infer_action("verde servidor"), None);
        assert_eq!(infer_action("editorial"), None);
    }

    #[test]
    fn test_keyword_stems() {
        assert_eq!(infer_action("agregar un producto"), Some(Action::Create));
        assert_eq!(infer_action("Buscando facturas"), Some(Action::Read));
        assert_eq!(infer_action("borrado lógico"), Some(Action::Delete));
        assert_eq!(infer_action("please add one"), Some(Action::Create));
    }

    #[test]
    fn test_keyword_priority() {
        assert_eq!(infer_action("MOSTRAR y eliminar"), Some(Action::Read));
        assert_eq!(infer_action("actualizar"), Some(Action::Update));
        assert_eq!(infer_action("definir entidad"), Some(Action::DefineEntity));
        assert_eq!(infer_action("hola"), None);
    }

    proptest! {
        #[test]
        fn prop_classify_never_panics(text in ".*") {
            let _ = classify(&text, true);
        }

        #[test]
        fn prop_plain_text_is_verbatim(text in "[a-eg-mo-su-zA-Z]\\PC*") {
            prop_assert_eq!(classify(&text, true), Classified::PlainText(text.clone()));
        }
    }
}
