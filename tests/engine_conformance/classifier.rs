//! Classification of agent replies.

use proptest::prelude::*;
use protean_executor::{classify, Classified, Reply};
use serde_json::json;

use crate::common::*;

#[test]
fn conversational_text_passes_through() {
    let executor = Executor::in_memory();
    let reply = executor.handle_reply("Claro, ya guardé a tu cliente.");
    assert_eq!(reply, Reply::text("Claro, ya guardé a tu cliente."));
    assert!(executor.definitions().is_empty());
}

#[test]
fn is_command_false_is_text() {
    let text = json!({"isCommand": false, "action": "create", "entity": "nota"}).to_string();
    assert!(!classify(&text, true).is_command());
}

#[test]
fn missing_action_is_inferred_from_keywords() {
    let executor = Executor::in_memory();
    let text = r#"{"isCommand": true, "entity": "tarea", "data": {"titulo": "crear informe"}}"#;
    let reply = executor.handle_reply(text);
    assert!(reply.is_success(), "{:?}", reply);
    assert_eq!(reply.result.as_ref().map(|r| r["data"]["titulo"].clone()), Some(json!("crear informe")));
}

#[test]
fn keywords_inside_names_and_keys_are_ignored() {
    let executor = Executor::in_memory();
    let reply = executor.handle_reply(
        r#"{"isCommand": true, "entity": "contacto", "where": {"address": "%calle%"}}"#,
    );
    assert!(reply.is_command);
    assert!(!reply.is_success());
    assert!(executor.definitions().is_empty());

    match classify(r#"{"isCommand": true, "entity": "credito"}"#, true) {
        Classified::Command(cmd) => assert_eq!(cmd.action, None),
        other => panic!("expected command, got {:?}", other),
    }
}

#[test]
fn explicit_action_beats_keywords() {
    let text = r#"{"action": "read", "entity": "tarea", "where": {"titulo": "eliminar duplicados"}}"#;
    match classify(text, true) {
        Classified::Command(cmd) => assert_eq!(cmd.action.as_deref(), Some("read")),
        other => panic!("expected command, got {:?}", other),
    }
}

#[test]
fn fenced_json_is_a_command() {
    let text = "```json\n{\"action\": \"read\", \"entity\": \"tarea\"}\n```";
    assert!(classify(text, true).is_command());
}

proptest! {
    #[test]
    fn classify_never_panics(text in "\\PC*") {
        let _ = classify(&text, true);
    }

    #[test]
    fn handle_reply_always_answers(text in "\\PC{0,64}") {
        let executor = Executor::in_memory();
        let reply = executor.handle_reply(&text);
        if !reply.is_command {
            prop_assert_eq!(reply.text.as_deref(), Some(text.as_str()));
        }
    }
}
