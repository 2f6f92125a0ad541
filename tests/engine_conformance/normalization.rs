//! Entity name normalization and registry identity.

use proptest::prelude::*;
use protean_core::{normalize_name, DefinitionKind, EntityName};

use crate::common::*;

#[test]
fn equivalent_spellings_share_one_name() {
    let a = normalize_name("cliente potencial");
    assert_eq!(a, "ClientePotencial");
    assert_eq!(a, normalize_name("Cliente_Potencial"));
    assert_eq!(a, normalize_name("cliente-potencial"));
}

#[test]
fn equivalent_spellings_resolve_one_definition() {
    let executor = Executor::in_memory();
    executor
        .execute(Command::create("cliente potencial", serde_json::json!({"n": 1})))
        .unwrap();
    executor
        .execute(Command::create("Cliente_Potencial", serde_json::json!({"n": 2})))
        .unwrap();
    let rows = records(executor.execute(Command::read("cliente-potencial")).unwrap());
    assert_eq!(rows.len(), 2);
    assert_eq!(executor.definitions().len(), 1);
}

#[test]
fn uppercase_spelling_reaches_the_declared_entity() {
    let executor = Executor::in_memory();
    executor
        .execute(Command::define(
            "Cliente",
            serde_json::json!({"nombre": {"type": "string", "allowNull": false}}),
        ))
        .unwrap();
    executor
        .execute(Command::create("CLIENTE", serde_json::json!({"nombre": "Ana"})))
        .unwrap();

    let definitions = executor.definitions();
    assert_eq!(definitions.len(), 1);
    assert_eq!(definitions[0].name().as_str(), "Cliente");
    assert_eq!(definitions[0].kind(), DefinitionKind::Declared);
    let rows = records(executor.execute(Command::read("cliente")).unwrap());
    assert_eq!(rows.len(), 1);
}

#[test]
fn blank_names_fall_back_to_placeholder() {
    assert_eq!(EntityName::normalize(" -- ").as_str(), "Entidad");
}

proptest! {
    #[test]
    fn normalize_is_idempotent(raw in "\\PC{0,24}") {
        let once = normalize_name(&raw);
        prop_assert_eq!(normalize_name(&once), once.clone());
        prop_assert!(!once.is_empty());
    }

    #[test]
    fn separators_do_not_matter(words in proptest::collection::vec("[a-z]{1,8}", 1..4)) {
        let spaced = words.join(" ");
        let snake = words.join("_");
        let kebab = words.join("-");
        prop_assert_eq!(normalize_name(&spaced), normalize_name(&snake));
        prop_assert_eq!(normalize_name(&snake), normalize_name(&kebab));
    }
}
