//! End-to-end conversation: define a cliente, then work with it.

use serde_json::json;

use protean_executor::{Output, Reply};

use crate::common::*;

#[test]
fn cliente_lifecycle() {
    let (store, executor) = counted_executor();

    let defined = executor.handle_reply(
        &json!({
            "isCommand": true,
            "action": "define_entity",
            "entity": "cliente",
            "schema": {
                "nombre": {"type": "string", "allowNull": false},
                "saldo": {"type": "decimal", "defaultValue": 0},
            },
        })
        .to_string(),
    );
    assert!(defined.is_success(), "{:?}", defined);
    let result = defined.result.clone().unwrap();
    assert_eq!(result["message"], json!("Entidad 'Cliente' definida y sincronizada."));
    assert_eq!(result["columns"], json!(["id", "createdAt", "updatedAt", "nombre", "saldo"]));

    let definition = executor.engine().registry().get_definition("Cliente").unwrap();
    let created = executor
        .execute(Command::create("cliente", json!({"nombre": "Ana"})))
        .unwrap();
    let Output::Record(record) = created else {
        panic!("expected Record");
    };
    assert!(record.id().is_some());
    assert_eq!(record.to_json()["saldo"], json!(0.0));
    assert!(std::sync::Arc::ptr_eq(
        &definition,
        &executor.engine().registry().get_definition("cliente").unwrap()
    ));

    let updated = executor.handle_reply(
        r#"{"action": "update", "entity": "Cliente", "data": {"saldo": 120.5}, "where": {"nombre": "ana"}}"#,
    );
    assert_eq!(updated.result, Some(json!({"updated": 0})));

    let updated = executor.handle_reply(
        r#"{"action": "update", "entity": "Cliente", "data": {"saldo": 120.5}, "where": {"nombre": "%ana%"}}"#,
    );
    assert_eq!(updated.result, Some(json!({"updated": 1})));

    let read = executor.handle_reply(r#"{"action": "read", "entity": "clientes"}"#);
    // "clientes" is a different entity; it is provisioned loose and empty
    assert_eq!(read.result, Some(json!([])));

    let read = executor.handle_reply(r#"{"action": "read", "entity": "cliente", "where": {"saldo": 120.5}}"#);
    let rows = read.result.unwrap();
    assert_eq!(rows.as_array().map(Vec::len), Some(1));
    assert_eq!(rows[0]["nombre"], json!("Ana"));

    let bad = executor.handle_reply(r#"{"action": "create", "entity": "cliente", "data": {"saldo": 5}}"#);
    assert_eq!(bad.success, Some(false));
    assert_eq!(bad.detail.as_ref().and_then(|d| d.validation_kind()), Some(protean_executor::ValidationKind::NullNotAllowed));

    let deleted = executor.handle_reply(r#"{"action": "delete", "entity": "cliente", "where": {"nombre": "Ana"}}"#);
    assert_eq!(deleted.result, Some(json!({"deleted": 1})));

    assert_eq!(store.provisions(), 2);
    let names: Vec<String> = executor.definitions().iter().map(|d| d.name().to_string()).collect();
    assert_eq!(names, vec!["Cliente", "Clientes"]);
}

#[test]
fn replies_serialize_for_the_chat_layer() {
    let executor = Executor::in_memory();
    let reply: Reply = executor.handle_reply(r#"{"action": "archive", "entity": "nota"}"#);
    let json = serde_json::to_value(&reply).unwrap();
    assert_eq!(json["isCommand"], json!(true));
    assert_eq!(json["success"], json!(false));
    assert_eq!(json["detail"]["kind"], json!("unsupported_action"));
    assert_eq!(json["detail"]["entity"], json!("Nota"));
}
