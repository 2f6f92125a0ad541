//! CRUD behaviour through the executor: loose entities, filters, options
//! and validation ordering.

use serde_json::json;

use protean_executor::{Output, ValidationKind};

use crate::common::*;

fn seeded_contactos(executor: &Executor) {
    executor
        .execute(Command::define(
            "contacto",
            json!({
                "name": {"type": "string", "allowNull": false},
                "edad": {"type": "integer"},
            }),
        ))
        .unwrap();
    for (name, edad) in [("Ana", 31), ("Mariana", 25), ("Bruno", 40), ("ANASTASIA", 19)] {
        executor
            .execute(Command::create("contacto", json!({"name": name, "edad": edad})))
            .unwrap();
    }
}

fn names(rows: &[protean_core::Record]) -> Vec<String> {
    rows.iter()
        .map(|r| r.to_json()["name"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[test]
fn loose_entity_accepts_arbitrary_payload() {
    let executor = Executor::in_memory();
    let created = executor
        .execute(Command::create(
            "recordatorio",
            json!({"texto": "llamar", "prioridad": 2, "tags": ["casa"], "hecho": false}),
        ))
        .unwrap();
    let Output::Record(record) = created else {
        panic!("expected Record");
    };
    assert!(record.id().is_some());

    let rows = records(executor.execute(Command::read("recordatorio")).unwrap());
    assert_eq!(rows.len(), 1);
    let json = rows[0].to_json();
    assert_eq!(json["data"]["texto"], json!("llamar"));
    assert_eq!(json["data"]["tags"], json!(["casa"]));
    assert_eq!(json["id"], record.to_json()["id"]);
}

#[test]
fn pattern_filter_is_case_insensitive() {
    let executor = Executor::in_memory();
    seeded_contactos(&executor);

    let rows = records(
        executor
            .execute(Command::read("contacto").with_where(json!({"name": "%ana%"})))
            .unwrap(),
    );
    let mut found = names(&rows);
    found.sort();
    assert_eq!(found, vec!["ANASTASIA", "Ana", "Mariana"]);
}

#[test]
fn equality_filters_combine() {
    let executor = Executor::in_memory();
    seeded_contactos(&executor);

    let rows = records(
        executor
            .execute(Command::read("contacto").with_where(json!({"name": "%ana%", "edad": 25})))
            .unwrap(),
    );
    assert_eq!(names(&rows), vec!["Mariana"]);
}

#[test]
fn update_with_empty_data_fails_before_backend() {
    let (store, executor) = counted_executor();
    let err = executor
        .execute(Command::update("proveedor", json!({}), json!({"nombre": "x"})))
        .unwrap_err();
    assert_eq!(err.validation_kind(), Some(ValidationKind::MissingPayload));
    assert_eq!(store.backend_calls(), 0);
    assert!(executor.definitions().is_empty());
}

#[test]
fn delete_without_filter_fails_before_backend() {
    let (store, executor) = counted_executor();
    let err = executor
        .execute(Command::delete("proveedor", json!({})))
        .unwrap_err();
    assert_eq!(err.validation_kind(), Some(ValidationKind::MissingFilter));
    assert_eq!(store.backend_calls(), 0);
}

#[test]
fn update_and_delete_report_counts() {
    let executor = Executor::in_memory();
    seeded_contactos(&executor);

    let updated = executor
        .execute(Command::update("contacto", json!({"edad": 50}), json!({"name": "%ana%"})))
        .unwrap();
    assert_eq!(updated, Output::Updated(3));

    let deleted = executor
        .execute(Command::delete("contacto", json!({"edad": 50})))
        .unwrap();
    assert_eq!(deleted, Output::Deleted(3));

    let rows = records(executor.execute(Command::read("contacto")).unwrap());
    assert_eq!(names(&rows), vec!["Bruno"]);
}

#[test]
fn unsupported_type_names_type_and_field() {
    let executor = Executor::in_memory();
    let err = executor
        .execute(Command::define(
            "factura",
            json!({"total": {"type": "currency"}, "numero": {"type": "integer"}}),
        ))
        .unwrap_err();

    assert_eq!(err.validation_kind(), Some(ValidationKind::UnsupportedType));
    let message = err.to_string();
    assert!(message.contains("currency"), "{}", message);
    assert!(message.contains("total"), "{}", message);
    // Nothing was registered, so a corrected definition still wins
    assert!(executor.definitions().is_empty());
    executor
        .execute(Command::define("factura", json!({"total": {"type": "decimal"}})))
        .unwrap();
}

#[test]
fn reserved_field_is_rejected() {
    let executor = Executor::in_memory();
    let err = executor
        .execute(Command::define("cuenta", json!({"id": {"type": "integer"}})))
        .unwrap_err();
    assert_eq!(err.validation_kind(), Some(ValidationKind::ReservedField));

    let err = executor
        .execute(Command::create("nota", json!({"createdAt": "2024-01-01"})))
        .unwrap_err();
    assert_eq!(err.validation_kind(), Some(ValidationKind::ReservedField));
}

#[test]
fn options_limit_offset_and_order_apply() {
    let executor = Executor::in_memory();
    seeded_contactos(&executor);

    let rows = records(
        executor
            .execute(Command::read("contacto").with_options(json!({
                "order": [["edad", "DESC"]],
                "limit": 2,
                "offset": 1,
            })))
            .unwrap(),
    );
    assert_eq!(names(&rows), vec!["Ana", "Mariana"]);
}

#[test]
fn malformed_options_are_ignored() {
    let executor = Executor::in_memory();
    seeded_contactos(&executor);

    for options in [
        json!("todo"),
        json!({"limit": -3, "offset": "dos"}),
        json!({"order": [["edad", "SIDEWAYS"], 42, ["desconocido", "ASC"]]}),
        json!({"order": "edad"}),
    ] {
        let rows = records(
            executor
                .execute(Command::read("contacto").with_options(options.clone()))
                .unwrap(),
        );
        assert_eq!(rows.len(), 4, "options {} should be ignored", options);
    }
}

#[test]
fn read_with_non_object_where_is_rejected() {
    let executor = Executor::in_memory();
    let err = executor
        .execute(Command::read("contacto").with_where(json!(["name"])))
        .unwrap_err();
    assert_eq!(err.validation_kind(), Some(ValidationKind::InvalidFilter));
}

#[test]
fn loose_filter_numbers_match_across_int_and_float() {
    let executor = Executor::in_memory();
    executor
        .execute(Command::create("paciente", json!({"nombre": "Ana", "edad": 30})))
        .unwrap();
    executor
        .execute(Command::create("paciente", json!({"nombre": "Luis", "edad": 41})))
        .unwrap();

    let rows = records(
        executor
            .execute(Command::read("paciente").with_where(json!({"edad": 30.0})))
            .unwrap(),
    );
    assert_eq!(rows.len(), 1);
}
