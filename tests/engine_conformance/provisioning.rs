//! Registry identity and single-flight provisioning.

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use protean_executor::Output;

use crate::common::*;

#[test]
fn sequential_upserts_return_first_definition() {
    let (store, registry) = slow_registry(Duration::ZERO);
    let first = registry
        .upsert_definition("producto", &schema(&[("nombre", "string")]))
        .unwrap();
    let second = registry
        .upsert_definition("Producto", &schema(&[("precio", "decimal"), ("stock", "integer")]))
        .unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(second.column_names(), vec!["id", "createdAt", "updatedAt", "nombre"]);
    assert_eq!(store.provisions(), 1);
}

#[test]
fn concurrent_first_upserts_provision_once() {
    const THREADS: usize = 12;
    let (store, registry) = slow_registry(Duration::from_millis(25));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                // Every thread proposes a different schema; only one may win
                let field = format!("campo{}", i);
                registry
                    .upsert_definition("pedido", &schema(&[(field.as_str(), "string")]))
                    .unwrap()
            })
        })
        .collect();

    let defs: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(store.provisions(), 1);
    for def in &defs[1..] {
        assert!(Arc::ptr_eq(&defs[0], def));
    }
    assert_eq!(registry.len(), 1);
}

#[test]
fn concurrent_creates_on_unseen_entity_provision_once() {
    const THREADS: usize = 8;
    let store = Arc::new(CountingStore::with_delay(Duration::from_millis(20)));
    let executor = Arc::new(Executor::new(store.clone(), EngineConfig::default()));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let executor = Arc::clone(&executor);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                executor
                    .execute(Command::create("evento", serde_json::json!({"n": i})))
                    .unwrap()
            })
        })
        .collect();
    for h in handles {
        assert!(matches!(h.join().unwrap(), Output::Record(_)));
    }

    assert_eq!(store.provisions(), 1);
    assert_eq!(store.row_count("evento"), Some(THREADS));
}

#[test]
fn distinct_entities_provision_in_parallel() {
    const ENTITIES: usize = 6;
    let delay = Duration::from_millis(150);
    let (store, registry) = slow_registry(delay);
    let barrier = Arc::new(Barrier::new(ENTITIES));

    let started = std::time::Instant::now();
    let handles: Vec<_> = (0..ENTITIES)
        .map(|i| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                registry.ensure_loose_definition(&format!("tabla {}", i)).unwrap()
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(store.provisions(), ENTITIES as u64);
    assert_eq!(registry.len(), ENTITIES);
    // Serialized provisioning would take ENTITIES * delay
    assert!(started.elapsed() < delay * (ENTITIES as u32 - 1));
}

#[test]
fn loose_definition_is_reused_by_later_define() {
    let (store, executor) = counted_executor();
    executor
        .execute(Command::create("nota", serde_json::json!({"texto": "hola"})))
        .unwrap();
    let out = executor
        .execute(Command::define("nota", serde_json::json!({"texto": {"type": "text"}})))
        .unwrap();

    match out {
        Output::Defined { created, columns, .. } => {
            assert!(!created);
            assert_eq!(columns, vec!["id", "createdAt", "updatedAt", "data"]);
        }
        other => panic!("expected Defined, got {:?}", other),
    }
    assert_eq!(store.provisions(), 1);
}
