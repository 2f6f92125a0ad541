//! Shared helpers for the conformance suite.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use protean_core::{
    Definition, EntityName, FieldSpec, Filter, FindOptions, Patch, Record, Schema, Storage,
    StorageResult,
};
pub use protean_engine::{EngineConfig, EntityRegistry};
pub use protean_executor::{Command, Executor, Output};
use protean_storage::MemoryStore;

/// MemoryStore that counts calls and slows provisioning down so concurrent
/// first-time resolutions overlap.
#[derive(Debug, Default)]
pub struct CountingStore {
    inner: MemoryStore,
    provisions: AtomicU64,
    backend_calls: AtomicU64,
    provision_delay: Duration,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            provision_delay: delay,
            ..Self::default()
        }
    }

    /// Number of `provision_table` calls.
    pub fn provisions(&self) -> u64 {
        self.provisions.load(Ordering::SeqCst)
    }

    /// Number of calls of any kind.
    pub fn backend_calls(&self) -> u64 {
        self.backend_calls.load(Ordering::SeqCst)
    }

    pub fn row_count(&self, table: &str) -> Option<usize> {
        self.inner.row_count(&EntityName::normalize(table))
    }
}

impl Storage for CountingStore {
    fn provision_table(&self, definition: &Definition) -> StorageResult<bool> {
        self.backend_calls.fetch_add(1, Ordering::SeqCst);
        self.provisions.fetch_add(1, Ordering::SeqCst);
        if !self.provision_delay.is_zero() {
            thread::sleep(self.provision_delay);
        }
        self.inner.provision_table(definition)
    }

    fn insert(&self, table: &EntityName, record: Record) -> StorageResult<Record> {
        self.backend_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.insert(table, record)
    }

    fn find(&self, table: &EntityName, filter: &Filter, options: &FindOptions) -> StorageResult<Vec<Record>> {
        self.backend_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.find(table, filter, options)
    }

    fn update_where(&self, table: &EntityName, patch: &Patch, filter: &Filter) -> StorageResult<u64> {
        self.backend_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.update_where(table, patch, filter)
    }

    fn delete_where(&self, table: &EntityName, filter: &Filter) -> StorageResult<u64> {
        self.backend_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.delete_where(table, filter)
    }
}

/// Executor over a counting store, returning both.
pub fn counted_executor() -> (Arc<CountingStore>, Executor) {
    let store = Arc::new(CountingStore::new());
    let executor = Executor::new(store.clone(), EngineConfig::default());
    (store, executor)
}

/// Registry over a counting store with a provisioning delay.
pub fn slow_registry(delay: Duration) -> (Arc<CountingStore>, Arc<EntityRegistry>) {
    let store = Arc::new(CountingStore::with_delay(delay));
    let registry = Arc::new(EntityRegistry::new(store.clone(), EngineConfig::default()));
    (store, registry)
}

pub fn schema(fields: &[(&str, &str)]) -> Schema {
    fields
        .iter()
        .map(|(name, ty)| (name.to_string(), FieldSpec::of_type(*ty)))
        .collect()
}

/// Records of a successful read.
pub fn records(output: Output) -> Vec<Record> {
    match output {
        Output::Records(rows) => rows,
        other => panic!("expected Records, got {:?}", other),
    }
}
