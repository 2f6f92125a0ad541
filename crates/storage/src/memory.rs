//! In-process storage backend
//!
//! `MemoryStore` keeps every provisioned table in a `DashMap`, each behind
//! its own `parking_lot::RwLock`. It enforces the column constraints a SQL
//! backend would (unique columns) and treats provisioning as
//! create-if-missing, so a rebuilt registry can provision again without
//! losing rows.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use protean_core::{
    Definition, EntityName, Filter, FindOptions, Patch, PatchOp, Record, Storage, StorageError,
    StorageResult, Value,
};
use serde_json::Value as JsonValue;
use tracing::{debug, info};

use crate::eval::{compare, matches};

/// One provisioned table.
#[derive(Debug)]
struct Table {
    definition: Definition,
    state: RwLock<TableState>,
}

impl Table {
    fn new(definition: Definition) -> Self {
        let unique = definition
            .columns()
            .iter()
            .filter(|c| c.unique)
            .map(|c| (c.name.clone(), HashSet::new()))
            .collect();
        Self {
            definition,
            state: RwLock::new(TableState {
                rows: Vec::new(),
                unique,
            }),
        }
    }

    fn violation(&self, column: &str) -> StorageError {
        StorageError::UniqueViolation {
            table: self.definition.name().to_string(),
            column: column.to_string(),
        }
    }
}

/// Rows plus one index of taken keys per unique column.
#[derive(Debug)]
struct TableState {
    rows: Vec<Record>,
    unique: HashMap<String, HashSet<String>>,
}

/// Index key of a unique column value; nulls are never indexed.
fn unique_key(record: &Record, column: &str) -> Option<String> {
    match record.get(column) {
        None | Some(Value::Null) => None,
        Some(value) => Some(value.to_json().to_string()),
    }
}

impl TableState {
    fn index(&mut self, record: &Record) {
        for (column, keys) in self.unique.iter_mut() {
            if let Some(key) = unique_key(record, column) {
                keys.insert(key);
            }
        }
    }

    fn unindex(&mut self, record: &Record) {
        for (column, keys) in self.unique.iter_mut() {
            if let Some(key) = unique_key(record, column) {
                keys.remove(&key);
            }
        }
    }

    /// First unique column `record` would collide on.
    fn clash(&self, record: &Record) -> Option<&str> {
        self.unique.iter().find_map(|(column, keys)| {
            unique_key(record, column)
                .is_some_and(|key| keys.contains(&key))
                .then_some(column.as_str())
        })
    }

    /// First unique column on which replacing `before` with `after` (row by
    /// row) would collide, with each other or with an untouched row.
    fn clash_on_replace(&self, before: &[&Record], after: &[Record]) -> Option<&str> {
        self.unique.iter().find_map(|(column, keys)| {
            let released: HashSet<String> = before.iter().filter_map(|r| unique_key(r, column)).collect();
            let mut taken = HashSet::with_capacity(after.len());
            let collides = after.iter().filter_map(|r| unique_key(r, column)).any(|key| {
                (keys.contains(&key) && !released.contains(&key)) || !taken.insert(key)
            });
            collides.then_some(column.as_str())
        })
    }
}

/// In-process [`Storage`] implementation.
///
/// # Thread Safety
///
/// `MemoryStore` is `Send + Sync`. Distinct tables never contend; the
/// table map itself is only locked (per shard) while looking a table up.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: DashMap<EntityName, Arc<Table>>,
    provision_calls: AtomicU64,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `provision_table` calls received, created or not.
    pub fn provision_calls(&self) -> u64 {
        self.provision_calls.load(Ordering::SeqCst)
    }

    /// Number of provisioned tables.
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Rows currently stored in `table`, if provisioned.
    pub fn row_count(&self, table: &EntityName) -> Option<usize> {
        self.tables.get(table).map(|t| t.state.read().rows.len())
    }

    /// The definition a table was provisioned with.
    pub fn table_definition(&self, table: &EntityName) -> Option<Definition> {
        self.tables.get(table).map(|t| t.definition.clone())
    }

    fn table(&self, name: &EntityName) -> StorageResult<Arc<Table>> {
        // Clone the Arc so the shard guard is released before locking rows
        self.tables
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| StorageError::TableNotProvisioned(name.to_string()))
    }
}

fn apply_patch(record: &mut Record, patch: &Patch) {
    for (column, op) in &patch.ops {
        match op {
            PatchOp::Set(value) => record.set(column.clone(), value.clone()),
            PatchOp::MergeJson(entries) => {
                let mut merged = match record.get(column) {
                    Some(Value::Json(JsonValue::Object(existing))) => existing.clone(),
                    _ => serde_json::Map::new(),
                };
                for (k, v) in entries {
                    merged.insert(k.clone(), v.clone());
                }
                record.set(column.clone(), Value::Json(JsonValue::Object(merged)));
            }
        }
    }
}

impl Storage for MemoryStore {
    fn provision_table(&self, definition: &Definition) -> StorageResult<bool> {
        self.provision_calls.fetch_add(1, Ordering::SeqCst);
        let mut created = false;
        self.tables
            .entry(definition.name().clone())
            .or_insert_with(|| {
                created = true;
                Arc::new(Table::new(definition.clone()))
            });
        if created {
            info!(target: "protean::storage", table = %definition.name(), columns = definition.columns().len(), "Provisioned table");
        } else {
            debug!(target: "protean::storage", table = %definition.name(), "Table already provisioned");
        }
        Ok(created)
    }

    fn insert(&self, table: &EntityName, record: Record) -> StorageResult<Record> {
        let table = self.table(table)?;
        let mut state = table.state.write();
        if let Some(column) = state.clash(&record) {
            return Err(table.violation(column));
        }
        state.index(&record);
        state.rows.push(record.clone());
        Ok(record)
    }

    fn find(&self, table: &EntityName, filter: &Filter, options: &FindOptions) -> StorageResult<Vec<Record>> {
        let table = self.table(table)?;
        let state = table.state.read();
        let mut hits: Vec<&Record> = state.rows.iter().filter(|r| matches(r, filter)).collect();
        if !options.order.is_empty() {
            // Stable sort keeps insertion order among equal keys
            hits.sort_by(|a, b| compare(a, b, &options.order));
        }
        let offset = options.offset.unwrap_or(0) as usize;
        let limit = options.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        Ok(hits.into_iter().skip(offset).take(limit).cloned().collect())
    }

    fn update_where(&self, table: &EntityName, patch: &Patch, filter: &Filter) -> StorageResult<u64> {
        let table = self.table(table)?;
        let mut state = table.state.write();
        let positions: Vec<usize> = state
            .rows
            .iter()
            .enumerate()
            .filter(|(_, r)| matches(r, filter))
            .map(|(i, _)| i)
            .collect();
        if positions.is_empty() {
            return Ok(0);
        }

        let patched: Vec<Record> = positions
            .iter()
            .map(|&i| {
                let mut row = state.rows[i].clone();
                apply_patch(&mut row, patch);
                row
            })
            .collect();
        let before: Vec<&Record> = positions.iter().map(|&i| &state.rows[i]).collect();
        if let Some(column) = state.clash_on_replace(&before, &patched) {
            return Err(table.violation(column));
        }

        for (&i, row) in positions.iter().zip(patched) {
            let old = std::mem::replace(&mut state.rows[i], row);
            state.unindex(&old);
        }
        for &i in &positions {
            let row = state.rows[i].clone();
            state.index(&row);
        }
        Ok(positions.len() as u64)
    }

    fn delete_where(&self, table: &EntityName, filter: &Filter) -> StorageResult<u64> {
        let table = self.table(table)?;
        let mut state = table.state.write();
        let (removed, kept): (Vec<Record>, Vec<Record>) =
            std::mem::take(&mut state.rows).into_iter().partition(|r| matches(r, filter));
        state.rows = kept;
        for row in &removed {
            state.unindex(row);
        }
        Ok(removed.len() as u64)
    }
}
