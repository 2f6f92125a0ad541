//! Entity registry
//!
//! Process-lifetime cache of normalized entity name → [`Definition`].
//!
//! # Single-flight provisioning
//!
//! Each name owns one slot, an `Arc<OnceCell<Arc<Definition>>>` stored in a
//! `DashMap`. Resolving a name clones the slot out of the map (releasing the
//! shard lock) and then initializes the cell. The cell lets exactly one
//! caller run synthesis and provisioning while concurrent callers for the
//! same name wait; callers for other names never touch that cell. A failed
//! initialization leaves the cell empty, so the next caller retries.
//!
//! Entries are never replaced or evicted: the first definition of a name
//! wins for the lifetime of the registry.

use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::OnceCell;
use protean_core::{Action, Definition, EntityName, Error, Result, Schema, Storage};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::synthesizer::{synthesize, synthesize_loose};

type Slot = Arc<OnceCell<Arc<Definition>>>;

/// Outcome of resolving a name.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The live definition for the name
    pub definition: Arc<Definition>,
    /// True when this call synthesized and provisioned it
    pub created: bool,
}

/// Registry of live entity definitions.
///
/// # Thread Safety
///
/// `EntityRegistry` is `Send + Sync` and meant to be shared behind `Arc`.
pub struct EntityRegistry {
    storage: Arc<dyn Storage>,
    config: EngineConfig,
    slots: DashMap<EntityName, Slot>,
}

impl std::fmt::Debug for EntityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityRegistry")
            .field("config", &self.config)
            .field("entities", &self.slots.len())
            .finish()
    }
}

impl EntityRegistry {
    /// Empty registry provisioning through `storage`.
    pub fn new(storage: Arc<dyn Storage>, config: EngineConfig) -> Self {
        Self {
            storage,
            config,
            slots: DashMap::new(),
        }
    }

    /// Configuration in effect.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Normalize a raw entity name with the configured placeholder.
    pub fn normalize(&self, raw: &str) -> EntityName {
        EntityName::normalize_or(raw, &self.config.placeholder_name)
    }

    fn slot(&self, name: &EntityName) -> Slot {
        // The map guard is a temporary and drops at the end of the statement
        Arc::clone(
            self.slots
                .entry(name.clone())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .value(),
        )
    }

    fn resolve<F>(&self, name: EntityName, action: Action, build: F) -> Result<Resolution>
    where
        F: FnOnce(EntityName) -> Result<Definition>,
    {
        let slot = self.slot(&name);
        if let Some(definition) = slot.get() {
            debug!(target: "protean::registry", entity = %name, "Definition cached");
            return Ok(Resolution {
                definition: Arc::clone(definition),
                created: false,
            });
        }

        let mut created = false;
        let outcome = slot.get_or_try_init(|| {
            let definition = build(name.clone())?;
            self.storage.provision_table(&definition).map_err(|e| {
                warn!(target: "protean::registry", entity = %name, error = %e, "Provisioning failed");
                Error::storage(name.as_str(), action.as_str(), e)
            })?;
            info!(
                target: "protean::registry",
                entity = %name,
                kind = ?definition.kind(),
                columns = definition.columns().len(),
                "Entity provisioned"
            );
            created = true;
            Ok::<_, Error>(Arc::new(definition))
        });
        let definition = match outcome {
            Ok(definition) => definition,
            Err(e) => {
                self.discard_empty_slot(&name, &slot);
                return Err(e);
            }
        };

        Ok(Resolution {
            definition: Arc::clone(definition),
            created,
        })
    }

    /// Drop `slot` from the map if it is still empty and no other caller
    /// holds it, so names that never resolved do not accumulate.
    fn discard_empty_slot(&self, name: &EntityName, slot: &Slot) {
        // Map plus our clone; the shard lock blocks new clones during the check
        let removed = self.slots.remove_if(name, |_, held| {
            Arc::ptr_eq(held, slot) && held.get().is_none() && Arc::strong_count(held) == 2
        });
        if removed.is_some() {
            debug!(target: "protean::registry", entity = %name, "Discarded unresolved slot");
        }
    }

    /// Declare an entity, reporting whether this call created it.
    ///
    /// An existing definition is returned unchanged and `schema` is not
    /// looked at.
    ///
    /// # Errors
    ///
    /// Synthesis validation errors, or a storage error if provisioning fails.
    /// On error nothing is cached.
    pub fn define(&self, raw_name: &str, schema: &Schema) -> Result<Resolution> {
        let name = self.normalize(raw_name);
        self.resolve(name, Action::DefineEntity, |name| synthesize(name, schema))
    }

    /// Return the definition for `raw_name`, creating it from `schema` if the
    /// name is unseen. The first definition of a name wins.
    ///
    /// # Errors
    ///
    /// See [`EntityRegistry::define`].
    pub fn upsert_definition(&self, raw_name: &str, schema: &Schema) -> Result<Arc<Definition>> {
        self.define(raw_name, schema).map(|r| r.definition)
    }

    /// Cache-only lookup; never creates.
    pub fn get_definition(&self, raw_name: &str) -> Option<Arc<Definition>> {
        let name = self.normalize(raw_name);
        self.slots.get(&name).and_then(|slot| slot.get().cloned())
    }

    /// Return the definition for `raw_name`, creating a loose one if unseen.
    ///
    /// # Errors
    ///
    /// Returns a storage error if provisioning fails; nothing is cached.
    pub fn ensure_loose_definition(&self, raw_name: &str) -> Result<Arc<Definition>> {
        self.ensure_loose_for(raw_name, Action::Create)
    }

    /// [`EntityRegistry::ensure_loose_definition`] on behalf of `action`,
    /// which is named in any provisioning error.
    pub fn ensure_loose_for(&self, raw_name: &str, action: Action) -> Result<Arc<Definition>> {
        let name = self.normalize(raw_name);
        let payload = self.config.loose_payload_field.as_str();
        self.resolve(name, action, |name| Ok(synthesize_loose(name, payload)))
            .map(|r| r.definition)
    }

    /// Every resolved definition, sorted by name.
    pub fn definitions(&self) -> Vec<Arc<Definition>> {
        let mut out: Vec<Arc<Definition>> = self
            .slots
            .iter()
            .filter_map(|entry| entry.value().get().cloned())
            .collect();
        out.sort_by(|a, b| a.name().cmp(b.name()));
        out
    }

    /// Number of resolved definitions.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|entry| entry.value().get().is_some()).count()
    }

    /// True when nothing has been resolved.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
