//! # Store Registry
//!
//! Associates each [`ResourceKind`] with the store that caches it, for code that only learns at
//! runtime which resource a message concerns.

use crate::framework::{RawSyncPayload, SyncOutcome};
use crate::registry::error::RegistryError;
use crate::registry::kind::{ResourceKind, ResourceTag};
use crate::registry::message::SyncMessage;
use crate::registry::store::RegistryStore;
use futures::future::join_all;
use indexmap::IndexMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, instrument, warn};

/// What happened to a dispatched message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The target store reconciled the payload.
    Delivered(SyncOutcome),
    /// The tag names no known resource type. Dropped.
    UnknownResource(String),
    /// The resource type is known but no store is registered for it (yet). Dropped.
    Unregistered(ResourceKind),
    /// The payload did not decode into the store's entity type. Dropped.
    Malformed(String),
}

/// Registry of live stores, keyed by resource type.
///
/// Cloning yields another handle to the same registry. Entries are added at startup and later
/// by optional modules; an existing entry is never replaced.
#[derive(Clone, Default)]
pub struct StoreRegistry {
    stores: Arc<RwLock<IndexMap<ResourceKind, Arc<dyn RegistryStore>>>>,
}

impl StoreRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `store` under `kind`.
    pub fn register<S>(&self, kind: ResourceKind, store: S) -> Result<(), RegistryError>
    where
        S: RegistryStore + 'static,
    {
        let mut stores = self.stores.write().unwrap_or_else(PoisonError::into_inner);
        if stores.contains_key(&kind) {
            warn!(resource = %kind, "Store already registered");
            return Err(RegistryError::AlreadyRegistered(kind));
        }
        debug!(resource = %kind, entity_type = store.entity_type(), "Registered store");
        stores.insert(kind, Arc::new(store));
        Ok(())
    }

    pub fn get(&self, kind: ResourceKind) -> Option<Arc<dyn RegistryStore>> {
        self.read().get(&kind).cloned()
    }

    /// Registered resource types, in registration order.
    pub fn names(&self) -> Vec<ResourceKind> {
        self.read().keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Routes `payload` to the store registered for `resource`.
    ///
    /// Never fails: unknown, unregistered and malformed messages are logged and dropped.
    pub fn dispatch(&self, resource: &ResourceTag, payload: RawSyncPayload) -> DispatchOutcome {
        let kind = match resource {
            ResourceTag::Known(kind) => *kind,
            ResourceTag::Unknown(tag) => {
                warn!(resource = %tag, version = payload.version, "Dropping sync for unknown resource");
                return DispatchOutcome::UnknownResource(tag.clone());
            }
        };
        let Some(store) = self.get(kind) else {
            warn!(resource = %kind, version = payload.version, "Dropping sync for unregistered resource");
            return DispatchOutcome::Unregistered(kind);
        };

        debug!(resource = %kind, ?payload, "Dispatching sync");
        match store.apply_raw(payload) {
            Ok(outcome) => DispatchOutcome::Delivered(outcome),
            Err(e) => {
                warn!(resource = %kind, error = %e, "Dropping malformed sync payload");
                DispatchOutcome::Malformed(e.to_string())
            }
        }
    }

    pub fn dispatch_message(&self, message: SyncMessage) -> DispatchOutcome {
        self.dispatch(&message.resource, message.payload)
    }

    /// Stores that have completed at least one bulk load since their last clear.
    pub fn get_loaded_stores(&self) -> Vec<(ResourceKind, Arc<dyn RegistryStore>)> {
        self.read()
            .iter()
            .filter(|(_, store)| store.is_loaded())
            .map(|(kind, store)| (*kind, Arc::clone(store)))
            .collect()
    }

    /// Force-reloads every loaded store concurrently and waits for all of them to settle.
    ///
    /// Unloaded stores are skipped; they pick up current server state on their first load.
    #[instrument(skip(self))]
    pub async fn refresh_all_loaded_stores(&self) {
        let loaded = self.get_loaded_stores();
        info!(count = loaded.len(), "Refreshing loaded stores");
        join_all(loaded.iter().map(|(_, store)| store.refresh())).await;
    }

    /// Resets every registered store.
    pub fn clear_all_stores(&self) {
        let stores: Vec<_> = self.read().values().cloned().collect();
        for store in &stores {
            store.clear();
        }
        info!(count = stores.len(), "Cleared all stores");
    }

    fn read(
        &self,
    ) -> std::sync::RwLockReadGuard<'_, IndexMap<ResourceKind, Arc<dyn RegistryStore>>> {
        self.stores.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::{
        ResourceLoader, ResourceStore, StoreEntity, StoreError, SyncAction, SyncPayload,
    };
    use async_trait::async_trait;
    use serde::{Deserialize, Serialize};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Zone {
        id: u32,
        name: String,
    }

    impl StoreEntity for Zone {
        type Id = u32;
        type Create = ();
        type Update = ();

        fn id(&self) -> u32 {
            self.id
        }
    }

    /// Sleeps briefly before answering, so overlapping loads are observable.
    struct SlowLoader {
        calls: AtomicUsize,
        running: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ResourceLoader<Zone> for SlowLoader {
        async fn fetch_all(&self) -> Result<Vec<Zone>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.running.fetch_sub(1, Ordering::SeqCst);
            Ok(vec![Zone {
                id: 1,
                name: "Hall".to_string(),
            }])
        }
    }

    fn zone_store(
        running: &Arc<AtomicUsize>,
        peak: &Arc<AtomicUsize>,
    ) -> (ResourceStore<Zone>, Arc<SlowLoader>) {
        let loader = Arc::new(SlowLoader {
            calls: AtomicUsize::new(0),
            running: Arc::clone(running),
            peak: Arc::clone(peak),
        });
        (ResourceStore::new(loader.clone()), loader)
    }

    fn raw_created(id: u32, version: u64) -> RawSyncPayload {
        RawSyncPayload {
            id: serde_json::json!(id),
            version,
            action: SyncAction::Created,
            data: Some(serde_json::json!({ "id": id, "name": "Terrace" })),
        }
    }

    #[tokio::test]
    async fn test_register_never_replaces() {
        let counters = (Arc::default(), Arc::default());
        let (first, _) = zone_store(&counters.0, &counters.1);
        let (second, _) = zone_store(&counters.0, &counters.1);
        let registry = StoreRegistry::new();

        registry.register(ResourceKind::Zone, first.clone()).unwrap();
        let result = registry.register(ResourceKind::Zone, second);

        assert_eq!(result, Err(RegistryError::AlreadyRegistered(ResourceKind::Zone)));
        registry.dispatch(&ResourceKind::Zone.into(), raw_created(4, 1));
        assert_eq!(first.len(), 1, "original store still receives messages");
    }

    #[tokio::test]
    async fn test_dispatch_routes_by_tag() {
        let counters = (Arc::default(), Arc::default());
        let (zones, _) = zone_store(&counters.0, &counters.1);
        let registry = StoreRegistry::new();
        registry.register(ResourceKind::Zone, zones.clone()).unwrap();

        let outcome = registry.dispatch(&ResourceTag::from("zone"), raw_created(4, 1));

        assert_eq!(outcome, DispatchOutcome::Delivered(SyncOutcome::Applied));
        assert_eq!(zones.get_by_id(&4).unwrap().name, "Terrace");
    }

    #[tokio::test]
    async fn test_dispatch_drops_unknown_and_unregistered() {
        let registry = StoreRegistry::new();

        let unknown = registry.dispatch(&ResourceTag::from("Zone"), raw_created(1, 1));
        let unregistered = registry.dispatch(&ResourceTag::from("table"), raw_created(1, 1));

        assert_eq!(unknown, DispatchOutcome::UnknownResource("Zone".to_string()));
        assert_eq!(unregistered, DispatchOutcome::Unregistered(ResourceKind::Table));
    }

    #[tokio::test]
    async fn test_malformed_payload_does_not_move_watermark() {
        let counters = (Arc::default(), Arc::default());
        let (zones, _) = zone_store(&counters.0, &counters.1);
        let registry = StoreRegistry::new();
        registry.register(ResourceKind::Zone, zones.clone()).unwrap();
        let bad = RawSyncPayload {
            id: serde_json::json!("not-a-number"),
            version: 1,
            action: SyncAction::Deleted,
            data: None,
        };

        let outcome = registry.dispatch(&ResourceKind::Zone.into(), bad);

        assert!(matches!(outcome, DispatchOutcome::Malformed(_)));
        assert_eq!(zones.last_version(), 0);
    }

    #[tokio::test]
    async fn test_refresh_runs_loaded_stores_concurrently() {
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (zones, zone_loader) = zone_store(&running, &peak);
        let (tables, table_loader) = zone_store(&running, &peak);
        let (idle, idle_loader) = zone_store(&running, &peak);
        let registry = StoreRegistry::new();
        registry.register(ResourceKind::Zone, zones.clone()).unwrap();
        registry.register(ResourceKind::Table, tables.clone()).unwrap();
        registry.register(ResourceKind::Tag, idle).unwrap();
        zones.fetch_all(false).await;
        tables.fetch_all(false).await;

        registry.refresh_all_loaded_stores().await;

        assert_eq!(zone_loader.calls.load(Ordering::SeqCst), 2);
        assert_eq!(table_loader.calls.load(Ordering::SeqCst), 2);
        assert_eq!(idle_loader.calls.load(Ordering::SeqCst), 0);
        assert_eq!(peak.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_loaded_stores_and_clear_all() {
        let counters = (Arc::default(), Arc::default());
        let (zones, _) = zone_store(&counters.0, &counters.1);
        let (tables, _) = zone_store(&counters.0, &counters.1);
        let registry = StoreRegistry::new();
        registry.register(ResourceKind::Zone, zones.clone()).unwrap();
        registry.register(ResourceKind::Table, tables.clone()).unwrap();
        zones.fetch_all(false).await;
        zones.apply_sync(SyncPayload::created(
            7,
            Zone {
                id: 2,
                name: "Bar".to_string(),
            },
        ));

        let loaded: Vec<_> = registry
            .get_loaded_stores()
            .into_iter()
            .map(|(kind, _)| kind)
            .collect();
        assert_eq!(loaded, vec![ResourceKind::Zone]);
        assert_eq!(registry.names(), vec![ResourceKind::Zone, ResourceKind::Table]);

        registry.clear_all_stores();

        assert!(registry.get_loaded_stores().is_empty());
        assert!(zones.is_empty());
        assert_eq!(zones.last_version(), 0);
    }
}
