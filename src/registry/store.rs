//! # Type-Erased Stores
//!
//! The registry holds stores of twelve different entity types side by side. [`RegistryStore`] is
//! the object-safe slice of a store's API that the registry needs: apply an untyped payload,
//! report whether it is loaded, refresh, clear.

use crate::framework::{
    CrudResourceStore, RawSyncPayload, ResourceStore, StoreEntity, StoreResult, SyncOutcome,
};
use async_trait::async_trait;

#[async_trait]
pub trait RegistryStore: Send + Sync {
    /// Short entity type name, for logs.
    fn entity_type(&self) -> &'static str;

    /// Decodes `payload` into the store's entity type and reconciles it.
    ///
    /// A payload that does not decode is rejected before it reaches the store, so it never
    /// moves the watermark.
    fn apply_raw(&self, payload: RawSyncPayload) -> StoreResult<SyncOutcome>;

    fn is_loaded(&self) -> bool;

    fn last_version(&self) -> u64;

    /// Forces a full reload.
    async fn refresh(&self);

    fn clear(&self);
}

#[async_trait]
impl<T: StoreEntity> RegistryStore for ResourceStore<T> {
    fn entity_type(&self) -> &'static str {
        ResourceStore::entity_type(self)
    }

    fn apply_raw(&self, payload: RawSyncPayload) -> StoreResult<SyncOutcome> {
        Ok(self.apply_sync(payload.decode::<T>()?))
    }

    fn is_loaded(&self) -> bool {
        ResourceStore::is_loaded(self)
    }

    fn last_version(&self) -> u64 {
        ResourceStore::last_version(self)
    }

    async fn refresh(&self) {
        self.fetch_all(true).await;
    }

    fn clear(&self) {
        ResourceStore::clear(self);
    }
}

#[async_trait]
impl<T: StoreEntity> RegistryStore for CrudResourceStore<T> {
    fn entity_type(&self) -> &'static str {
        self.store().entity_type()
    }

    fn apply_raw(&self, payload: RawSyncPayload) -> StoreResult<SyncOutcome> {
        RegistryStore::apply_raw(self.store(), payload)
    }

    fn is_loaded(&self) -> bool {
        self.store().is_loaded()
    }

    fn last_version(&self) -> u64 {
        self.store().last_version()
    }

    async fn refresh(&self) {
        self.store().fetch_all(true).await;
    }

    fn clear(&self) {
        self.store().clear();
    }
}
