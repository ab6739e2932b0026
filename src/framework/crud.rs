//! # CRUD Resource Store
//!
//! Adds server-backed mutations and optimistic local mutations on top of a [`ResourceStore`].
//!
//! Two paths converge on the same collection:
//! - **Caller-initiated** (`create`/`update`/`remove`, `optimistic_*`): the user clicked save and
//!   the UI wants the result now.
//! - **Server-initiated** ([`ResourceStore::apply_sync`]): another terminal's change arrives later.
//!
//! Both paths de-duplicate by id, which is what makes them safe to race against each other.

use crate::framework::api::{ResourceApi, ResourceLoader};
use crate::framework::config::StoreConfig;
use crate::framework::entity::StoreEntity;
use crate::framework::error::StoreResult;
use crate::framework::store::ResourceStore;
use async_trait::async_trait;
use std::ops::Deref;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// A [`ResourceStore`] with server-backed create/update/remove and optimistic helpers.
///
/// Dereferences to the underlying store, so every read selector, `fetch_all` and
/// `apply_sync` are available directly.
pub struct CrudResourceStore<T: StoreEntity> {
    store: ResourceStore<T>,
    api: Arc<dyn ResourceApi<T>>,
}

impl<T: StoreEntity> Clone for CrudResourceStore<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            api: Arc::clone(&self.api),
        }
    }
}

/// Lets the bulk loader go through the same API handle as the mutations.
struct ApiLoader<T: StoreEntity>(Arc<dyn ResourceApi<T>>);

#[async_trait]
impl<T: StoreEntity> ResourceLoader<T> for ApiLoader<T> {
    async fn fetch_all(&self) -> StoreResult<Vec<T>> {
        self.0.fetch_all().await
    }
}

impl<T: StoreEntity> Deref for CrudResourceStore<T> {
    type Target = ResourceStore<T>;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

impl<T: StoreEntity> CrudResourceStore<T> {
    pub fn new(api: Arc<dyn ResourceApi<T>>) -> Self {
        Self::with_config(api, StoreConfig::default())
    }

    pub fn with_config(api: Arc<dyn ResourceApi<T>>, config: StoreConfig) -> Self {
        let loader = Arc::new(ApiLoader(Arc::clone(&api)));
        Self {
            store: ResourceStore::with_config(loader, config),
            api,
        }
    }

    /// The underlying reconciliation store.
    pub fn store(&self) -> &ResourceStore<T> {
        &self.store
    }

    // --- Server-backed mutations ---

    /// Creates the entity on the server and inserts the server's version locally.
    ///
    /// If a sync message already delivered the same id, the entry is replaced rather than
    /// duplicated. On failure nothing changes locally and the error is returned.
    #[instrument(skip(self), fields(entity_type = self.store.entity_type()))]
    pub async fn create(&self, data: T::Create) -> StoreResult<T> {
        debug!("Sending create");
        let created = self.api.create(data).await.inspect_err(|e| {
            warn!(error = %e, "Create failed");
        })?;
        info!(id = %created.id(), "Created");
        self.store.upsert(created.clone());
        Ok(created)
    }

    /// Updates the entity on the server and replaces the local copy with the result.
    #[instrument(skip(self), fields(entity_type = self.store.entity_type()))]
    pub async fn update(&self, id: T::Id, data: T::Update) -> StoreResult<T> {
        debug!("Sending update");
        let updated = self.api.update(id.clone(), data).await.inspect_err(|e| {
            warn!(error = %e, "Update failed");
        })?;
        if self.store.replace(&id, updated.clone()) {
            info!("Updated");
        } else {
            debug!("Updated entity not held locally");
        }
        Ok(updated)
    }

    /// Removes the entity on the server, then locally.
    #[instrument(skip(self), fields(entity_type = self.store.entity_type()))]
    pub async fn remove(&self, id: T::Id) -> StoreResult<()> {
        debug!("Sending remove");
        self.api.remove(id.clone()).await.inspect_err(|e| {
            warn!(error = %e, "Remove failed");
        })?;
        self.store.remove_item(&id);
        info!("Removed");
        Ok(())
    }

    // --- Optimistic mutations ---

    /// Inserts `item` immediately, unless an entry with its id is already present.
    ///
    /// Returns whether the item was inserted.
    pub fn optimistic_add(&self, item: T) -> bool {
        let id = item.id();
        let inserted = self.store.insert_if_absent(item);
        debug!(entity_type = self.store.entity_type(), %id, inserted, "Optimistic add");
        inserted
    }

    /// Rewrites the entry with `id` immediately.
    ///
    /// When `version` is given the watermark is raised to it, so the server's matching sync
    /// message is later recognized as stale. The watermark is never lowered.
    pub fn optimistic_update(
        &self,
        id: &T::Id,
        updater: impl FnOnce(&T) -> T,
        version: Option<u64>,
    ) -> bool {
        let updated = self.store.update_with(id, updater, version);
        debug!(entity_type = self.store.entity_type(), %id, updated, ?version, "Optimistic update");
        updated
    }

    /// Removes the entry with `id` immediately. Returns whether anything was removed.
    pub fn optimistic_remove(&self, id: &T::Id) -> bool {
        let removed = self.store.remove_item(id);
        debug!(entity_type = self.store.entity_type(), %id, removed, "Optimistic remove");
        removed
    }
}
