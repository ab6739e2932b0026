//! # Resource Store
//!
//! This module defines the `ResourceStore`, the reconciliation unit for one resource type.
//! It owns the local copy of the collection and merges three sources of truth into it:
//! the bulk load, the server's versioned change stream, and local optimistic mutations
//! (see [`CrudResourceStore`](crate::framework::CrudResourceStore)).

use crate::framework::api::ResourceLoader;
use crate::framework::config::StoreConfig;
use crate::framework::entity::StoreEntity;
use crate::framework::error::StoreError;
use crate::framework::payload::{SyncAction, SyncOutcome, SyncPayload};
use futures::future::{BoxFuture, FutureExt, Shared};
use indexmap::IndexMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

type InFlightFetch = Shared<BoxFuture<'static, ()>>;

/// The generic store that caches one resource collection.
///
/// # Architecture Note
/// The store is a cheap, cloneable handle. All clones share one state, guarded by a mutex that
/// is only ever held for the duration of a synchronous state transition, never across an
/// `.await`. That keeps [`apply_sync`](Self::apply_sync) synchronous, so the dispatcher never
/// suspends while applying a message.
///
/// # Reconciliation
///
/// * **Bulk load** ([`fetch_all`](Self::fetch_all)): replaces `items` wholesale. Single-flight:
///   concurrent callers share one in-flight future and the loader runs once. Does not touch the
///   version watermark.
/// * **Incremental sync** ([`apply_sync`](Self::apply_sync)): stale payloads are discarded, a gap
///   triggers a background reload, contiguous payloads are applied and advance the watermark.
/// * **Reset** ([`clear`](Self::clear)): back to the pristine pre-load state.
pub struct ResourceStore<T: StoreEntity> {
    inner: Arc<Inner<T>>,
}

impl<T: StoreEntity> Clone for ResourceStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<T: StoreEntity> {
    entity_type: &'static str,
    loader: Arc<dyn ResourceLoader<T>>,
    config: StoreConfig,
    state: Mutex<State<T>>,
    revision: watch::Sender<u64>,
}

struct State<T: StoreEntity> {
    items: IndexMap<T::Id, T>,
    is_loading: bool,
    is_loaded: bool,
    error: Option<String>,
    last_version: u64,
    in_flight: Option<InFlightFetch>,
}

/// A point-in-time copy of a store's observable state.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSnapshot<T> {
    pub items: Vec<T>,
    pub is_loading: bool,
    pub is_loaded: bool,
    pub error: Option<String>,
    pub last_version: u64,
}

impl<T: StoreEntity> Inner<T> {
    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }

    async fn load(self: Arc<Self>) {
        debug!(entity_type = self.entity_type, "Loading");
        let result = match self.config.fetch_timeout {
            Some(limit) => tokio::time::timeout(limit, self.loader.fetch_all())
                .await
                .unwrap_or_else(|_| Err(StoreError::Timeout(limit))),
            None => self.loader.fetch_all().await,
        };
        self.finish_load(result);
    }

    fn finish_load(&self, result: Result<Vec<T>, StoreError>) {
        let entity_type = self.entity_type;
        let mut state = self.lock();
        state.is_loading = false;
        state.in_flight = None;
        match result {
            Ok(items) => {
                state.items = items.into_iter().map(|item| (item.id(), item)).collect();
                state.is_loaded = true;
                info!(entity_type, size = state.items.len(), "Loaded");
            }
            Err(e) => {
                // Stale-but-present beats empty: items stay as they were.
                warn!(entity_type, error = %e, "Load failed");
                state.error = Some(e.to_string());
            }
        }
        drop(state);
        self.notify();
    }
}

impl<T: StoreEntity> ResourceStore<T> {
    /// Creates an empty, unloaded store backed by `loader`.
    pub fn new(loader: Arc<dyn ResourceLoader<T>>) -> Self {
        Self::with_config(loader, StoreConfig::default())
    }

    pub fn with_config(loader: Arc<dyn ResourceLoader<T>>, config: StoreConfig) -> Self {
        // Extract just the type name (e.g., "Product" instead of "pos_sync::model::catalog::Product")
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                entity_type,
                loader,
                config,
                state: Mutex::new(State {
                    items: IndexMap::new(),
                    is_loading: false,
                    is_loaded: false,
                    error: None,
                    last_version: 0,
                    in_flight: None,
                }),
                revision,
            }),
        }
    }

    /// The short type name used in log fields.
    pub fn entity_type(&self) -> &'static str {
        self.inner.entity_type
    }

    // --- Bulk load ---

    /// Loads the full collection from the injected loader.
    ///
    /// * If a load is already in flight, waits for that load instead of starting another.
    /// * If the store is loaded and `force` is false, returns immediately.
    /// * On success `items` is replaced and the store becomes loaded; on failure the message
    ///   is recorded in [`error`](Self::error) and `items` is left untouched.
    #[instrument(skip(self), fields(entity_type = self.inner.entity_type))]
    pub async fn fetch_all(&self, force: bool) {
        if let Some(fetch) = self.begin_fetch(force) {
            fetch.await;
        }
    }

    /// Waits for the in-flight load, if there is one.
    pub async fn wait_for_fetch(&self) {
        let pending = self.inner.lock().in_flight.clone();
        if let Some(fetch) = pending {
            fetch.await;
        }
    }

    /// Applies the single-flight and load-once guards and, when a load is due, installs the
    /// shared in-flight future. Marks the store as loading before returning.
    fn begin_fetch(&self, force: bool) -> Option<InFlightFetch> {
        let entity_type = self.inner.entity_type;
        let mut state = self.inner.lock();
        if let Some(pending) = &state.in_flight {
            debug!(entity_type, "Joining in-flight fetch");
            return Some(pending.clone());
        }
        if state.is_loaded && !force {
            debug!(entity_type, "Already loaded");
            return None;
        }

        state.is_loading = true;
        state.error = None;
        let fetch = Arc::clone(&self.inner).load().boxed().shared();
        state.in_flight = Some(fetch.clone());
        drop(state);

        self.inner.notify();
        Some(fetch)
    }

    fn refresh_in_background(&self) {
        let Some(fetch) = self.begin_fetch(true) else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(fetch);
            }
            Err(_) => warn!(
                entity_type = self.inner.entity_type,
                "No async runtime; refresh deferred to the next fetch"
            ),
        }
    }

    // --- Incremental sync ---

    /// Reconciles one server change notification with the local collection.
    ///
    /// 1. A version at or below the watermark is stale and discarded (idempotence).
    /// 2. A version more than one past the watermark means messages were missed: the payload
    ///    is discarded and, if the store is loaded, a full reload runs in the background.
    /// 3. Otherwise (contiguous, or the bootstrap watermark `0`) the action is applied and the
    ///    watermark moves to the payload's version, even when nothing visible changed.
    pub fn apply_sync(&self, payload: SyncPayload<T>) -> SyncOutcome {
        let entity_type = self.inner.entity_type;
        let mut state = self.inner.lock();
        let last_version = state.last_version;

        if last_version > 0 && payload.version <= last_version {
            debug!(entity_type, version = payload.version, last_version, "Stale sync discarded");
            return SyncOutcome::Stale;
        }

        if last_version > 0 && payload.version > last_version.saturating_add(1) {
            let refreshing = state.is_loaded;
            drop(state);
            warn!(
                entity_type,
                version = payload.version,
                last_version,
                refreshing,
                "Sync gap detected"
            );
            if refreshing {
                self.refresh_in_background();
            }
            return SyncOutcome::Gap { refreshing };
        }

        let SyncPayload {
            id,
            version,
            action,
            data,
        } = payload;
        if let Some(item) = &data {
            let data_id = item.id();
            if data_id != id {
                warn!(
                    entity_type,
                    %id,
                    %data_id,
                    "Sync payload id disagrees with its data; keyed by data"
                );
            }
        }
        match (action, data) {
            // Replaces an optimistic copy with the same id instead of duplicating it.
            (SyncAction::Created, Some(item)) => {
                state.items.insert(item.id(), item);
            }
            (SyncAction::Updated, Some(item)) => match state.items.get_mut(&item.id()) {
                Some(slot) => *slot = item,
                None => debug!(entity_type, %id, "Update for item not held locally"),
            },
            (SyncAction::Deleted, _) => {
                state.items.shift_remove(&id);
            }
            (_, None) => debug!(entity_type, %id, %action, "Sync payload without data"),
        }
        state.last_version = version;
        info!(entity_type, %id, version, %action, size = state.items.len(), "Applied sync");
        drop(state);

        self.inner.notify();
        SyncOutcome::Applied
    }

    /// Returns true if `server_version` is newer than anything this store has accepted.
    pub fn check_version(&self, server_version: u64) -> bool {
        server_version > self.inner.lock().last_version
    }

    /// Resets to the pristine pre-load state. An in-flight load is left running.
    pub fn clear(&self) {
        let mut state = self.inner.lock();
        state.items.clear();
        state.is_loaded = false;
        state.error = None;
        state.last_version = 0;
        drop(state);

        info!(entity_type = self.inner.entity_type, "Cleared");
        self.inner.notify();
    }

    // --- Read selectors ---

    pub fn get_by_id(&self, id: &T::Id) -> Option<T> {
        self.inner.lock().items.get(id).cloned()
    }

    pub fn contains(&self, id: &T::Id) -> bool {
        self.inner.lock().items.contains_key(id)
    }

    /// All items, in the order they were first inserted.
    pub fn items(&self) -> Vec<T> {
        self.inner.lock().items.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_loading(&self) -> bool {
        self.inner.lock().is_loading
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.lock().is_loaded
    }

    pub fn error(&self) -> Option<String> {
        self.inner.lock().error.clone()
    }

    pub fn last_version(&self) -> u64 {
        self.inner.lock().last_version
    }

    pub fn snapshot(&self) -> StoreSnapshot<T> {
        let state = self.inner.lock();
        StoreSnapshot {
            items: state.items.values().cloned().collect(),
            is_loading: state.is_loading,
            is_loaded: state.is_loaded,
            error: state.error.clone(),
            last_version: state.last_version,
        }
    }

    /// Subscribes to state changes. The value is a revision counter bumped on every change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    // --- Local mutations (used by CrudResourceStore) ---

    /// Inserts `item`, replacing any entry with the same id in place.
    pub(crate) fn upsert(&self, item: T) {
        let id = item.id();
        self.inner.lock().items.insert(id, item);
        self.inner.notify();
    }

    /// Inserts `item` only if no entry with its id exists. Returns whether it was inserted.
    pub(crate) fn insert_if_absent(&self, item: T) -> bool {
        let id = item.id();
        let mut state = self.inner.lock();
        if state.items.contains_key(&id) {
            return false;
        }
        state.items.insert(id, item);
        drop(state);
        self.inner.notify();
        true
    }

    /// Replaces the entry with `id`, if present. Returns whether it was replaced.
    pub(crate) fn replace(&self, id: &T::Id, item: T) -> bool {
        let mut state = self.inner.lock();
        let Some(slot) = state.items.get_mut(id) else {
            return false;
        };
        *slot = item;
        drop(state);
        self.inner.notify();
        true
    }

    /// Removes the entry with `id`. Returns whether anything was removed.
    pub(crate) fn remove_item(&self, id: &T::Id) -> bool {
        let removed = self.inner.lock().items.shift_remove(id).is_some();
        if removed {
            self.inner.notify();
        }
        removed
    }

    /// Rewrites the entry with `id` through `updater` and optionally raises the watermark.
    ///
    /// The watermark never decreases. Returns whether an entry was rewritten.
    ///
    /// `updater` runs without the lock held, so it may read this store. If the entry is
    /// removed while `updater` runs, nothing is written back.
    pub(crate) fn update_with(
        &self,
        id: &T::Id,
        updater: impl FnOnce(&T) -> T,
        version: Option<u64>,
    ) -> bool {
        let entity_type = self.inner.entity_type;
        let current = self.inner.lock().items.get(id).cloned();
        let rewritten = current.map(|item| updater(&item));

        let mut state = self.inner.lock();
        let updated = match (rewritten, state.items.get_mut(id)) {
            (Some(item), Some(slot)) => {
                *slot = item;
                true
            }
            _ => false,
        };
        let mut raised = false;
        if let Some(version) = version {
            let last_version = state.last_version;
            if last_version > 0 && version > last_version.saturating_add(1) {
                warn!(
                    entity_type,
                    version, last_version, "Optimistic version skips ahead; a gap may be masked"
                );
            }
            raised = version > last_version;
            state.last_version = last_version.max(version);
        }
        drop(state);

        if updated || raised {
            self.inner.notify();
        }
        updated
    }
}
