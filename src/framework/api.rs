//! # Backend API Seams
//!
//! The store never talks to the network itself. The surrounding API layer injects these
//! traits per resource type: a loader for the full bulk list and, for mutable resources,
//! the server-backed create/update/remove calls.
//!
//! Implementations must return the *complete* collection from `fetch_all` (no pagination)
//! and report failures as [`StoreError`](crate::framework::StoreError) with a human-readable message.

use crate::framework::entity::StoreEntity;
use crate::framework::error::StoreResult;
use async_trait::async_trait;

/// Loads the full, current collection of one resource type.
#[async_trait]
pub trait ResourceLoader<T: StoreEntity>: Send + Sync {
    async fn fetch_all(&self) -> StoreResult<Vec<T>>;
}

/// Server-backed mutations for one resource type.
///
/// The returned entities are the server's authoritative versions and replace whatever the
/// store holds locally.
#[async_trait]
pub trait ResourceApi<T: StoreEntity>: ResourceLoader<T> {
    async fn create(&self, data: T::Create) -> StoreResult<T>;

    async fn update(&self, id: T::Id, data: T::Update) -> StoreResult<T>;

    async fn remove(&self, id: T::Id) -> StoreResult<()>;
}
