//! # StoreEntity Trait
//!
//! The `StoreEntity` trait defines the contract every cached resource (Product, Table, Order, …)
//! must implement to be held by a [`ResourceStore`](crate::framework::ResourceStore). It names the
//! identifier type and the DTOs used for server-backed mutations, and exposes the entity's id.
//!
//! # Architecture Note
//! By defining one contract that all resource types satisfy, the reconciliation algorithm
//! (bulk load, versioned incremental sync, optimistic mutation) is written *once* and reused for
//! every resource type.
//!
//! Associated types keep the mutation paths type-safe: a `Product` store accepts a
//! `ProductCreate` payload, and the compiler rejects a `CategoryCreate`.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any resource entity must implement to be cached by a `ResourceStore`.
///
/// Entities are value objects: the store owns the canonical copy and hands out clones.
/// The serde bounds let the registry decode type-erased wire payloads into `Self`.
pub trait StoreEntity: Clone + Debug + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// The unique identifier for this entity, scoped to its resource type.
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug + Serialize + DeserializeOwned;

    /// The data required to create a new instance on the server.
    type Create: Send + Sync + Debug + Serialize;

    /// The data required to update an existing instance on the server.
    type Update: Send + Sync + Debug + Serialize;

    /// Returns this entity's identifier.
    fn id(&self) -> Self::Id;
}
