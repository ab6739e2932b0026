//! Generic reconciliation engine for cached resource collections.
//!
//! This module provides the domain-agnostic building blocks that keep a client-side copy of a
//! server-authoritative collection consistent with the server's versioned change stream.
//!
//! # Main Components
//!
//! - [`StoreEntity`] - Trait that resource types implement to be cached by a store
//! - [`ResourceStore`] - Bulk load plus versioned incremental sync for one resource type
//! - [`CrudResourceStore`] - A `ResourceStore` with server-backed and optimistic mutations
//! - [`SyncPayload`] / [`RawSyncPayload`] - The `{id, version, action, data}` change envelope
//! - [`ResourceLoader`] / [`ResourceApi`] - Injected backend seams
//! - [`ApiClient`] - Channel-backed implementation of the backend seams
//! - [`StoreError`] - Common error type
//!
//! # Testing
//!
//! See [`mock`] module for utilities to test stores without a real backend.

pub mod api;
pub mod client;
pub mod config;
pub mod crud;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;
pub mod payload;
pub mod store;

pub use api::{ResourceApi, ResourceLoader};
pub use client::ApiClient;
pub use config::StoreConfig;
pub use crud::CrudResourceStore;
pub use entity::StoreEntity;
pub use error::{StoreError, StoreResult};
pub use message::{ApiRequest, Response};
pub use payload::{RawSyncPayload, SyncAction, SyncOutcome, SyncPayload};
pub use store::{ResourceStore, StoreSnapshot};
