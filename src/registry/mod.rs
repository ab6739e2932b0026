//! Routing of server broadcasts to the store that caches each resource type.
//!
//! # Main Components
//!
//! - [`ResourceKind`] / [`ResourceTag`] - Closed set of broadcast tags, plus the unknown fallback
//! - [`SyncMessage`] - Tag and untyped payload, as delivered by the transport
//! - [`RegistryStore`] - Object-safe view of a store
//! - [`StoreRegistry`] - Dispatch table with bulk refresh and clear
//! - [`RegistryError`] - Registration and tag parsing errors

pub mod error;
pub mod kind;
pub mod message;
pub mod store;
pub mod store_registry;

pub use error::RegistryError;
pub use kind::{ResourceKind, ResourceTag};
pub use message::SyncMessage;
pub use store::RegistryStore;
pub use store_registry::{DispatchOutcome, StoreRegistry};
