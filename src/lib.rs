//! # POS Sync
//!
//! > **Client-side cache consistency for multi-terminal point-of-sale.**
//!
//! Every terminal keeps a local copy of the server's resources (products, tables, orders, …).
//! This crate keeps those copies consistent with the server by reconciling three sources of
//! change into one monotonically advancing view per resource type:
//!
//! 1. an initial **bulk load**,
//! 2. a stream of **versioned change notifications** pushed by the server, which may have gaps,
//! 3. **optimistic local mutations** that hide round-trip latency.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### One algorithm, every resource
//! You'll see `ResourceStore<T: StoreEntity>` everywhere. The reconciliation algorithm is written
//! **once** and applied identically to all twelve resource types.
//!
//! ### Versions, not timestamps
//! Each resource type has its own server-assigned sequence number. A store remembers the last
//! version it accepted (its *watermark*):
//! - `version <= watermark` → **stale**, discarded. Replays are idempotent.
//! - `version > watermark + 1` → **gap**, discarded, and a full reload repairs the store.
//! - otherwise → **applied**, and the watermark advances.
//!
//! ### Snapshot as the fallback
//! Whenever incremental application cannot be proven safe the store falls back to a fresh bulk
//! load. There is no retry logic and no coordinator.
//!
//! ## 👩‍💻 Architecture Notes
//!
//! ### 1. Type-Safe Error Handling
//! [`StoreError`](framework::StoreError) and [`RegistryError`](registry::RegistryError) are
//! `thiserror` enums. Load failures are recorded in store state; mutation failures are returned
//! to the caller; stale and gapped messages are outcomes, not errors.
//!
//! ### 2. Explicit Containers, No Globals
//! Stores are constructed with their backend handles injected and owned by a
//! [`PosSystem`](lifecycle::PosSystem). Tests build as many isolated systems as they need.
//!
//! ### 3. Concurrency Model
//! Store state sits behind a mutex that is never held across an `.await`, so applying a sync
//! message is synchronous. Bulk loads are single-flight: concurrent callers share one in-flight
//! future. A dispatcher task applies broadcasts one at a time, preserving per-resource order.
//!
//! ### 4. Observability
//! We use `tracing` everywhere with structured fields (`entity_type`, `resource`, `id`,
//! `version`). See the [`lifecycle::tracing`] module for details.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Engine ([`framework`])
//! The generic, domain-agnostic reconciliation engine.
//! - **Key items**: [`ResourceStore`](framework::ResourceStore),
//!   [`CrudResourceStore`](framework::CrudResourceStore), [`SyncPayload`](framework::SyncPayload).
//!
//! ### 2. The Router ([`registry`])
//! Maps the server's resource tags to stores, for code that only learns at runtime which
//! resource a message concerns.
//! - **Key items**: [`StoreRegistry`](registry::StoreRegistry), [`ResourceKind`](registry::ResourceKind).
//!
//! ### 3. The Orchestrator ([`lifecycle`])
//! Builds every store, registers it and runs the dispatcher.
//! - **Key items**: [`PosSystem`](lifecycle::PosSystem), [`SyncConfig`](lifecycle::SyncConfig).
//!
//! ### 4. The Resources ([`model`])
//! The twelve POS resource types with their typed ids and mutation DTOs.
//!
//! ## 🚀 Quick Start
//!
//! ### Running Tests
//!
//! ```bash
//! cargo test
//!
//! # With logs
//! RUST_LOG=debug cargo test -- --nocapture
//! ```

pub mod framework;
pub mod lifecycle;
pub mod model;
pub mod registry;
