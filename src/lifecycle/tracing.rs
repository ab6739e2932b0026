//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a structured `tracing` subscriber for the whole sync layer.
//!
//! ## Configuration
//!
//! The subscriber uses a compact format that hides the crate/module prefix
//! (`with_target(false)`). Every store log line carries an `entity_type` field instead, and
//! registry lines carry `resource`, which keeps lines short while still telling stores apart.
//!
//! ## What Gets Traced
//!
//! - **Bulk loads**: start, size on success, error on failure (`fetch_all` span)
//! - **Sync messages**: applied payloads with `id`/`version`, stale discards, gaps
//! - **Mutations**: server-backed and optimistic create/update/remove
//! - **Routing**: unknown, unregistered and malformed messages the registry drops
//!
//! ## Usage Examples
//!
//! ```bash
//! # Accepted state changes, gaps and failures
//! RUST_LOG=info cargo test
//!
//! # Also stale discards, joined fetches and full payloads
//! RUST_LOG=debug cargo test
//!
//! # Only the registry
//! RUST_LOG=pos_sync::registry=debug cargo test
//! ```
//!
//! **With `RUST_LOG=info`**, a gap followed by its self-healing reload reads:
//!
//! ```text
//! INFO Applied sync entity_type="Product" id=4 version=3 action=created size=12
//! WARN Sync gap detected entity_type="Product" version=6 last_version=3 refreshing=true
//! INFO Loaded entity_type="Product" size=14
//! ```

/// Installs the global subscriber, filtered by `RUST_LOG`.
///
/// Calling it more than once is harmless: later calls leave the first subscriber in place,
/// so every test can call it.
pub fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // entity_type identifies the store instead
        .compact()
        .try_init();
}
