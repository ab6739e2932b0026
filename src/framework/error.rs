//! # Store Errors
//!
//! Errors surfaced by the reconciliation engine and by the API seams it calls.
//!
//! Load failures never reach callers as `Err`: [`ResourceStore::fetch_all`](crate::framework::ResourceStore::fetch_all)
//! records them as a string in store state. Mutation failures (`create`, `update`, `remove`)
//! propagate unchanged so the UI layer can report them.

use std::time::Duration;

/// Errors that can occur within the store framework or its injected backend API.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A human-readable failure reported by the backend API, surfaced verbatim.
    #[error("{0}")]
    Api(String),
    #[error("Backend channel closed")]
    BackendClosed,
    #[error("Backend dropped response channel")]
    BackendDropped,
    #[error("fetch timed out after {0:?}")]
    Timeout(Duration),
    #[error("Malformed sync payload: {0}")]
    Decode(#[from] serde_json::Error),
}

impl StoreError {
    /// Shorthand for backend implementations reporting a failure message.
    pub fn api(message: impl Into<String>) -> Self {
        StoreError::Api(message.into())
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
