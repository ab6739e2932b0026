//! # Mock Backend & Testing Guide
//!
//! Stores call their backend through [`ResourceLoader`](crate::framework::ResourceLoader) and
//! [`ResourceApi`](crate::framework::ResourceApi). This module provides two ways to stand in for
//! that backend in tests without any network or IPC.
//!
//! ## When to use which
//!
//! | Feature | [`MockApi`] (expectation queue) | [`create_mock_api`] (raw channel) |
//! |---------|------------|------------|
//! | **Style** | Declare responses up front | Answer each request by hand |
//! | **Timing** | Answers immediately | Test decides *when* to answer |
//! | **Use Case** | CRUD flows, error injection | Single-flight, races, in-flight state |
//!
//! ## Pattern 1: Expectation Queue
//!
//! ```rust
//! use pos_sync::framework::mock::MockApi;
//! use pos_sync::framework::{CrudResourceStore, StoreEntity, StoreError};
//! use serde::{Deserialize, Serialize};
//! use std::sync::Arc;
//!
//! #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
//! struct Zone { id: u32, name: String }
//! #[derive(Debug, Serialize)] struct ZoneCreate { name: String }
//!
//! impl StoreEntity for Zone {
//!     type Id = u32; type Create = ZoneCreate; type Update = ();
//!     fn id(&self) -> u32 { self.id }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockApi::<Zone>::new();
//!     mock.expect_fetch().return_ok(vec![Zone { id: 1, name: "Patio".into() }]);
//!     mock.expect_create().return_err(StoreError::api("zone limit reached"));
//!
//!     let zones = CrudResourceStore::new(Arc::new(mock.api()));
//!     zones.fetch_all(false).await;
//!     let result = zones.create(ZoneCreate { name: "Bar".into() }).await;
//!
//!     assert!(result.is_err());
//!     assert_eq!(zones.len(), 1);
//!     mock.verify();
//! }
//! ```
//!
//! ## Pattern 2: Raw Channel
//!
//! ```rust,ignore
//! let (api, mut requests) = create_mock_api::<Zone>(10);
//! let store = ResourceStore::new(Arc::new(api));
//!
//! let first = tokio::spawn({ let s = store.clone(); async move { s.fetch_all(false).await } });
//! let responder = expect_fetch(&mut requests).await.expect("Expected FetchAll request");
//! assert!(store.is_loading());
//! responder.send(Ok(vec![])).unwrap();
//! first.await.unwrap();
//! ```

use crate::framework::client::ApiClient;
use crate::framework::entity::StoreEntity;
use crate::framework::error::StoreError;
use crate::framework::message::{ApiRequest, Response};
use std::collections::VecDeque;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// An expected request to the mock backend and the response to give it.
enum Expectation<T: StoreEntity> {
    FetchAll {
        response: Result<Vec<T>, StoreError>,
    },
    Create {
        response: Result<T, StoreError>,
    },
    Update {
        id: T::Id,
        response: Result<T, StoreError>,
    },
    Remove {
        id: T::Id,
        response: Result<(), StoreError>,
    },
}

type Expectations<T> = Arc<Mutex<VecDeque<Expectation<T>>>>;

/// A mock backend with expectation tracking for fluent testing.
///
/// Expectations are consumed in order. A request that does not match the next expectation
/// panics the serving task, which the caller observes as [`StoreError::BackendDropped`].
pub struct MockApi<T: StoreEntity> {
    client: ApiClient<T>,
    expectations: Expectations<T>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: StoreEntity> Default for MockApi<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: StoreEntity> MockApi<T> {
    /// Creates a new mock with no expectations. Must be called inside a Tokio runtime.
    pub fn new() -> Self {
        let (client, mut receiver) = ApiClient::channel(100);
        let expectations: Expectations<T> = Arc::new(Mutex::new(VecDeque::new()));
        let expectations_clone = expectations.clone();

        // Spawn background task to answer requests
        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let expectation = expectations_clone.lock().unwrap().pop_front();

                match (request, expectation) {
                    (ApiRequest::FetchAll { respond_to }, Some(Expectation::FetchAll { response })) => {
                        let _ = respond_to.send(response);
                    }
                    (ApiRequest::Create { respond_to, .. }, Some(Expectation::Create { response })) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        ApiRequest::Update { id, respond_to, .. },
                        Some(Expectation::Update { id: expected, response }),
                    ) => {
                        assert_eq!(id, expected, "update for unexpected id");
                        let _ = respond_to.send(response);
                    }
                    (
                        ApiRequest::Remove { id, respond_to },
                        Some(Expectation::Remove { id: expected, response }),
                    ) => {
                        assert_eq!(id, expected, "remove for unexpected id");
                        let _ = respond_to.send(response);
                    }
                    (request, _) => {
                        panic!("Unexpected request or expectation mismatch: {:?}", request);
                    }
                }
            }
        });

        Self {
            client,
            expectations,
            _handle: handle,
        }
    }

    /// Returns an API handle for the store under test.
    pub fn api(&self) -> ApiClient<T> {
        self.client.clone()
    }

    /// Expects a bulk `fetch_all`.
    pub fn expect_fetch(&mut self) -> ExpectationBuilder<T, Vec<T>> {
        self.builder(|response| Expectation::FetchAll { response })
    }

    /// Expects a `create`.
    pub fn expect_create(&mut self) -> ExpectationBuilder<T, T> {
        self.builder(|response| Expectation::Create { response })
    }

    /// Expects an `update` of `id`.
    pub fn expect_update(&mut self, id: T::Id) -> ExpectationBuilder<T, T> {
        self.builder(move |response| Expectation::Update { id, response })
    }

    /// Expects a `remove` of `id`.
    pub fn expect_remove(&mut self, id: T::Id) -> ExpectationBuilder<T, ()> {
        self.builder(move |response| Expectation::Remove { id, response })
    }

    /// Number of expectations not yet consumed.
    pub fn remaining(&self) -> usize {
        self.expectations.lock().unwrap().len()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let remaining = self.remaining();
        if remaining > 0 {
            panic!("Not all expectations were met. {} remaining", remaining);
        }
    }

    fn builder<R>(
        &mut self,
        make: impl FnOnce(Result<R, StoreError>) -> Expectation<T> + 'static,
    ) -> ExpectationBuilder<T, R> {
        ExpectationBuilder {
            expectations: self.expectations.clone(),
            make: Box::new(make),
            _response: PhantomData,
        }
    }
}

/// Builder that completes one expectation with its response.
pub struct ExpectationBuilder<T: StoreEntity, R> {
    expectations: Expectations<T>,
    make: Box<dyn FnOnce(Result<R, StoreError>) -> Expectation<T>>,
    _response: PhantomData<R>,
}

impl<T: StoreEntity, R> ExpectationBuilder<T, R> {
    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: R) {
        self.push(Ok(value));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: StoreError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<R, StoreError>) {
        let expectation = (self.make)(response);
        self.expectations.lock().unwrap().push_back(expectation);
    }
}

// =============================================================================
// RAW CHANNEL HELPERS
// =============================================================================

/// Creates an API handle and the receiver its requests arrive on.
///
/// The test answers each request itself through the responder carried in the message, which
/// makes it possible to hold a request open and observe the store while it is in flight.
pub fn create_mock_api<T: StoreEntity>(
    buffer_size: usize,
) -> (ApiClient<T>, mpsc::Receiver<ApiRequest<T>>) {
    ApiClient::channel(buffer_size)
}

/// Helper to verify that the next message is a FetchAll request
pub async fn expect_fetch<T: StoreEntity>(
    receiver: &mut mpsc::Receiver<ApiRequest<T>>,
) -> Option<Response<Vec<T>>> {
    match receiver.recv().await {
        Some(ApiRequest::FetchAll { respond_to }) => Some(respond_to),
        _ => None,
    }
}

/// Helper to verify that the next message is a Create request
pub async fn expect_create<T: StoreEntity>(
    receiver: &mut mpsc::Receiver<ApiRequest<T>>,
) -> Option<(T::Create, Response<T>)> {
    match receiver.recv().await {
        Some(ApiRequest::Create { params, respond_to }) => Some((params, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Update request
pub async fn expect_update<T: StoreEntity>(
    receiver: &mut mpsc::Receiver<ApiRequest<T>>,
) -> Option<(T::Id, T::Update, Response<T>)> {
    match receiver.recv().await {
        Some(ApiRequest::Update {
            id,
            update,
            respond_to,
        }) => Some((id, update, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Remove request
pub async fn expect_remove<T: StoreEntity>(
    receiver: &mut mpsc::Receiver<ApiRequest<T>>,
) -> Option<(T::Id, Response<()>)> {
    match receiver.recv().await {
        Some(ApiRequest::Remove { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}
