//! # Channel-Backed API Client
//!
//! This module defines the generic client that forwards store API calls to a backend bridge task.

use crate::framework::api::{ResourceApi, ResourceLoader};
use crate::framework::entity::StoreEntity;
use crate::framework::error::{StoreError, StoreResult};
use crate::framework::message::ApiRequest;
use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

/// ## ApiClient
///
/// `ApiClient<T>` implements [`ResourceLoader`] and [`ResourceApi`] by sending [`ApiRequest`]
/// messages over a Tokio mpsc channel and awaiting the answer on a oneshot channel. Whatever
/// owns the receiving end (an IPC handler, a test double) performs the actual backend call.
///
/// * **Cloneable** – holds only a sender, so cloning is inexpensive.
/// * **Failure mapping** – a closed channel is [`StoreError::BackendClosed`], a dropped
///   responder is [`StoreError::BackendDropped`].
pub struct ApiClient<T: StoreEntity> {
    sender: mpsc::Sender<ApiRequest<T>>,
}

impl<T: StoreEntity> Clone for ApiClient<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T: StoreEntity> ApiClient<T> {
    pub fn new(sender: mpsc::Sender<ApiRequest<T>>) -> Self {
        Self { sender }
    }

    /// Creates a client and the receiver its bridge task should serve.
    pub fn channel(buffer_size: usize) -> (Self, mpsc::Receiver<ApiRequest<T>>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        (Self::new(sender), receiver)
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<R, StoreError>>) -> ApiRequest<T>,
    ) -> StoreResult<R> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| StoreError::BackendClosed)?;
        response.await.map_err(|_| StoreError::BackendDropped)?
    }
}

#[async_trait]
impl<T: StoreEntity> ResourceLoader<T> for ApiClient<T> {
    async fn fetch_all(&self) -> StoreResult<Vec<T>> {
        self.request(|respond_to| ApiRequest::FetchAll { respond_to })
            .await
    }
}

#[async_trait]
impl<T: StoreEntity> ResourceApi<T> for ApiClient<T> {
    async fn create(&self, params: T::Create) -> StoreResult<T> {
        self.request(|respond_to| ApiRequest::Create { params, respond_to })
            .await
    }

    async fn update(&self, id: T::Id, update: T::Update) -> StoreResult<T> {
        self.request(|respond_to| ApiRequest::Update {
            id,
            update,
            respond_to,
        })
        .await
    }

    async fn remove(&self, id: T::Id) -> StoreResult<()> {
        self.request(|respond_to| ApiRequest::Remove { id, respond_to })
            .await
    }
}
