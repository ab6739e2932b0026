//! # Backend Request Messages
//!
//! This module defines the message types exchanged between an [`ApiClient`](crate::framework::ApiClient)
//! and the task that bridges to the backend (an IPC handler in the application, a test double
//! in tests).

use crate::framework::entity::StoreEntity;
use crate::framework::error::StoreError;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by the backend bridge.
pub type Response<T> = oneshot::Sender<Result<T, StoreError>>;

/// A request for the backend bridge.
///
/// The variants map one-to-one onto [`ResourceLoader`](crate::framework::ResourceLoader) and
/// [`ResourceApi`](crate::framework::ResourceApi): a bulk list plus the three mutations.
/// Every variant carries its own responder, so requests can be answered out of order.
#[derive(Debug)]
pub enum ApiRequest<T: StoreEntity> {
    FetchAll {
        respond_to: Response<Vec<T>>,
    },
    Create {
        params: T::Create,
        respond_to: Response<T>,
    },
    Update {
        id: T::Id,
        update: T::Update,
        respond_to: Response<T>,
    },
    Remove {
        id: T::Id,
        respond_to: Response<()>,
    },
}
