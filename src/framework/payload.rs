//! # Sync Payloads
//!
//! The `{id, version, action, data}` envelope the server broadcasts for every change to a
//! resource. `version` is a per-resource-type sequence number; it means nothing across types.

use crate::framework::entity::StoreEntity;
use crate::framework::error::StoreResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of change a sync payload describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncAction {
    Created,
    Updated,
    Deleted,
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncAction::Created => "created",
            SyncAction::Updated => "updated",
            SyncAction::Deleted => "deleted",
        };
        f.write_str(name)
    }
}

/// A typed change notification for one entity.
///
/// `data` is `None` for deletions; a `created`/`updated` payload without data is accepted
/// in sequence but changes nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "T: StoreEntity")]
pub struct SyncPayload<T: StoreEntity> {
    pub id: T::Id,
    pub version: u64,
    pub action: SyncAction,
    pub data: Option<T>,
}

impl<T: StoreEntity> SyncPayload<T> {
    pub fn created(version: u64, data: T) -> Self {
        Self {
            id: data.id(),
            version,
            action: SyncAction::Created,
            data: Some(data),
        }
    }

    pub fn updated(version: u64, data: T) -> Self {
        Self {
            id: data.id(),
            version,
            action: SyncAction::Updated,
            data: Some(data),
        }
    }

    pub fn deleted(version: u64, id: T::Id) -> Self {
        Self {
            id,
            version,
            action: SyncAction::Deleted,
            data: None,
        }
    }
}

/// A sync payload as delivered by the transport, before the target store is known.
///
/// The registry routes it by resource tag; the receiving store decodes it into its own
/// entity type with [`RawSyncPayload::decode`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSyncPayload {
    pub id: serde_json::Value,
    pub version: u64,
    pub action: SyncAction,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl RawSyncPayload {
    /// Decodes the untyped id and data into `T`'s types.
    ///
    /// A JSON `null` in `data` decodes to `None`.
    pub fn decode<T: StoreEntity>(self) -> StoreResult<SyncPayload<T>> {
        let id = serde_json::from_value(self.id)?;
        let data = match self.data {
            None | Some(serde_json::Value::Null) => None,
            Some(value) => Some(serde_json::from_value(value)?),
        };
        Ok(SyncPayload {
            id,
            version: self.version,
            action: self.action,
            data,
        })
    }
}

/// Which branch of the reconciliation algorithm handled a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The payload was contiguous (or bootstrap) and the watermark advanced to its version.
    Applied,
    /// The payload's version was at or below the watermark; it was discarded.
    Stale,
    /// One or more versions were missed; the payload was discarded.
    /// `refreshing` is true when a full reload was triggered.
    Gap { refreshing: bool },
}
