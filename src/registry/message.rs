//! The wire envelope routed by the registry.

use crate::framework::RawSyncPayload;
use crate::registry::kind::ResourceTag;
use serde::{Deserialize, Serialize};

/// One broadcast from the server: the resource tag and the untyped change payload.
///
/// ```json
/// {"resource": "product", "payload": {"id": 1, "version": 3, "action": "created", "data": {...}}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncMessage {
    pub resource: ResourceTag,
    pub payload: RawSyncPayload,
}

impl SyncMessage {
    pub fn new(resource: impl Into<ResourceTag>, payload: RawSyncPayload) -> Self {
        Self {
            resource: resource.into(),
            payload,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
