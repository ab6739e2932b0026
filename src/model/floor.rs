//! Floor plan: zones and the dining tables placed in them.

use crate::registry::ResourceKind;
use serde::{Deserialize, Serialize};

resource_id!(ZoneId(u32));
resource_id!(TableId(u32));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneCreate {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

pos_resource!(Zone, ZoneId, ZoneCreate, ZoneUpdate, ResourceKind::Zone);

/// A table guests sit at. Broadcast under the `table` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiningTable {
    pub id: TableId,
    pub zone_id: ZoneId,
    pub name: String,
    pub seats: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiningTableCreate {
    pub zone_id: ZoneId,
    pub name: String,
    pub seats: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiningTableUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<ZoneId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seats: Option<u32>,
}

pos_resource!(DiningTable, TableId, DiningTableCreate, DiningTableUpdate, ResourceKind::Table);
