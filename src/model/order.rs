//! Orders. The client never mutates them through the cache; it only loads them and follows
//! the server's broadcasts.

use crate::registry::ResourceKind;
use serde::{Deserialize, Serialize};

use super::TableId;

resource_id!(
    /// Orders are keyed by a server-generated string.
    OrderId(String)
);

impl From<&str> for OrderId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Open,
    Paid,
    Void,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub table_id: Option<TableId>,
    pub status: OrderStatus,
    pub total: f64,
}

impl Order {
    pub fn open(id: impl Into<OrderId>, table_id: Option<TableId>, total: f64) -> Self {
        Self {
            id: id.into(),
            table_id,
            status: OrderStatus::Open,
            total,
        }
    }
}

pos_resource!(Order, OrderId, (), (), ResourceKind::Order);
