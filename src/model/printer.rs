//! Kitchen printers. Only cached when the printing module is enabled.

use crate::registry::ResourceKind;
use serde::{Deserialize, Serialize};

resource_id!(PrinterId(u32));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KitchenPrinter {
    pub id: PrinterId,
    pub name: String,
    /// Network address or device path.
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KitchenPrinterCreate {
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KitchenPrinterUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

pos_resource!(
    KitchenPrinter,
    PrinterId,
    KitchenPrinterCreate,
    KitchenPrinterUpdate,
    ResourceKind::KitchenPrinter
);
