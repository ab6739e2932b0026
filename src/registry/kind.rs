//! # Resource Tags
//!
//! The server tags every broadcast with the name of the resource type it concerns. Known names
//! form the closed [`ResourceKind`] enumeration; anything else arrives as
//! [`ResourceTag::Unknown`] and is handled explicitly by the dispatcher.

use crate::registry::error::RegistryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every resource type the POS client caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Product,
    Category,
    Zone,
    Table,
    Employee,
    Role,
    PriceRule,
    KitchenPrinter,
    Order,
    Tag,
    Attribute,
    Spec,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 12] = [
        ResourceKind::Product,
        ResourceKind::Category,
        ResourceKind::Zone,
        ResourceKind::Table,
        ResourceKind::Employee,
        ResourceKind::Role,
        ResourceKind::PriceRule,
        ResourceKind::KitchenPrinter,
        ResourceKind::Order,
        ResourceKind::Tag,
        ResourceKind::Attribute,
        ResourceKind::Spec,
    ];

    /// The broadcast tag, exactly as the server emits it.
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Product => "product",
            ResourceKind::Category => "category",
            ResourceKind::Zone => "zone",
            ResourceKind::Table => "table",
            ResourceKind::Employee => "employee",
            ResourceKind::Role => "role",
            ResourceKind::PriceRule => "price_rule",
            ResourceKind::KitchenPrinter => "kitchen_printer",
            ResourceKind::Order => "order",
            ResourceKind::Tag => "tag",
            ResourceKind::Attribute => "attribute",
            ResourceKind::Spec => "spec",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = RegistryError;

    /// Matches the tag exactly; `"Product"` or `"products"` are unknown.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| RegistryError::UnknownResource(s.to_string()))
    }
}

/// A resource tag as received from the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResourceTag {
    Known(ResourceKind),
    Unknown(String),
}

impl ResourceTag {
    pub fn kind(&self) -> Option<ResourceKind> {
        match self {
            ResourceTag::Known(kind) => Some(*kind),
            ResourceTag::Unknown(_) => None,
        }
    }
}

impl From<String> for ResourceTag {
    fn from(tag: String) -> Self {
        match tag.parse() {
            Ok(kind) => ResourceTag::Known(kind),
            Err(_) => ResourceTag::Unknown(tag),
        }
    }
}

impl From<&str> for ResourceTag {
    fn from(tag: &str) -> Self {
        ResourceTag::from(tag.to_string())
    }
}

impl From<ResourceKind> for ResourceTag {
    fn from(kind: ResourceKind) -> Self {
        ResourceTag::Known(kind)
    }
}

impl From<ResourceTag> for String {
    fn from(tag: ResourceTag) -> Self {
        match tag {
            ResourceTag::Known(kind) => kind.as_str().to_string(),
            ResourceTag::Unknown(tag) => tag,
        }
    }
}

impl fmt::Display for ResourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceTag::Known(kind) => f.write_str(kind.as_str()),
            ResourceTag::Unknown(tag) => f.write_str(tag),
        }
    }
}
