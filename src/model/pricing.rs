use crate::registry::ResourceKind;
use serde::{Deserialize, Serialize};

resource_id!(PriceRuleId(u32));

/// A discount or surcharge. The client only caches it; the server evaluates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRule {
    pub id: PriceRuleId,
    pub name: String,
    pub percent: f64,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRuleCreate {
    pub name: String,
    pub percent: f64,
    pub active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceRuleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

pos_resource!(PriceRule, PriceRuleId, PriceRuleCreate, PriceRuleUpdate, ResourceKind::PriceRule);
