//! POS resource types cached on the client, implementing [`StoreEntity`](crate::framework::StoreEntity).
//!
//! Each type carries only what the cache needs: its typed id and the fields the server
//! broadcasts. Business rules (pricing, order workflow) live on the server.

use crate::framework::StoreEntity;
use crate::registry::ResourceKind;

/// Binds a model type to the tag the server broadcasts its changes under.
pub trait PosResource: StoreEntity {
    const KIND: ResourceKind;
}

/// Declares a type-safe id that serializes as the bare wire value.
macro_rules! resource_id {
    ($(#[$meta:meta])* $name:ident($inner:ty)) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub $inner);

        impl From<$inner> for $name {
            fn from(id: $inner) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

/// Implements [`StoreEntity`] and [`PosResource`] for a model type with an `id` field.
macro_rules! pos_resource {
    ($entity:ty, $id:ty, $create:ty, $update:ty, $kind:expr) => {
        impl $crate::framework::StoreEntity for $entity {
            type Id = $id;
            type Create = $create;
            type Update = $update;

            fn id(&self) -> $id {
                self.id.clone()
            }
        }

        impl $crate::model::PosResource for $entity {
            const KIND: $crate::registry::ResourceKind = $kind;
        }
    };
}

pub mod catalog;
pub mod floor;
pub mod order;
pub mod pricing;
pub mod printer;
pub mod staff;

pub use catalog::*;
pub use floor::*;
pub use order::*;
pub use pricing::*;
pub use printer::*;
pub use staff::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_as_bare_values() {
        assert_eq!(serde_json::to_string(&ProductId(7)).unwrap(), "7");
        assert_eq!(
            serde_json::to_string(&OrderId("ord-1".to_string())).unwrap(),
            r#""ord-1""#
        );
        let id: TableId = serde_json::from_str("12").unwrap();
        assert_eq!(id, TableId(12));
        assert_eq!(id.to_string(), "12");
    }

    #[test]
    fn test_each_model_has_a_distinct_kind() {
        let kinds = [
            Product::KIND,
            Category::KIND,
            Zone::KIND,
            DiningTable::KIND,
            Employee::KIND,
            Role::KIND,
            PriceRule::KIND,
            KitchenPrinter::KIND,
            Order::KIND,
            Tag::KIND,
            Attribute::KIND,
            Spec::KIND,
        ];
        let mut sorted = kinds.to_vec();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), ResourceKind::ALL.len());
    }

    #[test]
    fn test_entity_decodes_from_wire() {
        let product: Product = serde_json::from_str(
            r#"{"id": 3, "name": "Flat White", "category_id": 1, "price": 3.5}"#,
        )
        .unwrap();

        assert_eq!(product.id(), ProductId(3));
        assert_eq!(product.category_id, CategoryId(1));
    }
}
