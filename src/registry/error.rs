//! Registry errors.

use crate::registry::kind::ResourceKind;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Existing entries are never replaced.
    #[error("a store is already registered for '{0}'")]
    AlreadyRegistered(ResourceKind),
    #[error("unknown resource type '{0}'")]
    UnknownResource(String),
}
