//! Error returned by write paths and services that reach the store.

use thiserror::Error;

use inventrack_core::DomainError;

use crate::store::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    /// Deterministic domain failure (validation, conflict, not found, invariant).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Infrastructure failure with no domain meaning.
    #[error("store failure: {0}")]
    Store(StoreError),
}

impl InventoryError {
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            InventoryError::Domain(e) => Some(e),
            InventoryError::Store(_) => None,
        }
    }
}

impl From<StoreError> for InventoryError {
    fn from(value: StoreError) -> Self {
        match value.to_domain() {
            Some(domain) => InventoryError::Domain(domain),
            None => InventoryError::Store(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inventrack_core::ConflictKind;

    #[test]
    fn store_errors_with_domain_meaning_become_domain_errors() {
        let err = InventoryError::from(StoreError::DuplicateSku("X-100".to_string()));
        assert!(err.domain().unwrap().is_conflict(ConflictKind::DuplicateSku));

        let err = InventoryError::from(StoreError::not_found("item", "abc"));
        assert_eq!(err.domain().unwrap().code(), "not_found");
    }

    #[test]
    fn infrastructure_errors_stay_store_errors() {
        let err = InventoryError::from(StoreError::Unavailable("down".to_string()));
        assert!(err.domain().is_none());
        assert_eq!(err.to_string(), "store failure: store unavailable: down");
    }
}
