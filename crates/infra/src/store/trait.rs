use thiserror::Error;

use inventrack_core::{
    CategoryId, ConflictKind, DomainError, ExpectedVersion, ItemId, LocationId,
};
use inventrack_inventory::{Category, InventoryItem, InventorySnapshot, Location, Sku, SnapshotFilter};

use std::sync::Arc;

/// Failures at the store boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("sku already issued: {0}")]
    DuplicateSku(String),

    #[error("{entity} name already taken: {name}")]
    DuplicateName { entity: &'static str, name: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("version mismatch (expected {expected:?}, actual {actual})")]
    VersionMismatch { expected: ExpectedVersion, actual: u64 },

    /// The write would change something the store treats as immutable.
    #[error("invalid write: {0}")]
    InvalidWrite(String),

    /// A stored row fails domain validation.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    /// The backend could not serve the request (poisoned lock, lost connection).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl core::fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Domain meaning of this failure, if it has one.
    pub fn to_domain(&self) -> Option<DomainError> {
        match self {
            StoreError::DuplicateSku(sku) => Some(DomainError::conflict(
                ConflictKind::DuplicateSku,
                format!("sku `{sku}` is already issued"),
            )),
            StoreError::DuplicateName { entity, name } => Some(DomainError::conflict(
                ConflictKind::DuplicateName,
                format!("{entity} `{name}` already exists"),
            )),
            StoreError::NotFound { entity, id } => Some(DomainError::NotFound {
                entity,
                id: id.clone(),
            }),
            StoreError::VersionMismatch { expected, actual } => Some(DomainError::stale(format!(
                "expected {expected:?}, found {actual}"
            ))),
            StoreError::InvalidWrite(_) | StoreError::Corrupt(_) | StoreError::Unavailable(_) => {
                None
            }
        }
    }
}

/// Read/write collaborator holding items, categories and locations.
///
/// Implementations must make every method atomic with respect to the others:
/// `snapshot` is a single point-in-time read, `insert_item` checks SKU
/// uniqueness and references in the same critical section as the write, and
/// `replace_item` is a compare-and-swap on the item version.
pub trait InventoryStore: Send + Sync {
    fn snapshot(&self, filter: &SnapshotFilter) -> Result<InventorySnapshot, StoreError>;

    fn get_item(&self, id: ItemId) -> Result<Option<InventoryItem>, StoreError>;

    fn find_by_sku(&self, sku: &Sku) -> Result<Option<InventoryItem>, StoreError>;

    fn insert_item(&self, item: InventoryItem) -> Result<(), StoreError>;

    fn replace_item(
        &self,
        item: InventoryItem,
        expected_version: ExpectedVersion,
    ) -> Result<(), StoreError>;

    /// Returns `false` if the item did not exist.
    fn delete_item(&self, id: ItemId) -> Result<bool, StoreError>;

    fn insert_category(&self, category: Category) -> Result<(), StoreError>;

    fn insert_location(&self, location: Location) -> Result<(), StoreError>;

    fn categories(&self) -> Result<Vec<Category>, StoreError>;

    fn locations(&self) -> Result<Vec<Location>, StoreError>;

    fn category(&self, id: CategoryId) -> Result<Option<Category>, StoreError>;

    fn location(&self, id: LocationId) -> Result<Option<Location>, StoreError>;
}

impl<S> InventoryStore for Arc<S>
where
    S: InventoryStore + ?Sized,
{
    fn snapshot(&self, filter: &SnapshotFilter) -> Result<InventorySnapshot, StoreError> {
        (**self).snapshot(filter)
    }

    fn get_item(&self, id: ItemId) -> Result<Option<InventoryItem>, StoreError> {
        (**self).get_item(id)
    }

    fn find_by_sku(&self, sku: &Sku) -> Result<Option<InventoryItem>, StoreError> {
        (**self).find_by_sku(sku)
    }

    fn insert_item(&self, item: InventoryItem) -> Result<(), StoreError> {
        (**self).insert_item(item)
    }

    fn replace_item(
        &self,
        item: InventoryItem,
        expected_version: ExpectedVersion,
    ) -> Result<(), StoreError> {
        (**self).replace_item(item, expected_version)
    }

    fn delete_item(&self, id: ItemId) -> Result<bool, StoreError> {
        (**self).delete_item(id)
    }

    fn insert_category(&self, category: Category) -> Result<(), StoreError> {
        (**self).insert_category(category)
    }

    fn insert_location(&self, location: Location) -> Result<(), StoreError> {
        (**self).insert_location(location)
    }

    fn categories(&self) -> Result<Vec<Category>, StoreError> {
        (**self).categories()
    }

    fn locations(&self) -> Result<Vec<Location>, StoreError> {
        (**self).locations()
    }

    fn category(&self, id: CategoryId) -> Result<Option<Category>, StoreError> {
        (**self).category(id)
    }

    fn location(&self, id: LocationId) -> Result<Option<Location>, StoreError> {
        (**self).location(id)
    }
}
