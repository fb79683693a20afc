use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use inventrack_core::{CategoryId, Entity, ExpectedVersion, ItemId, LocationId};
use inventrack_inventory::{
    Category, InventoryItem, InventorySnapshot, ItemRecord, Location, Sku, SnapshotFilter,
};

use super::r#trait::{InventoryStore, StoreError};

#[derive(Debug, Default)]
struct Tables {
    items: HashMap<ItemId, ItemRecord>,
    sku_index: HashMap<String, ItemId>,
    categories: HashMap<CategoryId, Category>,
    locations: HashMap<LocationId, Location>,
}

impl Tables {
    fn ensure_references(&self, item: &InventoryItem) -> Result<(), StoreError> {
        if let Some(id) = item.category_id() {
            if !self.categories.contains_key(&id) {
                return Err(StoreError::not_found("category", id));
            }
        }
        if let Some(id) = item.location_id() {
            if !self.locations.contains_key(&id) {
                return Err(StoreError::not_found("location", id));
            }
        }
        Ok(())
    }
}

fn encode(item: &InventoryItem) -> Result<ItemRecord, StoreError> {
    ItemRecord::try_from(item).map_err(|e| StoreError::InvalidWrite(e.to_string()))
}

fn decode(row: &ItemRecord) -> Result<InventoryItem, StoreError> {
    InventoryItem::try_from(row.clone())
        .map_err(|e| StoreError::Corrupt(format!("item {}: {e}", row.id)))
}

/// In-memory item store.
///
/// Intended for tests/dev. One `RwLock` guards all tables, so every method is
/// atomic and snapshots are consistent.
#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }

    /// Write a raw row without any checks, as a faulty migration might.
    #[cfg(test)]
    pub(crate) fn put_raw_record(&self, row: ItemRecord) {
        if let Ok(mut t) = self.tables.write() {
            t.sku_index.insert(row.sku.clone(), row.id);
            t.items.insert(row.id, row);
        }
    }
}

impl InventoryStore for InMemoryInventoryStore {
    fn snapshot(&self, filter: &SnapshotFilter) -> Result<InventorySnapshot, StoreError> {
        let t = self.read()?;
        let snapshot = InventorySnapshot::from_records(
            t.items.values().cloned(),
            t.categories.values().cloned(),
            t.locations.values().cloned(),
            Utc::now(),
        );
        drop(t);
        Ok(snapshot.filtered(filter))
    }

    fn get_item(&self, id: ItemId) -> Result<Option<InventoryItem>, StoreError> {
        let t = self.read()?;
        t.items.get(&id).map(decode).transpose()
    }

    fn find_by_sku(&self, sku: &Sku) -> Result<Option<InventoryItem>, StoreError> {
        let t = self.read()?;
        t.sku_index
            .get(sku.as_str())
            .and_then(|id| t.items.get(id))
            .map(decode)
            .transpose()
    }

    fn insert_item(&self, item: InventoryItem) -> Result<(), StoreError> {
        let mut t = self.write()?;
        let sku = item.sku().as_str();
        if t.sku_index.contains_key(sku) {
            return Err(StoreError::DuplicateSku(sku.to_string()));
        }
        if t.items.contains_key(&item.id_typed()) {
            return Err(StoreError::InvalidWrite(format!(
                "item {} already exists",
                item.id_typed()
            )));
        }
        t.ensure_references(&item)?;
        let row = encode(&item)?;

        t.sku_index.insert(sku.to_string(), item.id_typed());
        t.items.insert(item.id_typed(), row);
        Ok(())
    }

    fn replace_item(
        &self,
        item: InventoryItem,
        expected_version: ExpectedVersion,
    ) -> Result<(), StoreError> {
        let mut t = self.write()?;
        let id = item.id_typed();
        let current = t
            .items
            .get(&id)
            .ok_or_else(|| StoreError::not_found("item", id))?;

        if !expected_version.matches(current.version) {
            return Err(StoreError::VersionMismatch {
                expected: expected_version,
                actual: current.version,
            });
        }
        if current.sku != item.sku().as_str() {
            return Err(StoreError::InvalidWrite(format!(
                "sku of item {id} is immutable"
            )));
        }
        t.ensure_references(&item)?;
        let row = encode(&item)?;

        t.items.insert(id, row);
        Ok(())
    }

    fn delete_item(&self, id: ItemId) -> Result<bool, StoreError> {
        let mut t = self.write()?;
        match t.items.remove(&id) {
            Some(row) => {
                t.sku_index.remove(&row.sku);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn insert_category(&self, category: Category) -> Result<(), StoreError> {
        let mut t = self.write()?;
        if t.categories.values().any(|c| c.name() == category.name()) {
            return Err(StoreError::DuplicateName {
                entity: "category",
                name: category.name().to_string(),
            });
        }
        t.categories.insert(category.id_typed(), category);
        Ok(())
    }

    fn insert_location(&self, location: Location) -> Result<(), StoreError> {
        let mut t = self.write()?;
        if t.locations.values().any(|l| l.name() == location.name()) {
            return Err(StoreError::DuplicateName {
                entity: "location",
                name: location.name().to_string(),
            });
        }
        t.locations.insert(location.id_typed(), location);
        Ok(())
    }

    fn categories(&self) -> Result<Vec<Category>, StoreError> {
        let t = self.read()?;
        let mut out: Vec<Category> = t.categories.values().cloned().collect();
        out.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(out)
    }

    fn locations(&self) -> Result<Vec<Location>, StoreError> {
        let t = self.read()?;
        let mut out: Vec<Location> = t.locations.values().cloned().collect();
        out.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(out)
    }

    fn category(&self, id: CategoryId) -> Result<Option<Category>, StoreError> {
        Ok(self.read()?.categories.get(&id).cloned())
    }

    fn location(&self, id: LocationId) -> Result<Option<Location>, StoreError> {
        Ok(self.read()?.locations.get(&id).cloned())
    }
}
