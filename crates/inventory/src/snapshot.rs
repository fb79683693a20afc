//! Point-in-time view of the whole inventory.
//!
//! A snapshot is the sole input to aggregation and view selection. It is
//! immutable once built, so any number of readers can share it.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use inventrack_core::{CategoryId, Entity, LocationId};

use crate::catalog::{Category, Location};
use crate::item::InventoryItem;
use crate::record::ItemRecord;

/// Optional narrowing of a snapshot by category and/or location.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotFilter {
    pub category_id: Option<CategoryId>,
    pub location_id: Option<LocationId>,
}

impl SnapshotFilter {
    pub fn matches(&self, item: &InventoryItem) -> bool {
        self.category_id.is_none_or(|c| item.category_id() == Some(c))
            && self.location_id.is_none_or(|l| item.location_id() == Some(l))
    }

    pub fn is_unfiltered(&self) -> bool {
        self.category_id.is_none() && self.location_id.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct InventorySnapshot {
    items: Vec<InventoryItem>,
    categories: HashMap<CategoryId, Category>,
    locations: HashMap<LocationId, Location>,
    taken_at: DateTime<Utc>,
    skipped_records: usize,
}

impl InventorySnapshot {
    pub fn new(
        items: Vec<InventoryItem>,
        categories: impl IntoIterator<Item = Category>,
        locations: impl IntoIterator<Item = Location>,
        taken_at: DateTime<Utc>,
    ) -> Self {
        Self {
            items,
            categories: categories.into_iter().map(|c| (c.id_typed(), c)).collect(),
            locations: locations.into_iter().map(|l| (l.id_typed(), l)).collect(),
            taken_at,
            skipped_records: 0,
        }
    }

    /// Build a snapshot from raw store rows.
    ///
    /// Rows that fail domain validation are skipped (and counted) so one bad
    /// record cannot halt the dashboard.
    pub fn from_records(
        records: impl IntoIterator<Item = ItemRecord>,
        categories: impl IntoIterator<Item = Category>,
        locations: impl IntoIterator<Item = Location>,
        taken_at: DateTime<Utc>,
    ) -> Self {
        let mut skipped = 0usize;
        let items = records
            .into_iter()
            .filter_map(|row| {
                let id = row.id;
                match InventoryItem::try_from(row) {
                    Ok(item) => Some(item),
                    Err(err) => {
                        skipped += 1;
                        tracing::warn!(item_id = %id, error = %err, "skipping invalid item record");
                        None
                    }
                }
            })
            .collect();

        let mut snapshot = Self::new(items, categories, locations, taken_at);
        snapshot.skipped_records = skipped;
        snapshot
    }

    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }

    /// Number of store rows dropped while building this snapshot.
    pub fn skipped_records(&self) -> usize {
        self.skipped_records
    }

    pub fn category_name(&self, id: CategoryId) -> Option<&str> {
        self.categories.get(&id).map(|c| c.name())
    }

    pub fn location_name(&self, id: LocationId) -> Option<&str> {
        self.locations.get(&id).map(|l| l.name())
    }

    /// Sub-snapshot holding only items that match `filter` (same point in time).
    pub fn filtered(&self, filter: &SnapshotFilter) -> InventorySnapshot {
        if filter.is_unfiltered() {
            return self.clone();
        }
        InventorySnapshot {
            items: self
                .items
                .iter()
                .filter(|item| filter.matches(item))
                .cloned()
                .collect(),
            categories: self.categories.clone(),
            locations: self.locations.clone(),
            taken_at: self.taken_at,
            skipped_records: self.skipped_records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{NewItem, Sku};
    use inventrack_core::ItemId;

    fn item(n: u128, category: Option<CategoryId>, location: Option<LocationId>) -> InventoryItem {
        let mut new = NewItem::new(format!("Item {n}"), Sku::parse(&format!("SKU-{n}")).unwrap());
        new.category_id = category;
        new.location_id = location;
        InventoryItem::create(ItemId::from_u128(n), new, Utc::now()).unwrap()
    }

    #[test]
    fn bad_records_are_skipped_not_fatal() {
        let good = ItemRecord::try_from(&item(1, None, None)).unwrap();
        let mut bad = ItemRecord::try_from(&item(2, None, None)).unwrap();
        bad.quantity = -1;

        let snap = InventorySnapshot::from_records(vec![good, bad], vec![], vec![], Utc::now());
        assert_eq!(snap.len(), 1);
        assert_eq!(snap.skipped_records(), 1);
        assert_eq!(snap.items()[0].id_typed(), ItemId::from_u128(1));
    }

    #[test]
    fn filter_by_category_and_location() {
        let electronics = CategoryId::from_u128(10);
        let shelf = LocationId::from_u128(20);
        let snap = InventorySnapshot::new(
            vec![
                item(1, Some(electronics), Some(shelf)),
                item(2, Some(electronics), None),
                item(3, None, Some(shelf)),
            ],
            vec![],
            vec![],
            Utc::now(),
        );

        let by_cat = snap.filtered(&SnapshotFilter {
            category_id: Some(electronics),
            location_id: None,
        });
        assert_eq!(by_cat.len(), 2);

        let both = snap.filtered(&SnapshotFilter {
            category_id: Some(electronics),
            location_id: Some(shelf),
        });
        assert_eq!(both.len(), 1);
        assert_eq!(both.taken_at(), snap.taken_at());

        assert_eq!(snap.filtered(&SnapshotFilter::default()).len(), 3);
    }

    #[test]
    fn names_resolve_through_lookup_tables() {
        let cat = Category::new(CategoryId::from_u128(1), "Furniture").unwrap();
        let loc = Location::new(LocationId::from_u128(2), "Warehouse B").unwrap();
        let snap = InventorySnapshot::new(vec![], vec![cat], vec![loc], Utc::now());

        assert_eq!(snap.category_name(CategoryId::from_u128(1)), Some("Furniture"));
        assert_eq!(snap.location_name(LocationId::from_u128(2)), Some("Warehouse B"));
        assert_eq!(snap.category_name(CategoryId::from_u128(3)), None);
        assert!(snap.is_empty());
    }
}
