//! Derived item lists for the dashboard.
//!
//! Both selectors are pure projections over a snapshot: they clone what they
//! return and never touch the store.

use serde::Serialize;

use crate::item::InventoryItem;
use crate::snapshot::InventorySnapshot;
use crate::stock::StockStatus;

/// An item with its category/location names resolved and its stock status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    #[serde(flatten)]
    pub item: InventoryItem,
    pub category_name: Option<String>,
    pub location_name: Option<String>,
    pub stock_status: StockStatus,
}

impl ItemView {
    /// Dangling references resolve to `None`, like absent ones.
    pub fn resolve(item: &InventoryItem, snapshot: &InventorySnapshot) -> Self {
        Self {
            category_name: item
                .category_id()
                .and_then(|id| snapshot.category_name(id))
                .map(str::to_string),
            location_name: item
                .location_id()
                .and_then(|id| snapshot.location_name(id))
                .map(str::to_string),
            stock_status: item.stock_status(),
            item: item.clone(),
        }
    }
}

/// Most recently updated items first; ties broken by id ascending.
pub fn recent_items(snapshot: &InventorySnapshot, limit: usize) -> Vec<ItemView> {
    let mut items: Vec<&InventoryItem> = snapshot.items().iter().collect();
    items.sort_by(|a, b| {
        b.last_updated()
            .cmp(&a.last_updated())
            .then_with(|| a.id_typed().cmp(&b.id_typed()))
    });

    tracing::debug!(candidates = items.len(), limit, "selecting recent items");
    items
        .into_iter()
        .take(limit)
        .map(|item| ItemView::resolve(item, snapshot))
        .collect()
}

/// Low and out-of-stock items, most depleted first; ties broken by id ascending.
pub fn low_stock_items(snapshot: &InventorySnapshot, limit: usize) -> Vec<ItemView> {
    let mut items: Vec<&InventoryItem> = snapshot
        .items()
        .iter()
        .filter(|item| item.stock_status().needs_attention())
        .collect();
    items.sort_by(|a, b| {
        a.quantity()
            .cmp(&b.quantity())
            .then_with(|| a.id_typed().cmp(&b.id_typed()))
    });

    tracing::debug!(candidates = items.len(), limit, "selecting low-stock items");
    items
        .into_iter()
        .take(limit)
        .map(|item| ItemView::resolve(item, snapshot))
        .collect()
}
