//! Inventory domain module.
//!
//! Items, categories and locations, stock classification, and the pure
//! read-side computations (dashboard summary, recent and low-stock views) over
//! an immutable snapshot. No IO, no storage.

pub mod catalog;
pub mod item;
pub mod money;
pub mod record;
pub mod request;
pub mod snapshot;
pub mod stock;
pub mod summary;
pub mod views;

pub use catalog::{Category, Location};
pub use item::{
    AdjustStock, DetailsUpdated, InventoryCommand, InventoryEvent, InventoryItem, ItemPatch,
    NewItem, SetQuantity, Sku, StockAdjusted, UpdateDetails,
};
pub use money::{Money, PriceInput};
pub use record::ItemRecord;
pub use request::{ItemPatchRequest, NewItemRequest};
pub use snapshot::{InventorySnapshot, SnapshotFilter};
pub use stock::{StockStatus, classify};
pub use summary::{DashboardSummary, summarize};
pub use views::{ItemView, low_stock_items, recent_items};
