//! Row shape of an item as a relational store holds it.
//!
//! Rows are loosely typed (signed price, raw SKU text); converting a row into
//! an [`InventoryItem`] re-checks every domain invariant so a corrupt row is
//! caught at read time instead of poisoning aggregation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use inventrack_core::{CategoryId, DomainError, ItemId, LocationId};

use crate::catalog::validate_name;
use crate::item::{InventoryItem, Sku};
use crate::money::Money;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: ItemId,
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
    pub category_id: Option<CategoryId>,
    pub location_id: Option<LocationId>,
    pub quantity: i64,
    pub price_cents: Option<i64>,
    pub low_stock_threshold: Option<i64>,
    pub barcode: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub version: u64,
}

/// Fails only for a price the signed `price_cents` column cannot hold.
impl TryFrom<&InventoryItem> for ItemRecord {
    type Error = DomainError;

    fn try_from(item: &InventoryItem) -> Result<Self, Self::Error> {
        let price_cents = item
            .price
            .map(|p| {
                i64::try_from(p.cents()).map_err(|_| {
                    DomainError::validation("price", format!("item {} price does not fit", item.id))
                })
            })
            .transpose()?;

        Ok(Self {
            id: item.id,
            name: item.name.clone(),
            sku: item.sku.as_str().to_string(),
            description: item.description.clone(),
            category_id: item.category_id,
            location_id: item.location_id,
            quantity: item.quantity,
            price_cents,
            low_stock_threshold: item.low_stock_threshold,
            barcode: item.barcode.clone(),
            created_at: item.created_at,
            last_updated: item.last_updated,
            version: item.version,
        })
    }
}

impl TryFrom<ItemRecord> for InventoryItem {
    type Error = DomainError;

    fn try_from(row: ItemRecord) -> Result<Self, Self::Error> {
        let name = validate_name("name", &row.name)?;
        let sku = Sku::parse(&row.sku)?;
        if row.quantity < 0 {
            return Err(DomainError::invariant(format!(
                "item {} has negative quantity {}",
                row.id, row.quantity
            )));
        }
        let price = match row.price_cents {
            Some(c) => Some(Money::from_cents(u64::try_from(c).map_err(|_| {
                DomainError::validation("price", format!("item {} has negative price", row.id))
            })?)),
            None => None,
        };
        if let Some(t) = row.low_stock_threshold {
            if t < 0 {
                return Err(DomainError::validation(
                    "low_stock_threshold",
                    format!("item {} has negative threshold", row.id),
                ));
            }
        }

        Ok(InventoryItem {
            id: row.id,
            name,
            sku,
            description: row.description,
            category_id: row.category_id,
            location_id: row.location_id,
            quantity: row.quantity,
            price,
            low_stock_threshold: row.low_stock_threshold,
            barcode: row.barcode,
            created_at: row.created_at,
            last_updated: row.last_updated,
            version: row.version,
        })
    }
}
