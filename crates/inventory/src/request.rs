//! Boundary payloads for insert/update commands.
//!
//! Payloads deserialize leniently (everything optional, price as number or
//! string) and are then turned into validated [`NewItem`] / [`ItemPatch`]
//! values before any mutation is attempted.

use serde::{Deserialize, Deserializer};

use inventrack_core::{CategoryId, DomainError, DomainResult, LocationId};

use crate::catalog::validate_name;
use crate::item::{ItemPatch, NewItem, Sku};
use crate::money::PriceInput;

/// Distinguish "field absent" (`None`) from "field is null" (`Some(None)`).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Blank optional text is stored as absent.
fn normalize_text(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItemRequest {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<CategoryId>,
    pub location_id: Option<LocationId>,
    pub quantity: Option<i64>,
    pub price: Option<PriceInput>,
    pub low_stock_threshold: Option<i64>,
    pub barcode: Option<String>,
}

impl NewItemRequest {
    pub fn validate(self) -> DomainResult<NewItem> {
        let name = self
            .name
            .ok_or_else(|| DomainError::validation("name", "is required"))?;
        let name = validate_name("name", &name)?;
        let sku = self
            .sku
            .ok_or_else(|| DomainError::validation("sku", "is required"))?;
        let sku = Sku::parse(&sku)?;
        let price = self.price.as_ref().map(PriceInput::to_money).transpose()?;

        let item = NewItem {
            name,
            sku,
            description: normalize_text(self.description),
            category_id: self.category_id,
            location_id: self.location_id,
            quantity: self.quantity.unwrap_or(0),
            price,
            low_stock_threshold: self.low_stock_threshold,
            barcode: normalize_text(self.barcode),
        };
        item.validate()?;
        Ok(item)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatchRequest {
    pub name: Option<String>,
    pub sku: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub category_id: Option<Option<CategoryId>>,
    #[serde(default, deserialize_with = "double_option")]
    pub location_id: Option<Option<LocationId>>,
    pub quantity: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    pub price: Option<Option<PriceInput>>,
    #[serde(default, deserialize_with = "double_option")]
    pub low_stock_threshold: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub barcode: Option<Option<String>>,
}

impl ItemPatchRequest {
    pub fn validate(self) -> DomainResult<ItemPatch> {
        let sku = self.sku.as_deref().map(Sku::parse).transpose()?;
        let price = match &self.price {
            Some(Some(input)) => Some(Some(input.to_money()?)),
            Some(None) => Some(None),
            None => None,
        };

        let patch = ItemPatch {
            name: self.name,
            sku,
            description: self.description.map(normalize_text),
            category_id: self.category_id,
            location_id: self.location_id,
            quantity: self.quantity,
            price,
            low_stock_threshold: self.low_stock_threshold,
            barcode: self.barcode.map(normalize_text),
        };
        patch.validate()?;
        Ok(patch)
    }
}
