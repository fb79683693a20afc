use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use inventrack_core::{
    Aggregate, AggregateRoot, CategoryId, DomainError, DomainResult, ItemId, LocationId,
    ValueObject,
};

use crate::catalog::validate_name;
use crate::money::Money;
use crate::stock::{StockStatus, classify};

const MAX_SKU_LEN: usize = 64;

/// Stock-keeping unit: unique, human-facing item code, immutable once issued.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sku(String);

impl ValueObject for Sku {}

impl Sku {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let sku = raw.trim();
        if sku.is_empty() {
            return Err(DomainError::validation("sku", "cannot be empty"));
        }
        if sku.chars().any(char::is_whitespace) {
            return Err(DomainError::validation("sku", "cannot contain whitespace"));
        }
        if sku.len() > MAX_SKU_LEN {
            return Err(DomainError::validation(
                "sku",
                format!("cannot exceed {MAX_SKU_LEN} bytes"),
            ));
        }
        Ok(Self(sku.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Sku {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

fn ensure_non_negative(field: &'static str, value: i64) -> DomainResult<()> {
    if value < 0 {
        return Err(DomainError::validation(field, "cannot be negative"));
    }
    Ok(())
}

/// Validated field set for inserting a new item.
///
/// Category and location references are checked for existence by the store at
/// insert time, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub name: String,
    pub sku: Sku,
    pub description: Option<String>,
    pub category_id: Option<CategoryId>,
    pub location_id: Option<LocationId>,
    pub quantity: i64,
    pub price: Option<Money>,
    pub low_stock_threshold: Option<i64>,
    pub barcode: Option<String>,
}

impl NewItem {
    /// Minimal new item: name + SKU, everything else empty and zero stock.
    pub fn new(name: impl Into<String>, sku: Sku) -> Self {
        Self {
            name: name.into(),
            sku,
            description: None,
            category_id: None,
            location_id: None,
            quantity: 0,
            price: None,
            low_stock_threshold: None,
            barcode: None,
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        validate_name("name", &self.name)?;
        ensure_non_negative("quantity", self.quantity)?;
        if let Some(price) = self.price {
            price.ensure_price()?;
        }
        if let Some(t) = self.low_stock_threshold {
            ensure_non_negative("low_stock_threshold", t)?;
        }
        Ok(())
    }
}

/// Partial update of an item's mutable fields.
///
/// For optional fields the outer `Option` says whether the field is touched and
/// the inner one whether it is set or cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub name: Option<String>,
    /// Only accepted when equal to the issued SKU.
    pub sku: Option<Sku>,
    pub description: Option<Option<String>>,
    pub category_id: Option<Option<CategoryId>>,
    pub location_id: Option<Option<LocationId>>,
    pub quantity: Option<i64>,
    pub price: Option<Option<Money>>,
    pub low_stock_threshold: Option<Option<i64>>,
    pub barcode: Option<Option<String>>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        *self == ItemPatch::default()
    }

    /// Whether applying this patch refreshes `last_updated`.
    pub fn touches_tracked_fields(&self) -> bool {
        self.name.is_some()
            || self.quantity.is_some()
            || self.price.is_some()
            || self.low_stock_threshold.is_some()
            || self.category_id.is_some()
            || self.location_id.is_some()
    }

    pub fn validate(&self) -> DomainResult<()> {
        if let Some(name) = &self.name {
            validate_name("name", name)?;
        }
        if let Some(q) = self.quantity {
            ensure_non_negative("quantity", q)?;
        }
        if let Some(Some(price)) = self.price {
            price.ensure_price()?;
        }
        if let Some(Some(t)) = self.low_stock_threshold {
            ensure_non_negative("low_stock_threshold", t)?;
        }
        Ok(())
    }

    /// Keep only the fields whose value differs from `item`.
    pub fn diff(&self, item: &InventoryItem) -> ItemPatch {
        fn changed<T: PartialEq + Clone>(new: &Option<T>, current: &T) -> Option<T> {
            new.as_ref().filter(|v| *v != current).cloned()
        }

        ItemPatch {
            name: self
                .name
                .as_ref()
                .map(|n| n.trim().to_string())
                .filter(|n| *n != item.name),
            sku: None,
            description: changed(&self.description, &item.description),
            category_id: changed(&self.category_id, &item.category_id),
            location_id: changed(&self.location_id, &item.location_id),
            quantity: changed(&self.quantity, &item.quantity),
            price: changed(&self.price, &item.price),
            low_stock_threshold: changed(&self.low_stock_threshold, &item.low_stock_threshold),
            barcode: changed(&self.barcode, &item.barcode),
        }
    }
}

/// Aggregate root: InventoryItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub(crate) id: ItemId,
    pub(crate) name: String,
    pub(crate) sku: Sku,
    pub(crate) description: Option<String>,
    pub(crate) category_id: Option<CategoryId>,
    pub(crate) location_id: Option<LocationId>,
    pub(crate) quantity: i64,
    #[serde(rename = "priceCents")]
    pub(crate) price: Option<Money>,
    pub(crate) low_stock_threshold: Option<i64>,
    pub(crate) barcode: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) last_updated: DateTime<Utc>,
    pub(crate) version: u64,
}

impl InventoryItem {
    /// Build a freshly inserted item at version 1.
    pub fn create(id: ItemId, new: NewItem, now: DateTime<Utc>) -> DomainResult<Self> {
        new.validate()?;
        Ok(Self {
            id,
            name: new.name.trim().to_string(),
            sku: new.sku,
            description: new.description,
            category_id: new.category_id,
            location_id: new.location_id,
            quantity: new.quantity,
            price: new.price,
            low_stock_threshold: new.low_stock_threshold,
            barcode: new.barcode,
            created_at: now,
            last_updated: now,
            version: 1,
        })
    }

    pub fn id_typed(&self) -> ItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sku(&self) -> &Sku {
        &self.sku
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn category_id(&self) -> Option<CategoryId> {
        self.category_id
    }

    pub fn location_id(&self) -> Option<LocationId> {
        self.location_id
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn price(&self) -> Option<Money> {
        self.price
    }

    pub fn low_stock_threshold(&self) -> Option<i64> {
        self.low_stock_threshold
    }

    pub fn barcode(&self) -> Option<&str> {
        self.barcode.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    pub fn stock_status(&self) -> StockStatus {
        classify(self.quantity, self.low_stock_threshold)
    }

    /// `price × quantity` with an absent price counted as zero; `None` on overflow.
    pub fn line_value(&self) -> Option<Money> {
        self.price
            .unwrap_or(Money::ZERO)
            .checked_mul_quantity(self.quantity)
    }

    /// Decide and apply a command in one step, returning the applied events.
    ///
    /// On error the item is left untouched.
    pub fn execute(&mut self, command: &InventoryCommand) -> DomainResult<Vec<InventoryEvent>> {
        let events = self.handle(command)?;
        for event in &events {
            self.apply(event);
        }
        Ok(events)
    }
}

impl AggregateRoot for InventoryItem {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: AdjustStock (signed delta).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjustStock {
    pub item_id: ItemId,
    pub delta: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SetQuantity (absolute count, e.g. after a stocktake).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetQuantity {
    pub item_id: ItemId,
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateDetails (partial field update).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateDetails {
    pub item_id: ItemId,
    pub patch: ItemPatch,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryCommand {
    AdjustStock(AdjustStock),
    SetQuantity(SetQuantity),
    UpdateDetails(UpdateDetails),
}

impl InventoryCommand {
    pub fn item_id(&self) -> ItemId {
        match self {
            InventoryCommand::AdjustStock(c) => c.item_id,
            InventoryCommand::SetQuantity(c) => c.item_id,
            InventoryCommand::UpdateDetails(c) => c.item_id,
        }
    }

    /// Stateless checks that can run before the store is touched.
    pub fn validate(&self) -> DomainResult<()> {
        match self {
            InventoryCommand::AdjustStock(c) if c.delta == 0 => {
                Err(DomainError::validation("delta", "cannot be zero"))
            }
            InventoryCommand::AdjustStock(_) => Ok(()),
            InventoryCommand::SetQuantity(c) => ensure_non_negative("quantity", c.quantity),
            InventoryCommand::UpdateDetails(c) => c.patch.validate(),
        }
    }
}

/// Event: StockAdjusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockAdjusted {
    pub item_id: ItemId,
    pub delta: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: DetailsUpdated. `changes` holds only fields that actually differ.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailsUpdated {
    pub item_id: ItemId,
    pub changes: ItemPatch,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryEvent {
    StockAdjusted(StockAdjusted),
    DetailsUpdated(DetailsUpdated),
}

impl InventoryEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            InventoryEvent::StockAdjusted(_) => "inventory.item.stock_adjusted",
            InventoryEvent::DetailsUpdated(_) => "inventory.item.details_updated",
        }
    }
}

impl Aggregate for InventoryItem {
    type Command = InventoryCommand;
    type Event = InventoryEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            InventoryEvent::StockAdjusted(e) => {
                self.quantity += e.delta;
                self.last_updated = e.occurred_at;
            }
            InventoryEvent::DetailsUpdated(e) => {
                let c = &e.changes;
                if let Some(name) = &c.name {
                    self.name = name.clone();
                }
                if let Some(description) = &c.description {
                    self.description = description.clone();
                }
                if let Some(category_id) = c.category_id {
                    self.category_id = category_id;
                }
                if let Some(location_id) = c.location_id {
                    self.location_id = location_id;
                }
                if let Some(quantity) = c.quantity {
                    self.quantity = quantity;
                }
                if let Some(price) = c.price {
                    self.price = price;
                }
                if let Some(threshold) = c.low_stock_threshold {
                    self.low_stock_threshold = threshold;
                }
                if let Some(barcode) = &c.barcode {
                    self.barcode = barcode.clone();
                }
                if c.touches_tracked_fields() {
                    self.last_updated = e.occurred_at;
                }
            }
        }

        // +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        self.ensure_item_id(command.item_id())?;
        command.validate()?;

        match command {
            InventoryCommand::AdjustStock(cmd) => self.handle_adjust(cmd.delta, cmd.occurred_at),
            InventoryCommand::SetQuantity(cmd) => {
                self.handle_adjust(cmd.quantity - self.quantity, cmd.occurred_at)
            }
            InventoryCommand::UpdateDetails(cmd) => self.handle_update(cmd),
        }
    }
}

impl InventoryItem {
    fn ensure_item_id(&self, item_id: ItemId) -> DomainResult<()> {
        if self.id != item_id {
            return Err(DomainError::invariant("item_id mismatch"));
        }
        Ok(())
    }

    fn handle_adjust(
        &self,
        delta: i64,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Vec<InventoryEvent>> {
        if delta == 0 {
            return Ok(vec![]);
        }

        let new_stock = self
            .quantity
            .checked_add(delta)
            .ok_or_else(|| DomainError::invariant("stock quantity overflow"))?;
        if new_stock < 0 {
            return Err(DomainError::invariant(format!(
                "stock cannot go negative (item {}, quantity {}, delta {delta})",
                self.id, self.quantity
            )));
        }

        Ok(vec![InventoryEvent::StockAdjusted(StockAdjusted {
            item_id: self.id,
            delta,
            occurred_at,
        })])
    }

    fn handle_update(&self, cmd: &UpdateDetails) -> DomainResult<Vec<InventoryEvent>> {
        if let Some(sku) = &cmd.patch.sku {
            if *sku != self.sku {
                return Err(DomainError::validation("sku", "is immutable once issued"));
            }
        }

        let changes = cmd.patch.diff(self);
        if changes.is_empty() {
            return Ok(vec![]);
        }

        Ok(vec![InventoryEvent::DetailsUpdated(DetailsUpdated {
            item_id: self.id,
            changes,
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn item(quantity: i64, threshold: Option<i64>) -> InventoryItem {
        let mut new = NewItem::new("Wireless Mouse", Sku::parse("MS-WL200").unwrap());
        new.quantity = quantity;
        new.low_stock_threshold = threshold;
        new.price = Some(Money::from_cents(2299));
        InventoryItem::create(ItemId::from_u128(1), new, t0()).unwrap()
    }

    fn adjust(item: &InventoryItem, delta: i64) -> InventoryCommand {
        InventoryCommand::AdjustStock(AdjustStock {
            item_id: item.id_typed(),
            delta,
            occurred_at: t0() + Duration::minutes(5),
        })
    }

    fn update(item: &InventoryItem, patch: ItemPatch) -> InventoryCommand {
        InventoryCommand::UpdateDetails(UpdateDetails {
            item_id: item.id_typed(),
            patch,
            occurred_at: t0() + Duration::minutes(5),
        })
    }

    #[test]
    fn sku_is_trimmed_and_checked() {
        assert_eq!(Sku::parse("  X-100 ").unwrap().as_str(), "X-100");
        assert!(Sku::parse("").is_err());
        assert!(Sku::parse("X 100").is_err());
    }

    #[test]
    fn create_rejects_negative_quantity_and_threshold() {
        let mut new = NewItem::new("Cable", Sku::parse("CA-1").unwrap());
        new.quantity = -1;
        let err = InventoryItem::create(ItemId::new(), new.clone(), t0()).unwrap_err();
        assert_eq!(err, DomainError::validation("quantity", "cannot be negative"));

        new.quantity = 1;
        new.low_stock_threshold = Some(-5);
        let err = InventoryItem::create(ItemId::new(), new, t0()).unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "low_stock_threshold", .. }));
    }

    #[test]
    fn create_starts_at_version_one_with_equal_timestamps() {
        let it = item(5, Some(8));
        assert_eq!(it.version(), 1);
        assert_eq!(it.created_at(), it.last_updated());
        assert_eq!(it.stock_status(), StockStatus::Low);
    }

    #[test]
    fn adjust_stock_applies_delta_and_refreshes_timestamp() {
        let mut it = item(10, None);
        let events = it.execute(&adjust(&it, -3)).unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(it.quantity(), 7);
        assert_eq!(it.version(), 2);
        assert_eq!(it.last_updated(), t0() + Duration::minutes(5));
    }

    #[test]
    fn adjust_below_zero_is_an_invariant_violation() {
        let mut it = item(2, None);
        let before = it.clone();
        let err = it.execute(&adjust(&it, -3)).unwrap_err();

        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert_eq!(it, before);
    }

    #[test]
    fn zero_delta_is_rejected() {
        let it = item(2, None);
        let err = it.handle(&adjust(&it, 0)).unwrap_err();
        assert_eq!(err, DomainError::validation("delta", "cannot be zero"));
    }

    #[test]
    fn set_quantity_to_current_value_emits_nothing() {
        let mut it = item(4, None);
        let cmd = InventoryCommand::SetQuantity(SetQuantity {
            item_id: it.id_typed(),
            quantity: 4,
            occurred_at: t0() + Duration::hours(1),
        });
        assert!(it.execute(&cmd).unwrap().is_empty());
        assert_eq!(it.version(), 1);
        assert_eq!(it.last_updated(), t0());
    }

    #[test]
    fn description_only_update_keeps_last_updated() {
        let mut it = item(4, None);
        let patch = ItemPatch {
            description: Some(Some("Optical".to_string())),
            barcode: Some(Some("423456789012".to_string())),
            ..ItemPatch::default()
        };
        it.execute(&update(&it, patch)).unwrap();

        assert_eq!(it.description(), Some("Optical"));
        assert_eq!(it.version(), 2);
        assert_eq!(it.last_updated(), t0());
    }

    #[test]
    fn tracked_field_update_refreshes_last_updated() {
        let mut it = item(4, Some(8));
        let patch = ItemPatch {
            low_stock_threshold: Some(None),
            ..ItemPatch::default()
        };
        it.execute(&update(&it, patch)).unwrap();

        assert_eq!(it.low_stock_threshold(), None);
        assert_eq!(it.stock_status(), StockStatus::Normal);
        assert_eq!(it.last_updated(), t0() + Duration::minutes(5));
    }

    #[test]
    fn every_tracked_field_refreshes_last_updated() {
        let cases: Vec<(&str, ItemPatch)> = vec![
            ("name", ItemPatch { name: Some("Silent Mouse".to_string()), ..ItemPatch::default() }),
            ("quantity", ItemPatch { quantity: Some(9), ..ItemPatch::default() }),
            ("price set", ItemPatch { price: Some(Some(Money::from_cents(1999))), ..ItemPatch::default() }),
            ("price cleared", ItemPatch { price: Some(None), ..ItemPatch::default() }),
            ("threshold", ItemPatch { low_stock_threshold: Some(Some(3)), ..ItemPatch::default() }),
            ("category", ItemPatch { category_id: Some(Some(CategoryId::from_u128(7))), ..ItemPatch::default() }),
            ("location", ItemPatch { location_id: Some(Some(LocationId::from_u128(8))), ..ItemPatch::default() }),
        ];

        for (field, patch) in cases {
            let mut it = item(4, Some(8));
            it.execute(&update(&it, patch)).unwrap();
            assert_eq!(it.version(), 2, "{field}");
            assert_eq!(it.last_updated(), t0() + Duration::minutes(5), "{field}");
        }
    }

    #[test]
    fn untracked_fields_bump_version_only() {
        let cases: Vec<(&str, ItemPatch)> = vec![
            ("description", ItemPatch { description: Some(Some("Optical".to_string())), ..ItemPatch::default() }),
            ("barcode", ItemPatch { barcode: Some(Some("1".to_string())), ..ItemPatch::default() }),
        ];

        for (field, patch) in cases {
            let mut it = item(4, Some(8));
            it.execute(&update(&it, patch)).unwrap();
            assert_eq!(it.version(), 2, "{field}");
            assert_eq!(it.last_updated(), t0(), "{field}");
        }
    }

    #[test]
    fn oversized_price_is_a_validation_error() {
        let mut new = NewItem::new("Gold bar", Sku::parse("AU-1").unwrap());
        new.price = Some(Money::from_cents(u64::MAX));
        let err = InventoryItem::create(ItemId::new(), new, t0()).unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "price", .. }));

        let it = item(4, None);
        let patch = ItemPatch {
            price: Some(Some(Money::from_cents(u64::MAX))),
            ..ItemPatch::default()
        };
        let err = it.handle(&update(&it, patch)).unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "price", .. }));
    }

    #[test]
    fn unchanged_values_are_a_no_op() {
        let mut it = item(4, Some(8));
        let patch = ItemPatch {
            name: Some(" Wireless Mouse ".to_string()),
            quantity: Some(4),
            price: Some(Some(Money::from_cents(2299))),
            ..ItemPatch::default()
        };
        assert!(it.execute(&update(&it, patch)).unwrap().is_empty());
        assert_eq!(it.version(), 1);
    }

    #[test]
    fn sku_cannot_change() {
        let it = item(4, None);
        let same = ItemPatch {
            sku: Some(Sku::parse("MS-WL200").unwrap()),
            ..ItemPatch::default()
        };
        assert!(it.handle(&update(&it, same)).unwrap().is_empty());

        let other = ItemPatch {
            sku: Some(Sku::parse("MS-WL201").unwrap()),
            ..ItemPatch::default()
        };
        let err = it.handle(&update(&it, other)).unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "sku", .. }));
    }

    #[test]
    fn command_for_another_item_is_refused() {
        let it = item(4, None);
        let cmd = InventoryCommand::AdjustStock(AdjustStock {
            item_id: ItemId::from_u128(99),
            delta: 1,
            occurred_at: t0(),
        });
        assert!(matches!(it.handle(&cmd), Err(DomainError::InvariantViolation(_))));
    }

    #[test]
    fn line_value_treats_missing_price_as_zero() {
        let mut it = item(24, None);
        assert_eq!(it.line_value(), Some(Money::from_cents(2299 * 24)));
        it.price = None;
        assert_eq!(it.line_value(), Some(Money::ZERO));
    }
}
