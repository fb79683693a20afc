//! Inventory application service.
//!
//! Thin façade over the store (reads), the [`MutationSerializer`] (writes) and
//! the open-order source. Every operation takes an explicit
//! [`RequestContext`]; admin-only operations are checked before anything
//! else runs.

use chrono::Utc;

use inventrack_core::{CategoryId, DomainError, Entity, ExpectedVersion, ItemId, LocationId};
use inventrack_infra::{
    InventoryConfig, InventoryError, InventoryStore, MutationSerializer, OpenOrdersSource,
};
use inventrack_inventory::{
    AdjustStock, Category, DashboardSummary, InventoryCommand, InventoryItem, ItemPatchRequest,
    ItemView, Location, NewItemRequest, Sku, SnapshotFilter, StockStatus, UpdateDetails,
    low_stock_items, recent_items, summarize,
};

use crate::authz::require_admin;
use crate::context::RequestContext;

pub struct InventoryService<S, O> {
    serializer: MutationSerializer<S>,
    orders: O,
    config: InventoryConfig,
}

impl<S, O> InventoryService<S, O>
where
    S: InventoryStore,
    O: OpenOrdersSource,
{
    pub fn new(store: S, orders: O, config: InventoryConfig) -> Self {
        Self {
            serializer: MutationSerializer::new(store, &config),
            orders,
            config,
        }
    }

    pub fn serializer(&self) -> &MutationSerializer<S> {
        &self.serializer
    }

    pub fn config(&self) -> &InventoryConfig {
        &self.config
    }

    fn store(&self) -> &S {
        self.serializer.store()
    }

    /// Dashboard figures, all computed from one snapshot.
    pub fn dashboard_summary(
        &self,
        ctx: &RequestContext,
    ) -> Result<DashboardSummary, InventoryError> {
        let snapshot = self.store().snapshot(&SnapshotFilter::default())?;
        let summary = summarize(&snapshot, self.orders.open_orders());

        tracing::debug!(
            principal_id = %ctx.principal_id(),
            total_items = summary.total_items,
            low_stock_count = summary.low_stock_count,
            skipped_records = snapshot.skipped_records(),
            "dashboard summary computed"
        );
        Ok(summary)
    }

    pub fn recent_items(
        &self,
        ctx: &RequestContext,
        limit: Option<usize>,
    ) -> Result<Vec<ItemView>, InventoryError> {
        let limit = self.config.page_limit(limit);
        let snapshot = self.store().snapshot(&SnapshotFilter::default())?;
        tracing::debug!(principal_id = %ctx.principal_id(), limit, "recent items requested");
        Ok(recent_items(&snapshot, limit))
    }

    pub fn low_stock_items(
        &self,
        ctx: &RequestContext,
        limit: Option<usize>,
    ) -> Result<Vec<ItemView>, InventoryError> {
        let limit = self.config.page_limit(limit);
        let snapshot = self.store().snapshot(&SnapshotFilter::default())?;
        tracing::debug!(principal_id = %ctx.principal_id(), limit, "low-stock items requested");
        Ok(low_stock_items(&snapshot, limit))
    }

    /// Stock status of an item the caller already holds, e.g. for row
    /// coloring. No store access.
    pub fn classify_item(&self, _ctx: &RequestContext, item: &InventoryItem) -> StockStatus {
        item.stock_status()
    }

    /// Stock status of the stored item with `id`.
    pub fn classify_item_by_id(
        &self,
        ctx: &RequestContext,
        id: ItemId,
    ) -> Result<StockStatus, InventoryError> {
        let item = self.load(ctx, id)?;
        Ok(self.classify_item(ctx, &item))
    }

    pub fn insert_item(
        &self,
        ctx: &RequestContext,
        request: NewItemRequest,
    ) -> Result<InventoryItem, InventoryError> {
        let new = request.validate()?;
        tracing::debug!(principal_id = %ctx.principal_id(), sku = %new.sku, "inserting item");
        self.serializer.insert(new, Utc::now())
    }

    /// Partial update. `expected_version` is the version the caller last saw;
    /// `None` composes the change onto the current state.
    pub fn update_item(
        &self,
        ctx: &RequestContext,
        id: ItemId,
        request: ItemPatchRequest,
        expected_version: Option<u64>,
    ) -> Result<InventoryItem, InventoryError> {
        let patch = request.validate()?;
        tracing::debug!(principal_id = %ctx.principal_id(), item_id = %id, "updating item");

        let command = InventoryCommand::UpdateDetails(UpdateDetails {
            item_id: id,
            patch,
            occurred_at: Utc::now(),
        });
        self.serializer
            .execute(command, ExpectedVersion::from(expected_version))
    }

    pub fn adjust_stock(
        &self,
        ctx: &RequestContext,
        id: ItemId,
        delta: i64,
    ) -> Result<InventoryItem, InventoryError> {
        tracing::debug!(principal_id = %ctx.principal_id(), item_id = %id, delta, "adjusting stock");

        let command = InventoryCommand::AdjustStock(AdjustStock {
            item_id: id,
            delta,
            occurred_at: Utc::now(),
        });
        self.serializer.execute(command, ExpectedVersion::Any)
    }

    pub fn get_item(&self, ctx: &RequestContext, id: ItemId) -> Result<ItemView, InventoryError> {
        let item = self.load(ctx, id)?;
        self.view(item)
    }

    pub fn get_item_by_sku(
        &self,
        _ctx: &RequestContext,
        sku: &str,
    ) -> Result<ItemView, InventoryError> {
        let sku = Sku::parse(sku)?;
        let item = self
            .store()
            .find_by_sku(&sku)?
            .ok_or_else(|| DomainError::not_found("item", &sku))?;
        self.view(item)
    }

    /// All items matching `filter`, ordered by name then id.
    pub fn list_items(
        &self,
        _ctx: &RequestContext,
        filter: SnapshotFilter,
    ) -> Result<Vec<ItemView>, InventoryError> {
        let snapshot = self.store().snapshot(&filter)?;
        let mut items: Vec<&InventoryItem> = snapshot.items().iter().collect();
        items.sort_by(|a, b| {
            a.name()
                .cmp(b.name())
                .then_with(|| a.id_typed().cmp(&b.id_typed()))
        });

        Ok(items
            .into_iter()
            .map(|item| ItemView::resolve(item, &snapshot))
            .collect())
    }

    pub fn delete_item(&self, ctx: &RequestContext, id: ItemId) -> Result<(), InventoryError> {
        require_admin(ctx, "delete item")?;
        self.serializer.delete(id)?;
        tracing::info!(principal_id = %ctx.principal_id(), item_id = %id, "item removed by admin");
        Ok(())
    }

    pub fn create_category(
        &self,
        ctx: &RequestContext,
        name: &str,
    ) -> Result<Category, InventoryError> {
        require_admin(ctx, "create category")?;
        let category = Category::new(CategoryId::new(), name)?;
        self.store().insert_category(category.clone())?;
        tracing::info!(category_id = %category.id_typed(), "category created");
        Ok(category)
    }

    pub fn create_location(
        &self,
        ctx: &RequestContext,
        name: &str,
    ) -> Result<Location, InventoryError> {
        require_admin(ctx, "create location")?;
        let location = Location::new(LocationId::new(), name)?;
        self.store().insert_location(location.clone())?;
        tracing::info!(location_id = %location.id_typed(), "location created");
        Ok(location)
    }

    pub fn list_categories(&self, _ctx: &RequestContext) -> Result<Vec<Category>, InventoryError> {
        Ok(self.store().categories()?)
    }

    pub fn list_locations(&self, _ctx: &RequestContext) -> Result<Vec<Location>, InventoryError> {
        Ok(self.store().locations()?)
    }

    fn load(&self, _ctx: &RequestContext, id: ItemId) -> Result<InventoryItem, InventoryError> {
        self.store()
            .get_item(id)?
            .ok_or_else(|| DomainError::not_found("item", id).into())
    }

    fn view(&self, item: InventoryItem) -> Result<ItemView, InventoryError> {
        let category_name = match item.category_id() {
            Some(id) => self.store().category(id)?.map(|c| c.name().to_string()),
            None => None,
        };
        let location_name = match item.location_id() {
            Some(id) => self.store().location(id)?.map(|l| l.name().to_string()),
            None => None,
        };

        Ok(ItemView {
            category_name,
            location_name,
            stock_status: item.stock_status(),
            item,
        })
    }
}
