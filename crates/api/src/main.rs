use anyhow::Context;

use inventrack_api::{InventoryService, RequestContext};
use inventrack_core::PrincipalId;
use inventrack_infra::{FixedOpenOrders, InMemoryInventoryStore, InventoryConfig, demo};

fn main() -> anyhow::Result<()> {
    inventrack_observability::init();

    let config = InventoryConfig::from_env();
    let orders = FixedOpenOrders(config.open_orders);
    let service = InventoryService::new(InMemoryInventoryStore::new(), orders, config);

    demo::seed(service.serializer()).context("seeding demo inventory")?;

    let ctx = RequestContext::admin(PrincipalId::new());
    let summary = service.dashboard_summary(&ctx)?;
    let recent = service.recent_items(&ctx, None)?;
    let low_stock = service.low_stock_items(&ctx, None)?;

    let dashboard = serde_json::json!({
        "summary": &summary,
        "recentItems": recent,
        "lowStockItems": low_stock,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&dashboard).context("serializing dashboard")?
    );

    tracing::info!(
        total_items = summary.total_items,
        low_stock_count = summary.low_stock_count,
        "demo dashboard rendered"
    );
    Ok(())
}
