//! Dashboard-wide summary metrics.

use serde::Serialize;

use crate::money::Money;
use crate::snapshot::InventorySnapshot;

/// Headline numbers for the dashboard.
///
/// `total_value` is in cents. `open_orders` is supplied by the order subsystem
/// and passed through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_items: usize,
    pub low_stock_count: usize,
    pub total_value: Money,
    pub open_orders: u64,
}

/// Compute the summary from one snapshot.
///
/// Valuation is `Σ price × quantity` (absent price counts as zero). A line
/// value that overflows is logged and the total saturates; the other metrics
/// are unaffected.
pub fn summarize(snapshot: &InventorySnapshot, open_orders: u64) -> DashboardSummary {
    let mut low_stock_count = 0usize;
    let mut total_value = Money::ZERO;

    for item in snapshot.items() {
        if item.stock_status().needs_attention() {
            low_stock_count += 1;
        }

        match item.line_value().and_then(|v| total_value.checked_add(v)) {
            Some(total) => total_value = total,
            None => {
                tracing::warn!(
                    item_id = %item.id_typed(),
                    quantity = item.quantity(),
                    "inventory value overflow; saturating total"
                );
                total_value = Money::from_cents(u64::MAX);
            }
        }
    }

    DashboardSummary {
        total_items: snapshot.len(),
        low_stock_count,
        total_value,
        open_orders,
    }
}
