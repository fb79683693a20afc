//! Open-order count supplied by the (external) order subsystem.

use std::sync::Arc;

/// Source of the dashboard's open-order figure. The inventory core treats the
/// value as opaque and never derives it.
pub trait OpenOrdersSource: Send + Sync {
    fn open_orders(&self) -> u64;
}

impl<S> OpenOrdersSource for Arc<S>
where
    S: OpenOrdersSource + ?Sized,
{
    fn open_orders(&self) -> u64 {
        (**self).open_orders()
    }
}

/// Constant count, used until an order subsystem is connected.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct FixedOpenOrders(pub u64);

impl OpenOrdersSource for FixedOpenOrders {
    fn open_orders(&self) -> u64 {
        self.0
    }
}
