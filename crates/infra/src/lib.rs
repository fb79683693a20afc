//! Infrastructure layer: item store, mutation serializer, config, external sources.

pub mod config;
pub mod demo;
pub mod error;
pub mod orders;
pub mod serializer;
pub mod store;


pub use config::InventoryConfig;
pub use error::InventoryError;
pub use orders::{FixedOpenOrders, OpenOrdersSource};
pub use serializer::MutationSerializer;
pub use store::{InMemoryInventoryStore, InventoryStore, StoreError};
