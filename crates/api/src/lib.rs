//! Application surface: request context, authorization, and the inventory
//! service façade over the store and mutation serializer.

pub mod authz;
pub mod context;
pub mod service;

pub use context::{RequestContext, Role};
pub use service::InventoryService;
