//! Item store boundary.
//!
//! The core never assumes a storage technology; it talks to an
//! [`InventoryStore`]. The in-memory implementation keeps relational-style
//! rows and is used for tests, benchmarks and the demo binary.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryInventoryStore;
pub use r#trait::{InventoryStore, StoreError};
