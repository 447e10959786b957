//! Warehouse persistence boundary.
//!
//! The store owns the optimistic-lock token. Writes take the enclosing
//! [`UnitOfWork`](crate::unit_of_work::UnitOfWork) and are staged there; reads
//! only ever observe committed state.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryWarehouseStore;
pub use r#trait::{StoreError, WarehouseStore};
