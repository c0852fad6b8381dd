//! Persistence boundary for manufacturing records and raw-material stock.
//!
//! This module defines the infrastructure-facing abstraction the manufacturing
//! service saves through, without making any storage assumptions. Every save
//! runs inside one [`ManufacturingStore::transaction`].

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryManufacturingStore;
pub use r#trait::{ManufacturingStore, ManufacturingTx, StoreError};
