//! Infrastructure layer: transactional storage and the manufacturing record service.

pub mod service;
pub mod store;


pub use service::{ManufacturingError, ManufacturingRecord, ManufacturingRecordService, SaveWarning, SavedRecord};
pub use store::{InMemoryManufacturingStore, ManufacturingStore, ManufacturingTx, StoreError};
