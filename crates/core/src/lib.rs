//! `atelier-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by the inventory and
//! manufacturing crates (no infrastructure concerns).

pub mod decimal;
pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use decimal::{checked_product, checked_sum, ensure_non_negative, ensure_not_blank};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{CustomerId, FinishedItemId, RawMaterialId};
pub use value_object::ValueObject;
