//! Raw-material catalog domain.
//!
//! Materials, the pricing category each one falls under, and the only two ways
//! their on-hand stock may change: a restore and a floor-checked deduction.

pub mod category;
pub mod material;

pub use category::{MaterialKind, PricingCategory};
pub use material::{RawMaterial, StockShortfall};
