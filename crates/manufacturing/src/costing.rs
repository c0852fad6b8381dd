//! Material cost model and bill-of-materials cost aggregation.
//!
//! A consumption line is costed by the pricing category of the material it
//! references:
//!
//! | category            | subtotal                                 | deducted from stock |
//! |---------------------|------------------------------------------|---------------------|
//! | `weight_based`      | `quantity * cost_at_time`                | `quantity`          |
//! | `carat_piece_based` | `pieces * carat_per_piece * cost_at_time`| `pieces`            |
//! | `flat_piece_based`  | `pieces * cost_per_piece`                | `pieces`            |
//!
//! Stock of piece-tracked materials is counted in physical pieces, never in carats
//! or currency, so the deducted quantity differs from the displayed one.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use atelier_core::{DomainResult, ValueObject, checked_product, checked_sum};
use atelier_inventory::{PricingCategory, RawMaterial};

use crate::bom::{ConsumptionInput, MaterialConsumptionLine};
use crate::labor::LaborEntry;

/// Category-specific usage of a material, captured when a line is saved.
///
/// Prices and the piece default are resolved at capture time, so restoring a
/// saved line later returns exactly what was deducted even if the catalog entry
/// has since changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum MaterialUsage {
    WeightBased {
        quantity: Decimal,
        cost_at_time: Decimal,
    },
    CaratPieceBased {
        pieces: u32,
        carat_per_piece: Decimal,
        cost_at_time: Decimal,
    },
    FlatPieceBased {
        pieces: u32,
        cost_per_piece: Decimal,
    },
}

impl ValueObject for MaterialUsage {}

impl MaterialUsage {
    /// Interpret a caller line under `category`.
    ///
    /// Unset `pieces` defaults to 1. Unset prices fall back to `current_unit_cost`.
    pub fn capture(category: PricingCategory, input: &ConsumptionInput, current_unit_cost: Decimal) -> Self {
        let pieces = input.pieces.unwrap_or(1);
        match category {
            PricingCategory::WeightBased => MaterialUsage::WeightBased {
                quantity: input.quantity.unwrap_or(Decimal::ZERO),
                cost_at_time: input.cost_at_time.unwrap_or(current_unit_cost),
            },
            PricingCategory::CaratPieceBased => MaterialUsage::CaratPieceBased {
                pieces,
                carat_per_piece: input.carat_per_piece.unwrap_or(Decimal::ZERO),
                cost_at_time: input.cost_at_time.unwrap_or(current_unit_cost),
            },
            PricingCategory::FlatPieceBased => MaterialUsage::FlatPieceBased {
                pieces,
                cost_per_piece: input.cost_per_piece.unwrap_or(current_unit_cost),
            },
        }
    }

    pub fn subtotal(&self) -> DomainResult<Decimal> {
        match self {
            MaterialUsage::WeightBased {
                quantity,
                cost_at_time,
            } => checked_product("line subtotal", *quantity, *cost_at_time),
            MaterialUsage::CaratPieceBased { cost_at_time, .. } => {
                checked_product("line subtotal", self.quantity_used()?, *cost_at_time)
            }
            MaterialUsage::FlatPieceBased {
                pieces,
                cost_per_piece,
            } => checked_product("line subtotal", Decimal::from(*pieces), *cost_per_piece),
        }
    }

    /// Physical units removed from stock: grams for weight, pieces otherwise.
    pub fn deduction_quantity(&self) -> Decimal {
        match self {
            MaterialUsage::WeightBased { quantity, .. } => *quantity,
            MaterialUsage::CaratPieceBased { pieces, .. }
            | MaterialUsage::FlatPieceBased { pieces, .. } => Decimal::from(*pieces),
        }
    }

    /// Quantity shown to the user: grams, total carats, or pieces.
    pub fn quantity_used(&self) -> DomainResult<Decimal> {
        match self {
            MaterialUsage::WeightBased { quantity, .. } => Ok(*quantity),
            MaterialUsage::CaratPieceBased {
                pieces,
                carat_per_piece,
                ..
            } => checked_product("carat weight", Decimal::from(*pieces), *carat_per_piece),
            MaterialUsage::FlatPieceBased { pieces, .. } => Ok(Decimal::from(*pieces)),
        }
    }

    /// Unit price captured for the line (per gram, per carat, or per piece).
    pub fn cost_at_time(&self) -> Decimal {
        match self {
            MaterialUsage::WeightBased { cost_at_time, .. }
            | MaterialUsage::CaratPieceBased { cost_at_time, .. } => *cost_at_time,
            MaterialUsage::FlatPieceBased { cost_per_piece, .. } => *cost_per_piece,
        }
    }
}

/// Subtotal of one caller line against the material it references.
///
/// An unresolved material contributes nothing.
pub fn line_cost(material: Option<&RawMaterial>, input: &ConsumptionInput) -> DomainResult<Decimal> {
    match material {
        Some(material) => {
            MaterialUsage::capture(material.pricing_category(), input, material.cost_per_unit()).subtotal()
        }
        None => Ok(Decimal::ZERO),
    }
}

/// Material, labor and overall cost of a bill of materials.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub materials: Decimal,
    pub labor: Decimal,
    pub total: Decimal,
}

/// Sums line costs into the manufacturing cost of an item.
///
/// Always recomputed from the lines; nothing is carried over between saves.
/// A sum outside the decimal range is an invariant violation, never a panic.
pub struct CostAggregator;

impl CostAggregator {
    pub fn breakdown(materials: &[MaterialConsumptionLine], labor: &[LaborEntry]) -> DomainResult<CostBreakdown> {
        let materials = checked_sum("material cost", materials.iter().map(MaterialConsumptionLine::subtotal))?;
        let labor = checked_sum("labor cost", labor.iter().map(LaborEntry::total_cost))?;
        Ok(CostBreakdown {
            materials,
            labor,
            total: checked_sum("total cost", [materials, labor])?,
        })
    }

    pub fn total_cost(materials: &[MaterialConsumptionLine], labor: &[LaborEntry]) -> DomainResult<Decimal> {
        Ok(Self::breakdown(materials, labor)?.total)
    }
}
