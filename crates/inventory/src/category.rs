use serde::{Deserialize, Serialize};

/// The physical kind of a raw material as entered in the catalog.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialKind {
    Gold,
    Silver,
    Other,
    Diamond,
    Gem,
    SouthSeaPearl,
}

impl MaterialKind {
    pub fn pricing_category(self) -> PricingCategory {
        match self {
            MaterialKind::Gold | MaterialKind::Silver | MaterialKind::Other => {
                PricingCategory::WeightBased
            }
            MaterialKind::Diamond | MaterialKind::Gem => PricingCategory::CaratPieceBased,
            MaterialKind::SouthSeaPearl => PricingCategory::FlatPieceBased,
        }
    }
}

/// Selects the cost and stock-deduction formula for a material.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingCategory {
    /// Priced and stocked by weight (grams).
    WeightBased,
    /// Priced per carat, stocked in pieces.
    CaratPieceBased,
    /// Priced per piece, stocked in pieces.
    FlatPieceBased,
}

impl PricingCategory {
    /// Unit in which `quantity_on_hand` is tracked.
    pub fn stock_unit(self) -> &'static str {
        match self {
            PricingCategory::WeightBased => "g",
            PricingCategory::CaratPieceBased | PricingCategory::FlatPieceBased => "pcs",
        }
    }
}
