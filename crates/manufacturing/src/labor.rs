//! Labor cost model. Labor never touches raw-material stock.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use atelier_core::{DomainResult, ValueObject, checked_product, ensure_non_negative};

/// How a labor line is charged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum LaborKind {
    /// Charged per piece worked (e.g. per stone set).
    PieceRate { pieces: u32, amount_per_piece: Decimal },
    /// A flat charge for the job.
    Fixed { fixed_cost: Decimal },
}

impl ValueObject for LaborKind {}

impl LaborKind {
    pub fn validate(&self) -> DomainResult<()> {
        match self {
            LaborKind::PieceRate { amount_per_piece, .. } => {
                ensure_non_negative("amount_per_piece", *amount_per_piece)
            }
            LaborKind::Fixed { fixed_cost } => ensure_non_negative("fixed_cost", *fixed_cost),
        }
    }
}

/// Cost of one labor line.
pub fn labor_cost(kind: &LaborKind) -> DomainResult<Decimal> {
    match kind {
        LaborKind::Fixed { fixed_cost } => Ok(*fixed_cost),
        LaborKind::PieceRate {
            pieces,
            amount_per_piece,
        } => checked_product("labor cost", Decimal::from(*pieces), *amount_per_piece),
    }
}

/// Labor line as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaborInput {
    #[serde(default)]
    pub description: String,
    pub kind: LaborKind,
}

impl LaborInput {
    pub fn fixed(description: impl Into<String>, fixed_cost: Decimal) -> Self {
        Self {
            description: description.into(),
            kind: LaborKind::Fixed { fixed_cost },
        }
    }

    pub fn piece_rate(description: impl Into<String>, pieces: u32, amount_per_piece: Decimal) -> Self {
        Self {
            description: description.into(),
            kind: LaborKind::PieceRate {
                pieces,
                amount_per_piece,
            },
        }
    }
}

/// Persisted labor line belonging to one finished item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaborEntry {
    line_no: u32,
    description: String,
    kind: LaborKind,
    total_cost: Decimal,
}

impl LaborEntry {
    pub fn new(line_no: u32, input: &LaborInput) -> DomainResult<Self> {
        Ok(Self {
            line_no,
            description: input.description.clone(),
            kind: input.kind.clone(),
            total_cost: labor_cost(&input.kind)?,
        })
    }

    pub fn line_no(&self) -> u32 {
        self.line_no
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> &LaborKind {
        &self.kind
    }

    pub fn total_cost(&self) -> Decimal {
        self.total_cost
    }
}
