//! Raw-material stock reconciliation for finished-item saves.
//!
//! A save moves stock in two phases:
//!
//! ```text
//! previous bill ──restore──▶ stock as if the item had never been saved
//!                                   │
//! new bill ───────deduct───────────▶ stock after this save
//! ```
//!
//! A create is an edit whose previous bill is empty. Quantities are aggregated
//! per material in first-appearance order, so the sufficiency check compares the
//! whole bill's demand for a material against what is on hand.
//!
//! The reconciler talks to stock only through [`StockLedger`]. Deductions must be
//! atomic conditional decrements, and the ledger must be transactional: when
//! [`StockReconciler::apply`] fails part-way, the caller rolls the ledger back so
//! no partial movement survives.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;

use atelier_core::{DomainError, DomainResult, RawMaterialId, checked_sum};
use atelier_inventory::RawMaterial;

use crate::bom::MaterialConsumptionLine;

/// Result of a floor-checked deduction.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LedgerDeduction {
    Applied { remaining: Decimal },
    Insufficient { available: Decimal },
    MissingMaterial,
}

/// Stock port used by the reconciler.
pub trait StockLedger {
    type Error: core::fmt::Debug;

    /// Add `quantity` back. `None` when the material no longer exists.
    fn restore(&mut self, material_id: RawMaterialId, quantity: Decimal) -> Result<Option<Decimal>, Self::Error>;

    /// Decrement by `quantity` only if `quantity_on_hand >= quantity`, in one step.
    fn try_deduct(&mut self, material_id: RawMaterialId, quantity: Decimal) -> Result<LedgerDeduction, Self::Error>;
}

impl StockLedger for HashMap<RawMaterialId, RawMaterial> {
    type Error = DomainError;

    fn restore(&mut self, material_id: RawMaterialId, quantity: Decimal) -> Result<Option<Decimal>, Self::Error> {
        match self.get_mut(&material_id) {
            Some(material) => material.restore(quantity).map(Some),
            None => Ok(None),
        }
    }

    fn try_deduct(&mut self, material_id: RawMaterialId, quantity: Decimal) -> Result<LedgerDeduction, Self::Error> {
        let Some(material) = self.get_mut(&material_id) else {
            return Ok(LedgerDeduction::MissingMaterial);
        };
        Ok(match material.try_deduct(quantity) {
            Ok(remaining) => LedgerDeduction::Applied { remaining },
            Err(shortfall) => LedgerDeduction::Insufficient {
                available: shortfall.available,
            },
        })
    }
}

/// Net quantity to move for one material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedAdjustment {
    pub material_id: RawMaterialId,
    pub material_name: String,
    pub quantity: Decimal,
}

/// Restores and deductions needed to move from one bill to another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockPlan {
    restores: Vec<PlannedAdjustment>,
    deductions: Vec<PlannedAdjustment>,
}

impl StockPlan {
    pub fn for_create(next: &[MaterialConsumptionLine]) -> DomainResult<Self> {
        Self::for_edit(&[], next)
    }

    pub fn for_edit(previous: &[MaterialConsumptionLine], next: &[MaterialConsumptionLine]) -> DomainResult<Self> {
        Ok(Self {
            restores: aggregate(previous)?,
            deductions: aggregate(next)?,
        })
    }

    pub fn restores(&self) -> &[PlannedAdjustment] {
        &self.restores
    }

    pub fn deductions(&self) -> &[PlannedAdjustment] {
        &self.deductions
    }

    pub fn is_empty(&self) -> bool {
        self.restores.is_empty() && self.deductions.is_empty()
    }

    /// Net effect on each touched material (restored minus deducted), in plan order.
    pub fn net_delta(&self) -> DomainResult<Vec<(RawMaterialId, Decimal)>> {
        let mut out: Vec<(RawMaterialId, Decimal)> = Vec::new();
        let signed = self
            .restores
            .iter()
            .map(|a| (a.material_id, a.quantity))
            .chain(self.deductions.iter().map(|a| (a.material_id, -a.quantity)));
        for (material_id, delta) in signed {
            match out.iter_mut().find(|(id, _)| *id == material_id) {
                Some((_, total)) => *total = checked_sum("stock delta", [*total, delta])?,
                None => out.push((material_id, delta)),
            }
        }
        Ok(out)
    }
}

fn aggregate(lines: &[MaterialConsumptionLine]) -> DomainResult<Vec<PlannedAdjustment>> {
    let mut out: Vec<PlannedAdjustment> = Vec::new();
    let mut index: HashMap<RawMaterialId, usize> = HashMap::new();

    for line in lines {
        let quantity = line.deduction_quantity();
        // Selected but not yet quantified.
        if quantity <= Decimal::ZERO {
            continue;
        }
        match index.get(&line.material_id()) {
            Some(&pos) => {
                let planned = &mut out[pos].quantity;
                *planned = checked_sum("planned quantity", [*planned, quantity])?;
            }
            None => {
                index.insert(line.material_id(), out.len());
                out.push(PlannedAdjustment {
                    material_id: line.material_id(),
                    material_name: line.material_name().to_string(),
                    quantity,
                });
            }
        }
    }
    Ok(out)
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    Restore,
    Deduct,
}

/// One applied stock change and the level it left behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockMovement {
    pub material_id: RawMaterialId,
    pub kind: MovementKind,
    pub quantity: Decimal,
    pub on_hand_after: Decimal,
}

/// Everything a successful reconciliation did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StockReport {
    pub movements: Vec<StockMovement>,
    /// Materials referenced by the plan that no longer exist; no stock moved for them.
    pub skipped: Vec<RawMaterialId>,
}

impl StockReport {
    /// Final on-hand level of a material after this reconciliation, if it moved.
    pub fn on_hand_after(&self, material_id: RawMaterialId) -> Option<Decimal> {
        self.movements
            .iter()
            .rev()
            .find(|m| m.material_id == material_id)
            .map(|m| m.on_hand_after)
    }
}

/// Reconciliation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError<E> {
    /// The bill needs more of a material than is on hand (after restores).
    InsufficientStock {
        material_id: RawMaterialId,
        material_name: String,
        requested: Decimal,
        available: Decimal,
    },
    /// The plan could not be built from the bills.
    Invalid(DomainError),
    /// The ledger itself failed.
    Ledger(E),
}

impl<E: core::fmt::Debug> core::fmt::Display for ReconcileError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ReconcileError::InsufficientStock {
                material_name,
                requested,
                available,
                ..
            } => write!(
                f,
                "insufficient stock for {material_name}: requested {requested}, available {available}"
            ),
            ReconcileError::Invalid(e) => write!(f, "invalid stock plan: {e}"),
            ReconcileError::Ledger(e) => write!(f, "stock ledger failure: {e:?}"),
        }
    }
}

impl<E: core::fmt::Debug> std::error::Error for ReconcileError<E> {}

/// Applies stock plans to a ledger.
pub struct StockReconciler;

impl StockReconciler {
    /// Restore every planned restore, then deduct every planned deduction.
    ///
    /// Stops at the first material whose demand exceeds its (restored) stock.
    /// Movements already applied are left in the ledger for the caller's
    /// transaction to roll back.
    pub fn apply<L>(plan: &StockPlan, ledger: &mut L) -> Result<StockReport, ReconcileError<L::Error>>
    where
        L: StockLedger + ?Sized,
    {
        let mut report = StockReport::default();

        for adj in &plan.restores {
            match ledger
                .restore(adj.material_id, adj.quantity)
                .map_err(ReconcileError::Ledger)?
            {
                Some(on_hand_after) => report.movements.push(StockMovement {
                    material_id: adj.material_id,
                    kind: MovementKind::Restore,
                    quantity: adj.quantity,
                    on_hand_after,
                }),
                None => report.skipped.push(adj.material_id),
            }
        }

        for adj in &plan.deductions {
            match ledger
                .try_deduct(adj.material_id, adj.quantity)
                .map_err(ReconcileError::Ledger)?
            {
                LedgerDeduction::Applied { remaining } => report.movements.push(StockMovement {
                    material_id: adj.material_id,
                    kind: MovementKind::Deduct,
                    quantity: adj.quantity,
                    on_hand_after: remaining,
                }),
                LedgerDeduction::Insufficient { available } => {
                    return Err(ReconcileError::InsufficientStock {
                        material_id: adj.material_id,
                        material_name: adj.material_name.clone(),
                        requested: adj.quantity,
                        available,
                    });
                }
                LedgerDeduction::MissingMaterial => report.skipped.push(adj.material_id),
            }
        }

        Ok(report)
    }

    /// Plan and apply in one go: `previous` is empty for a create.
    pub fn reconcile<L>(
        previous: &[MaterialConsumptionLine],
        next: &[MaterialConsumptionLine],
        ledger: &mut L,
    ) -> Result<StockReport, ReconcileError<L::Error>>
    where
        L: StockLedger + ?Sized,
    {
        let plan = StockPlan::for_edit(previous, next).map_err(ReconcileError::Invalid)?;
        Self::apply(&plan, ledger)
    }
}
