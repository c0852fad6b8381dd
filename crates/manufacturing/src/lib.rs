//! Manufacturing domain module.
//!
//! Costing and stock reconciliation for finished jewelry items built from a bill
//! of materials plus labor. Everything here is deterministic domain logic: stock
//! is reached only through the [`StockLedger`] port, persistence lives in
//! `atelier-infra`.

pub mod bom;
pub mod costing;
pub mod item;
pub mod labor;
pub mod reconcile;

pub use bom::{BillOfMaterials, BomDraft, ConsumptionInput, MaterialConsumptionLine, ResolvedBill, UnresolvedLine};
pub use costing::{CostAggregator, CostBreakdown, MaterialUsage, line_cost};
pub use item::{FinishedItem, FinishedItemDraft};
pub use labor::{LaborEntry, LaborInput, LaborKind, labor_cost};
pub use reconcile::{
    LedgerDeduction, MovementKind, PlannedAdjustment, ReconcileError, StockLedger, StockMovement,
    StockPlan, StockReconciler, StockReport,
};
