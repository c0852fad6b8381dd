//! Manufacturing record orchestration (application-level).
//!
//! ```text
//! draft
//!   ↓
//! 1. Validate (no store access on failure)
//!   ↓  ┌──────────── one store transaction ────────────┐
//! 2. │ Resolve lines against the material catalog      │
//! 3. │ Cost the bill (always recomputed)               │
//! 4. │ Restore previous bill, deduct new bill          │
//! 5. │ Write item, replace consumption + labor lines   │
//!   ↓  └───────────────────────────────────────────────┘
//! 6. Append audit entry (committed saves only)
//! ```
//!
//! Any failure inside the transaction rolls back every stock movement and row
//! write of the attempt, so a rejected save leaves stock exactly as it was.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::{debug, info, warn};

use atelier_core::{DomainError, FinishedItemId, RawMaterialId, checked_sum};
use atelier_events::{AuditAction, AuditEntry, AuditLog};
use atelier_manufacturing::{
    BillOfMaterials, CostBreakdown, FinishedItem, FinishedItemDraft, ReconcileError, ResolvedBill, StockPlan,
    StockReconciler, StockReport,
};

use crate::store::{ManufacturingStore, ManufacturingTx, StoreError};

const ENTITY_TYPE: &str = "finished_item";

#[derive(Debug, Error)]
pub enum ManufacturingError {
    /// Caller input was rejected before any stock moved.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The bill needs more of a material than is on hand; nothing was saved.
    #[error(
        "insufficient stock for {material_name}: requested {requested}, available {available} (short by {shortfall})"
    )]
    InsufficientStock {
        material_id: RawMaterialId,
        material_name: String,
        requested: Decimal,
        available: Decimal,
        shortfall: Decimal,
    },

    /// Unknown or soft-deleted finished item.
    #[error("finished item {0} not found")]
    NotFound(FinishedItemId),

    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error(transparent)]
    Persistence(StoreError),
}

impl From<DomainError> for ManufacturingError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => ManufacturingError::Validation(msg),
            DomainError::InvariantViolation(msg) => ManufacturingError::InvariantViolation(msg),
        }
    }
}

impl From<StoreError> for ManufacturingError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Rejected(e) => e.into(),
            other => ManufacturingError::Persistence(other),
        }
    }
}

impl From<ReconcileError<StoreError>> for ManufacturingError {
    fn from(value: ReconcileError<StoreError>) -> Self {
        match value {
            ReconcileError::InsufficientStock {
                material_id,
                material_name,
                requested,
                available,
            } => ManufacturingError::InsufficientStock {
                material_id,
                material_name,
                requested,
                available,
                shortfall: requested - available,
            },
            ReconcileError::Invalid(e) => e.into(),
            ReconcileError::Ledger(e) => e.into(),
        }
    }
}

/// Non-fatal problems found while saving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SaveWarning {
    /// A draft line named a material that does not exist; it was dropped with
    /// zero cost and zero stock effect.
    UnresolvedMaterialReference { line_no: u32, material_id: RawMaterialId },
    /// A previously saved line's material no longer exists; its stock was not moved.
    StockSkipped { material_id: RawMaterialId },
}

/// A finished item with its persisted bill of materials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManufacturingRecord {
    pub item: FinishedItem,
    pub bill: BillOfMaterials,
}

/// Result of a successful create or update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedRecord {
    pub record: ManufacturingRecord,
    pub cost: CostBreakdown,
    pub stock: StockReport,
    pub warnings: Vec<SaveWarning>,
}

impl SavedRecord {
    fn new(item: FinishedItem, resolved: ResolvedBill, cost: CostBreakdown, stock: StockReport) -> Self {
        let mut warnings: Vec<SaveWarning> = resolved
            .unresolved
            .iter()
            .map(|u| SaveWarning::UnresolvedMaterialReference {
                line_no: u.line_no,
                material_id: u.material_id,
            })
            .collect();
        warnings.extend(
            stock
                .skipped
                .iter()
                .map(|&material_id| SaveWarning::StockSkipped { material_id }),
        );
        Self {
            record: ManufacturingRecord {
                item,
                bill: resolved.bill,
            },
            cost,
            stock,
            warnings,
        }
    }

    pub fn item(&self) -> &FinishedItem {
        &self.record.item
    }
}

/// Creates and edits finished items while keeping raw-material stock consistent.
///
/// Generic over the store and the audit sink so tests run against in-memory
/// implementations.
#[derive(Debug)]
pub struct ManufacturingRecordService<S, A> {
    store: S,
    audit: A,
}

impl<S, A> ManufacturingRecordService<S, A> {
    pub fn new(store: S, audit: A) -> Self {
        Self { store, audit }
    }
}

impl<S, A> ManufacturingRecordService<S, A>
where
    S: ManufacturingStore,
    A: AuditLog,
{
    /// Save a new finished item and consume its materials.
    pub fn create(&self, draft: &FinishedItemDraft) -> Result<SavedRecord, ManufacturingError> {
        draft.validate()?;
        let now = Utc::now();
        let item_id = FinishedItemId::new();

        let saved = self.store.transaction(|tx| {
            let resolved = resolve(tx, draft)?;
            let cost = resolved.bill.cost_breakdown()?;
            let plan = StockPlan::for_create(&resolved.bill.materials)?;
            let stock = StockReconciler::apply(&plan, &mut *tx)?;

            let item = FinishedItem::from_draft(item_id, draft, cost.total, now);
            tx.insert_finished_item(&item)?;
            write_lines(tx, item_id, &resolved.bill)?;

            Ok::<_, ManufacturingError>(SavedRecord::new(item, resolved, cost, stock))
        });
        let saved = saved.inspect_err(|e| log_rejected("create", None, e))?;

        log_saved("created", &saved);
        self.append_audit(AuditAction::Create, None, &saved.record);
        Ok(saved)
    }

    /// Replace an item's fields and bill, moving stock from the old bill to the new one.
    ///
    /// Saving the same draft twice leaves stock where the first save left it.
    pub fn update(&self, item_id: FinishedItemId, draft: &FinishedItemDraft) -> Result<SavedRecord, ManufacturingError> {
        draft.validate()?;
        let now = Utc::now();

        let outcome = self.store.transaction(|tx| {
            let existing = tx
                .finished_item(item_id)?
                .filter(|item| !item.is_deleted())
                .ok_or(ManufacturingError::NotFound(item_id))?;
            let previous = BillOfMaterials {
                materials: tx.consumption_lines(item_id)?,
                labor: tx.labor_entries(item_id)?,
            };

            let resolved = resolve(tx, draft)?;
            let cost = resolved.bill.cost_breakdown()?;
            let plan = StockPlan::for_edit(&previous.materials, &resolved.bill.materials)?;
            let stock = StockReconciler::apply(&plan, &mut *tx)?;

            let item = existing.revise(draft, cost.total, now);
            tx.update_finished_item(&item)?;
            write_lines(tx, item_id, &resolved.bill)?;

            let before = ManufacturingRecord {
                item: existing,
                bill: previous,
            };
            Ok::<_, ManufacturingError>((before, SavedRecord::new(item, resolved, cost, stock)))
        });
        let (before, saved) = outcome.inspect_err(|e| log_rejected("update", Some(item_id), e))?;

        log_saved("updated", &saved);
        self.append_audit(AuditAction::Update, Some(&before), &saved.record);
        Ok(saved)
    }

    /// Read back a non-deleted item with its persisted lines.
    pub fn record(&self, item_id: FinishedItemId) -> Result<ManufacturingRecord, ManufacturingError> {
        self.store.transaction(|tx| {
            let item = tx
                .finished_item(item_id)?
                .filter(|item| !item.is_deleted())
                .ok_or(ManufacturingError::NotFound(item_id))?;
            let bill = BillOfMaterials {
                materials: tx.consumption_lines(item_id)?,
                labor: tx.labor_entries(item_id)?,
            };
            Ok::<_, ManufacturingError>(ManufacturingRecord { item, bill })
        })
    }

    /// Stock of a material currently tied up in non-deleted finished items.
    pub fn outstanding_consumption(&self, material_id: RawMaterialId) -> Result<Decimal, ManufacturingError> {
        self.store.transaction(|tx| {
            let mut quantities = Vec::new();
            for item in tx.finished_items()?.iter().filter(|i| !i.is_deleted()) {
                quantities.extend(
                    tx.consumption_lines(item.id)?
                        .iter()
                        .filter(|line| line.material_id() == material_id)
                        .map(|line| line.deduction_quantity())
                        .filter(|qty| *qty > Decimal::ZERO),
                );
            }
            Ok::<_, ManufacturingError>(checked_sum("outstanding consumption", quantities)?)
        })
    }

    fn append_audit(&self, action: AuditAction, before: Option<&ManufacturingRecord>, after: &ManufacturingRecord) {
        let entry = AuditEntry::new(
            action,
            ENTITY_TYPE,
            after.item.id,
            before.and_then(snapshot),
            snapshot(after),
            after.item.updated_at,
        );
        if let Err(e) = self.audit.record(entry) {
            // The save is already committed; the audit trail is best-effort from here.
            warn!(item_id = %after.item.id, action = %action, error = ?e, "audit append failed");
        }
    }
}

fn resolve(tx: &mut dyn ManufacturingTx, draft: &FinishedItemDraft) -> Result<ResolvedBill, ManufacturingError> {
    BillOfMaterials::resolve(&draft.bill, |id| tx.raw_material(id).map_err(ManufacturingError::from))
}

fn write_lines(tx: &mut dyn ManufacturingTx, item_id: FinishedItemId, bill: &BillOfMaterials) -> Result<(), StoreError> {
    tx.replace_consumption_lines(item_id, &bill.materials)?;
    tx.replace_labor_entries(item_id, &bill.labor)
}

fn snapshot(record: &ManufacturingRecord) -> Option<JsonValue> {
    match serde_json::to_value(record) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(item_id = %record.item.id, error = %e, "could not snapshot record for audit");
            None
        }
    }
}

fn log_saved(verb: &str, saved: &SavedRecord) {
    let item = saved.item();
    info!(
        item_id = %item.id,
        sku = %item.sku,
        total_cost = %saved.cost.total,
        material_cost = %saved.cost.materials,
        labor_cost = %saved.cost.labor,
        movements = saved.stock.movements.len(),
        "finished item {verb}"
    );
    for movement in &saved.stock.movements {
        debug!(
            item_id = %item.id,
            material_id = %movement.material_id,
            kind = ?movement.kind,
            quantity = %movement.quantity,
            on_hand_after = %movement.on_hand_after,
            "stock moved"
        );
    }
    for warning in &saved.warnings {
        warn!(item_id = %item.id, warning = ?warning, "finished item saved with warning");
    }
}

fn log_rejected(op: &str, item_id: Option<FinishedItemId>, error: &ManufacturingError) {
    match error {
        ManufacturingError::InsufficientStock { .. } | ManufacturingError::NotFound(_) => {
            info!(op, item_id = ?item_id, error = %error, "manufacturing save rejected");
        }
        _ => warn!(op, item_id = ?item_id, error = %error, "manufacturing save failed"),
    }
}
