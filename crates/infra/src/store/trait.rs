use std::sync::Arc;

use thiserror::Error;

use atelier_core::{DomainError, FinishedItemId, RawMaterialId};
use atelier_inventory::RawMaterial;
use atelier_manufacturing::{FinishedItem, LaborEntry, MaterialConsumptionLine, StockLedger};

/// Persistence operation error.
///
/// These are **infrastructure errors** as opposed to domain errors (validation,
/// insufficient stock). They are surfaced to the caller verbatim and never
/// retried here.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("conflicting write: {0}")]
    Conflict(String),

    #[error("missing row: {0}")]
    MissingRow(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("backend failure: {0}")]
    Backend(String),

    /// A stock write the store refused because it would break a domain rule.
    #[error("stock write rejected: {0}")]
    Rejected(#[from] DomainError),
}

/// Operations available inside one store transaction.
///
/// Stock moves through the [`StockLedger`] supertrait: `try_deduct` must be a
/// single conditional decrement (`quantity_on_hand >= n`), never a read followed
/// by a write.
pub trait ManufacturingTx: StockLedger<Error = StoreError> {
    fn raw_material(&self, id: RawMaterialId) -> Result<Option<RawMaterial>, StoreError>;

    fn finished_item(&self, id: FinishedItemId) -> Result<Option<FinishedItem>, StoreError>;

    /// All finished items, soft-deleted ones included.
    fn finished_items(&self) -> Result<Vec<FinishedItem>, StoreError>;

    /// Lines of an item in line order. Empty when the item has none.
    fn consumption_lines(&self, item_id: FinishedItemId) -> Result<Vec<MaterialConsumptionLine>, StoreError>;

    fn labor_entries(&self, item_id: FinishedItemId) -> Result<Vec<LaborEntry>, StoreError>;

    /// Fails with `Conflict` if the id is taken.
    fn insert_finished_item(&mut self, item: &FinishedItem) -> Result<(), StoreError>;

    /// Fails with `MissingRow` if the item does not exist.
    fn update_finished_item(&mut self, item: &FinishedItem) -> Result<(), StoreError>;

    /// Delete every consumption line of the item and insert `lines`.
    fn replace_consumption_lines(
        &mut self,
        item_id: FinishedItemId,
        lines: &[MaterialConsumptionLine],
    ) -> Result<(), StoreError>;

    /// Delete every labor entry of the item and insert `entries`.
    fn replace_labor_entries(&mut self, item_id: FinishedItemId, entries: &[LaborEntry]) -> Result<(), StoreError>;
}

/// Transactional store for finished items, their lines, and material stock.
///
/// ## Transaction semantics
///
/// `transaction` runs `work` against a [`ManufacturingTx`]. If `work` returns
/// `Ok`, every write it made is committed together; if it returns `Err`, none
/// of them are visible afterwards. Concurrent transactions touching the same
/// material must not interleave their stock changes.
pub trait ManufacturingStore: Send + Sync {
    fn transaction<T, E>(&self, work: impl FnOnce(&mut dyn ManufacturingTx) -> Result<T, E>) -> Result<T, E>
    where
        E: From<StoreError>;
}

impl<S> ManufacturingStore for Arc<S>
where
    S: ManufacturingStore + ?Sized,
{
    fn transaction<T, E>(&self, work: impl FnOnce(&mut dyn ManufacturingTx) -> Result<T, E>) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        (**self).transaction(work)
    }
}
