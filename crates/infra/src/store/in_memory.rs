use std::collections::HashMap;
use std::sync::Mutex;

use rust_decimal::Decimal;

use atelier_core::{Entity, FinishedItemId, RawMaterialId};
use atelier_inventory::RawMaterial;
use atelier_manufacturing::{FinishedItem, LaborEntry, LedgerDeduction, MaterialConsumptionLine, StockLedger};

use super::r#trait::{ManufacturingStore, ManufacturingTx, StoreError};

#[derive(Debug, Clone, Default)]
struct State {
    materials: HashMap<RawMaterialId, RawMaterial>,
    items: HashMap<FinishedItemId, FinishedItem>,
    consumption: HashMap<FinishedItemId, Vec<MaterialConsumptionLine>>,
    labor: HashMap<FinishedItemId, Vec<LaborEntry>>,
}

/// In-memory transactional store.
///
/// Intended for tests/dev. Transactions are serialized behind one lock and
/// roll back to a snapshot taken when they start, so they are atomic and isolated,
/// but not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryManufacturingStore {
    state: Mutex<State>,
}

impl InMemoryManufacturingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with a material catalog.
    pub fn with_materials(materials: impl IntoIterator<Item = RawMaterial>) -> Self {
        let state = State {
            materials: materials.into_iter().map(|m| (*m.id(), m)).collect(),
            ..State::default()
        };
        Self {
            state: Mutex::new(state),
        }
    }

    /// Add or replace a catalog entry (catalog maintenance lives outside the engine).
    pub fn upsert_raw_material(&self, material: RawMaterial) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        state.materials.insert(*material.id(), material);
        Ok(())
    }

    /// Drop a catalog entry, leaving any lines that reference it dangling.
    pub fn remove_raw_material(&self, id: RawMaterialId) -> Result<Option<RawMaterial>, StoreError> {
        Ok(self.lock()?.materials.remove(&id))
    }

    pub fn raw_material(&self, id: RawMaterialId) -> Result<Option<RawMaterial>, StoreError> {
        Ok(self.lock()?.materials.get(&id).cloned())
    }

    pub fn raw_materials(&self) -> Result<Vec<RawMaterial>, StoreError> {
        let mut materials: Vec<RawMaterial> = self.lock()?.materials.values().cloned().collect();
        materials.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(materials)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, State>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }
}

impl ManufacturingStore for InMemoryManufacturingStore {
    fn transaction<T, E>(&self, work: impl FnOnce(&mut dyn ManufacturingTx) -> Result<T, E>) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let mut guard = self.lock()?;
        let snapshot = guard.clone();

        let mut tx = InMemoryTx { state: &mut *guard };
        let outcome = work(&mut tx);

        if outcome.is_err() {
            *guard = snapshot;
        }
        outcome
    }
}

struct InMemoryTx<'a> {
    state: &'a mut State,
}

impl StockLedger for InMemoryTx<'_> {
    type Error = StoreError;

    // Same stock rules as a bare catalog map.
    fn restore(&mut self, material_id: RawMaterialId, quantity: Decimal) -> Result<Option<Decimal>, StoreError> {
        Ok(self.state.materials.restore(material_id, quantity)?)
    }

    fn try_deduct(&mut self, material_id: RawMaterialId, quantity: Decimal) -> Result<LedgerDeduction, StoreError> {
        Ok(self.state.materials.try_deduct(material_id, quantity)?)
    }
}

impl ManufacturingTx for InMemoryTx<'_> {
    fn raw_material(&self, id: RawMaterialId) -> Result<Option<RawMaterial>, StoreError> {
        Ok(self.state.materials.get(&id).cloned())
    }

    fn finished_item(&self, id: FinishedItemId) -> Result<Option<FinishedItem>, StoreError> {
        Ok(self.state.items.get(&id).cloned())
    }

    fn finished_items(&self) -> Result<Vec<FinishedItem>, StoreError> {
        let mut items: Vec<FinishedItem> = self.state.items.values().cloned().collect();
        items.sort_by_key(|i| i.id);
        Ok(items)
    }

    fn consumption_lines(&self, item_id: FinishedItemId) -> Result<Vec<MaterialConsumptionLine>, StoreError> {
        Ok(self.state.consumption.get(&item_id).cloned().unwrap_or_default())
    }

    fn labor_entries(&self, item_id: FinishedItemId) -> Result<Vec<LaborEntry>, StoreError> {
        Ok(self.state.labor.get(&item_id).cloned().unwrap_or_default())
    }

    fn insert_finished_item(&mut self, item: &FinishedItem) -> Result<(), StoreError> {
        if self.state.items.contains_key(item.id()) {
            return Err(StoreError::Conflict(format!("finished item {} already exists", item.id)));
        }
        self.state.items.insert(*item.id(), item.clone());
        Ok(())
    }

    fn update_finished_item(&mut self, item: &FinishedItem) -> Result<(), StoreError> {
        match self.state.items.get_mut(item.id()) {
            Some(existing) => {
                *existing = item.clone();
                Ok(())
            }
            None => Err(StoreError::MissingRow(format!("finished item {}", item.id))),
        }
    }

    fn replace_consumption_lines(
        &mut self,
        item_id: FinishedItemId,
        lines: &[MaterialConsumptionLine],
    ) -> Result<(), StoreError> {
        if !self.state.items.contains_key(&item_id) {
            return Err(StoreError::MissingRow(format!("finished item {item_id}")));
        }
        self.state.consumption.insert(item_id, lines.to_vec());
        Ok(())
    }

    fn replace_labor_entries(&mut self, item_id: FinishedItemId, entries: &[LaborEntry]) -> Result<(), StoreError> {
        if !self.state.items.contains_key(&item_id) {
            return Err(StoreError::MissingRow(format!("finished item {item_id}")));
        }
        self.state.labor.insert(item_id, entries.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_core::DomainError;
    use atelier_inventory::MaterialKind;
    use atelier_manufacturing::{ConsumptionInput, FinishedItemDraft};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn gold() -> RawMaterial {
        RawMaterial::new(RawMaterialId::new(), "14K Gold", MaterialKind::Gold, dec!(50), dec!(3000)).unwrap()
    }

    fn item() -> FinishedItem {
        let draft = FinishedItemDraft {
            name: "Band".to_string(),
            sku: "BND-1".to_string(),
            description: None,
            date_manufactured: None,
            selling_price: dec!(20000),
            stock: 1,
            customer_id: None,
            bill: Default::default(),
        };
        FinishedItem::from_draft(FinishedItemId::new(), &draft, dec!(15000), Utc::now())
    }

    #[test]
    fn committed_transaction_persists_every_write() {
        let material = gold();
        let store = InMemoryManufacturingStore::with_materials([material.clone()]);
        let item = item();
        let line = MaterialConsumptionLine::capture(
            1,
            &material,
            &ConsumptionInput::weight(material.id_typed(), dec!(5)),
        )
        .unwrap();

        store
            .transaction(|tx| {
                assert!(matches!(
                    tx.try_deduct(material.id_typed(), dec!(5))?,
                    LedgerDeduction::Applied { .. }
                ));
                tx.insert_finished_item(&item)?;
                tx.replace_consumption_lines(item.id, std::slice::from_ref(&line))?;
                Ok::<_, StoreError>(())
            })
            .unwrap();

        let on_hand = store.raw_material(material.id_typed()).unwrap().unwrap().quantity_on_hand();
        assert_eq!(on_hand, dec!(45));
        let lines = store
            .transaction(|tx| tx.consumption_lines(item.id))
            .unwrap();
        assert_eq!(lines, vec![line]);
    }

    #[test]
    fn failed_transaction_rolls_back_stock_and_rows() {
        let material = gold();
        let store = InMemoryManufacturingStore::with_materials([material.clone()]);
        let item = item();

        let err = store
            .transaction(|tx| {
                tx.try_deduct(material.id_typed(), dec!(20))?;
                tx.insert_finished_item(&item)?;
                Err::<(), _>(StoreError::Backend("disk full".to_string()))
            })
            .unwrap_err();
        assert_eq!(err, StoreError::Backend("disk full".to_string()));

        let on_hand = store.raw_material(material.id_typed()).unwrap().unwrap().quantity_on_hand();
        assert_eq!(on_hand, dec!(50));
        assert!(store.transaction(|tx| tx.finished_item(item.id)).unwrap().is_none());
    }

    #[test]
    fn deduct_is_floor_checked() {
        let material = gold();
        let store = InMemoryManufacturingStore::with_materials([material.clone()]);

        let outcome = store
            .transaction(|tx| tx.try_deduct(material.id_typed(), dec!(50.01)))
            .unwrap();
        assert_eq!(outcome, LedgerDeduction::Insufficient { available: dec!(50) });

        let outcome = store
            .transaction(|tx| tx.try_deduct(RawMaterialId::new(), dec!(1)))
            .unwrap();
        assert_eq!(outcome, LedgerDeduction::MissingMaterial);
    }

    #[test]
    fn duplicate_insert_and_missing_update_are_rejected() {
        let store = InMemoryManufacturingStore::new();
        let item = item();

        let err = store
            .transaction(|tx| {
                tx.insert_finished_item(&item)?;
                tx.insert_finished_item(&item)
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        let err = store.transaction(|tx| tx.update_finished_item(&item)).unwrap_err();
        assert!(matches!(err, StoreError::MissingRow(_)));

        let err = store
            .transaction(|tx| tx.replace_labor_entries(item.id, &[]))
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingRow(_)));
    }

    #[test]
    fn restore_of_removed_material_reports_none() {
        let material = gold();
        let store = InMemoryManufacturingStore::with_materials([material.clone()]);
        store.remove_raw_material(material.id_typed()).unwrap();

        let restored = store
            .transaction(|tx| tx.restore(material.id_typed(), dec!(5)))
            .unwrap();
        assert_eq!(restored, None);
        assert!(store.raw_materials().unwrap().is_empty());
    }

    #[test]
    fn restore_overflow_is_rejected_and_rolled_back() {
        let material = RawMaterial::new(RawMaterialId::new(), "14K Gold", MaterialKind::Gold, Decimal::MAX, dec!(3000))
            .unwrap();
        let store = InMemoryManufacturingStore::with_materials([material.clone()]);

        let err = store
            .transaction(|tx| tx.restore(material.id_typed(), dec!(1)))
            .unwrap_err();
        assert!(matches!(err, StoreError::Rejected(DomainError::InvariantViolation(_))));

        let on_hand = store.raw_material(material.id_typed()).unwrap().unwrap().quantity_on_hand();
        assert_eq!(on_hand, Decimal::MAX);
    }
}
