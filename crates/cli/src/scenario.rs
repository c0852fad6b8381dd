//! JSON scenarios: a seeded material catalog followed by create/update steps.
//!
//! ```json
//! {
//!   "materials": [{ "id": "…", "name": "14K Gold", "kind": "gold",
//!                   "quantity_on_hand": "50", "cost_per_unit": "3000" }],
//!   "steps": [
//!     { "op": "create", "key": "ring", "item": { … } },
//!     { "op": "update", "key": "ring", "item": { … } }
//!   ]
//! }
//! ```
//!
//! Update steps address the item created under the same `key`.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use atelier_core::{FinishedItemId, RawMaterialId};
use atelier_events::InMemoryAuditLog;
use atelier_infra::{InMemoryManufacturingStore, ManufacturingRecordService, SavedRecord};
use atelier_inventory::{MaterialKind, RawMaterial};
use atelier_manufacturing::FinishedItemDraft;

#[derive(Debug, Clone, Deserialize)]
pub struct MaterialSeed {
    pub id: RawMaterialId,
    pub name: String,
    pub kind: MaterialKind,
    pub quantity_on_hand: Decimal,
    pub cost_per_unit: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Create { key: String, item: FinishedItemDraft },
    Update { key: String, item: FinishedItemDraft },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub materials: Vec<MaterialSeed>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("scenario is not valid JSON")
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    Saved { key: String, saved: Box<SavedRecord> },
    Rejected { key: String, error: String },
}

#[derive(Debug, Serialize)]
pub struct StockLevel {
    pub material_id: RawMaterialId,
    pub name: String,
    pub unit: &'static str,
    pub quantity_on_hand: Decimal,
}

#[derive(Debug, Serialize)]
pub struct ScenarioReport {
    pub steps: Vec<StepOutcome>,
    pub stock: Vec<StockLevel>,
    pub audit_entries: usize,
}

/// Seed an in-memory store and play every step in order.
///
/// Rejected steps are reported and do not stop the run.
pub fn run(scenario: Scenario) -> Result<ScenarioReport> {
    let materials = scenario
        .materials
        .into_iter()
        .map(|seed| {
            RawMaterial::new(seed.id, seed.name, seed.kind, seed.quantity_on_hand, seed.cost_per_unit)
                .with_context(|| format!("invalid material {}", seed.id))
        })
        .collect::<Result<Vec<_>>>()?;

    let store = Arc::new(InMemoryManufacturingStore::with_materials(materials));
    let audit = Arc::new(InMemoryAuditLog::new());
    let service = ManufacturingRecordService::new(store.clone(), audit.clone());

    let mut created: HashMap<String, FinishedItemId> = HashMap::new();
    let mut steps = Vec::with_capacity(scenario.steps.len());

    for step in scenario.steps {
        let outcome = match step {
            Step::Create { key, item } => match service.create(&item) {
                Ok(saved) => {
                    created.insert(key.clone(), saved.item().id);
                    StepOutcome::Saved {
                        key,
                        saved: Box::new(saved),
                    }
                }
                Err(e) => StepOutcome::Rejected { key, error: e.to_string() },
            },
            Step::Update { key, item } => match created.get(&key) {
                Some(&id) => match service.update(id, &item) {
                    Ok(saved) => StepOutcome::Saved {
                        key,
                        saved: Box::new(saved),
                    },
                    Err(e) => StepOutcome::Rejected { key, error: e.to_string() },
                },
                None => StepOutcome::Rejected {
                    error: format!("no item was created under key `{key}`"),
                    key,
                },
            },
        };
        if let StepOutcome::Rejected { key, error } = &outcome {
            tracing::info!(key = %key, error = %error, "scenario step rejected");
        }
        steps.push(outcome);
    }

    let stock = store
        .raw_materials()?
        .into_iter()
        .map(|m| StockLevel {
            material_id: m.id_typed(),
            unit: m.pricing_category().stock_unit(),
            quantity_on_hand: m.quantity_on_hand(),
            name: m.name().to_string(),
        })
        .collect();

    Ok(ScenarioReport {
        steps,
        stock,
        audit_entries: audit.len().context("audit log unreadable")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const GOLD: &str = "0190a1b2-0000-7000-8000-000000000001";
    const DIAMOND: &str = "0190a1b2-0000-7000-8000-000000000002";

    fn scenario() -> String {
        format!(
            r#"{{
              "materials": [
                {{ "id": "{GOLD}", "name": "14K Gold", "kind": "gold",
                   "quantity_on_hand": "50", "cost_per_unit": "3000" }},
                {{ "id": "{DIAMOND}", "name": "Diamond-VS1", "kind": "diamond",
                   "quantity_on_hand": "10", "cost_per_unit": "50000" }}
              ],
              "steps": [
                {{ "op": "create", "key": "ring", "item": {{
                    "name": "Solitaire", "sku": "RNG-1", "selling_price": "120000", "stock": 1,
                    "bill": {{
                      "materials": [
                        {{ "material_id": "{GOLD}", "quantity": "5" }},
                        {{ "material_id": "{DIAMOND}", "pieces": 2, "carat_per_piece": "0.5" }}
                      ],
                      "labor": [
                        {{ "description": "setting", "kind": {{ "category": "fixed", "fixed_cost": "1500" }} }}
                      ]
                    }}
                }} }},
                {{ "op": "update", "key": "ring", "item": {{
                    "name": "Solitaire", "sku": "RNG-1", "selling_price": "120000", "stock": 1,
                    "bill": {{ "materials": [
                        {{ "material_id": "{GOLD}", "quantity": "5" }},
                        {{ "material_id": "{DIAMOND}", "pieces": 1, "carat_per_piece": "0.5" }}
                    ] }}
                }} }},
                {{ "op": "update", "key": "missing", "item": {{
                    "name": "Ghost", "sku": "GH-1", "selling_price": "1", "stock": 0
                }} }}
              ]
            }}"#
        )
    }

    fn level(report: &ScenarioReport, name: &str) -> Decimal {
        report
            .stock
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.quantity_on_hand)
            .unwrap()
    }

    #[test]
    fn plays_steps_in_order_and_reports_final_stock() {
        let report = run(Scenario::from_json(&scenario()).unwrap()).unwrap();

        match &report.steps[0] {
            StepOutcome::Saved { saved, .. } => assert_eq!(saved.item().total_cost, dec!(66500)),
            other => panic!("Expected create to succeed, got {other:?}"),
        }
        match &report.steps[1] {
            StepOutcome::Saved { saved, .. } => assert_eq!(saved.item().total_cost, dec!(40000)),
            other => panic!("Expected update to succeed, got {other:?}"),
        }
        assert!(matches!(&report.steps[2], StepOutcome::Rejected { key, .. } if key == "missing"));

        assert_eq!(level(&report, "14K Gold"), dec!(45));
        assert_eq!(level(&report, "Diamond-VS1"), dec!(9));
        assert_eq!(report.audit_entries, 2);
    }

    #[test]
    fn invalid_seed_material_aborts_the_run() {
        let raw = format!(
            r#"{{ "materials": [{{ "id": "{GOLD}", "name": " ", "kind": "gold",
                 "quantity_on_hand": "1", "cost_per_unit": "1" }}] }}"#
        );
        assert!(run(Scenario::from_json(&raw).unwrap()).is_err());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(Scenario::from_json("{ \"materials\": ").is_err());
    }
}
