use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use atelier_core::{
    CustomerId, DomainError, DomainResult, Entity, FinishedItemId, ensure_non_negative, ensure_not_blank,
};

use crate::bom::BomDraft;

/// Finished-item fields plus bill of materials, as submitted for create or update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishedItemDraft {
    pub name: String,
    pub sku: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date_manufactured: Option<NaiveDate>,
    pub selling_price: Decimal,
    /// Finished goods on hand.
    pub stock: i64,
    /// Owning customer for custom orders.
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    #[serde(default)]
    pub bill: BomDraft,
}

impl FinishedItemDraft {
    pub fn validate(&self) -> DomainResult<()> {
        ensure_not_blank("name", &self.name)?;
        ensure_not_blank("sku", &self.sku)?;
        ensure_non_negative("selling_price", self.selling_price)?;
        if self.stock < 0 {
            return Err(DomainError::negative("stock", self.stock));
        }
        self.bill.validate()
    }
}

/// A manufactured jewelry item.
///
/// `total_cost` is derived from the bill of materials on every save and is never
/// set by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinishedItem {
    pub id: FinishedItemId,
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
    pub date_manufactured: Option<NaiveDate>,
    pub selling_price: Decimal,
    pub stock: i64,
    pub customer_id: Option<CustomerId>,
    pub total_cost: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set by the soft-delete workflow; deleted items keep their rows.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl FinishedItem {
    pub fn from_draft(id: FinishedItemId, draft: &FinishedItemDraft, total_cost: Decimal, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name.trim().to_string(),
            sku: draft.sku.trim().to_string(),
            description: draft.description.clone(),
            date_manufactured: draft.date_manufactured,
            selling_price: draft.selling_price,
            stock: draft.stock,
            customer_id: draft.customer_id,
            total_cost,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Apply an edit, keeping identity and creation time.
    pub fn revise(&self, draft: &FinishedItemDraft, total_cost: Decimal, now: DateTime<Utc>) -> Self {
        Self {
            created_at: self.created_at,
            deleted_at: self.deleted_at,
            ..Self::from_draft(self.id, draft, total_cost, now)
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Selling price minus manufacturing cost (negative when sold below cost).
    pub fn margin(&self) -> Decimal {
        self.selling_price - self.total_cost
    }
}

impl Entity for FinishedItem {
    type Id = FinishedItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bom::ConsumptionInput;
    use atelier_core::RawMaterialId;
    use rust_decimal_macros::dec;

    fn draft() -> FinishedItemDraft {
        FinishedItemDraft {
            name: "Solitaire Ring".to_string(),
            sku: "RNG-0001".to_string(),
            description: None,
            date_manufactured: NaiveDate::from_ymd_opt(2026, 3, 14),
            selling_price: dec!(95000),
            stock: 1,
            customer_id: None,
            bill: BomDraft::default(),
        }
    }

    fn expect_validation(draft: &FinishedItemDraft, field: &str) {
        match draft.validate().unwrap_err() {
            DomainError::Validation(msg) if msg.contains(field) => {}
            other => panic!("Expected validation error for {field}, got {other:?}"),
        }
    }

    #[test]
    fn valid_draft_passes() {
        assert!(draft().validate().is_ok());
    }

    #[test]
    fn required_fields_are_enforced() {
        expect_validation(&FinishedItemDraft { name: "   ".into(), ..draft() }, "name");
        expect_validation(&FinishedItemDraft { sku: String::new(), ..draft() }, "sku");
        expect_validation(
            &FinishedItemDraft {
                selling_price: dec!(-1),
                ..draft()
            },
            "selling_price",
        );
        expect_validation(&FinishedItemDraft { stock: -3, ..draft() }, "stock");
    }

    #[test]
    fn bill_lines_are_validated_with_the_item() {
        let mut d = draft();
        d.bill
            .materials
            .push(ConsumptionInput::weight(RawMaterialId::new(), dec!(1)).with_cost_at_time(dec!(-5)));
        expect_validation(&d, "cost_at_time");
    }

    #[test]
    fn revise_keeps_identity_and_creation_time() {
        let created_at = Utc::now();
        let item = FinishedItem::from_draft(FinishedItemId::new(), &draft(), dec!(40000), created_at);

        let later = created_at + chrono::Duration::minutes(5);
        let edited = FinishedItemDraft {
            name: "Solitaire Ring (resized)".into(),
            ..draft()
        };
        let revised = item.revise(&edited, dec!(42000), later);

        assert_eq!(revised.id, item.id);
        assert_eq!(revised.created_at, created_at);
        assert_eq!(revised.updated_at, later);
        assert_eq!(revised.name, "Solitaire Ring (resized)");
        assert_eq!(revised.total_cost, dec!(42000));
        assert_eq!(revised.margin(), dec!(53000));
    }
}
