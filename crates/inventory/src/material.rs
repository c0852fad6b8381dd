use rust_decimal::Decimal;
use serde::Serialize;

use atelier_core::{DomainError, DomainResult, Entity, RawMaterialId, ensure_non_negative, ensure_not_blank};

use crate::category::{MaterialKind, PricingCategory};

/// A raw material in the stock catalog (gold by the gram, diamonds by the piece, ...).
///
/// `quantity_on_hand` never goes negative: the only mutators are [`RawMaterial::restore`]
/// and the floor-checked [`RawMaterial::try_deduct`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawMaterial {
    id: RawMaterialId,
    name: String,
    kind: MaterialKind,
    quantity_on_hand: Decimal,
    cost_per_unit: Decimal,
}

/// A deduction that would have taken stock below zero.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StockShortfall {
    pub requested: Decimal,
    pub available: Decimal,
}

impl StockShortfall {
    /// How much more stock the deduction needed.
    pub fn missing(&self) -> Decimal {
        self.requested - self.available
    }
}

impl RawMaterial {
    pub fn new(
        id: RawMaterialId,
        name: impl Into<String>,
        kind: MaterialKind,
        quantity_on_hand: Decimal,
        cost_per_unit: Decimal,
    ) -> DomainResult<Self> {
        let name = name.into();
        ensure_not_blank("material name", &name)?;
        ensure_non_negative("quantity_on_hand", quantity_on_hand)?;
        ensure_non_negative("cost_per_unit", cost_per_unit)?;
        Ok(Self {
            id,
            name,
            kind,
            quantity_on_hand,
            cost_per_unit,
        })
    }

    pub fn id_typed(&self) -> RawMaterialId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> MaterialKind {
        self.kind
    }

    pub fn pricing_category(&self) -> PricingCategory {
        self.kind.pricing_category()
    }

    pub fn quantity_on_hand(&self) -> Decimal {
        self.quantity_on_hand
    }

    pub fn cost_per_unit(&self) -> Decimal {
        self.cost_per_unit
    }

    /// Return previously consumed stock. Returns the new on-hand quantity.
    pub fn restore(&mut self, quantity: Decimal) -> DomainResult<Decimal> {
        if quantity.is_sign_negative() && !quantity.is_zero() {
            return Err(DomainError::invariant("cannot restore a negative quantity"));
        }
        self.quantity_on_hand = self
            .quantity_on_hand
            .checked_add(quantity)
            .ok_or_else(|| DomainError::overflow("quantity on hand"))?;
        Ok(self.quantity_on_hand)
    }

    /// Decrement by `quantity` only if enough stock is on hand.
    ///
    /// On success returns the remaining quantity; on failure the material is untouched.
    pub fn try_deduct(&mut self, quantity: Decimal) -> Result<Decimal, StockShortfall> {
        if quantity > self.quantity_on_hand {
            return Err(StockShortfall {
                requested: quantity,
                available: self.quantity_on_hand,
            });
        }
        self.quantity_on_hand -= quantity;
        Ok(self.quantity_on_hand)
    }
}

impl Entity for RawMaterial {
    type Id = RawMaterialId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn gold(on_hand: Decimal) -> RawMaterial {
        RawMaterial::new(RawMaterialId::new(), "14K Gold", MaterialKind::Gold, on_hand, dec!(3000))
            .unwrap()
    }

    #[test]
    fn new_rejects_negative_stock_and_blank_names() {
        let err = RawMaterial::new(
            RawMaterialId::new(),
            "Silver",
            MaterialKind::Silver,
            dec!(-1),
            dec!(40),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = RawMaterial::new(RawMaterialId::new(), " ", MaterialKind::Gem, dec!(1), dec!(1))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn deduct_within_stock_reduces_on_hand() {
        let mut material = gold(dec!(50));
        assert_eq!(material.try_deduct(dec!(5)), Ok(dec!(45)));
        assert_eq!(material.quantity_on_hand(), dec!(45));
    }

    #[test]
    fn deduct_exactly_all_stock_leaves_zero() {
        let mut material = gold(dec!(2.5));
        assert_eq!(material.try_deduct(dec!(2.5)), Ok(dec!(0)));
    }

    #[test]
    fn deduct_beyond_stock_is_refused_without_mutation() {
        let mut material = gold(dec!(5));
        let shortfall = material.try_deduct(dec!(20)).unwrap_err();
        assert_eq!(shortfall.requested, dec!(20));
        assert_eq!(shortfall.available, dec!(5));
        assert_eq!(shortfall.missing(), dec!(15));
        assert_eq!(material.quantity_on_hand(), dec!(5));
    }

    #[test]
    fn restore_rejects_negative_quantities() {
        let mut material = gold(dec!(5));
        assert!(material.restore(dec!(-1)).is_err());
        assert_eq!(material.restore(dec!(2)), Ok(dec!(7)));
    }

    #[test]
    fn restore_past_the_decimal_range_leaves_stock_untouched() {
        let mut material = gold(Decimal::MAX);
        assert_eq!(material.restore(dec!(1)), Err(DomainError::overflow("quantity on hand")));
        assert_eq!(material.quantity_on_hand(), Decimal::MAX);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: no sequence of deductions and restores drives stock negative.
        #[test]
        fn stock_never_goes_negative(
            start in 0u32..10_000u32,
            ops in prop::collection::vec((any::<bool>(), 0u32..5_000u32), 0..40)
        ) {
            let mut material = gold(Decimal::from(start));
            for (is_restore, qty) in ops {
                let qty = Decimal::from(qty);
                if is_restore {
                    material.restore(qty).unwrap();
                } else {
                    let _ = material.try_deduct(qty);
                }
                prop_assert!(material.quantity_on_hand() >= Decimal::ZERO);
            }
        }
    }
}
