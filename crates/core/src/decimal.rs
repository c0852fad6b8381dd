//! Guards for the decimal and text fields that cross the caller boundary.

use rust_decimal::Decimal;

use crate::error::{DomainError, DomainResult};

/// Reject negative money or quantity values.
pub fn ensure_non_negative(field: &str, value: Decimal) -> DomainResult<()> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(DomainError::negative(field, value));
    }
    Ok(())
}

/// Reject empty or whitespace-only required text.
pub fn ensure_not_blank(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::blank(field));
    }
    Ok(())
}

/// `a * b`, or an invariant error naming `what` when the product overflows.
pub fn checked_product(what: &str, a: Decimal, b: Decimal) -> DomainResult<Decimal> {
    a.checked_mul(b).ok_or_else(|| DomainError::overflow(what))
}

/// Sum of `values`, or an invariant error naming `what` on overflow.
pub fn checked_sum(what: &str, values: impl IntoIterator<Item = Decimal>) -> DomainResult<Decimal> {
    values.into_iter().try_fold(Decimal::ZERO, |total, value| {
        total.checked_add(value).ok_or_else(|| DomainError::overflow(what))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn zero_and_positive_values_pass() {
        assert!(ensure_non_negative("price", dec!(0)).is_ok());
        assert!(ensure_non_negative("price", dec!(-0.00)).is_ok());
        assert!(ensure_non_negative("price", dec!(12.50)).is_ok());
    }

    #[test]
    fn negative_values_are_rejected_with_field_name() {
        let err = ensure_non_negative("selling_price", dec!(-1)).unwrap_err();
        match err {
            DomainError::Validation(msg) if msg.contains("selling_price") => {}
            other => panic!("Expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn blank_text_is_rejected() {
        assert!(ensure_not_blank("sku", "  ").is_err());
        assert!(ensure_not_blank("sku", "RNG-001").is_ok());
    }

    #[test]
    fn checked_arithmetic_reports_overflow() {
        assert_eq!(checked_product("subtotal", dec!(2.5), dec!(4)).unwrap(), dec!(10.0));
        assert_eq!(
            checked_product("subtotal", Decimal::MAX, dec!(2)).unwrap_err(),
            DomainError::overflow("subtotal")
        );

        assert_eq!(checked_sum("total", [dec!(1), dec!(2.5)]).unwrap(), dec!(3.5));
        assert_eq!(checked_sum("total", Vec::<Decimal>::new()).unwrap(), Decimal::ZERO);
        assert!(matches!(
            checked_sum("total", [Decimal::MAX, dec!(1)]),
            Err(DomainError::InvariantViolation(msg)) if msg == "total overflow"
        ));
    }
}
