//! Input checks shared by the calculators
//!
//! Every check fails with [`CalcError::InvalidInput`]. Values are never
//! clamped into range.

use rust_decimal::Decimal;

use crate::error::CalcError;

pub const PRICE_BELOW_COST: &str = "Selling price must be greater than sourcing cost.";

/// Reject a selling price that does not exceed the sourcing cost
pub fn ensure_price_above_cost(selling_price: Decimal, sourcing_cost: Decimal) -> Result<(), CalcError> {
    if selling_price <= sourcing_cost {
        return Err(CalcError::invalid(PRICE_BELOW_COST));
    }
    Ok(())
}

pub fn ensure_non_negative(field: &str, value: Decimal) -> Result<(), CalcError> {
    if value < Decimal::ZERO {
        return Err(CalcError::invalid(format!("{} cannot be negative.", field)));
    }
    Ok(())
}

/// Percent values are expressed in percent units and must lie in 0..=100
pub fn ensure_percent(field: &str, value: Decimal) -> Result<(), CalcError> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(CalcError::invalid(format!(
            "{} must be between 0 and 100 percent.",
            field
        )));
    }
    Ok(())
}

pub const AMOUNT_TOO_LARGE: &str = "Amounts are too large to calculate. Enter smaller values.";

fn too_large() -> CalcError {
    CalcError::invalid(AMOUNT_TOO_LARGE)
}

// Checked arithmetic for the calculators. Overflow is reported as invalid
// input instead of aborting.

pub(crate) fn checked_add(a: Decimal, b: Decimal) -> Result<Decimal, CalcError> {
    a.checked_add(b).ok_or_else(too_large)
}

pub(crate) fn checked_sub(a: Decimal, b: Decimal) -> Result<Decimal, CalcError> {
    a.checked_sub(b).ok_or_else(too_large)
}

pub(crate) fn checked_mul(a: Decimal, b: Decimal) -> Result<Decimal, CalcError> {
    a.checked_mul(b).ok_or_else(too_large)
}

/// Callers guard against a zero divisor; only overflow reaches the error
pub(crate) fn checked_div(a: Decimal, b: Decimal) -> Result<Decimal, CalcError> {
    a.checked_div(b).ok_or_else(too_large)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_price_equal_to_cost_is_rejected() {
        let err = ensure_price_above_cost(dec!(1000), dec!(1000)).unwrap_err();
        assert_eq!(err, CalcError::invalid(PRICE_BELOW_COST));
        assert!(ensure_price_above_cost(dec!(1000.01), dec!(1000)).is_ok());
    }

    #[test]
    fn test_percent_bounds_are_inclusive() {
        assert!(ensure_percent("Returned orders", dec!(0)).is_ok());
        assert!(ensure_percent("Returned orders", dec!(100)).is_ok());
        assert!(ensure_percent("Returned orders", dec!(100.5)).is_err());

        let err = ensure_percent("Debit card tax", dec!(-1)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Debit card tax must be between 0 and 100 percent."
        );
    }

    #[test]
    fn test_negative_amount_names_the_field() {
        let err = ensure_non_negative("Courier rate", dec!(-200)).unwrap_err();
        assert_eq!(err.to_string(), "Courier rate cannot be negative.");
        assert!(ensure_non_negative("Courier rate", Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_overflow_is_invalid_input() {
        let err = checked_mul(Decimal::MAX, dec!(2)).unwrap_err();
        assert_eq!(err, CalcError::invalid(AMOUNT_TOO_LARGE));
        assert!(checked_div(Decimal::MAX, dec!(0.001)).is_err());
        assert!(checked_add(Decimal::MAX, Decimal::ONE).is_err());
        assert!(checked_sub(Decimal::MIN, Decimal::ONE).is_err());
        assert_eq!(checked_div(dec!(10), dec!(4)), Ok(dec!(2.5)));
    }
}
