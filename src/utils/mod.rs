//! Utility functions for formatting money and percentages
//!
//! Amounts are shown the way Pakistani sellers read them in the web app:
//! `PKR 12,345` with en-US grouping (`,` thousands, `.` decimals) and
//! half-away-from-zero rounding.

use rust_decimal::{Decimal, RoundingStrategy};

/// Currency symbol options for formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencySymbol {
    /// Include "PKR " prefix
    Pkr,
    /// Include "$" prefix
    Usd,
    /// No currency symbol (CSV cells, ratios)
    None,
}

/// Core formatting function with full control over output.
///
/// # Arguments
/// * `value` - The decimal value to format
/// * `decimals` - Digits kept after the decimal point
/// * `width` - Minimum width for padding (0 for no padding, right-aligned)
/// * `symbol` - Whether to include a currency symbol
///
/// # Examples
/// ```
/// use nafa::utils::{format_amount, CurrencySymbol};
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_amount(dec!(1234.56), 2, 0, CurrencySymbol::Pkr), "PKR 1,234.56");
/// assert_eq!(format_amount(dec!(1234), 0, 10, CurrencySymbol::None), "     1,234");
/// ```
pub fn format_amount(value: Decimal, decimals: u32, width: usize, symbol: CurrencySymbol) -> String {
    let mut rounded = value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(decimals);

    let is_negative = rounded < Decimal::ZERO;
    let formatted = rounded.abs().to_string();
    let (integer_part, decimal_part) = match formatted.split_once('.') {
        Some((int, frac)) => (int.to_string(), Some(frac.to_string())),
        None => (formatted, None),
    };

    let digits: Vec<char> = integer_part.chars().collect();
    let mut with_separators = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            with_separators.push(',');
        }
        with_separators.push(*c);
    }

    let sign = if is_negative { "-" } else { "" };
    let prefix = match symbol {
        CurrencySymbol::Pkr => "PKR ",
        CurrencySymbol::Usd => "$",
        CurrencySymbol::None => "",
    };

    let result = match decimal_part {
        Some(frac) => format!("{}{}{}.{}", prefix, sign, with_separators, frac),
        None => format!("{}{}{}", prefix, sign, with_separators),
    };

    if width > 0 && result.len() < width {
        format!("{:>width$}", result, width = width)
    } else {
        result
    }
}

// ============ Convenience functions ============

/// Whole rupees with symbol: "PKR 12,345"
///
/// # Examples
/// ```
/// use nafa::utils::format_pkr;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_pkr(dec!(72200.75)), "PKR 72,201");
/// assert_eq!(format_pkr(dec!(-500)), "PKR -500");
/// ```
pub fn format_pkr(value: Decimal) -> String {
    format_amount(value, 0, 0, CurrencySymbol::Pkr)
}

/// Rupees with a fixed number of decimals: "PKR 1,234.50"
pub fn format_pkr_with_decimals(value: Decimal, decimals: u32) -> String {
    format_amount(value, decimals, 0, CurrencySymbol::Pkr)
}

pub fn format_usd(value: Decimal) -> String {
    format_amount(value, 2, 0, CurrencySymbol::Usd)
}

/// Percentage with one decimal: "51.0%"
///
/// # Examples
/// ```
/// use nafa::utils::format_percent;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_percent(dec!(51)), "51.0%");
/// ```
pub fn format_percent(value: Decimal) -> String {
    format!("{}%", format_fixed(value, 1))
}

/// Ratio with two decimals and a multiplier sign: "4.76x"
pub fn format_multiplier(value: Decimal) -> String {
    format!("{}x", format_fixed(value, 2))
}

/// Plain fixed-point number without grouping, for summaries and CSV cells
pub fn format_fixed(value: Decimal, decimals: u32) -> String {
    let mut rounded = value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(decimals);
    if rounded.is_zero() {
        rounded = rounded.abs();
    }
    rounded.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_pkr_groups_thousands() {
        assert_eq!(format_pkr(dec!(0)), "PKR 0");
        assert_eq!(format_pkr(dec!(999)), "PKR 999");
        assert_eq!(format_pkr(dec!(1000)), "PKR 1,000");
        assert_eq!(format_pkr(dec!(1234567.4)), "PKR 1,234,567");
    }

    #[test]
    fn test_format_pkr_rounds_half_away_from_zero() {
        assert_eq!(format_pkr(dec!(2.5)), "PKR 3");
        assert_eq!(format_pkr(dec!(-2.5)), "PKR -3");
        assert_eq!(format_pkr(dec!(-0.4)), "PKR 0");
    }

    #[test]
    fn test_format_with_decimals() {
        assert_eq!(format_pkr_with_decimals(dec!(8905.5375), 2), "PKR 8,905.54");
        assert_eq!(format_pkr_with_decimals(dec!(5), 2), "PKR 5.00");
        assert_eq!(format_usd(dec!(29)), "$29.00");
    }

    #[test]
    fn test_format_alignment() {
        assert_eq!(format_amount(dec!(100), 0, 8, CurrencySymbol::Pkr), " PKR 100");
        assert_eq!(format_amount(dec!(100000), 0, 3, CurrencySymbol::None), "100,000");
    }

    #[test]
    fn test_format_percent_and_multiplier() {
        assert_eq!(format_percent(dec!(28.88035)), "28.9%");
        assert_eq!(format_percent(dec!(-0.01)), "0.0%");
        assert_eq!(format_multiplier(dec!(4.761904)), "4.76x");
        assert_eq!(format_fixed(dec!(1.96078), 2), "1.96");
    }
}
