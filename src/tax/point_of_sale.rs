use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CalcError;

/// Withholding deducted by the courier on cash-on-delivery orders (Section 236Y)
const COD_TAX_RATE: Decimal = dec!(0.02);
/// Withholding on non-cash (card, wallet, bank transfer) orders
const ONLINE_TAX_RATE: Decimal = dec!(0.01);

/// How the customer pays for an order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PaymentType {
    #[serde(rename = "COD")]
    Cod,
    #[serde(rename = "Online")]
    Online,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Cod => "COD",
            PaymentType::Online => "Online",
        }
    }

    /// Explanation shown next to the per-unit FBR deduction
    pub fn tax_note(&self) -> &'static str {
        match self {
            PaymentType::Cod => {
                "A 2% FBR tax will be deducted by your courier as per Section 236Y."
            }
            PaymentType::Online => "A 1% FBR tax applies on non-cash transactions as per FBR rules.",
        }
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentType {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "COD" | "CASH" => Ok(PaymentType::Cod),
            "ONLINE" | "CARD" => Ok(PaymentType::Online),
            _ => Err(CalcError::invalid(format!(
                "Unrecognized payment type '{}'. Use COD or Online.",
                s.trim()
            ))),
        }
    }
}

pub fn fbr_tax_rate(payment_type: PaymentType) -> Decimal {
    match payment_type {
        PaymentType::Cod => COD_TAX_RATE,
        PaymentType::Online => ONLINE_TAX_RATE,
    }
}

/// Per-unit FBR deduction on the selling price
pub fn fbr_tax(selling_price: Decimal, payment_type: PaymentType) -> Decimal {
    selling_price * fbr_tax_rate(payment_type)
}
