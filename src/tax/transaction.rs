use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::CalcError;
use crate::validation::{checked_add, checked_mul, ensure_non_negative, ensure_percent};

/// Advance income tax (WHT) on foreign/digital payments for active taxpayers
const FILER_WHT_RATE: Decimal = dec!(0.01);
/// WHT for persons not on the Active Taxpayer List
const NON_FILER_WHT_RATE: Decimal = dec!(0.04);
/// 16% FED levied on a quarter of the transaction value
const FED_IMPACT_RATE: Decimal = dec!(0.04);

/// Taxpayer settings that change deductions on outgoing payments
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaxRegime {
    pub filer_status: bool,
    pub provincial_tax_enabled: bool,
    /// Percent, only read when `provincial_tax_enabled` is set
    pub provincial_tax_rate: Decimal,
}

impl Default for TaxRegime {
    fn default() -> Self {
        Self {
            filer_status: true,
            provincial_tax_enabled: false,
            provincial_tax_rate: Decimal::ZERO,
        }
    }
}

impl TaxRegime {
    pub fn validate(&self) -> Result<(), CalcError> {
        if self.provincial_tax_enabled {
            ensure_percent("Provincial tax rate", self.provincial_tax_rate)?;
        }
        Ok(())
    }

    pub fn wht_rate(&self) -> Decimal {
        if self.filer_status {
            FILER_WHT_RATE
        } else {
            NON_FILER_WHT_RATE
        }
    }

    pub fn fed_impact_rate(&self) -> Decimal {
        FED_IMPACT_RATE
    }

    /// Provincial sales tax as a fraction; zero when the toggle is off
    pub fn provincial_rate(&self) -> Decimal {
        if self.provincial_tax_enabled {
            self.provincial_tax_rate / Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        }
    }

    /// Combined deduction fraction on a PKR payment
    pub fn local_tax_rate(&self) -> Decimal {
        self.wht_rate() + self.fed_impact_rate() + self.provincial_rate()
    }

    /// Combined deduction fraction on a USD card payment, bank fee included
    pub fn usd_tax_rate(&self, debit_card_tax_percent: Decimal) -> Decimal {
        debit_card_tax_percent / Decimal::ONE_HUNDRED + self.local_tax_rate()
    }
}

/// PKR cost of a USD charge paid by debit card, all deductions included
pub fn effective_usd_cost(
    usd_amount: Decimal,
    usd_to_local_rate: Decimal,
    debit_card_tax_percent: Decimal,
    regime: &TaxRegime,
) -> Result<Decimal, CalcError> {
    ensure_non_negative("USD amount", usd_amount)?;
    ensure_percent("Debit card tax", debit_card_tax_percent)?;
    regime.validate()?;
    if usd_amount.is_zero() {
        return Ok(Decimal::ZERO);
    }
    if usd_to_local_rate <= Decimal::ZERO {
        return Err(CalcError::MissingRate);
    }

    let converted = checked_mul(usd_amount, usd_to_local_rate)?;
    checked_mul(converted, Decimal::ONE + regime.usd_tax_rate(debit_card_tax_percent))
}

/// PKR cost of a local payment (ad spend); no bank conversion fee applies
pub fn effective_local_cost(amount: Decimal, regime: &TaxRegime) -> Result<Decimal, CalcError> {
    ensure_non_negative("Ad spend", amount)?;
    regime.validate()?;
    checked_mul(amount, Decimal::ONE + regime.local_tax_rate())
}

/// Itemised deductions on a payment, for display.
///
/// `total` is the sum of the deductions and excludes `base`, so the charged
/// amount is `base + total`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaxBreakdown {
    pub base: Decimal,
    pub bank_fee: Decimal,
    pub bank_fee_percent: Decimal,
    pub wht: Decimal,
    pub wht_percent: Decimal,
    pub fed: Decimal,
    pub provincial_tax: Decimal,
    pub provincial_tax_percent: Decimal,
    pub total: Decimal,
}

impl TaxBreakdown {
    /// Breakdown of a USD charge converted at `usd_to_local_rate`
    pub fn for_usd(
        usd_amount: Decimal,
        usd_to_local_rate: Decimal,
        debit_card_tax_percent: Decimal,
        regime: &TaxRegime,
    ) -> Result<Self, CalcError> {
        ensure_non_negative("USD amount", usd_amount)?;
        ensure_percent("Debit card tax", debit_card_tax_percent)?;
        if usd_amount.is_zero() {
            regime.validate()?;
            return Ok(Self::default());
        }
        if usd_to_local_rate <= Decimal::ZERO {
            return Err(CalcError::MissingRate);
        }
        Self::itemise(checked_mul(usd_amount, usd_to_local_rate)?, debit_card_tax_percent, regime)
    }

    /// Breakdown of a PKR payment
    pub fn for_local(amount: Decimal, regime: &TaxRegime) -> Result<Self, CalcError> {
        ensure_non_negative("Ad spend", amount)?;
        Self::itemise(amount, Decimal::ZERO, regime)
    }

    fn itemise(base: Decimal, bank_fee_percent: Decimal, regime: &TaxRegime) -> Result<Self, CalcError> {
        regime.validate()?;

        let bank_fee = checked_mul(base, bank_fee_percent / Decimal::ONE_HUNDRED)?;
        let wht = checked_mul(base, regime.wht_rate())?;
        let fed = checked_mul(base, regime.fed_impact_rate())?;
        let provincial_tax = checked_mul(base, regime.provincial_rate())?;
        let total = checked_add(checked_add(bank_fee, wht)?, checked_add(fed, provincial_tax)?)?;
        // charged_amount() adds these back together
        checked_add(base, total)?;
        let provincial_tax_percent = if regime.provincial_tax_enabled {
            regime.provincial_tax_rate
        } else {
            Decimal::ZERO
        };

        Ok(Self {
            base,
            bank_fee,
            bank_fee_percent,
            wht,
            wht_percent: regime.wht_rate() * Decimal::ONE_HUNDRED,
            fed,
            provincial_tax,
            provincial_tax_percent,
            total,
        })
    }

    pub fn charged_amount(&self) -> Decimal {
        self.base + self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total <= Decimal::ZERO
    }
}
