//! Monthly feasibility check
//!
//! Combines per-unit costs, monthly fixed costs (Shopify subscription and ad
//! spend, both taxed), and the ad funnel (budget / cost per conversion, minus
//! returned orders) into profit, break-even and ROAS figures plus a verdict.
//!
//! [`compute_feasibility`] is pure: the exchange rate and every tax toggle are
//! fields of [`FeasibilityInput`], so the same input always yields the same
//! result.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CalcError;
use crate::status::ProfitStatus;
use crate::tax::{self, PaymentType, TaxBreakdown, TaxRegime};
use crate::utils::format_pkr;
use crate::validation::{
    checked_add, checked_div, checked_mul, checked_sub, ensure_non_negative, ensure_percent,
    ensure_price_above_cost,
};

/// Shopify subscription state; a trial store still pays a nominal $1
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ShopifyPlan {
    Trial,
    Regular,
}

impl ShopifyPlan {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShopifyPlan::Trial => "trial",
            ShopifyPlan::Regular => "regular",
        }
    }
}

impl fmt::Display for ShopifyPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShopifyPlan {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trial" => Ok(ShopifyPlan::Trial),
            "regular" => Ok(ShopifyPlan::Regular),
            _ => Err(CalcError::invalid(format!(
                "Unrecognized Shopify plan '{}'. Use trial or regular.",
                s.trim()
            ))),
        }
    }
}

/// Business inputs for a monthly feasibility check. Money is PKR unless noted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeasibilityInput {
    pub sourcing_cost: Decimal,
    pub selling_price: Decimal,
    /// Per delivery
    pub courier_rate: Decimal,
    pub payment_type: PaymentType,
    /// Monthly
    pub ad_budget: Decimal,
    /// Zero means unknown, i.e. no orders are projected
    pub cost_per_conversion: Decimal,
    /// Actual spend when it differs from the budget; zero or unset falls back to `ad_budget`
    #[serde(default)]
    pub ad_spend: Option<Decimal>,
    #[serde(default)]
    pub shopify_plan: Option<ShopifyPlan>,
    /// USD per month, ignored for trial stores
    #[serde(default)]
    pub shopify_monthly_cost: Decimal,
    /// Percent charged by the bank on international card payments
    #[serde(default)]
    pub debit_card_tax: Decimal,
    pub usd_to_local_rate: Decimal,
    #[serde(default)]
    pub tax: TaxRegime,
    /// Percent of orders returned or refused at the door
    #[serde(default)]
    pub returned_orders_percent: Option<Decimal>,
}

impl FeasibilityInput {
    /// Shopify charge in USD before conversion and taxes
    pub fn shopify_usd_cost(&self) -> Decimal {
        match self.shopify_plan {
            None => Decimal::ZERO,
            Some(ShopifyPlan::Trial) => Decimal::ONE,
            Some(ShopifyPlan::Regular) => self.shopify_monthly_cost,
        }
    }

    pub fn effective_ad_spend(&self) -> Decimal {
        match self.ad_spend {
            Some(spend) if spend > Decimal::ZERO => spend,
            _ => self.ad_budget,
        }
    }

    fn validate(&self) -> Result<(), CalcError> {
        ensure_price_above_cost(self.selling_price, self.sourcing_cost)?;
        ensure_non_negative("Sourcing cost", self.sourcing_cost)?;
        ensure_non_negative("Courier rate", self.courier_rate)?;
        ensure_non_negative("Ad budget", self.ad_budget)?;
        ensure_non_negative("Cost per conversion", self.cost_per_conversion)?;
        if let Some(spend) = self.ad_spend {
            ensure_non_negative("Ad spend", spend)?;
        }
        ensure_non_negative("Shopify monthly cost", self.shopify_monthly_cost)?;
        ensure_percent("Debit card tax", self.debit_card_tax)?;
        if let Some(returned) = self.returned_orders_percent {
            ensure_percent("Returned orders", returned)?;
        }
        self.tax.validate()
    }
}

/// Everything derived from a [`FeasibilityInput`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeasibilityResult {
    /// Per-unit FBR deduction
    pub fbr_tax: Decimal,
    pub profit_per_sale: Decimal,
    pub shopify_cost_local: Decimal,
    pub taxed_ad_spend: Decimal,
    pub total_monthly_fixed_costs: Decimal,
    pub breakeven_conversions: u64,
    pub total_orders: Decimal,
    pub successful_orders: Decimal,
    pub total_revenue: Decimal,
    pub net_profit: Decimal,
    /// Percent of revenue
    pub profit_margin: Decimal,
    pub roas_multiplier: Decimal,
    pub roas_percent: Decimal,
    /// Lowest per-unit price that covers unit costs, fixed costs excluded
    pub break_even_price: Decimal,
    pub profit_status: ProfitStatus,
    pub summary: String,
    /// Deductions on the Shopify charge; display only
    pub tax_breakdown: TaxBreakdown,
    /// Deductions on the ad spend; display only
    #[serde(default)]
    pub ad_tax_breakdown: TaxBreakdown,
}

/// Run the monthly feasibility check.
///
/// Fails with [`CalcError::InvalidInput`] when the selling price does not
/// exceed the sourcing cost or a field is out of range, and with
/// [`CalcError::MissingRate`] when a Shopify charge needs converting but no
/// positive rate was supplied. Amounts whose products overflow a `Decimal`
/// are also reported as invalid input. Zero denominators never fail; the
/// affected metric is reported as zero.
pub fn compute_feasibility(input: &FeasibilityInput) -> Result<FeasibilityResult, CalcError> {
    input.validate()?;

    let fbr_tax = tax::fbr_tax(input.selling_price, input.payment_type);

    let shopify_usd = input.shopify_usd_cost();
    let shopify_cost_local = tax::effective_usd_cost(
        shopify_usd,
        input.usd_to_local_rate,
        input.debit_card_tax,
        &input.tax,
    )?;
    let tax_breakdown =
        TaxBreakdown::for_usd(shopify_usd, input.usd_to_local_rate, input.debit_card_tax, &input.tax)?;

    let effective_ad_spend = input.effective_ad_spend();
    let taxed_ad_spend = tax::effective_local_cost(effective_ad_spend, &input.tax)?;
    let ad_tax_breakdown = TaxBreakdown::for_local(effective_ad_spend, &input.tax)?;
    let total_monthly_fixed_costs = checked_add(shopify_cost_local, taxed_ad_spend)?;

    let unit_cost = checked_add(checked_add(input.sourcing_cost, input.courier_rate)?, fbr_tax)?;
    let profit_per_sale = checked_sub(input.selling_price, unit_cost)?;
    let breakeven_conversions = if total_monthly_fixed_costs > Decimal::ZERO && profit_per_sale > Decimal::ZERO {
        ceil_count(checked_div(total_monthly_fixed_costs, profit_per_sale)?)
    } else {
        0
    };

    let total_orders = if input.cost_per_conversion > Decimal::ZERO {
        checked_div(input.ad_budget, input.cost_per_conversion)?
    } else {
        Decimal::ZERO
    };
    let returned_share = input.returned_orders_percent.unwrap_or(Decimal::ZERO) / Decimal::ONE_HUNDRED;
    let successful_orders = checked_mul(total_orders, Decimal::ONE - returned_share)?;

    let total_revenue = checked_mul(successful_orders, input.selling_price)?;
    let unit_costs_total = checked_mul(successful_orders, unit_cost)?;
    let net_profit = checked_sub(
        checked_sub(total_revenue, unit_costs_total)?,
        total_monthly_fixed_costs,
    )?;

    let profit_margin = if total_revenue > Decimal::ZERO {
        checked_mul(checked_div(net_profit, total_revenue)?, Decimal::ONE_HUNDRED)?
    } else {
        Decimal::ZERO
    };

    let roas_multiplier = if taxed_ad_spend > Decimal::ZERO {
        checked_div(total_revenue, taxed_ad_spend)?
    } else {
        Decimal::ZERO
    };
    let roas_percent = checked_mul(roas_multiplier, Decimal::ONE_HUNDRED)?;

    let break_even_price = unit_cost;

    let profit_status = ProfitStatus::from_net_profit(net_profit, total_monthly_fixed_costs);
    let summary = feasibility_summary(profit_status, net_profit);

    Ok(FeasibilityResult {
        fbr_tax,
        profit_per_sale,
        shopify_cost_local,
        taxed_ad_spend,
        total_monthly_fixed_costs,
        breakeven_conversions,
        total_orders,
        successful_orders,
        total_revenue,
        net_profit,
        profit_margin,
        roas_multiplier,
        roas_percent,
        break_even_price,
        profit_status,
        summary,
        tax_breakdown,
        ad_tax_breakdown,
    })
}

/// Human-readable verdict for a monthly check
pub fn feasibility_summary(status: ProfitStatus, net_profit: Decimal) -> String {
    match status {
        ProfitStatus::Profitable => format!(
            "You are making an estimated profit of {}/month.",
            format_pkr(net_profit)
        ),
        ProfitStatus::NearBreakeven => "You're close to breaking even. A small improvement in sales or costs could make you profitable.".to_string(),
        ProfitStatus::Loss => "You're projected to be at a loss. You need more sales or lower costs to be profitable.".to_string(),
    }
}

/// Round a positive quotient up to a whole count
pub(crate) fn ceil_count(quotient: Decimal) -> u64 {
    quotient.ceil().to_u64().unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    /// The worked example from the product docs: a PKR 2,500 item on COD
    fn sample_input() -> FeasibilityInput {
        FeasibilityInput {
            sourcing_cost: dec!(1000),
            selling_price: dec!(2500),
            courier_rate: dec!(200),
            payment_type: PaymentType::Cod,
            ad_budget: dec!(50000),
            cost_per_conversion: dec!(500),
            ad_spend: None,
            shopify_plan: Some(ShopifyPlan::Trial),
            shopify_monthly_cost: dec!(79),
            debit_card_tax: Decimal::ZERO,
            usd_to_local_rate: dec!(285),
            tax: TaxRegime::default(),
            returned_orders_percent: None,
        }
    }

    #[test]
    fn test_profitable_cod_scenario() {
        let result = compute_feasibility(&sample_input()).unwrap();

        assert_eq!(result.fbr_tax, dec!(50));
        assert_eq!(result.profit_per_sale, dec!(1250));
        assert_eq!(result.total_orders, dec!(100));
        // $1 trial * 285 * 1.05, plus 50,000 ad budget * 1.05
        assert_eq!(result.shopify_cost_local, dec!(299.25));
        assert_eq!(result.taxed_ad_spend, dec!(52500));
        assert_eq!(result.total_monthly_fixed_costs, dec!(52799.25));
        assert_eq!(result.breakeven_conversions, 43);
        assert_eq!(result.net_profit, dec!(72200.75));
        assert!(result.net_profit > Decimal::ZERO);
        assert_eq!(result.break_even_price, dec!(1250));
        assert_eq!(result.profit_status, ProfitStatus::Profitable);
        assert_eq!(
            result.summary,
            "You are making an estimated profit of PKR 72,201/month."
        );
    }

    #[test]
    fn test_price_equal_to_cost_is_invalid() {
        let input = FeasibilityInput {
            selling_price: dec!(1000),
            sourcing_cost: dec!(1000),
            ..sample_input()
        };
        let err = compute_feasibility(&input).unwrap_err();
        assert_eq!(
            err,
            CalcError::invalid("Selling price must be greater than sourcing cost.")
        );
    }

    #[test]
    fn test_no_ads_degrades_to_zero_without_errors() {
        let input = FeasibilityInput {
            ad_budget: Decimal::ZERO,
            cost_per_conversion: Decimal::ZERO,
            shopify_plan: None,
            ..sample_input()
        };
        let result = compute_feasibility(&input).unwrap();

        assert_eq!(result.breakeven_conversions, 0);
        assert_eq!(result.roas_multiplier, Decimal::ZERO);
        assert_eq!(result.roas_percent, Decimal::ZERO);
        assert_eq!(result.total_orders, Decimal::ZERO);
        assert_eq!(result.profit_margin, Decimal::ZERO);
        assert_eq!(result.net_profit, Decimal::ZERO);
        // Zero profit with zero fixed costs is not "near" anything
        assert_eq!(result.profit_status, ProfitStatus::Loss);
    }

    #[test]
    fn test_returned_orders_reduce_successful_orders() {
        let base = compute_feasibility(&sample_input()).unwrap();
        let with_returns = compute_feasibility(&FeasibilityInput {
            returned_orders_percent: Some(dec!(20)),
            ..sample_input()
        })
        .unwrap();

        assert_eq!(base.successful_orders, dec!(100));
        assert_eq!(with_returns.successful_orders, dec!(80));
        assert_eq!(with_returns.net_profit, dec!(47200.75));
        assert!(with_returns.net_profit < base.net_profit);
    }

    #[test]
    fn test_ad_spend_overrides_budget_for_fixed_costs_only() {
        let result = compute_feasibility(&FeasibilityInput {
            ad_spend: Some(dec!(40000)),
            ..sample_input()
        })
        .unwrap();

        assert_eq!(result.taxed_ad_spend, dec!(42000));
        // Orders still follow the planned budget
        assert_eq!(result.total_orders, dec!(100));

        let zero_spend = compute_feasibility(&FeasibilityInput {
            ad_spend: Some(Decimal::ZERO),
            ..sample_input()
        })
        .unwrap();
        assert_eq!(zero_spend.taxed_ad_spend, dec!(52500));
    }

    #[test]
    fn test_regular_plan_converts_monthly_cost_with_bank_fee() {
        let result = compute_feasibility(&FeasibilityInput {
            shopify_plan: Some(ShopifyPlan::Regular),
            shopify_monthly_cost: dec!(29),
            debit_card_tax: dec!(2.75),
            ..sample_input()
        })
        .unwrap();

        assert_eq!(result.shopify_cost_local, dec!(8905.5375));
        assert_eq!(result.tax_breakdown.base, dec!(8265));
        assert_eq!(result.tax_breakdown.charged_amount(), result.shopify_cost_local);
    }

    #[test]
    fn test_shopify_charge_without_rate_fails_fast() {
        let err = compute_feasibility(&FeasibilityInput {
            usd_to_local_rate: Decimal::ZERO,
            ..sample_input()
        })
        .unwrap_err();
        assert_eq!(err, CalcError::MissingRate);

        // No plan, nothing to convert
        let result = compute_feasibility(&FeasibilityInput {
            usd_to_local_rate: Decimal::ZERO,
            shopify_plan: None,
            ..sample_input()
        });
        assert!(result.is_ok());
    }

    #[test]
    fn test_near_breakeven_and_loss() {
        // 20 orders at 1,250 each leaves 25,000 against 52,799.25 fixed
        let loss = compute_feasibility(&FeasibilityInput {
            cost_per_conversion: dec!(2500),
            ..sample_input()
        })
        .unwrap();
        assert_eq!(loss.profit_status, ProfitStatus::Loss);
        assert_eq!(
            loss.summary,
            "You're projected to be at a loss. You need more sales or lower costs to be profitable."
        );

        // 40 orders: 50,000 against 52,799.25
        let near = compute_feasibility(&FeasibilityInput {
            cost_per_conversion: dec!(1250),
            ..sample_input()
        })
        .unwrap();
        assert_eq!(near.net_profit, dec!(-2799.25));
        assert_eq!(near.profit_status, ProfitStatus::NearBreakeven);
        assert!(near.summary.starts_with("You're close to breaking even."));
    }

    #[test]
    fn test_roas_uses_taxed_ad_spend() {
        let result = compute_feasibility(&sample_input()).unwrap();
        assert_eq!(result.total_revenue, dec!(250000));
        assert_eq!(result.roas_multiplier, dec!(250000) / dec!(52500));
        assert_eq!(result.roas_percent, result.roas_multiplier * dec!(100));
    }

    #[test]
    fn test_out_of_range_fields_are_rejected() {
        let err = compute_feasibility(&FeasibilityInput {
            returned_orders_percent: Some(dec!(120)),
            ..sample_input()
        })
        .unwrap_err();
        assert!(err.to_string().contains("Returned orders"));

        let err = compute_feasibility(&FeasibilityInput {
            courier_rate: dec!(-1),
            ..sample_input()
        })
        .unwrap_err();
        assert!(matches!(err, CalcError::InvalidInput(_)));
    }

    #[test]
    fn test_shopify_plan_parsing() {
        assert_eq!("Trial".parse::<ShopifyPlan>().unwrap(), ShopifyPlan::Trial);
        assert!("enterprise".parse::<ShopifyPlan>().is_err());
    }

    #[test]
    fn test_extreme_funnel_fails_instead_of_overflowing() {
        // 1e20 / 0.000001 projects 1e26 orders; revenue no longer fits a Decimal
        let input = FeasibilityInput {
            ad_budget: dec!(100000000000000000000),
            cost_per_conversion: dec!(0.000001),
            ..sample_input()
        };
        let err = compute_feasibility(&input).unwrap_err();
        assert_eq!(err, CalcError::invalid(crate::validation::AMOUNT_TOO_LARGE));
    }

    #[test]
    fn test_ad_spend_breakdown_itemises_taxed_spend() {
        let result = compute_feasibility(&sample_input()).unwrap();
        assert_eq!(result.ad_tax_breakdown.base, dec!(50000));
        assert_eq!(result.ad_tax_breakdown.bank_fee, Decimal::ZERO);
        assert_eq!(result.ad_tax_breakdown.charged_amount(), result.taxed_ad_spend);
    }
}
