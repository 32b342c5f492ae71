//! What-if simulation against a saved feasibility check
//!
//! Re-runs [`compute_feasibility`] with a different selling price, cost per
//! conversion or ad budget while every other input stays as it was, then
//! reports how the key metrics moved.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::CalcError;
use crate::feasibility::{compute_feasibility, FeasibilityInput, FeasibilityResult};

/// Inputs a simulation may change; `None` keeps the baseline value
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WhatIfOverrides {
    pub selling_price: Option<Decimal>,
    pub cost_per_conversion: Option<Decimal>,
    pub ad_budget: Option<Decimal>,
}

impl WhatIfOverrides {
    pub fn is_empty(&self) -> bool {
        self.selling_price.is_none() && self.cost_per_conversion.is_none() && self.ad_budget.is_none()
    }

    /// Baseline input with the overrides applied.
    ///
    /// A new ad budget also replaces any recorded actual spend, so the
    /// simulated budget is what gets taxed and counted as a fixed cost.
    pub fn apply(&self, baseline: &FeasibilityInput) -> FeasibilityInput {
        let mut input = baseline.clone();
        if let Some(price) = self.selling_price {
            input.selling_price = price;
        }
        if let Some(cpc) = self.cost_per_conversion {
            input.cost_per_conversion = cpc;
        }
        if let Some(budget) = self.ad_budget {
            input.ad_budget = budget;
            input.ad_spend = None;
        }
        input
    }
}

/// Baseline and simulated results with percent changes per metric
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WhatIfComparison {
    pub baseline: FeasibilityResult,
    pub simulated: FeasibilityResult,
    pub deltas: BTreeMap<String, Decimal>,
}

impl WhatIfComparison {
    pub fn from_results(baseline: FeasibilityResult, simulated: FeasibilityResult) -> Self {
        let metrics = [
            ("net_profit", baseline.net_profit, simulated.net_profit),
            ("roas_multiplier", baseline.roas_multiplier, simulated.roas_multiplier),
            ("total_revenue", baseline.total_revenue, simulated.total_revenue),
            ("profit_margin", baseline.profit_margin, simulated.profit_margin),
            (
                "breakeven_conversions",
                Decimal::from(baseline.breakeven_conversions),
                Decimal::from(simulated.breakeven_conversions),
            ),
        ];

        let deltas = metrics
            .into_iter()
            .map(|(name, old, new)| (name.to_string(), percent_change(new, old)))
            .collect();

        Self {
            baseline,
            simulated,
            deltas,
        }
    }

    pub fn delta(&self, metric: &str) -> Decimal {
        self.deltas.get(metric).copied().unwrap_or(Decimal::ZERO)
    }
}

/// Percent change from `old_value` to `new_value`, relative to `|old_value|`.
///
/// From a zero baseline any gain reads as +100% and anything else as 0%.
/// A change too large for a `Decimal` saturates at `Decimal::MAX` / `MIN`.
pub fn percent_change(new_value: Decimal, old_value: Decimal) -> Decimal {
    if !old_value.is_zero() {
        new_value
            .checked_sub(old_value)
            .and_then(|diff| diff.checked_div(old_value.abs()))
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .unwrap_or(if new_value > old_value { Decimal::MAX } else { Decimal::MIN })
    } else if new_value > Decimal::ZERO {
        Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    }
}

/// Compare the baseline input against the same input with `overrides` applied
pub fn simulate_what_if(
    baseline: &FeasibilityInput,
    overrides: &WhatIfOverrides,
) -> Result<WhatIfComparison, CalcError> {
    let baseline_result = compute_feasibility(baseline)?;
    let simulated_result = compute_feasibility(&overrides.apply(baseline))?;
    Ok(WhatIfComparison::from_results(baseline_result, simulated_result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feasibility::ShopifyPlan;
    use crate::status::ProfitStatus;
    use crate::tax::{PaymentType, TaxRegime};
    use rust_decimal_macros::dec;

    fn baseline() -> FeasibilityInput {
        FeasibilityInput {
            sourcing_cost: dec!(1000),
            selling_price: dec!(2500),
            courier_rate: dec!(200),
            payment_type: PaymentType::Cod,
            ad_budget: dec!(50000),
            cost_per_conversion: dec!(500),
            ad_spend: None,
            shopify_plan: Some(ShopifyPlan::Trial),
            shopify_monthly_cost: Decimal::ZERO,
            debit_card_tax: Decimal::ZERO,
            usd_to_local_rate: dec!(285),
            tax: TaxRegime::default(),
            returned_orders_percent: None,
        }
    }

    #[test]
    fn test_percent_change_relative_to_baseline() {
        assert_eq!(percent_change(dec!(1500), dec!(1000)), dec!(50));
        assert_eq!(percent_change(dec!(500), dec!(1000)), dec!(-50));
        // Negative baseline: moving from -1000 to -500 is an improvement
        assert_eq!(percent_change(dec!(-500), dec!(-1000)), dec!(50));
    }

    #[test]
    fn test_percent_change_from_zero() {
        assert_eq!(percent_change(dec!(10), Decimal::ZERO), dec!(100));
        assert_eq!(percent_change(dec!(-10), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(percent_change(Decimal::ZERO, Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_no_overrides_means_no_change() {
        let comparison = simulate_what_if(&baseline(), &WhatIfOverrides::default()).unwrap();
        assert_eq!(comparison.baseline, comparison.simulated);
        assert!(comparison.deltas.values().all(|d| d.is_zero()));
    }

    #[test]
    fn test_higher_price_raises_profit() {
        let input = baseline();
        let overrides = WhatIfOverrides {
            selling_price: Some(dec!(3000)),
            ..Default::default()
        };
        let comparison = simulate_what_if(&input, &overrides).unwrap();

        assert!(comparison.simulated.net_profit > comparison.baseline.net_profit);
        assert!(comparison.delta("net_profit") > Decimal::ZERO);
        assert_eq!(comparison.delta("total_revenue"), dec!(20));
        // Baseline input is untouched
        assert_eq!(input, baseline());
    }

    #[test]
    fn test_net_profit_delta_is_percent_of_baseline() {
        // Baseline: 100 orders, PKR 72,200.75 net. Doubling CPC halves orders.
        let comparison = simulate_what_if(
            &baseline(),
            &WhatIfOverrides {
                cost_per_conversion: Some(dec!(1000)),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(comparison.simulated.successful_orders, dec!(50));
        assert_eq!(comparison.simulated.net_profit, dec!(9700.75));
        assert_eq!(
            comparison.delta("net_profit"),
            percent_change(dec!(9700.75), dec!(72200.75))
        );
        assert_eq!(comparison.delta("total_revenue"), dec!(-50));
    }

    #[test]
    fn test_budget_override_replaces_recorded_spend() {
        let input = FeasibilityInput {
            ad_spend: Some(dec!(40000)),
            ..baseline()
        };
        let overrides = WhatIfOverrides {
            ad_budget: Some(dec!(20000)),
            ..Default::default()
        };
        let comparison = simulate_what_if(&input, &overrides).unwrap();

        assert_eq!(comparison.baseline.taxed_ad_spend, dec!(42000));
        assert_eq!(comparison.simulated.taxed_ad_spend, dec!(21000));
        assert_eq!(comparison.simulated.total_orders, dec!(40));
    }

    #[test]
    fn test_price_below_cost_is_rejected() {
        let err = simulate_what_if(
            &baseline(),
            &WhatIfOverrides {
                selling_price: Some(dec!(800)),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, CalcError::InvalidInput(_)));
    }

    #[test]
    fn test_cutting_ads_can_flip_status() {
        let comparison = simulate_what_if(
            &baseline(),
            &WhatIfOverrides {
                cost_per_conversion: Some(dec!(2500)),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(comparison.baseline.profit_status, ProfitStatus::Profitable);
        assert_eq!(comparison.simulated.profit_status, ProfitStatus::Loss);
    }

    #[test]
    fn test_percent_change_saturates() {
        assert_eq!(percent_change(Decimal::MAX, dec!(0.0001)), Decimal::MAX);
        assert_eq!(percent_change(Decimal::MIN, dec!(0.0001)), Decimal::MIN);
        assert_eq!(percent_change(Decimal::MAX, Decimal::MIN), Decimal::MAX);
    }
}
