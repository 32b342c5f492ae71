//! Launch planner: single-unit break-even for a new product
//!
//! No Shopify cost, currency conversion, or returns. The marketing budget is
//! only used to count how many units must sell to pay it back.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CalcError;
use crate::feasibility::ceil_count;
use crate::status::ProfitStatus;
use crate::tax::{self, PaymentType};
use crate::utils::format_fixed;
use crate::validation::{
    checked_add, checked_div, checked_mul, checked_sub, ensure_non_negative, ensure_price_above_cost,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LaunchPlanInput {
    pub sourcing_cost: Decimal,
    pub selling_price: Decimal,
    pub courier_rate: Decimal,
    pub payment_type: PaymentType,
    pub marketing_budget: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LaunchPlanResult {
    pub fbr_tax: Decimal,
    pub profit_per_unit: Decimal,
    pub breakeven_units: u64,
    /// Percent of the selling price
    pub profit_margin: Decimal,
    /// Revenue multiple the ads must return to break even
    pub breakeven_roas: Decimal,
    pub profit_status: ProfitStatus,
    pub summary: String,
}

pub fn compute_launch_plan(input: &LaunchPlanInput) -> Result<LaunchPlanResult, CalcError> {
    ensure_price_above_cost(input.selling_price, input.sourcing_cost)?;
    ensure_non_negative("Sourcing cost", input.sourcing_cost)?;
    ensure_non_negative("Courier rate", input.courier_rate)?;
    ensure_non_negative("Marketing budget", input.marketing_budget)?;

    let fbr_tax = tax::fbr_tax(input.selling_price, input.payment_type);
    let unit_cost = checked_add(checked_add(input.sourcing_cost, input.courier_rate)?, fbr_tax)?;
    let profit_per_unit = checked_sub(input.selling_price, unit_cost)?;

    let breakeven_units = if input.marketing_budget > Decimal::ZERO && profit_per_unit > Decimal::ZERO {
        ceil_count(checked_div(input.marketing_budget, profit_per_unit)?)
    } else {
        0
    };

    let profit_margin = if input.selling_price > Decimal::ZERO {
        checked_mul(checked_div(profit_per_unit, input.selling_price)?, Decimal::ONE_HUNDRED)?
    } else {
        Decimal::ZERO
    };

    let breakeven_roas = if profit_per_unit > Decimal::ZERO {
        checked_div(input.selling_price, profit_per_unit)?
    } else {
        Decimal::ZERO
    };

    let profit_status = ProfitStatus::from_margin(profit_margin);
    let summary = launch_plan_summary(profit_status, profit_margin);

    Ok(LaunchPlanResult {
        fbr_tax,
        profit_per_unit,
        breakeven_units,
        profit_margin,
        breakeven_roas,
        profit_status,
        summary,
    })
}

pub fn launch_plan_summary(status: ProfitStatus, profit_margin: Decimal) -> String {
    let margin = format_fixed(profit_margin, 1);
    match status {
        ProfitStatus::Profitable => {
            format!("With a {}% profit margin, this product looks promising.", margin)
        }
        ProfitStatus::NearBreakeven => {
            format!("The profit margin is low ({}%). Be cautious with ad spend.", margin)
        }
        ProfitStatus::Loss => "This product seems unprofitable at these metrics. Consider increasing the selling price or reducing costs.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn online_plan() -> LaunchPlanInput {
        LaunchPlanInput {
            sourcing_cost: dec!(1000),
            selling_price: dec!(2500),
            courier_rate: dec!(200),
            payment_type: PaymentType::Online,
            marketing_budget: dec!(50000),
        }
    }

    #[test]
    fn test_online_plan_is_profitable() {
        let result = compute_launch_plan(&online_plan()).unwrap();

        assert_eq!(result.fbr_tax, dec!(25));
        assert_eq!(result.profit_per_unit, dec!(1275));
        assert_eq!(result.profit_margin, dec!(51));
        assert_eq!(result.breakeven_units, 40);
        assert_eq!(result.breakeven_roas, dec!(2500) / dec!(1275));
        assert_eq!(result.profit_status, ProfitStatus::Profitable);
        assert_eq!(
            result.summary,
            "With a 51.0% profit margin, this product looks promising."
        );
    }

    #[test]
    fn test_thin_margin_is_near_breakeven() {
        // 2500 - 2000 - 200 - 50 = 250 per unit, a 10% margin
        let result = compute_launch_plan(&LaunchPlanInput {
            sourcing_cost: dec!(2000),
            payment_type: PaymentType::Cod,
            ..online_plan()
        })
        .unwrap();

        assert_eq!(result.profit_margin, dec!(10));
        assert_eq!(result.profit_status, ProfitStatus::NearBreakeven);
        assert_eq!(
            result.summary,
            "The profit margin is low (10.0%). Be cautious with ad spend."
        );
    }

    #[test]
    fn test_courier_eating_the_margin_is_a_loss() {
        let result = compute_launch_plan(&LaunchPlanInput {
            courier_rate: dec!(1600),
            ..online_plan()
        })
        .unwrap();

        assert!(result.profit_per_unit < Decimal::ZERO);
        assert_eq!(result.breakeven_units, 0);
        assert_eq!(result.breakeven_roas, Decimal::ZERO);
        assert_eq!(result.profit_status, ProfitStatus::Loss);
    }

    #[test]
    fn test_zero_budget_needs_no_units() {
        let result = compute_launch_plan(&LaunchPlanInput {
            marketing_budget: Decimal::ZERO,
            ..online_plan()
        })
        .unwrap();
        assert_eq!(result.breakeven_units, 0);
        assert_eq!(result.profit_status, ProfitStatus::Profitable);
    }

    #[test]
    fn test_price_must_exceed_cost() {
        let err = compute_launch_plan(&LaunchPlanInput {
            selling_price: dec!(900),
            ..online_plan()
        })
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Selling price must be greater than sourcing cost."
        );
    }

    #[test]
    fn test_tiny_margin_with_huge_budget_fails_cleanly() {
        let err = compute_launch_plan(&LaunchPlanInput {
            sourcing_cost: Decimal::ZERO,
            selling_price: dec!(0.0000000000000000000000001),
            courier_rate: Decimal::ZERO,
            marketing_budget: dec!(70000000000000000000000000000),
            ..online_plan()
        })
        .unwrap_err();
        assert_eq!(err, CalcError::invalid(crate::validation::AMOUNT_TOO_LARGE));
    }
}
