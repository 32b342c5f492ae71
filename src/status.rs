//! Profitability verdicts
//!
//! The feasibility check and the launch planner classify with different
//! rules: monthly cash flow against fixed costs for the former, per-unit
//! margin for the latter. Both land on the same three labels.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Losses smaller than this share of the monthly fixed costs count as near breakeven
const NEAR_BREAKEVEN_SHARE: Decimal = dec!(0.2);
/// Per-unit margin (percent) above which a launch plan is profitable
const HEALTHY_MARGIN_PERCENT: Decimal = dec!(15);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ProfitStatus {
    Profitable,
    #[serde(rename = "Near Breakeven")]
    NearBreakeven,
    Loss,
}

impl ProfitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfitStatus::Profitable => "Profitable",
            ProfitStatus::NearBreakeven => "Near Breakeven",
            ProfitStatus::Loss => "Loss",
        }
    }

    /// Monthly verdict: any positive net profit is profitable, a loss within
    /// 20% of the fixed costs is near breakeven
    pub fn from_net_profit(net_profit: Decimal, total_monthly_fixed_costs: Decimal) -> Self {
        if net_profit > Decimal::ZERO {
            ProfitStatus::Profitable
        } else if net_profit > -(total_monthly_fixed_costs * NEAR_BREAKEVEN_SHARE) {
            ProfitStatus::NearBreakeven
        } else {
            ProfitStatus::Loss
        }
    }

    /// Per-unit verdict used by the launch planner
    pub fn from_margin(profit_margin: Decimal) -> Self {
        if profit_margin > HEALTHY_MARGIN_PERCENT {
            ProfitStatus::Profitable
        } else if profit_margin > Decimal::ZERO {
            ProfitStatus::NearBreakeven
        } else {
            ProfitStatus::Loss
        }
    }
}

impl fmt::Display for ProfitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfitStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace(['_', '-'], " ").as_str() {
            "PROFITABLE" => Ok(ProfitStatus::Profitable),
            "NEAR BREAKEVEN" => Ok(ProfitStatus::NearBreakeven),
            "LOSS" => Ok(ProfitStatus::Loss),
            _ => Err(format!("Unknown profit status: {}", s)),
        }
    }
}
