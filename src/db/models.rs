use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::feasibility::{FeasibilityInput, FeasibilityResult};
use crate::launch_plan::{LaunchPlanInput, LaunchPlanResult};
use crate::status::ProfitStatus;

/// Which calculator produced a saved report
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ReportKind {
    Feasibility,
    LaunchPlan,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Feasibility => "FEASIBILITY",
            ReportKind::LaunchPlan => "LAUNCH_PLAN",
        }
    }

    /// Human label used in tables and exports
    pub fn label(&self) -> &'static str {
        match self {
            ReportKind::Feasibility => "Feasibility Analysis",
            ReportKind::LaunchPlan => "Launch Plan",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "FEASIBILITY" => Ok(ReportKind::Feasibility),
            "LAUNCH_PLAN" | "LAUNCH" | "PLAN" => Ok(ReportKind::LaunchPlan),
            _ => Err(format!("Unknown report kind: {}", s)),
        }
    }
}

/// Feasibility snapshot plus the catalogue names the figures came from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeasibilityReport {
    pub input: FeasibilityInput,
    pub result: FeasibilityResult,
    #[serde(default)]
    pub bank: Option<String>,
    #[serde(default)]
    pub courier: Option<String>,
    #[serde(default)]
    pub shopify_tier: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LaunchReport {
    pub input: LaunchPlanInput,
    pub result: LaunchPlanResult,
    #[serde(default)]
    pub courier: Option<String>,
}

/// Stored payload, tagged by calculator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Report {
    Feasibility(FeasibilityReport),
    LaunchPlan(LaunchReport),
}

impl Report {
    pub fn kind(&self) -> ReportKind {
        match self {
            Report::Feasibility(_) => ReportKind::Feasibility,
            Report::LaunchPlan(_) => ReportKind::LaunchPlan,
        }
    }

    pub fn profit_status(&self) -> ProfitStatus {
        match self {
            Report::Feasibility(r) => r.result.profit_status,
            Report::LaunchPlan(r) => r.result.profit_status,
        }
    }

    pub fn summary(&self) -> &str {
        match self {
            Report::Feasibility(r) => &r.result.summary,
            Report::LaunchPlan(r) => &r.result.summary,
        }
    }

    pub fn courier(&self) -> Option<&str> {
        match self {
            Report::Feasibility(r) => r.courier.as_deref(),
            Report::LaunchPlan(r) => r.courier.as_deref(),
        }
    }
}

/// A saved report row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryRecord {
    pub id: Option<i64>,
    pub product_name: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub report: Report,
}

impl HistoryRecord {
    pub fn new(product_name: impl Into<String>, category: impl Into<String>, report: Report) -> Self {
        Self {
            id: None,
            product_name: product_name.into(),
            category: category.into(),
            created_at: Utc::now(),
            report,
        }
    }

    pub fn kind(&self) -> ReportKind {
        self.report.kind()
    }
}
