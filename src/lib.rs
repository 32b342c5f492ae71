//! Nafa - profitability calculator for Pakistani e-commerce sellers
//!
//! This library provides the calculation core (FBR and foreign-payment taxes,
//! monthly feasibility, launch planning, what-if simulation) plus the pieces
//! the `nafa` binary builds around it: exchange rate lookup, settings, saved
//! report history and CSV export.

pub mod cli;
pub mod config;
pub mod db;
pub mod dispatcher;
pub mod error;
pub mod feasibility;
pub mod launch_plan;
pub mod rates;
pub mod reports;
pub mod status;
pub mod tax;
pub mod utils;
pub mod validation;
pub mod what_if;

pub use error::{AppError, CalcError};
pub use feasibility::{compute_feasibility, FeasibilityInput, FeasibilityResult, ShopifyPlan};
pub use launch_plan::{compute_launch_plan, LaunchPlanInput, LaunchPlanResult};
pub use status::ProfitStatus;
pub use what_if::{percent_change, simulate_what_if, WhatIfComparison, WhatIfOverrides};
