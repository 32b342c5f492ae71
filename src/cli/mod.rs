use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;

use crate::db::ReportKind;
use crate::error::CalcError;
use crate::feasibility::ShopifyPlan;
use crate::tax::PaymentType;

pub mod formatters;

#[derive(Parser)]
#[command(name = "nafa")]
#[command(
    version,
    about = "Profitability calculator for Pakistani e-commerce sellers"
)]
#[command(
    long_about = "Work out margins, break-even points and ROAS for a product before you spend on ads. Covers FBR point-of-sale tax, withholding and FED on foreign payments, bank card fees, courier charges and returned orders."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Monthly feasibility check: fixed costs, ad funnel, net profit and ROAS
    Feasibility(FeasibilityArgs),

    /// Launch plan: per-unit profit and units needed to recover a marketing budget
    Plan(PlanArgs),

    /// Re-run a saved feasibility check with a different price, CPC or ad budget
    WhatIf(WhatIfArgs),

    /// USD to PKR exchange rate
    Rate {
        #[command(subcommand)]
        action: RateCommands,
    },

    /// Saved reports
    History {
        #[command(subcommand)]
        action: HistoryCommands,
    },

    /// Settings file (filer status, provincial tax, catalogues)
    Settings {
        #[command(subcommand)]
        action: SettingsCommands,
    },

    /// List banks, Shopify plans and couriers known to the calculator
    Catalog,
}

/// `--shopify trial|regular|none`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShopifyArg(pub Option<ShopifyPlan>);

impl FromStr for ShopifyArg {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("none") {
            return Ok(ShopifyArg(None));
        }
        s.parse::<ShopifyPlan>().map(|plan| ShopifyArg(Some(plan)))
    }
}

/// Product identity and per-unit figures shared by both calculators
#[derive(Args, Debug, Clone)]
pub struct ProductArgs {
    /// Product name (used in history and export file names)
    #[arg(long)]
    pub product: String,

    #[arg(long, default_value = "General")]
    pub category: String,

    /// Sourcing cost per unit (PKR)
    #[arg(long)]
    pub sourcing_cost: Decimal,

    /// Selling price per unit (PKR)
    #[arg(long)]
    pub selling_price: Decimal,

    /// Courier from the catalogue (rate depends on payment type)
    #[arg(long, conflicts_with = "courier_rate")]
    pub courier: Option<String>,

    /// Per-delivery courier charge (PKR)
    #[arg(long)]
    pub courier_rate: Option<Decimal>,

    /// Payment type: cod or online
    #[arg(long, default_value = "cod")]
    pub payment: PaymentType,

    /// Save the report to history
    #[arg(long)]
    pub save: bool,
}

#[derive(Args, Debug, Clone)]
pub struct FeasibilityArgs {
    #[command(flatten)]
    pub product: ProductArgs,

    /// Monthly ad budget (PKR)
    #[arg(long, default_value = "0")]
    pub ad_budget: Decimal,

    /// Cost per conversion (PKR); 0 means unknown
    #[arg(long = "cpc", default_value = "0")]
    pub cost_per_conversion: Decimal,

    /// Actual ad spend if different from the budget (PKR)
    #[arg(long)]
    pub ad_spend: Option<Decimal>,

    /// Shopify plan: trial, regular or none. A tier or cost implies regular.
    #[arg(long)]
    pub shopify: Option<ShopifyArg>,

    /// Shopify monthly cost in USD for a regular plan
    #[arg(long, conflicts_with = "shopify_tier")]
    pub shopify_cost: Option<Decimal>,

    /// Shopify tier from the catalogue (Basic, Regular, Advanced)
    #[arg(long)]
    pub shopify_tier: Option<String>,

    /// Bank from the catalogue (sets the debit card tax)
    #[arg(long, conflicts_with = "debit_card_tax")]
    pub bank: Option<String>,

    /// Bank fee on international card payments (percent)
    #[arg(long)]
    pub debit_card_tax: Option<Decimal>,

    /// Share of orders returned (percent)
    #[arg(long)]
    pub returned: Option<Decimal>,

    /// USD to PKR rate; skips the rate lookup
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Treat the seller as a non-filer (4% WHT) regardless of settings
    #[arg(long)]
    pub non_filer: bool,

    /// Apply provincial sales tax at this rate (percent) regardless of settings
    #[arg(long)]
    pub provincial_tax: Option<Decimal>,
}

#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    #[command(flatten)]
    pub product: ProductArgs,

    /// Marketing budget to recover (PKR)
    #[arg(long, default_value = "0")]
    pub marketing_budget: Decimal,
}

#[derive(Args, Debug, Clone)]
pub struct WhatIfArgs {
    /// History id of a saved feasibility check
    pub id: i64,

    /// New selling price (PKR)
    #[arg(long)]
    pub price: Option<Decimal>,

    /// New cost per conversion (PKR)
    #[arg(long)]
    pub cpc: Option<Decimal>,

    /// New monthly ad budget (PKR)
    #[arg(long)]
    pub ad_budget: Option<Decimal>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum RateCommands {
    /// Show the rate the calculator would use right now
    Show,
    /// Fetch a fresh rate and update the cache
    Refresh,
    /// Pin a manual rate in the settings file
    Set {
        rate: Decimal,
    },
    /// Remove the manual rate and the cached rate
    Clear,
}

#[derive(Subcommand, Debug, Clone)]
pub enum HistoryCommands {
    /// List saved reports, newest first
    List {
        /// Only this kind: feasibility or launch-plan
        #[arg(long)]
        kind: Option<ReportKind>,

        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show a saved report in full
    Show {
        id: i64,
    },
    /// Export a saved report as CSV
    Export {
        id: i64,

        /// Output path (defaults to report-<product>-<id>.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Delete a saved report
    Delete {
        id: i64,
    },
    /// Delete every saved report
    Clear {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum SettingsCommands {
    /// Print the effective settings
    Show,
    /// Print the settings file location
    Path,
    /// Write a settings file with the defaults
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
