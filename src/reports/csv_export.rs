//! CSV export of a saved report: one header row, one value row.
//!
//! Columns shared by both report kinds come first, followed by the columns
//! specific to the calculator that produced the report.

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use rust_decimal::Decimal;

use crate::db::{FeasibilityReport, HistoryRecord, LaunchReport, Report};
use crate::utils::format_fixed;

const UNIVERSAL_HEADERS: [&str; 13] = [
    "Report ID",
    "Report Type",
    "Date Generated",
    "Product Name",
    "Category",
    "Sourcing Cost",
    "Selling Price",
    "Courier",
    "Courier Rate",
    "Profit Status",
    "Summary",
    "Payment Type",
    "FBR Tax",
];

const LAUNCH_HEADERS: [&str; 5] = [
    "Marketing Budget",
    "Profit Per Unit",
    "Breakeven Units",
    "Profit Margin (%)",
    "Breakeven ROAS",
];

const FEASIBILITY_HEADERS: [&str; 14] = [
    "Shopify Plan",
    "Shopify Monthly Cost (USD)",
    "Bank",
    "Debit Card Tax (%)",
    "Ad Budget",
    "Actual Ad Spend",
    "Cost Per Conversion",
    "Returned Orders (%)",
    "Total Monthly Fixed Costs",
    "Breakeven Conversions",
    "Net Profit",
    "Break-even Price",
    "ROAS Multiplier",
    "ROAS Percent",
];

/// `report-<product>-<id>.csv` with spaces in the product name replaced
pub fn export_file_name(record: &HistoryRecord) -> String {
    let product: String = record
        .product_name
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() || c == '/' || c == '\\' { '_' } else { c })
        .collect();
    let id = record.id.map(|id| id.to_string()).unwrap_or_else(|| "unsaved".to_string());
    format!("report-{}-{}.csv", product, id)
}

pub fn export_to_csv(record: &HistoryRecord) -> Result<String> {
    let mut headers: Vec<&str> = UNIVERSAL_HEADERS.to_vec();
    let mut values = universal_values(record);

    match &record.report {
        Report::LaunchPlan(launch) => {
            headers.extend(LAUNCH_HEADERS);
            values.extend(launch_values(launch));
        }
        Report::Feasibility(feasibility) => {
            headers.extend(FEASIBILITY_HEADERS);
            values.extend(feasibility_values(feasibility));
        }
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&headers).context("Failed to write CSV header")?;
    writer.write_record(&values).context("Failed to write CSV row")?;
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to finish CSV export: {}", e.error()))?;
    String::from_utf8(bytes).context("CSV export is not valid UTF-8")
}

fn plain(value: Decimal) -> String {
    value.normalize().to_string()
}

fn universal_values(record: &HistoryRecord) -> Vec<String> {
    let (sourcing_cost, selling_price, courier_rate, payment_type, fbr_tax) = match &record.report {
        Report::Feasibility(r) => (
            r.input.sourcing_cost,
            r.input.selling_price,
            r.input.courier_rate,
            r.input.payment_type,
            r.result.fbr_tax,
        ),
        Report::LaunchPlan(r) => (
            r.input.sourcing_cost,
            r.input.selling_price,
            r.input.courier_rate,
            r.input.payment_type,
            r.result.fbr_tax,
        ),
    };

    vec![
        record.id.map(|id| id.to_string()).unwrap_or_default(),
        record.kind().label().to_string(),
        record
            .created_at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        record.product_name.clone(),
        record.category.clone(),
        plain(sourcing_cost),
        plain(selling_price),
        record.report.courier().unwrap_or_default().to_string(),
        plain(courier_rate),
        record.report.profit_status().as_str().to_string(),
        record.report.summary().to_string(),
        payment_type.as_str().to_string(),
        format_fixed(fbr_tax, 2),
    ]
}

fn launch_values(report: &LaunchReport) -> Vec<String> {
    vec![
        plain(report.input.marketing_budget),
        format_fixed(report.result.profit_per_unit, 2),
        report.result.breakeven_units.to_string(),
        format_fixed(report.result.profit_margin, 2),
        format_fixed(report.result.breakeven_roas, 2),
    ]
}

fn feasibility_values(report: &FeasibilityReport) -> Vec<String> {
    let input = &report.input;
    let result = &report.result;
    vec![
        input
            .shopify_plan
            .map(|p| p.as_str().to_string())
            .unwrap_or_else(|| "none".to_string()),
        plain(input.shopify_usd_cost()),
        report.bank.clone().unwrap_or_default(),
        plain(input.debit_card_tax),
        plain(input.ad_budget),
        plain(input.effective_ad_spend()),
        plain(input.cost_per_conversion),
        plain(input.returned_orders_percent.unwrap_or_default()),
        format_fixed(result.total_monthly_fixed_costs, 2),
        result.breakeven_conversions.to_string(),
        format_fixed(result.net_profit, 2),
        format_fixed(result.break_even_price, 2),
        format_fixed(result.roas_multiplier, 2),
        format_fixed(result.roas_percent, 1),
    ]
}
