//! Output formatting module for CLI display
//!
//! This module handles all terminal output formatting, separating
//! the concerns of calculation from presentation.

use chrono::{DateTime, Local, Utc};
use colored::{ColoredString, Colorize};
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

use crate::config::Settings;
use crate::db::HistoryRecord;
use crate::feasibility::{FeasibilityInput, FeasibilityResult};
use crate::launch_plan::{LaunchPlanInput, LaunchPlanResult};
use crate::rates::RateQuote;
use crate::status::ProfitStatus;
use crate::tax::TaxBreakdown;
use crate::utils::{
    format_fixed, format_multiplier, format_percent, format_pkr, format_pkr_with_decimals,
    format_usd,
};
use crate::what_if::WhatIfComparison;

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Value")]
    value: String,
}

fn metric(name: &str, value: impl Into<String>) -> MetricRow {
    MetricRow {
        metric: name.to_string(),
        value: value.into(),
    }
}

fn metric_table(rows: Vec<MetricRow>) -> String {
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.modify(Columns::new(1..), Alignment::right());
    table.to_string()
}

/// Pretty JSON for any serializable report
pub fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

pub fn status_colored(status: ProfitStatus) -> ColoredString {
    match status {
        ProfitStatus::Profitable => status.as_str().green().bold(),
        ProfitStatus::NearBreakeven => status.as_str().yellow().bold(),
        ProfitStatus::Loss => status.as_str().red().bold(),
    }
}

fn signed_pkr(value: Decimal) -> String {
    let text = format_pkr(value);
    if value >= Decimal::ZERO {
        text.green().to_string()
    } else {
        text.red().to_string()
    }
}

fn roas_label(input: &FeasibilityInput) -> &'static str {
    match input.ad_spend {
        Some(spend) if spend > Decimal::ZERO => "ROAS (Actual)",
        _ => "ROAS (Estimated)",
    }
}

pub fn format_feasibility_table(
    product: &str,
    input: &FeasibilityInput,
    result: &FeasibilityResult,
    quote: Option<&RateQuote>,
) -> String {
    let mut output = format!("\n{} Feasibility - {}\n\n", "📊".cyan().bold(), product.bold());

    let mut rows = vec![
        metric("Selling Price", format_pkr(input.selling_price)),
        metric("Sourcing Cost", format_pkr(input.sourcing_cost)),
        metric("Courier Rate", format_pkr(input.courier_rate)),
        metric(
            &format!("FBR Tax ({})", input.payment_type),
            format_pkr_with_decimals(result.fbr_tax, 2),
        ),
        metric("Profit per Sale", format_pkr_with_decimals(result.profit_per_sale, 2)),
        metric("Shopify (PKR, taxed)", format_pkr_with_decimals(result.shopify_cost_local, 2)),
        metric("Ad Spend (taxed)", format_pkr_with_decimals(result.taxed_ad_spend, 2)),
        metric(
            "Monthly Fixed Costs",
            format_pkr_with_decimals(result.total_monthly_fixed_costs, 2),
        ),
        metric("Breakeven Conversions", result.breakeven_conversions.to_string()),
        metric("Projected Orders", format_fixed(result.total_orders, 1)),
    ];
    if input.returned_orders_percent.is_some() {
        rows.push(metric("Successful Orders", format_fixed(result.successful_orders, 1)));
    }
    rows.extend([
        metric("Revenue", format_pkr(result.total_revenue)),
        metric("Net Profit", signed_pkr(result.net_profit)),
        metric("Profit Margin", format_percent(result.profit_margin)),
        metric(
            roas_label(input),
            format!(
                "{} ({})",
                format_multiplier(result.roas_multiplier),
                format_percent(result.roas_percent)
            ),
        ),
        metric("Break-even Price", format_pkr_with_decimals(result.break_even_price, 2)),
        metric("Status", status_colored(result.profit_status).to_string()),
    ]);

    output.push_str(&metric_table(rows));
    output.push_str(&format!("\n\n{}\n", result.summary.bold()));
    output.push_str(&format!("{} {}\n", "ℹ".blue().bold(), input.payment_type.tax_note()));

    if !result.tax_breakdown.is_empty() {
        output.push_str(&format_tax_breakdown("Shopify Tax Breakdown", &result.tax_breakdown));
    }
    if !result.ad_tax_breakdown.is_empty() {
        output.push_str(&format_tax_breakdown("Ad Spend Tax Breakdown", &result.ad_tax_breakdown));
    }

    if let Some(quote) = quote {
        output.push_str(&format!("{}\n", format_rate_line(quote, Utc::now())));
    }

    output
}

/// Itemised deductions on a charge
pub fn format_tax_breakdown(title: &str, breakdown: &TaxBreakdown) -> String {
    let mut rows = vec![metric("Base Amount", format_pkr_with_decimals(breakdown.base, 2))];
    if breakdown.bank_fee > Decimal::ZERO {
        rows.push(metric(
            &format!("Bank Fee ({}%)", breakdown.bank_fee_percent.normalize()),
            format_pkr_with_decimals(breakdown.bank_fee, 2),
        ));
    }
    rows.push(metric(
        &format!("WHT ({}%)", breakdown.wht_percent.normalize()),
        format_pkr_with_decimals(breakdown.wht, 2),
    ));
    rows.push(metric("FED Impact", format_pkr_with_decimals(breakdown.fed, 2)));
    if breakdown.provincial_tax > Decimal::ZERO {
        rows.push(metric(
            &format!("Provincial Tax ({}%)", breakdown.provincial_tax_percent.normalize()),
            format_pkr_with_decimals(breakdown.provincial_tax, 2),
        ));
    }
    rows.push(metric("Total Taxes", format_pkr_with_decimals(breakdown.total, 2)));
    rows.push(metric(
        "Charged Amount",
        format_pkr_with_decimals(breakdown.charged_amount(), 2),
    ));

    format!("\n{} {}\n{}\n", "🧾".cyan(), title, metric_table(rows))
}

pub fn format_launch_plan_table(
    product: &str,
    input: &LaunchPlanInput,
    result: &LaunchPlanResult,
) -> String {
    let mut output = format!("\n{} Launch Plan - {}\n\n", "🚀".cyan().bold(), product.bold());

    let rows = vec![
        metric("Selling Price", format_pkr(input.selling_price)),
        metric("Sourcing Cost", format_pkr(input.sourcing_cost)),
        metric("Courier Rate", format_pkr(input.courier_rate)),
        metric(
            &format!("FBR Tax ({})", input.payment_type),
            format_pkr_with_decimals(result.fbr_tax, 2),
        ),
        metric("Profit per Unit", signed_pkr(result.profit_per_unit)),
        metric("Profit Margin", format_percent(result.profit_margin)),
        metric("Marketing Budget", format_pkr(input.marketing_budget)),
        metric("Breakeven Units", result.breakeven_units.to_string()),
        metric("Breakeven ROAS", format_multiplier(result.breakeven_roas)),
        metric("Status", status_colored(result.profit_status).to_string()),
    ];

    output.push_str(&metric_table(rows));
    output.push_str(&format!("\n\n{}\n", result.summary.bold()));
    output.push_str(&format!("{} {}\n", "ℹ".blue().bold(), input.payment_type.tax_note()));
    output
}

fn delta_colored(delta: Decimal) -> String {
    let text = format!("{}{}%", if delta > Decimal::ZERO { "+" } else { "" }, format_fixed(delta, 1));
    if delta > Decimal::ZERO {
        text.green().to_string()
    } else if delta < Decimal::ZERO {
        text.red().to_string()
    } else {
        text.bright_black().to_string()
    }
}

pub fn format_what_if_table(product: &str, comparison: &WhatIfComparison) -> String {
    #[derive(Tabled)]
    struct CompareRow {
        #[tabled(rename = "Metric")]
        metric: String,
        #[tabled(rename = "Current")]
        baseline: String,
        #[tabled(rename = "Simulated")]
        simulated: String,
        #[tabled(rename = "Change")]
        change: String,
    }

    let base = &comparison.baseline;
    let sim = &comparison.simulated;
    let rows = vec![
        CompareRow {
            metric: "Net Profit".to_string(),
            baseline: format_pkr(base.net_profit),
            simulated: format_pkr(sim.net_profit),
            change: delta_colored(comparison.delta("net_profit")),
        },
        CompareRow {
            metric: "ROAS".to_string(),
            baseline: format_multiplier(base.roas_multiplier),
            simulated: format_multiplier(sim.roas_multiplier),
            change: delta_colored(comparison.delta("roas_multiplier")),
        },
        CompareRow {
            metric: "Revenue".to_string(),
            baseline: format_pkr(base.total_revenue),
            simulated: format_pkr(sim.total_revenue),
            change: delta_colored(comparison.delta("total_revenue")),
        },
        CompareRow {
            metric: "Profit Margin".to_string(),
            baseline: format_percent(base.profit_margin),
            simulated: format_percent(sim.profit_margin),
            change: delta_colored(comparison.delta("profit_margin")),
        },
        CompareRow {
            metric: "Breakeven Conversions".to_string(),
            baseline: base.breakeven_conversions.to_string(),
            simulated: sim.breakeven_conversions.to_string(),
            change: delta_colored(comparison.delta("breakeven_conversions")),
        },
        CompareRow {
            metric: "Status".to_string(),
            baseline: status_colored(base.profit_status).to_string(),
            simulated: status_colored(sim.profit_status).to_string(),
            change: String::new(),
        },
    ];

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.modify(Columns::new(1..), Alignment::right());

    format!(
        "\n{} What-if - {}\n\n{}\n\n{}\n",
        "🔮".cyan().bold(),
        product.bold(),
        table,
        sim.summary.bold()
    )
}

pub fn format_history_table(records: &[HistoryRecord]) -> String {
    #[derive(Tabled)]
    struct HistoryRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Type")]
        kind: String,
        #[tabled(rename = "Product")]
        product: String,
        #[tabled(rename = "Category")]
        category: String,
        #[tabled(rename = "Status")]
        status: String,
    }

    let rows: Vec<HistoryRow> = records
        .iter()
        .map(|r| HistoryRow {
            id: r.id.map(|id| id.to_string()).unwrap_or_default(),
            date: format_local_time(r.created_at),
            kind: r.kind().label().to_string(),
            product: r.product_name.clone(),
            category: r.category.clone(),
            status: status_colored(r.report.profit_status()).to_string(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

pub fn format_empty_history() -> String {
    format!(
        "{} No saved reports\nSave one with: {} feasibility ... --save\n",
        "ℹ".blue().bold(),
        "nafa".bold()
    )
}

pub fn format_local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

fn format_age(minutes: i64) -> String {
    match minutes {
        m if m < 1 => "just now".to_string(),
        m if m < 60 => format!("{} min ago", m),
        m if m < 60 * 24 => format!("{} h ago", m / 60),
        m => format!("{} days ago", m / (60 * 24)),
    }
}

/// One-line description of where the rate came from
pub fn format_rate_line(quote: &RateQuote, now: DateTime<Utc>) -> String {
    match quote.rate {
        None => format!(
            "{} No USD to PKR rate available. Set one with {}",
            "⚠".yellow().bold(),
            "nafa rate set <rate>".bold()
        ),
        Some(rate) => {
            let age = quote
                .age(now)
                .map(|d| format!(", {}", format_age(d.num_minutes())))
                .unwrap_or_default();
            format!(
                "{} 1 USD = PKR {} ({}{})",
                "💱".cyan(),
                format_fixed(rate, 2),
                quote.source,
                age
            )
        }
    }
}

pub fn format_catalog(settings: &Settings) -> String {
    #[derive(Tabled)]
    struct BankRow {
        #[tabled(rename = "Bank")]
        name: String,
        #[tabled(rename = "Debit Card Tax")]
        tax: String,
    }

    #[derive(Tabled)]
    struct PlanRow {
        #[tabled(rename = "Shopify Plan")]
        name: String,
        #[tabled(rename = "Monthly")]
        cost: String,
    }

    #[derive(Tabled)]
    struct CourierRow {
        #[tabled(rename = "Courier")]
        name: String,
        #[tabled(rename = "COD")]
        cod: String,
        #[tabled(rename = "Online")]
        online: String,
    }

    let banks: Vec<BankRow> = settings
        .banks
        .iter()
        .map(|b| BankRow {
            name: b.name.clone(),
            tax: format!("{}%", b.debit_card_tax.normalize()),
        })
        .collect();
    let plans: Vec<PlanRow> = settings
        .shopify_plans
        .iter()
        .map(|p| PlanRow {
            name: p.name.clone(),
            cost: format_usd(p.monthly_usd),
        })
        .collect();
    let couriers: Vec<CourierRow> = settings
        .couriers
        .iter()
        .map(|c| CourierRow {
            name: c.name.clone(),
            cod: format_pkr(c.cod_rate),
            online: format_pkr(c.online_rate),
        })
        .collect();

    let mut output = String::new();
    for table in [
        Table::new(banks).with(Style::rounded()).to_string(),
        Table::new(plans).with(Style::rounded()).to_string(),
        Table::new(couriers).with(Style::rounded()).to_string(),
    ] {
        output.push_str(&table);
        output.push_str("\n\n");
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::RateSource;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    #[test]
    fn test_empty_history_message() {
        let msg = format_empty_history();
        assert!(msg.contains("No saved reports"));
        assert!(msg.contains("--save"));
    }

    #[test]
    fn test_rate_line() {
        colored::control::set_override(false);
        let now = Utc::now();
        let quote = RateQuote {
            rate: Some(dec!(278.5)),
            fetched_at: Some(now - Duration::hours(3)),
            source: RateSource::Cache,
            source_url: None,
        };
        let line = format_rate_line(&quote, now);
        assert!(line.contains("1 USD = PKR 278.50"));
        assert!(line.contains("3 h ago"));

        assert!(format_rate_line(&RateQuote::unavailable(), now).contains("nafa rate set"));
    }

    #[test]
    fn test_age_buckets() {
        assert_eq!(format_age(0), "just now");
        assert_eq!(format_age(45), "45 min ago");
        assert_eq!(format_age(600), "10 h ago");
        assert_eq!(format_age(60 * 24 * 3), "3 days ago");
    }

    #[test]
    fn test_catalog_lists_every_entry() {
        colored::control::set_override(false);
        let output = format_catalog(&Settings::default());
        assert!(output.contains("Meezan Bank"));
        assert!(output.contains("2.75%"));
        assert!(output.contains("$299.00"));
        assert!(output.contains("PostEx"));
    }

    #[test]
    fn test_ad_spend_breakdown_has_no_bank_fee() {
        use crate::tax::TaxRegime;
        colored::control::set_override(false);
        let breakdown = TaxBreakdown::for_local(dec!(50000), &TaxRegime::default()).unwrap();
        let output = format_tax_breakdown("Ad Spend Tax Breakdown", &breakdown);
        assert!(output.contains("Ad Spend Tax Breakdown"));
        assert!(output.contains("Base Amount"));
        assert!(output.contains("WHT (1%)"));
        assert!(!output.contains("Bank Fee"));
    }
}
