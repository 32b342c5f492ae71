use anyhow::{anyhow, bail, Context, Result};
use colored::Colorize;
use rust_decimal::Decimal;
use tracing::info;

use crate::cli::formatters;
use crate::cli::{FeasibilityArgs, PlanArgs, ProductArgs, ShopifyArg, WhatIfArgs};
use crate::config::Settings;
use crate::db::{self, FeasibilityReport, HistoryRecord, LaunchReport, Report};
use crate::feasibility::{compute_feasibility, FeasibilityInput, ShopifyPlan};
use crate::launch_plan::{compute_launch_plan, LaunchPlanInput};
use crate::rates::{require_rate, CachedRateSupplier, RateQuote, RateSupplier};
use crate::tax::TaxRegime;
use crate::what_if::{simulate_what_if, WhatIfOverrides};

/// Courier charge and the catalogue name it came from, if any
fn resolve_courier(settings: &Settings, args: &ProductArgs) -> Result<(Decimal, Option<String>)> {
    if let Some(name) = &args.courier {
        let courier = settings.find_courier(name).ok_or_else(|| {
            anyhow!("Unknown courier '{}'. Run `nafa catalog` to see the list.", name)
        })?;
        return Ok((courier.rate_for(args.payment), Some(courier.name.clone())));
    }
    match args.courier_rate {
        Some(rate) => Ok((rate, None)),
        None => bail!("Provide --courier <name> or --courier-rate <PKR>"),
    }
}

fn resolve_bank(settings: &Settings, args: &FeasibilityArgs) -> Result<(Decimal, Option<String>)> {
    if let Some(name) = &args.bank {
        let bank = settings
            .find_bank(name)
            .ok_or_else(|| anyhow!("Unknown bank '{}'. Run `nafa catalog` to see the list.", name))?;
        return Ok((bank.debit_card_tax, Some(bank.name.clone())));
    }
    Ok((args.debit_card_tax.unwrap_or(Decimal::ZERO), None))
}

/// Shopify plan, monthly USD cost and catalogue tier name.
///
/// A tier or cost given without `--shopify` implies a regular plan.
fn resolve_shopify(
    settings: &Settings,
    args: &FeasibilityArgs,
) -> Result<(Option<ShopifyPlan>, Decimal, Option<String>)> {
    let priced = args.shopify_tier.is_some() || args.shopify_cost.is_some();
    let plan = match args.shopify {
        Some(ShopifyArg(plan)) => plan,
        None if priced => Some(ShopifyPlan::Regular),
        None => None,
    };

    if plan != Some(ShopifyPlan::Regular) {
        if priced {
            bail!("--shopify-tier and --shopify-cost only apply to a regular Shopify plan");
        }
        return Ok((plan, Decimal::ZERO, None));
    }

    if let Some(name) = &args.shopify_tier {
        let tier = settings.find_shopify_plan(name).ok_or_else(|| {
            anyhow!("Unknown Shopify plan '{}'. Run `nafa catalog` to see the list.", name)
        })?;
        return Ok((plan, tier.monthly_usd, Some(tier.name.clone())));
    }
    match args.shopify_cost {
        Some(cost) if cost > Decimal::ZERO => Ok((plan, cost, None)),
        Some(_) => bail!("A regular Shopify plan needs a --shopify-cost above 0"),
        None => bail!("A regular Shopify plan needs --shopify-cost <USD> or --shopify-tier <name>"),
    }
}

fn tax_regime(settings: &Settings, args: &FeasibilityArgs) -> TaxRegime {
    let mut regime = settings.tax_regime();
    if args.non_filer {
        regime.filer_status = false;
    }
    if let Some(rate) = args.provincial_tax {
        regime.provincial_tax_enabled = true;
        regime.provincial_tax_rate = rate;
    }
    regime
}

fn save_record(record: &HistoryRecord) -> Result<i64> {
    let conn = db::open_history(None)?;
    db::insert_record(&conn, record).context("Failed to save report to history")
}

pub async fn dispatch_feasibility(args: FeasibilityArgs, json_output: bool) -> Result<()> {
    let settings = Settings::load()?;
    let (courier_rate, courier) = resolve_courier(&settings, &args.product)?;
    let (debit_card_tax, bank) = resolve_bank(&settings, &args)?;
    let (shopify_plan, shopify_monthly_cost, shopify_tier) = resolve_shopify(&settings, &args)?;

    let mut input = FeasibilityInput {
        sourcing_cost: args.product.sourcing_cost,
        selling_price: args.product.selling_price,
        courier_rate,
        payment_type: args.product.payment,
        ad_budget: args.ad_budget,
        cost_per_conversion: args.cost_per_conversion,
        ad_spend: args.ad_spend,
        shopify_plan,
        shopify_monthly_cost,
        debit_card_tax,
        usd_to_local_rate: Decimal::ZERO,
        tax: tax_regime(&settings, &args),
        returned_orders_percent: args.returned,
    };

    // Only a USD charge needs a rate; skip the lookup otherwise
    let quote = match args.rate {
        Some(rate) => Some(RateQuote::manual(rate)),
        None if input.shopify_usd_cost() > Decimal::ZERO => {
            let supplier = CachedRateSupplier::with_default_cache(settings.manual_rate)?;
            Some(supplier.get_rate().await?)
        }
        None => None,
    };
    if let Some(quote) = &quote {
        input.usd_to_local_rate = require_rate(quote)?;
    }

    let result = compute_feasibility(&input)?;
    info!(
        "Feasibility for {}: {} (net {})",
        args.product.product, result.profit_status, result.net_profit
    );

    let saved_id = if args.product.save {
        let record = HistoryRecord::new(
            args.product.product.clone(),
            args.product.category.clone(),
            Report::Feasibility(FeasibilityReport {
                input: input.clone(),
                result: result.clone(),
                bank,
                courier,
                shopify_tier,
            }),
        );
        Some(save_record(&record)?)
    } else {
        None
    };

    if json_output {
        let payload = serde_json::json!({
            "id": saved_id,
            "product_name": args.product.product,
            "category": args.product.category,
            "input": input,
            "result": result,
            "rate": quote,
        });
        println!("{}", formatters::to_json(&payload));
        return Ok(());
    }

    print!(
        "{}",
        formatters::format_feasibility_table(&args.product.product, &input, &result, quote.as_ref())
    );
    if let Some(id) = saved_id {
        println!("\n{} Saved to history as #{}\n", "✓".green().bold(), id);
    }
    Ok(())
}

pub fn dispatch_plan(args: PlanArgs, json_output: bool) -> Result<()> {
    let settings = Settings::load()?;
    let (courier_rate, courier) = resolve_courier(&settings, &args.product)?;

    let input = LaunchPlanInput {
        sourcing_cost: args.product.sourcing_cost,
        selling_price: args.product.selling_price,
        courier_rate,
        payment_type: args.product.payment,
        marketing_budget: args.marketing_budget,
    };
    let result = compute_launch_plan(&input)?;
    info!(
        "Launch plan for {}: {} (margin {})",
        args.product.product, result.profit_status, result.profit_margin
    );

    let saved_id = if args.product.save {
        let record = HistoryRecord::new(
            args.product.product.clone(),
            args.product.category.clone(),
            Report::LaunchPlan(LaunchReport {
                input: input.clone(),
                result: result.clone(),
                courier,
            }),
        );
        Some(save_record(&record)?)
    } else {
        None
    };

    if json_output {
        let payload = serde_json::json!({
            "id": saved_id,
            "product_name": args.product.product,
            "category": args.product.category,
            "input": input,
            "result": result,
        });
        println!("{}", formatters::to_json(&payload));
        return Ok(());
    }

    print!(
        "{}",
        formatters::format_launch_plan_table(&args.product.product, &input, &result)
    );
    if let Some(id) = saved_id {
        println!("\n{} Saved to history as #{}\n", "✓".green().bold(), id);
    }
    Ok(())
}

pub fn dispatch_what_if(args: WhatIfArgs, json_output: bool) -> Result<()> {
    let overrides = WhatIfOverrides {
        selling_price: args.price,
        cost_per_conversion: args.cpc,
        ad_budget: args.ad_budget,
    };
    if overrides.is_empty() {
        bail!("Nothing to simulate: pass --price, --cpc or --ad-budget");
    }

    let conn = db::open_history(None)?;
    let record = db::get_record(&conn, args.id)?
        .ok_or_else(|| anyhow!("Report #{} not found in history", args.id))?;
    let report = match &record.report {
        Report::Feasibility(report) => report,
        Report::LaunchPlan(_) => {
            bail!("Report #{} is a launch plan; what-if needs a feasibility check", args.id)
        }
    };

    let comparison = simulate_what_if(&report.input, &overrides)?;

    if json_output {
        let payload = serde_json::json!({
            "id": args.id,
            "product_name": record.product_name,
            "overrides": overrides,
            "baseline": comparison.baseline,
            "simulated": comparison.simulated,
            "deltas": comparison.deltas,
        });
        println!("{}", formatters::to_json(&payload));
        return Ok(());
    }

    print!("{}", formatters::format_what_if_table(&record.product_name, &comparison));
    Ok(())
}
