use anyhow::{bail, Result};
use chrono::Utc;
use colored::Colorize;
use rust_decimal::Decimal;

use crate::cli::formatters;
use crate::cli::RateCommands;
use crate::config::{settings_path, Settings};
use crate::rates::cache::{default_cache_dir, RateCache};
use crate::rates::{CachedRateSupplier, RateQuote, RateSupplier};

fn quote_json(quote: &RateQuote) -> serde_json::Value {
    serde_json::json!({
        "rate": quote.rate,
        "source": quote.source,
        "source_url": quote.source_url,
        "fetched_at": quote.fetched_at.map(|at| at.to_rfc3339()),
        "age_ms": quote.age_ms(Utc::now()),
    })
}

pub async fn dispatch_rate(action: RateCommands, json_output: bool) -> Result<()> {
    match action {
        RateCommands::Show => {
            let settings = Settings::load()?;
            let supplier = CachedRateSupplier::with_default_cache(settings.manual_rate)?;
            let quote = supplier.get_rate().await?;
            if json_output {
                println!("{}", formatters::to_json(&quote_json(&quote)));
            } else {
                println!("{}", formatters::format_rate_line(&quote, Utc::now()));
            }
            Ok(())
        }
        RateCommands::Refresh => {
            let supplier = CachedRateSupplier::with_default_cache(None)?;
            let quote = supplier.refresh().await?;
            if json_output {
                println!("{}", formatters::to_json(&quote_json(&quote)));
            } else {
                println!("{} Rate updated", "✓".green().bold());
                println!("{}", formatters::format_rate_line(&quote, Utc::now()));
                if Settings::load()?.manual_rate.is_some() {
                    println!(
                        "{} A manual rate is set and still takes precedence. Remove it with {}",
                        "ℹ".blue().bold(),
                        "nafa rate clear".bold()
                    );
                }
            }
            Ok(())
        }
        RateCommands::Set { rate } => {
            if rate <= Decimal::ZERO {
                bail!("Rate must be a positive number of PKR per USD");
            }
            let mut settings = Settings::load()?;
            settings.manual_rate = Some(rate);
            settings.save()?;
            if json_output {
                println!(
                    "{}",
                    serde_json::json!({ "manual_rate": rate, "path": settings_path()? })
                );
            } else {
                println!(
                    "{} Manual rate set: 1 USD = PKR {}",
                    "✓".green().bold(),
                    rate.normalize()
                );
            }
            Ok(())
        }
        RateCommands::Clear => {
            let mut settings = Settings::load()?;
            let had_manual = settings.manual_rate.take().is_some();
            if had_manual {
                settings.save()?;
            }
            let cache = RateCache::new(default_cache_dir()?);
            let had_cache = cache.clear()?;

            if json_output {
                println!(
                    "{}",
                    serde_json::json!({
                        "manual_rate_cleared": had_manual,
                        "cache_cleared": had_cache,
                    })
                );
            } else if had_manual || had_cache {
                println!("{} Cleared manual and cached rates", "✓".green().bold());
            } else {
                println!("Nothing to clear.");
            }
            Ok(())
        }
    }
}
