use anyhow::{bail, Context, Result};
use colored::Colorize;

use crate::cli::formatters;
use crate::cli::SettingsCommands;
use crate::config::{settings_path, Settings};

pub fn dispatch_settings(action: SettingsCommands, json_output: bool) -> Result<()> {
    let path = settings_path()?;
    match action {
        SettingsCommands::Show => {
            let settings = Settings::load_from(&path)?;
            if json_output {
                println!("{}", formatters::to_json(&settings));
                return Ok(());
            }
            let source = if path.exists() { "file" } else { "defaults" };
            println!("# {} ({})", path.display(), source);
            print!(
                "{}",
                toml::to_string_pretty(&settings).context("Failed to serialize settings")?
            );
            Ok(())
        }
        SettingsCommands::Path => {
            if json_output {
                println!("{}", serde_json::json!({ "path": path, "exists": path.exists() }));
            } else {
                println!("{}", path.display());
            }
            Ok(())
        }
        SettingsCommands::Init { force } => {
            if path.exists() && !force {
                bail!(
                    "Settings file already exists at {}. Use --force to overwrite.",
                    path.display()
                );
            }
            Settings::default().save_to(&path)?;
            if json_output {
                println!("{}", serde_json::json!({ "path": path }));
            } else {
                println!("{} Wrote default settings to {}", "✓".green().bold(), path.display());
            }
            Ok(())
        }
    }
}

pub fn dispatch_catalog(json_output: bool) -> Result<()> {
    let settings = Settings::load()?;
    if json_output {
        let payload = serde_json::json!({
            "banks": settings.banks,
            "shopify_plans": settings.shopify_plans,
            "couriers": settings.couriers,
        });
        println!("{}", formatters::to_json(&payload));
        return Ok(());
    }
    print!("{}", formatters::format_catalog(&settings));
    Ok(())
}
