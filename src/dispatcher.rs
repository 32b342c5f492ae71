//! Command dispatcher that routes parsed clap commands to their handlers.
//!
//! Handlers resolve everything the calculators need (settings, courier and
//! bank catalogues, the exchange rate) before calling into the pure core.

mod calculate;
mod history;
mod rates;
mod settings;

use anyhow::Result;

use crate::cli::{Cli, Commands};

/// Route a parsed command to its handler
pub async fn dispatch_command(cli: Cli) -> Result<()> {
    let json_output = cli.json;
    match cli.command {
        Commands::Feasibility(args) => calculate::dispatch_feasibility(args, json_output).await,
        Commands::Plan(args) => calculate::dispatch_plan(args, json_output),
        Commands::WhatIf(args) => calculate::dispatch_what_if(args, json_output),
        Commands::Rate { action } => rates::dispatch_rate(action, json_output).await,
        Commands::History { action } => history::dispatch_history(action, json_output),
        Commands::Settings { action } => settings::dispatch_settings(action, json_output),
        Commands::Catalog => settings::dispatch_catalog(json_output),
    }
}
