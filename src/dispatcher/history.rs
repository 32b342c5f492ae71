use anyhow::{anyhow, bail, Context, Result};
use colored::Colorize;
use std::path::PathBuf;

use crate::cli::formatters;
use crate::cli::HistoryCommands;
use crate::db::{self, HistoryRecord, Report};
use crate::reports::{export_file_name, export_to_csv};

fn load_record(conn: &rusqlite::Connection, id: i64) -> Result<HistoryRecord> {
    db::get_record(conn, id)?.ok_or_else(|| anyhow!("Report #{} not found in history", id))
}

pub fn dispatch_history(action: HistoryCommands, json_output: bool) -> Result<()> {
    let conn = db::open_history(None)?;

    match action {
        HistoryCommands::List { kind, limit } => {
            let records = db::list_records(&conn, kind, limit)?;
            if json_output {
                println!("{}", formatters::to_json(&records));
                return Ok(());
            }
            if records.is_empty() {
                print!("{}", formatters::format_empty_history());
                return Ok(());
            }
            println!("\n{} Saved Reports\n", "📚".cyan().bold());
            println!("{}\n", formatters::format_history_table(&records));
            Ok(())
        }
        HistoryCommands::Show { id } => {
            let record = load_record(&conn, id)?;
            if json_output {
                println!("{}", formatters::to_json(&record));
                return Ok(());
            }
            println!(
                "#{} {} | {} | {}",
                id,
                record.kind().label().bold(),
                record.category,
                formatters::format_local_time(record.created_at)
            );
            match &record.report {
                Report::Feasibility(r) => print!(
                    "{}",
                    formatters::format_feasibility_table(&record.product_name, &r.input, &r.result, None)
                ),
                Report::LaunchPlan(r) => print!(
                    "{}",
                    formatters::format_launch_plan_table(&record.product_name, &r.input, &r.result)
                ),
            }
            Ok(())
        }
        HistoryCommands::Export { id, output } => {
            let record = load_record(&conn, id)?;
            let csv_content = export_to_csv(&record)?;
            let path = output.unwrap_or_else(|| PathBuf::from(export_file_name(&record)));
            std::fs::write(&path, csv_content)
                .with_context(|| format!("Failed to write {}", path.display()))?;

            if json_output {
                println!("{}", serde_json::json!({ "id": id, "path": path }));
            } else {
                println!("{} Report exported to: {}", "✓".green().bold(), path.display());
            }
            Ok(())
        }
        HistoryCommands::Delete { id } => {
            if !db::delete_record(&conn, id)? {
                bail!("Report #{} not found in history", id);
            }
            if json_output {
                println!("{}", serde_json::json!({ "deleted": id }));
            } else {
                println!("{} Deleted report #{}", "✓".green().bold(), id);
            }
            Ok(())
        }
        HistoryCommands::Clear { yes } => {
            if !yes {
                bail!("This deletes every saved report. Re-run with --yes to confirm.");
            }
            let removed = db::clear_history(&conn)?;
            if json_output {
                println!("{}", serde_json::json!({ "deleted": removed }));
            } else {
                println!("{} Removed {} saved reports", "✓".green().bold(), removed);
            }
            Ok(())
        }
    }
}
