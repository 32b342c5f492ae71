// Database module - SQLite report history

pub mod models;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::error::AppError;
pub use models::{FeasibilityReport, HistoryRecord, LaunchReport, Report, ReportKind};

/// Get the default database path (~/.nafa/history.db)
pub fn get_default_db_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    let nafa_dir = PathBuf::from(home).join(".nafa");

    std::fs::create_dir_all(&nafa_dir).context("Failed to create .nafa directory")?;

    Ok(nafa_dir.join("history.db"))
}

/// Open database connection
pub fn open_db(db_path: Option<PathBuf>) -> Result<Connection> {
    let path = match db_path {
        Some(p) => p,
        None => get_default_db_path()?,
    };
    let conn = Connection::open(&path).context(format!("Failed to open database at {:?}", path))?;
    Ok(conn)
}

/// Create the history tables if they do not exist yet
pub fn apply_schema(conn: &Connection) -> Result<()> {
    let schema_sql = include_str!("schema.sql");
    conn.execute_batch(schema_sql)
        .context("Failed to execute schema")?;
    Ok(())
}

/// Initialize and open in one step
pub fn open_history(db_path: Option<PathBuf>) -> Result<Connection> {
    let conn = open_db(db_path)?;
    apply_schema(&conn)?;
    Ok(conn)
}

/// Save a report, returns its id
pub fn insert_record(conn: &Connection, record: &HistoryRecord) -> Result<i64> {
    let payload = serde_json::to_string(&record.report).context("Failed to serialize report")?;
    conn.execute(
        "INSERT INTO reports (kind, product_name, category, profit_status, created_at, payload)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            record.kind().as_str(),
            record.product_name,
            record.category,
            record.report.profit_status().as_str(),
            record.created_at,
            payload,
        ],
    )?;

    let id = conn.last_insert_rowid();
    info!("Saved {} report #{} for {}", record.kind().label(), id, record.product_name);
    Ok(id)
}

fn record_from_row(row: &Row) -> Result<HistoryRecord> {
    let id: i64 = row.get(0)?;
    let product_name: String = row.get(1)?;
    let category: String = row.get(2)?;
    let created_at: DateTime<Utc> = row.get(3)?;
    let payload: String = row.get(4)?;

    let report: Report = serde_json::from_str(&payload)
        .map_err(|e| AppError::History(format!("report #{} has an unreadable payload: {}", id, e)))?;

    Ok(HistoryRecord {
        id: Some(id),
        product_name,
        category,
        created_at,
        report,
    })
}

pub fn get_record(conn: &Connection, id: i64) -> Result<Option<HistoryRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, product_name, category, created_at, payload FROM reports WHERE id = ?1",
    )?;
    let mut rows = stmt.query([id])?;
    match rows.next()? {
        Some(row) => Ok(Some(record_from_row(row)?)),
        None => Ok(None),
    }
}

/// Newest first, optionally filtered by kind
pub fn list_records(
    conn: &Connection,
    kind: Option<ReportKind>,
    limit: Option<usize>,
) -> Result<Vec<HistoryRecord>> {
    let limit = limit.map(|l| l as i64).unwrap_or(-1);
    let kind = kind.map(|k| k.as_str());

    let mut stmt = conn.prepare(
        "SELECT id, product_name, category, created_at, payload
         FROM reports
         WHERE ?1 IS NULL OR kind = ?1
         ORDER BY created_at DESC, id DESC
         LIMIT ?2",
    )?;

    let mut rows = stmt.query(params![kind, limit])?;
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        records.push(record_from_row(row)?);
    }
    Ok(records)
}

/// Returns true if a row was removed
pub fn delete_record(conn: &Connection, id: i64) -> Result<bool> {
    let deleted = conn.execute("DELETE FROM reports WHERE id = ?1", [id])?;
    if deleted > 0 {
        info!("Deleted report #{}", id);
    }
    Ok(deleted > 0)
}

/// Remove every saved report, returns how many were removed
pub fn clear_history(conn: &Connection) -> Result<usize> {
    let deleted = conn.execute("DELETE FROM reports", [])?;
    info!("Cleared {} reports from history", deleted);
    Ok(deleted)
}
