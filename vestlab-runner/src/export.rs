//! Reporting and export — text table, JSON, and CSV rendering.
//!
//! Provides three output formats for a [`PortfolioReport`]:
//! - **Table**: fixed-width console report, optionally followed by full schedules
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: per-grant status and per-tranche schedule rows for spreadsheets
//!
//! Dates are always written as `YYYY-MM-DD`, the same format accepted on input.

use anyhow::{bail, Context, Result};
use vestlab_core::DATE_FORMAT;

use crate::portfolio::{GrantSchedule, PortfolioReport, SCHEMA_VERSION};

/// Placeholder for a grant with no tranche on or before the as-of date.
pub const NO_VESTING_DATE: &str = "N/A";

const STATUS_RULE_WIDTH: usize = 70;
const SCHEDULE_RULE_WIDTH: usize = 46;

// ─── Table ──────────────────────────────────────────────────────────

/// Render the console report: one row per grant, a totals row, then each
/// grant's full schedule if the report carries them.
pub fn render_table(report: &PortfolioReport) -> String {
    let mut out = String::new();
    let as_of = report.as_of.format(DATE_FORMAT).to_string();

    out.push_str(&format!(
        "\nVesting Status as of {} (Exercise Value: ${:.2}):\n",
        as_of, report.exercise_value
    ));
    out.push_str(&format!(
        "\n{:<20} {:<12} {:<14} {:<20}\n",
        "Grant Name", "Vesting Date", "Total Vested", "Accumulated Value"
    ));
    out.push_str(&"-".repeat(STATUS_RULE_WIDTH));
    out.push('\n');

    for grant in &report.grants {
        let date = grant
            .status
            .last_vesting_date
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_else(|| NO_VESTING_DATE.to_string());
        out.push_str(&status_line(
            &grant.name,
            &date,
            grant.status.vested_shares,
            grant.status.accumulated_value,
        ));
    }

    out.push_str(&"-".repeat(STATUS_RULE_WIDTH));
    out.push('\n');
    out.push_str(&status_line(
        "Total",
        &as_of,
        report.totals.vested_shares,
        report.totals.accumulated_value,
    ));

    for schedule in &report.schedules {
        out.push('\n');
        out.push_str(&render_schedule(schedule));
    }

    out
}

fn status_line(name: &str, date: &str, shares: u64, value: f64) -> String {
    let value = format!("${value:.2}");
    format!("{name:<20} {date:<12} {shares:<14} {value:<20}")
        .trim_end()
        .to_string()
        + "\n"
}

/// Render one grant's full schedule with running value.
pub fn render_schedule(schedule: &GrantSchedule) -> String {
    let mut out = format!(
        "{} (Strike Price: ${:.2})\n",
        schedule.name, schedule.strike_price
    );
    out.push_str(&format!(
        "{:<12} {:<14} {:<20}\n",
        "Vesting Date", "Vested Shares", "Accumulated Value"
    ));
    out.push_str(&"-".repeat(SCHEDULE_RULE_WIDTH));
    out.push('\n');
    for row in &schedule.rows {
        out.push_str(&format!(
            "{:<12} {:<14} ${:.2}\n",
            row.date.format(DATE_FORMAT).to_string(),
            row.vested_shares,
            row.accumulated_value
        ));
    }
    out
}

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a report to pretty JSON.
pub fn export_json(report: &PortfolioReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize PortfolioReport to JSON")
}

/// Deserialize a report from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<PortfolioReport> {
    let report: PortfolioReport =
        serde_json::from_str(json).context("failed to deserialize PortfolioReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export per-grant status as CSV, with a trailing `Total` row.
///
/// Columns: name, last_vesting_date, vested_shares, accumulated_value
pub fn export_status_csv(report: &PortfolioReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "name",
        "last_vesting_date",
        "vested_shares",
        "accumulated_value",
    ])?;

    for grant in &report.grants {
        let date = grant
            .status
            .last_vesting_date
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default();
        wtr.write_record([
            grant.name.as_str(),
            &date,
            &grant.status.vested_shares.to_string(),
            &format!("{:.2}", grant.status.accumulated_value),
        ])?;
    }

    wtr.write_record([
        "Total",
        &report.as_of.format(DATE_FORMAT).to_string(),
        &report.totals.vested_shares.to_string(),
        &format!("{:.2}", report.totals.accumulated_value),
    ])?;

    finish_csv(wtr)
}

/// Export every schedule row as CSV.
///
/// Columns: name, date, vested_shares, cumulative_shares, accumulated_value
pub fn export_schedule_csv(schedules: &[GrantSchedule]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "name",
        "date",
        "vested_shares",
        "cumulative_shares",
        "accumulated_value",
    ])?;

    for schedule in schedules {
        for row in &schedule.rows {
            wtr.write_record([
                schedule.name.as_str(),
                &row.date.format(DATE_FORMAT).to_string(),
                &row.vested_shares.to_string(),
                &row.cumulative_shares.to_string(),
                &format!("{:.2}", row.accumulated_value),
            ])?;
        }
    }

    finish_csv(wtr)
}

fn finish_csv(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = wtr
        .into_inner()
        .map_err(|e| anyhow::anyhow!("failed to flush CSV writer: {e}"))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}
