//! Grant ingestion from CSV.
//!
//! The file has one header row (skipped, not inspected) followed by one grant
//! per row with exactly six columns:
//!
//! ```text
//! name,shares,strike_price,cliff_months,vesting_months,grant_date
//! Founders ISO,1200,2.00,12,48,2020-01-01
//! ```
//!
//! Fields are whitespace-trimmed and dates use `YYYY-MM-DD`. The first bad
//! row aborts the load with an error naming the line and field; nothing is
//! evaluated from a partially valid file.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;
use vestlab_core::{Grant, GrantError, DATE_FORMAT};

/// Expected column order.
pub const GRANT_COLUMNS: [&str; 6] = [
    "name",
    "shares",
    "strike_price",
    "cliff_months",
    "vesting_months",
    "grant_date",
];

/// Errors from reading a grants file.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("opening grants file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("reading csv line {line}: {source}")]
    Csv {
        line: u64,
        #[source]
        source: csv::Error,
    },

    #[error("invalid number of columns on line {line} (expected {expected}, found {found})")]
    ColumnCount {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("invalid {field} on line {line} ('{value}'): {reason}")]
    InvalidField {
        line: u64,
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("invalid grant on line {line}: {source}")]
    InvalidGrant {
        line: u64,
        #[source]
        source: GrantError,
    },
}

impl IngestError {
    /// Line number in the source file, when the error is tied to a row.
    pub fn line(&self) -> Option<u64> {
        match self {
            Self::Io { .. } => None,
            Self::Csv { line, .. }
            | Self::ColumnCount { line, .. }
            | Self::InvalidField { line, .. }
            | Self::InvalidGrant { line, .. } => Some(*line),
        }
    }
}

/// Grants read from one source, with provenance.
#[derive(Debug, Clone)]
pub struct LoadedGrants {
    pub grants: Vec<Grant>,
    /// BLAKE3 content hash of the grants, see [`grants_fingerprint`].
    pub fingerprint: String,
    /// Non-fatal oddities worth showing the user.
    pub warnings: Vec<String>,
}

/// Load grants from a CSV file on disk.
pub fn load_grants(path: &Path) -> Result<LoadedGrants, IngestError> {
    let file = File::open(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_grants(file)
}

/// Parse grants from any CSV byte source.
pub fn parse_grants<R: Read>(reader: R) -> Result<LoadedGrants, IngestError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut grants = Vec::new();
    let mut warnings = Vec::new();

    // Header is line 1; used when the csv crate cannot report a position.
    let mut fallback_line: u64 = 1;

    for result in csv_reader.records() {
        fallback_line += 1;
        let record = result.map_err(|source| IngestError::Csv {
            line: source
                .position()
                .map(|p| p.line())
                .unwrap_or(fallback_line),
            source,
        })?;
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(fallback_line);

        let grant = parse_record(&record, line)?;
        if grant.cliff_exceeds_vesting() {
            warnings.push(format!(
                "grant '{}' on line {line}: cliff ({} months) exceeds vesting period ({} months); all shares vest at the cliff",
                grant.name, grant.cliff_months, grant.vesting_months
            ));
        }
        grants.push(grant);
    }

    let fingerprint = grants_fingerprint(&grants);
    Ok(LoadedGrants {
        grants,
        fingerprint,
        warnings,
    })
}

fn parse_record(record: &csv::StringRecord, line: u64) -> Result<Grant, IngestError> {
    if record.len() != GRANT_COLUMNS.len() {
        return Err(IngestError::ColumnCount {
            line,
            expected: GRANT_COLUMNS.len(),
            found: record.len(),
        });
    }

    let name = &record[0];
    let shares: u64 = parse_field(record, 1, "number of shares", line)?;
    let strike_price: f64 = parse_field(record, 2, "strike price", line)?;
    let cliff_months: u32 = parse_field(record, 3, "cliff duration (months)", line)?;
    let vesting_months: u32 = parse_field(record, 4, "vesting duration (months)", line)?;
    let grant_date = NaiveDate::parse_from_str(&record[5], DATE_FORMAT).map_err(|e| {
        IngestError::InvalidField {
            line,
            field: "grant date",
            value: record[5].to_string(),
            reason: format!("{e} (expected YYYY-MM-DD)"),
        }
    })?;

    Grant::new(
        name,
        shares,
        strike_price,
        cliff_months,
        vesting_months,
        grant_date,
    )
    .map_err(|source| IngestError::InvalidGrant { line, source })
}

fn parse_field<T>(
    record: &csv::StringRecord,
    index: usize,
    field: &'static str,
    line: u64,
) -> Result<T, IngestError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = &record[index];
    raw.parse::<T>().map_err(|e| IngestError::InvalidField {
        line,
        field,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Deterministic BLAKE3 hash over the grant set, in input order.
///
/// Identifies which inputs a report was computed from.
pub fn grants_fingerprint(grants: &[Grant]) -> String {
    let mut hasher = blake3::Hasher::new();
    for grant in grants {
        hasher.update(grant.name.as_bytes());
        hasher.update(&[0]);
        hasher.update(&grant.shares.to_le_bytes());
        hasher.update(&grant.strike_price.to_le_bytes());
        hasher.update(&grant.cliff_months.to_le_bytes());
        hasher.update(&grant.vesting_months.to_le_bytes());
        hasher.update(grant.grant_date.format(DATE_FORMAT).to_string().as_bytes());
    }
    hasher.finalize().to_hex().to_string()
}
