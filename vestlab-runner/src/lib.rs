//! VestLab Runner — ingestion, configuration, portfolio evaluation, export.
//!
//! This crate builds on `vestlab-core` to provide:
//! - Grant CSV ingestion with line-numbered validation errors
//! - TOML report configuration with command-line overrides
//! - Portfolio evaluation (sequential or on the rayon pool) with summed totals
//! - Table, JSON, and CSV rendering of the resulting report

pub mod config;
pub mod export;
pub mod ingest;
pub mod portfolio;

pub use config::{parse_as_of, ConfigError, ReportConfig, ReportSettings};
pub use export::{
    export_json, export_schedule_csv, export_status_csv, import_json, render_schedule,
    render_table,
};
pub use ingest::{grants_fingerprint, load_grants, parse_grants, IngestError, LoadedGrants};
pub use portfolio::{
    evaluate_portfolio, full_schedules, GrantSchedule, GrantStatus, PortfolioReport,
    PortfolioTotals, SCHEMA_VERSION,
};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<ReportConfig>();
        assert_sync::<ReportConfig>();
        assert_send::<ReportSettings>();
        assert_sync::<ReportSettings>();
    }

    #[test]
    fn report_types_are_send_sync() {
        assert_send::<PortfolioReport>();
        assert_sync::<PortfolioReport>();
        assert_send::<GrantStatus>();
        assert_sync::<GrantStatus>();
        assert_send::<GrantSchedule>();
        assert_sync::<GrantSchedule>();
        assert_send::<PortfolioTotals>();
        assert_sync::<PortfolioTotals>();
    }

    #[test]
    fn error_types_are_send_sync() {
        assert_send::<IngestError>();
        assert_sync::<IngestError>();
        assert_send::<ConfigError>();
        assert_sync::<ConfigError>();
    }

    #[test]
    fn loaded_grants_is_send_sync() {
        assert_send::<LoadedGrants>();
        assert_sync::<LoadedGrants>();
    }
}
