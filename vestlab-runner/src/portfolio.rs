//! Portfolio evaluation — every grant's as-of status plus the summed totals.
//!
//! Each grant is independent: its schedule and status depend only on the
//! grant itself and the report parameters. With `parallel` set, grants are
//! evaluated on the rayon pool; results are always returned in input order.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use vestlab_core::{
    evaluate_as_of, generate_schedule, render_full_schedule, AsOfStatus, Grant, IntervalStep,
    ScheduleError, ScheduleRow,
};

use crate::config::ReportConfig;
use crate::ingest::grants_fingerprint;

/// Report format version; bump on any breaking change to the JSON shape.
pub const SCHEMA_VERSION: u32 = 1;

/// One grant's position as of the report date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrantStatus {
    pub name: String,
    #[serde(flatten)]
    pub status: AsOfStatus,
}

/// One grant's full vesting history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrantSchedule {
    pub name: String,
    pub strike_price: f64,
    pub rows: Vec<ScheduleRow>,
}

/// Sum over every grant in the report.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PortfolioTotals {
    pub vested_shares: u64,
    pub accumulated_value: f64,
}

impl From<AsOfStatus> for PortfolioTotals {
    fn from(status: AsOfStatus) -> Self {
        Self {
            vested_shares: status.vested_shares,
            accumulated_value: status.accumulated_value,
        }
    }
}

/// Everything a renderer needs for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioReport {
    pub schema_version: u32,
    pub as_of: NaiveDate,
    pub exercise_value: f64,
    pub interval: IntervalStep,
    /// BLAKE3 fingerprint of the input grants.
    pub fingerprint: String,
    pub grants: Vec<GrantStatus>,
    pub totals: PortfolioTotals,
    /// Empty unless full schedules were requested.
    #[serde(default)]
    pub schedules: Vec<GrantSchedule>,
}

struct GrantOutcome {
    status: GrantStatus,
    schedule: Option<GrantSchedule>,
}

/// Evaluate every grant as of `config.as_of` and total the results.
///
/// Fails on the first grant whose schedule cannot be generated.
pub fn evaluate_portfolio(
    grants: &[Grant],
    config: &ReportConfig,
) -> Result<PortfolioReport, ScheduleError> {
    let outcomes: Vec<GrantOutcome> = if config.parallel {
        grants
            .par_iter()
            .map(|grant| evaluate_grant(grant, config))
            .collect::<Result<Vec<_>, _>>()?
    } else {
        grants
            .iter()
            .map(|grant| evaluate_grant(grant, config))
            .collect::<Result<Vec<_>, _>>()?
    };

    let totals: AsOfStatus = outcomes.iter().map(|o| o.status.status).sum();

    let mut statuses = Vec::with_capacity(outcomes.len());
    let mut schedules = Vec::new();
    for outcome in outcomes {
        statuses.push(outcome.status);
        if let Some(schedule) = outcome.schedule {
            schedules.push(schedule);
        }
    }

    Ok(PortfolioReport {
        schema_version: SCHEMA_VERSION,
        as_of: config.as_of,
        exercise_value: config.exercise_value,
        interval: config.interval,
        fingerprint: grants_fingerprint(grants),
        grants: statuses,
        totals: totals.into(),
        schedules,
    })
}

fn evaluate_grant(grant: &Grant, config: &ReportConfig) -> Result<GrantOutcome, ScheduleError> {
    let events = generate_schedule(grant, config.interval)?;
    let status = evaluate_as_of(
        &events,
        grant.strike_price,
        config.exercise_value,
        config.as_of,
    );
    let schedule = config.print_schedule.then(|| GrantSchedule {
        name: grant.name.clone(),
        strike_price: grant.strike_price,
        rows: render_full_schedule(&events, grant.strike_price, config.exercise_value),
    });

    Ok(GrantOutcome {
        status: GrantStatus {
            name: grant.name.clone(),
            status,
        },
        schedule,
    })
}

/// Full schedules for each grant, independent of any as-of date.
pub fn full_schedules(
    grants: &[Grant],
    exercise_value: f64,
    interval: IntervalStep,
) -> Result<Vec<GrantSchedule>, ScheduleError> {
    grants
        .iter()
        .map(|grant| {
            let events = generate_schedule(grant, interval)?;
            Ok(GrantSchedule {
                name: grant.name.clone(),
                strike_price: grant.strike_price,
                rows: render_full_schedule(&events, grant.strike_price, exercise_value),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_grants() -> Vec<Grant> {
        vec![
            Grant::new("Founders ISO", 1200, 2.0, 12, 48, date(2020, 1, 1)).unwrap(),
            Grant::new("Refresh", 480, 7.5, 0, 24, date(2022, 3, 15)).unwrap(),
            Grant::new("Future", 100, 1.0, 12, 48, date(2030, 1, 1)).unwrap(),
        ]
    }

    #[test]
    fn totals_are_sum_of_grants() {
        let config = ReportConfig::new(10.0, date(2022, 6, 30));
        let report = evaluate_portfolio(&sample_grants(), &config).unwrap();

        // Founders: cliff 300 + months 13..=29 (17 * 25) = 725.
        // Refresh: months 1..=3 (Apr 15, May 15, Jun 15) at 20 each = 60.
        assert_eq!(report.grants[0].status.vested_shares, 725);
        assert_eq!(report.grants[1].status.vested_shares, 60);
        assert_eq!(report.grants[2].status, AsOfStatus::default());

        assert_eq!(report.totals.vested_shares, 785);
        assert_eq!(report.totals.accumulated_value, 725.0 * 8.0 + 60.0 * 2.5);
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let base = ReportConfig::new(5.0, date(2023, 3, 1)).with_schedules(true);
        let par = evaluate_portfolio(&sample_grants(), &base.clone().with_parallelism(true)).unwrap();
        let seq = evaluate_portfolio(&sample_grants(), &base.with_parallelism(false)).unwrap();
        assert_eq!(par, seq);
    }

    #[test]
    fn schedules_only_when_requested() {
        let config = ReportConfig::new(5.0, date(2023, 3, 1));
        let report = evaluate_portfolio(&sample_grants(), &config).unwrap();
        assert!(report.schedules.is_empty());

        let report = evaluate_portfolio(&sample_grants(), &config.with_schedules(true)).unwrap();
        assert_eq!(report.schedules.len(), 3);
        assert_eq!(report.schedules[0].rows.len(), 37);
        assert_eq!(report.schedules[1].rows.len(), 24);
    }

    #[test]
    fn empty_portfolio_has_zero_totals() {
        let config = ReportConfig::new(5.0, date(2023, 3, 1));
        let report = evaluate_portfolio(&[], &config).unwrap();
        assert!(report.grants.is_empty());
        assert_eq!(report.totals, PortfolioTotals::default());
    }

    #[test]
    fn invalid_grant_aborts_evaluation() {
        let mut grants = sample_grants();
        grants[1].vesting_months = 0;
        let config = ReportConfig::new(5.0, date(2023, 3, 1));
        let err = evaluate_portfolio(&grants, &config).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidGrant { ref name, .. } if name == "Refresh"));
    }

    #[test]
    fn largest_grants_total_without_overflow() {
        let grants = vec![
            Grant::new("a", Grant::MAX_SHARES, 1.0, 0, 1, date(2020, 1, 1)).unwrap(),
            Grant::new("b", Grant::MAX_SHARES, 1.0, 0, 1, date(2020, 1, 1)).unwrap(),
        ];
        let config = ReportConfig::new(1.0, date(2021, 1, 1));
        let report = evaluate_portfolio(&grants, &config).unwrap();
        assert_eq!(report.totals.vested_shares, 2 * Grant::MAX_SHARES);
    }

    #[test]
    fn oversized_grant_is_rejected_not_summed() {
        let mut grants = sample_grants();
        grants[0].shares = u64::MAX;
        let config = ReportConfig::new(5.0, date(2023, 3, 1));
        let err = evaluate_portfolio(&grants, &config).unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::InvalidGrant {
                source: vestlab_core::GrantError::TooManyShares(u64::MAX),
                ..
            }
        ));
    }

    #[test]
    fn full_schedules_ignore_as_of() {
        let schedules = full_schedules(&sample_grants(), 3.0, IntervalStep::CalendarMonth).unwrap();
        assert_eq!(schedules.len(), 3);
        assert_eq!(schedules[2].rows.last().unwrap().cumulative_shares, 100);
    }
}
