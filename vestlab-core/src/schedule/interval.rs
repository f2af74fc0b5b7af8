//! Interval step — how far apart consecutive vesting tranches fall.

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Date arithmetic used for the monthly tranches after the cliff.
///
/// The cliff itself always lands on a true calendar month; only the interval
/// tranches are affected by this choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IntervalStep {
    /// Tranche `i` falls on the grant date plus `i` calendar months. Days past
    /// the end of a shorter month clamp to its last day (Jan 31 -> Feb 29).
    #[default]
    CalendarMonth,

    /// Tranche `i` falls on the grant date plus `i * days` days. With 30 days
    /// this drifts earlier than the calendar (month 12 is day 360).
    FixedDays { days: u32 },
}

impl IntervalStep {
    /// Day count of the drifting fixed-span month some payroll tools use.
    pub const LEGACY_FIXED_DAYS: u32 = 30;

    /// The fixed 30-day step, for parity with schedules produced that way.
    pub fn legacy() -> Self {
        Self::FixedDays {
            days: Self::LEGACY_FIXED_DAYS,
        }
    }

    /// Date of the `n`th interval counted from `start`.
    ///
    /// Always computed from `start` rather than chained from the previous
    /// tranche, so calendar clamping never accumulates. `None` when the
    /// result is outside chrono's representable range.
    pub fn advance(&self, start: NaiveDate, n: u32) -> Option<NaiveDate> {
        match *self {
            Self::CalendarMonth => add_months(start, n),
            Self::FixedDays { days } => {
                start.checked_add_days(Days::new(u64::from(days) * u64::from(n)))
            }
        }
    }
}

/// Whole calendar months added to `start`, clamped to the end of the month.
pub fn add_months(start: NaiveDate, months: u32) -> Option<NaiveDate> {
    start.checked_add_months(Months::new(months))
}
