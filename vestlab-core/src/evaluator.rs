//! As-of evaluation — vested shares and paper value at a point in time.
//!
//! Both operations walk a schedule produced by
//! [`generate_schedule`](crate::schedule::generate_schedule), which is sorted
//! by date. `evaluate_as_of` stops at the first tranche after the as-of date,
//! so feeding it an unsorted schedule silently undercounts.

use std::iter::Sum;
use std::ops::Add;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{is_chronological, VestingEvent};

/// Value of `vested_shares` at the exercise price, floored at zero.
///
/// An underwater option is simply not exercised, so it is worth nothing
/// rather than a negative amount.
pub fn accumulated_value(vested_shares: u64, strike_price: f64, exercise_value: f64) -> f64 {
    let value = vested_shares as f64 * (exercise_value - strike_price);
    if value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Cumulative vesting position of one grant as of a date.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AsOfStatus {
    pub vested_shares: u64,
    pub accumulated_value: f64,
    /// Date of the last tranche on or before the as-of date; `None` if nothing
    /// had vested yet.
    pub last_vesting_date: Option<NaiveDate>,
}

impl AsOfStatus {
    pub fn has_vested(&self) -> bool {
        self.last_vesting_date.is_some()
    }
}

/// Portfolio reduction: shares and value add; the last-vesting date is
/// per-grant and is not carried into the sum.
impl Add for AsOfStatus {
    type Output = AsOfStatus;

    fn add(self, rhs: AsOfStatus) -> AsOfStatus {
        AsOfStatus {
            vested_shares: self.vested_shares + rhs.vested_shares,
            accumulated_value: self.accumulated_value + rhs.accumulated_value,
            last_vesting_date: None,
        }
    }
}

impl Sum for AsOfStatus {
    fn sum<I: Iterator<Item = AsOfStatus>>(iter: I) -> Self {
        iter.fold(AsOfStatus::default(), Add::add)
    }
}

impl<'a> Sum<&'a AsOfStatus> for AsOfStatus {
    fn sum<I: Iterator<Item = &'a AsOfStatus>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Shares vested on or before `as_of` and their value at `exercise_value`.
pub fn evaluate_as_of(
    schedule: &[VestingEvent],
    strike_price: f64,
    exercise_value: f64,
    as_of: NaiveDate,
) -> AsOfStatus {
    debug_assert!(is_chronological(schedule), "schedule must be sorted by date");

    let mut vested_shares: u64 = 0;
    let mut last_vesting_date = None;

    for event in schedule {
        if event.date > as_of {
            break;
        }
        vested_shares += event.vested_shares;
        last_vesting_date = Some(event.date);
    }

    if last_vesting_date.is_none() {
        return AsOfStatus::default();
    }

    AsOfStatus {
        vested_shares,
        accumulated_value: accumulated_value(vested_shares, strike_price, exercise_value),
        last_vesting_date,
    }
}

/// One line of a full-history schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub date: NaiveDate,
    /// Shares vesting on this date.
    pub vested_shares: u64,
    /// Running total including this tranche.
    pub cumulative_shares: u64,
    /// Value of `cumulative_shares`, floored at zero.
    pub accumulated_value: f64,
}

/// Every tranche with its running share total and value; no date cutoff.
pub fn render_full_schedule(
    schedule: &[VestingEvent],
    strike_price: f64,
    exercise_value: f64,
) -> Vec<ScheduleRow> {
    let mut cumulative_shares: u64 = 0;
    schedule
        .iter()
        .map(|event| {
            cumulative_shares += event.vested_shares;
            ScheduleRow {
                date: event.date,
                vested_shares: event.vested_shares,
                cumulative_shares,
                accumulated_value: accumulated_value(
                    cumulative_shares,
                    strike_price,
                    exercise_value,
                ),
            }
        })
        .collect()
}
