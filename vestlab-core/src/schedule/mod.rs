//! Schedule generation — turns one grant into its ordered vesting tranches.
//!
//! A grant with a cliff produces one catch-up tranche on the cliff date
//! covering every month up to and including the cliff, followed by one
//! tranche per remaining month. The last monthly tranche absorbs the shares
//! lost to integer division, so a schedule always sums to the grant's share
//! count exactly.

pub mod interval;

pub use interval::{add_months, IntervalStep};

use thiserror::Error;

use crate::domain::{Grant, GrantError, VestingEvent};

/// Errors from schedule generation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    #[error("invalid grant '{name}': {source}")]
    InvalidGrant {
        name: String,
        #[source]
        source: GrantError,
    },

    #[error("vesting date for grant '{name}' at month {month} is outside the supported date range")]
    DateOutOfRange { name: String, month: u32 },
}

/// Generate the vesting schedule for `grant`.
///
/// The cliff tranche is dated with calendar-month arithmetic; monthly
/// tranches use `step`. A grant whose cliff is at least as long as its
/// vesting period vests in full on the cliff date.
///
/// The result is sorted by date (stable, so same-day tranches keep their
/// generation order). The as-of evaluator depends on that ordering.
pub fn generate_schedule(
    grant: &Grant,
    step: IntervalStep,
) -> Result<Vec<VestingEvent>, ScheduleError> {
    grant
        .validate()
        .map_err(|source| ScheduleError::InvalidGrant {
            name: grant.name.clone(),
            source,
        })?;

    let per_interval = grant.shares_per_interval();
    // `validate` caps vesting_months, so this reservation stays small.
    let mut schedule = Vec::with_capacity(grant.vesting_months as usize + 1);
    let mut accumulated: u64 = 0;

    if grant.cliff_months > 0 {
        let cliff_date = add_months(grant.grant_date, grant.cliff_months)
            .ok_or_else(|| out_of_range(grant, grant.cliff_months))?;
        let cliff_shares = if grant.vests_at_cliff() {
            grant.shares
        } else {
            u64::from(grant.cliff_months) * per_interval
        };
        accumulated = cliff_shares;
        schedule.push(VestingEvent::new(cliff_date, cliff_shares));
    }

    if !grant.vests_at_cliff() {
        for month in (grant.cliff_months + 1)..=grant.vesting_months {
            let date = step
                .advance(grant.grant_date, month)
                .ok_or_else(|| out_of_range(grant, month))?;
            let vested = if month == grant.vesting_months {
                grant.shares - accumulated
            } else {
                per_interval
            };
            accumulated += vested;
            schedule.push(VestingEvent::new(date, vested));
        }
    }

    // Fixed-day steps run behind the calendar, so a long cliff can land after
    // the first monthly tranche.
    schedule.sort_by_key(|event| event.date);

    Ok(schedule)
}

fn out_of_range(grant: &Grant, month: u32) -> ScheduleError {
    ScheduleError::DateOutOfRange {
        name: grant.name.clone(),
        month,
    }
}
