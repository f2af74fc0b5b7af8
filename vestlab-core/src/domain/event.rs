//! VestingEvent — one tranche of a grant's schedule.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Shares that vest on a single date.
///
/// `vested_shares` is incremental: the shares added on `date`, not the running
/// total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VestingEvent {
    pub date: NaiveDate,
    pub vested_shares: u64,
}

impl VestingEvent {
    pub fn new(date: NaiveDate, vested_shares: u64) -> Self {
        Self {
            date,
            vested_shares,
        }
    }
}

/// Sum of every tranche in a schedule.
pub fn total_vested(schedule: &[VestingEvent]) -> u64 {
    schedule.iter().map(|e| e.vested_shares).sum()
}

/// Date of the last tranche, i.e. the full-vesting date.
pub fn final_vesting_date(schedule: &[VestingEvent]) -> Option<NaiveDate> {
    schedule.last().map(|e| e.date)
}

/// True if dates never decrease along the schedule.
pub fn is_chronological(schedule: &[VestingEvent]) -> bool {
    schedule.windows(2).all(|w| w[0].date <= w[1].date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(m: u32, shares: u64) -> VestingEvent {
        VestingEvent::new(NaiveDate::from_ymd_opt(2021, m, 1).unwrap(), shares)
    }

    #[test]
    fn totals_and_final_date() {
        let schedule = vec![event(1, 300), event(2, 25), event(3, 25)];
        assert_eq!(total_vested(&schedule), 350);
        assert_eq!(
            final_vesting_date(&schedule),
            NaiveDate::from_ymd_opt(2021, 3, 1)
        );
    }

    #[test]
    fn empty_schedule() {
        assert_eq!(total_vested(&[]), 0);
        assert_eq!(final_vesting_date(&[]), None);
        assert!(is_chronological(&[]));
    }

    #[test]
    fn detects_out_of_order_schedule() {
        assert!(is_chronological(&[event(1, 1), event(1, 1), event(2, 1)]));
        assert!(!is_chronological(&[event(2, 1), event(1, 1)]));
    }
}
