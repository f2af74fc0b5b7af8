//! Grant — a single stock option award.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a grant record cannot be scheduled.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GrantError {
    #[error("vesting months must be positive (got {0})")]
    NonPositiveVestingMonths(u32),

    #[error("share count must be positive")]
    ZeroShares,

    #[error("share count {0} exceeds the maximum of {max}", max = Grant::MAX_SHARES)]
    TooManyShares(u64),

    #[error("vesting period of {0} months exceeds the maximum of {max}", max = Grant::MAX_VESTING_MONTHS)]
    VestingTooLong(u32),

    #[error("strike price must be a finite, non-negative number (got {0})")]
    InvalidStrikePrice(f64),
}

/// A stock option grant, read-only once constructed.
///
/// Names are labels only; two grants may share a name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grant {
    pub name: String,
    pub shares: u64,
    pub strike_price: f64,
    pub cliff_months: u32,
    pub vesting_months: u32,
    pub grant_date: NaiveDate,
}

impl Grant {
    /// Largest share count a single grant may carry. Portfolio totals are
    /// plain `u64` sums, which this keeps far from overflow.
    pub const MAX_SHARES: u64 = u32::MAX as u64;

    /// Longest vesting period accepted (100 years). Bounds the number of
    /// tranches a schedule holds.
    pub const MAX_VESTING_MONTHS: u32 = 1200;

    /// Construct a validated grant.
    pub fn new(
        name: impl Into<String>,
        shares: u64,
        strike_price: f64,
        cliff_months: u32,
        vesting_months: u32,
        grant_date: NaiveDate,
    ) -> Result<Self, GrantError> {
        let grant = Self {
            name: name.into(),
            shares,
            strike_price,
            cliff_months,
            vesting_months,
            grant_date,
        };
        grant.validate()?;
        Ok(grant)
    }

    /// Check the preconditions schedule generation relies on.
    ///
    /// Grants built by struct literal or deserialized from JSON skip `new`,
    /// so the generator calls this again before dividing.
    pub fn validate(&self) -> Result<(), GrantError> {
        if self.vesting_months == 0 {
            return Err(GrantError::NonPositiveVestingMonths(self.vesting_months));
        }
        if self.vesting_months > Self::MAX_VESTING_MONTHS {
            return Err(GrantError::VestingTooLong(self.vesting_months));
        }
        if self.shares == 0 {
            return Err(GrantError::ZeroShares);
        }
        if self.shares > Self::MAX_SHARES {
            return Err(GrantError::TooManyShares(self.shares));
        }
        if !self.strike_price.is_finite() || self.strike_price < 0.0 {
            return Err(GrantError::InvalidStrikePrice(self.strike_price));
        }
        Ok(())
    }

    /// Shares attributed to each monthly interval before remainder handling.
    pub fn shares_per_interval(&self) -> u64 {
        self.shares / u64::from(self.vesting_months.max(1))
    }

    /// True when the cliff is at least as long as the whole vesting period,
    /// so the entire grant vests in the cliff tranche.
    pub fn vests_at_cliff(&self) -> bool {
        self.cliff_months >= self.vesting_months
    }

    /// Cliff longer than the vesting period. Permitted, but almost always a
    /// data-entry mistake.
    pub fn cliff_exceeds_vesting(&self) -> bool {
        self.cliff_months > self.vesting_months
    }
}
