//! Domain types for VestLab

pub mod event;
pub mod grant;

pub use event::{final_vesting_date, is_chronological, total_vested, VestingEvent};
pub use grant::{Grant, GrantError};

/// Date format used for every textual date, in and out.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
