//! VestLab Core — grant domain types, schedule generation, as-of evaluation.
//!
//! This crate contains the vesting engine:
//! - Domain types (grants, vesting tranches)
//! - Schedule generation with cliff catch-up and remainder absorption
//! - Configurable interval step (calendar month or fixed day span)
//! - As-of evaluation of vested shares and floored paper value
//! - Full-history schedule rendering with running totals
//!
//! Everything here is pure and synchronous; I/O lives in `vestlab-runner`.

pub mod domain;
pub mod evaluator;
pub mod schedule;

pub use domain::{Grant, GrantError, VestingEvent, DATE_FORMAT};
pub use evaluator::{
    accumulated_value, evaluate_as_of, render_full_schedule, AsOfStatus, ScheduleRow,
};
pub use schedule::{generate_schedule, IntervalStep, ScheduleError};
