//! # pillar-time
//!
//! Date, period, day counter, schedule and interest-rate types.
//!
//! Dates are unadjusted: there are no holiday calendars or business-day
//! conventions, only the arithmetic rate helpers need to lay out their
//! accrual periods.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// `Date` type.
pub mod date;

/// Day-count conventions.
pub mod day_counter;

/// Payment / compounding frequency.
pub mod frequency;

/// Interest rates and compounding conversions.
pub mod interest_rate;

/// `Period` and `TimeUnit`.
pub mod period;

/// `Schedule`: an ordered sequence of accrual dates.
pub mod schedule;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use date::Date;
pub use day_counter::DayCounter;
pub use frequency::Frequency;
pub use interest_rate::InterestRate;
pub use period::{Period, TimeUnit};
pub use schedule::Schedule;
