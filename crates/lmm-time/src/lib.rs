//! # lmm-time
//!
//! Date services consumed by the LIBOR market model: day-count conventions,
//! business-day calendars and the accrual-period schedule builder.
//!
//! Dates are `chrono::NaiveDate`; this crate only layers the financial
//! conventions on top.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Calendars and business-day adjustment.
pub mod calendar;

/// Day-count conventions.
pub mod day_counter;

/// Accrual-period schedules.
pub mod schedule;

/// Calendar date type.
pub type Date = chrono::NaiveDate;

pub use calendar::{BusinessDayConvention, Calendar, NullCalendar, WeekendsOnly};
pub use day_counter::{Actual360, Actual365Fixed, DayCounter, Thirty360};
pub use schedule::{AccrualPeriod, ScheduleBuilder};
