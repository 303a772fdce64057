//! `TermStructure`: a curve anchored at a reference date.

use lmm_core::Time;
use lmm_time::{Date, DayCounter};

/// Base trait for dated curves.
pub trait TermStructure: std::fmt::Debug + Send + Sync {
    /// Date at which time is zero.
    fn reference_date(&self) -> Date;

    /// Convention turning dates into times.
    fn day_counter(&self) -> &dyn DayCounter;

    /// Year fraction from the reference date to `date`.
    fn time_from_reference(&self, date: Date) -> Time {
        self.day_counter().year_fraction(self.reference_date(), date)
    }
}
