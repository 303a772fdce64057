//! `DayCounter` trait and built-in day-count conventions.
//!
//! A day counter computes the **year fraction** between two dates, which the
//! forward-rate schedule uses for fixing times and accrual periods.

use crate::Date;
use chrono::Datelike;
use lmm_core::{Real, Time};

/// A convention for counting the fraction of a year between two dates.
pub trait DayCounter: std::fmt::Debug + Send + Sync {
    /// Human-readable name of this convention (e.g. `"Actual/365 (Fixed)"`).
    fn name(&self) -> &str;

    /// Number of days between `d1` and `d2` according to this convention.
    fn day_count(&self, d1: Date, d2: Date) -> i64;

    /// Fraction of a year between `d1` and `d2`.
    fn year_fraction(&self, d1: Date, d2: Date) -> Time;
}

/// Actual/365 (Fixed) day counter.
///
/// `year_fraction = actual_days / 365`
#[derive(Debug, Clone, Copy, Default)]
pub struct Actual365Fixed;

impl DayCounter for Actual365Fixed {
    fn name(&self) -> &str {
        "Actual/365 (Fixed)"
    }

    fn day_count(&self, d1: Date, d2: Date) -> i64 {
        (d2 - d1).num_days()
    }

    fn year_fraction(&self, d1: Date, d2: Date) -> Time {
        self.day_count(d1, d2) as Real / 365.0
    }
}

/// Actual/360 day counter, the usual money-market accrual basis.
#[derive(Debug, Clone, Copy, Default)]
pub struct Actual360;

impl DayCounter for Actual360 {
    fn name(&self) -> &str {
        "Actual/360"
    }

    fn day_count(&self, d1: Date, d2: Date) -> i64 {
        (d2 - d1).num_days()
    }

    fn year_fraction(&self, d1: Date, d2: Date) -> Time {
        self.day_count(d1, d2) as Real / 360.0
    }
}

/// 30/360 (US bond basis) day counter.
#[derive(Debug, Clone, Copy, Default)]
pub struct Thirty360;

impl DayCounter for Thirty360 {
    fn name(&self) -> &str {
        "30/360"
    }

    fn day_count(&self, d1: Date, d2: Date) -> i64 {
        let (y1, m1) = (i64::from(d1.year()), i64::from(d1.month()));
        let (y2, m2) = (i64::from(d2.year()), i64::from(d2.month()));
        let mut dd1 = i64::from(d1.day());
        let mut dd2 = i64::from(d2.day());

        if dd1 == 31 {
            dd1 = 30;
        }
        if dd2 == 31 && dd1 == 30 {
            dd2 = 30;
        }
        360 * (y2 - y1) + 30 * (m2 - m1) + (dd2 - dd1)
    }

    fn year_fraction(&self, d1: Date, d2: Date) -> Time {
        self.day_count(d1, d2) as Real / 360.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn actual_conventions() {
        let d1 = date(2024, 1, 15);
        let d2 = date(2024, 7, 15);
        assert_eq!(Actual360.day_count(d1, d2), 182);
        assert_abs_diff_eq!(Actual360.year_fraction(d1, d2), 182.0 / 360.0);
        assert_abs_diff_eq!(Actual365Fixed.year_fraction(d1, d2), 182.0 / 365.0);
        assert_abs_diff_eq!(Actual365Fixed.year_fraction(d2, d1), -182.0 / 365.0);
    }

    #[test]
    fn thirty_360_month_ends() {
        assert_eq!(Thirty360.day_count(date(2024, 1, 31), date(2024, 2, 28)), 28);
        assert_eq!(Thirty360.day_count(date(2024, 1, 30), date(2024, 3, 31)), 60);
        assert_eq!(Thirty360.day_count(date(2024, 1, 15), date(2025, 1, 15)), 360);
        assert_abs_diff_eq!(
            Thirty360.year_fraction(date(2024, 3, 15), date(2024, 9, 15)),
            0.5
        );
    }
}
