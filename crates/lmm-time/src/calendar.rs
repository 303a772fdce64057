//! `Calendar` trait and concrete calendar implementations.
//!
//! A calendar knows which dates are business days and can adjust dates
//! according to a [`BusinessDayConvention`]. Holiday tables are out of scope;
//! callers needing them implement [`Calendar`] themselves.

use crate::Date;
use chrono::{Datelike, Days, Weekday};

/// Rule for rolling a date that falls on a non-business day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BusinessDayConvention {
    /// Leave the date as is.
    Unadjusted,
    /// First business day after the date.
    Following,
    /// Following, unless that crosses into the next month, then Preceding.
    #[default]
    ModifiedFollowing,
    /// Last business day before the date.
    Preceding,
}

/// A financial calendar.
pub trait Calendar: std::fmt::Debug + Send + Sync {
    /// Human-readable name.
    fn name(&self) -> &str;

    /// Return `true` if `date` is a business day in this calendar.
    fn is_business_day(&self, date: Date) -> bool;

    /// Return `true` if `date` is a holiday (non-business) day.
    fn is_holiday(&self, date: Date) -> bool {
        !self.is_business_day(date)
    }

    /// Adjust `date` according to the given business-day convention.
    fn adjust(&self, date: Date, convention: BusinessDayConvention) -> Date {
        match convention {
            BusinessDayConvention::Unadjusted => date,
            BusinessDayConvention::Following => roll(self, date, true),
            BusinessDayConvention::ModifiedFollowing => {
                let adjusted = roll(self, date, true);
                if adjusted.month() != date.month() {
                    roll(self, date, false)
                } else {
                    adjusted
                }
            }
            BusinessDayConvention::Preceding => roll(self, date, false),
        }
    }

    /// Advance `date` by `n` business days (backwards for negative `n`).
    fn advance_business_days(&self, date: Date, n: i32) -> Date {
        let forward = n >= 0;
        let mut remaining = n.unsigned_abs();
        let mut d = date;
        while remaining > 0 {
            d = step(d, forward);
            if self.is_business_day(d) {
                remaining -= 1;
            }
        }
        d
    }
}

fn step(date: Date, forward: bool) -> Date {
    let next = if forward {
        date.checked_add_days(Days::new(1))
    } else {
        date.checked_sub_days(Days::new(1))
    };
    next.unwrap_or(date)
}

fn roll<C: Calendar + ?Sized>(calendar: &C, mut date: Date, forward: bool) -> Date {
    while calendar.is_holiday(date) {
        let next = step(date, forward);
        if next == date {
            break;
        }
        date = next;
    }
    date
}

/// Treats every day as a business day.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCalendar;

impl Calendar for NullCalendar {
    fn name(&self) -> &str {
        "Null"
    }

    fn is_business_day(&self, _date: Date) -> bool {
        true
    }
}

/// A calendar that treats only Saturdays and Sundays as non-business days.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeekendsOnly;

impl Calendar for WeekendsOnly {
    fn name(&self) -> &str {
        "Weekends Only"
    }

    fn is_business_day(&self, date: Date) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn null_calendar_always_business() {
        let cal = NullCalendar;
        assert!(cal.is_business_day(date(2023, 12, 25)));
        assert!(cal.is_business_day(date(2023, 9, 2)));
    }

    #[test]
    fn weekends_only_adjustments() {
        let cal = WeekendsOnly;
        // 2023-09-02 is a Saturday
        let sat = date(2023, 9, 2);
        assert!(!cal.is_business_day(sat));
        assert_eq!(cal.adjust(sat, BusinessDayConvention::Following), date(2023, 9, 4));
        assert_eq!(cal.adjust(sat, BusinessDayConvention::Preceding), date(2023, 9, 1));
        assert_eq!(cal.adjust(sat, BusinessDayConvention::Unadjusted), sat);
    }

    #[test]
    fn modified_following_stays_in_month() {
        // 2023-09-30 is a Saturday; Following would roll into October.
        let cal = WeekendsOnly;
        let d = date(2023, 9, 30);
        assert_eq!(
            cal.adjust(d, BusinessDayConvention::ModifiedFollowing),
            date(2023, 9, 29)
        );
    }

    #[test]
    fn advance_skips_weekends() {
        let cal = WeekendsOnly;
        // Monday 2023-09-04 minus two business days is Thursday 2023-08-31.
        assert_eq!(cal.advance_business_days(date(2023, 9, 4), -2), date(2023, 8, 31));
        assert_eq!(cal.advance_business_days(date(2023, 9, 1), 1), date(2023, 9, 4));
        assert_eq!(cal.advance_business_days(date(2023, 9, 1), 0), date(2023, 9, 1));
    }
}
