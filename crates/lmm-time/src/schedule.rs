//! Accrual-period schedules for a strip of forward rates.
//!
//! The builder rolls a start date forward by a fixed tenor, adjusts every
//! boundary on the calendar and derives each period's fixing date by moving
//! back `fixing_days` business days from the accrual start.

use crate::calendar::{BusinessDayConvention, Calendar};
use crate::Date;
use chrono::Months;
use lmm_core::{ensure, errors::Result, Error};

/// One accrual period of a floating leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccrualPeriod {
    /// Date on which the period's rate is observed.
    pub fixing_date: Date,
    /// First day of accrual.
    pub accrual_start: Date,
    /// Last day of accrual (payment date).
    pub accrual_end: Date,
}

/// Builds a strip of consecutive [`AccrualPeriod`]s.
///
/// ```
/// use lmm_time::{ScheduleBuilder, WeekendsOnly, Date};
///
/// let start = Date::from_ymd_opt(2024, 1, 17).unwrap();
/// let periods = ScheduleBuilder::new(start, 6, 4, &WeekendsOnly)
///     .with_fixing_days(2)
///     .build()
///     .unwrap();
/// assert_eq!(periods.len(), 4);
/// assert_eq!(periods[0].fixing_date, Date::from_ymd_opt(2024, 1, 15).unwrap());
/// ```
#[derive(Debug)]
pub struct ScheduleBuilder<'a> {
    start: Date,
    tenor_months: u32,
    periods: usize,
    calendar: &'a dyn Calendar,
    convention: BusinessDayConvention,
    fixing_days: u32,
}

impl<'a> ScheduleBuilder<'a> {
    /// A schedule of `periods` periods of `tenor_months` each, starting on
    /// `start`.
    pub fn new(start: Date, tenor_months: u32, periods: usize, calendar: &'a dyn Calendar) -> Self {
        Self {
            start,
            tenor_months,
            periods,
            calendar,
            convention: BusinessDayConvention::ModifiedFollowing,
            fixing_days: 0,
        }
    }

    /// Business-day convention applied to period boundaries.
    pub fn with_convention(mut self, convention: BusinessDayConvention) -> Self {
        self.convention = convention;
        self
    }

    /// Number of business days between fixing and accrual start.
    pub fn with_fixing_days(mut self, days: u32) -> Self {
        self.fixing_days = days;
        self
    }

    /// Generate the periods.
    pub fn build(&self) -> Result<Vec<AccrualPeriod>> {
        ensure!(self.periods > 0, "schedule needs at least one period");
        ensure!(self.tenor_months > 0, "tenor must be at least one month");

        let mut boundaries = Vec::with_capacity(self.periods + 1);
        for k in 0..=self.periods {
            let months = u32::try_from(k)
                .ok()
                .and_then(|k| k.checked_mul(self.tenor_months))
                .ok_or_else(|| Error::Configuration("schedule too long".into()))?;
            let unadjusted = self
                .start
                .checked_add_months(Months::new(months))
                .ok_or_else(|| {
                    Error::Configuration(format!("date overflow rolling {} by {months}M", self.start))
                })?;
            boundaries.push(self.calendar.adjust(unadjusted, self.convention));
        }

        let lag = i32::try_from(self.fixing_days)
            .map_err(|_| Error::Configuration("fixing lag too large".into()))?;
        let periods = boundaries
            .windows(2)
            .map(|w| AccrualPeriod {
                fixing_date: self.calendar.advance_business_days(w[0], -lag),
                accrual_start: w[0],
                accrual_end: w[1],
            })
            .collect::<Vec<_>>();

        ensure!(
            periods.iter().all(|p| p.accrual_end > p.accrual_start),
            "degenerate accrual period after business-day adjustment"
        );
        Ok(periods)
    }
}
