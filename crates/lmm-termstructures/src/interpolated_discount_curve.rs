//! `InterpolatedDiscountCurve`: discount factors at pillar times,
//! interpolated log-linearly.
//!
//! Log-linear interpolation gives piecewise-constant instantaneous forwards;
//! beyond the last pillar the last forward is extended flat.

use crate::term_structure::TermStructure;
use crate::yield_term_structure::YieldTermStructure;
use lmm_core::{ensure, errors::Result, DiscountFactor, Real, Time};
use lmm_math::search::upper_bound;
use lmm_time::{Date, DayCounter};
use std::sync::Arc;

/// Discount curve with log-linear interpolation.
#[derive(Debug, Clone)]
pub struct InterpolatedDiscountCurve {
    reference_date: Date,
    day_counter: Arc<dyn DayCounter>,
    times: Vec<Time>,
    log_discounts: Vec<Real>,
}

impl InterpolatedDiscountCurve {
    /// Build from pillar dates; the first date must be the reference date
    /// with a discount factor of one.
    pub fn new(
        dates: &[Date],
        discounts: &[DiscountFactor],
        day_counter: Arc<dyn DayCounter>,
    ) -> Result<Self> {
        ensure!(dates.len() >= 2, "need the reference date and at least one pillar");
        let reference_date = dates[0];
        let times: Vec<Time> = dates
            .iter()
            .map(|&d| day_counter.year_fraction(reference_date, d))
            .collect();
        Self::from_times(reference_date, &times, discounts, day_counter)
    }

    /// Build from pillar times measured from `reference_date`; `times[0]`
    /// must be zero.
    pub fn from_times(
        reference_date: Date,
        times: &[Time],
        discounts: &[DiscountFactor],
        day_counter: Arc<dyn DayCounter>,
    ) -> Result<Self> {
        ensure!(times.len() >= 2, "need at least two pillars");
        ensure!(
            times.len() == discounts.len(),
            "{} times but {} discount factors",
            times.len(),
            discounts.len()
        );
        ensure!(times[0] == 0.0, "first pillar must be at time zero");
        ensure!((discounts[0] - 1.0).abs() < 1e-12, "first discount factor must be 1");
        ensure!(
            times.windows(2).all(|w| w[1] > w[0]),
            "pillar times must be strictly increasing"
        );
        ensure!(discounts.iter().all(|&d| d > 0.0), "discount factors must be positive");
        Ok(Self {
            reference_date,
            day_counter,
            times: times.to_vec(),
            log_discounts: discounts.iter().map(|d| d.ln()).collect(),
        })
    }

    /// Pillar times.
    pub fn times(&self) -> &[Time] {
        &self.times
    }
}

impl TermStructure for InterpolatedDiscountCurve {
    fn reference_date(&self) -> Date {
        self.reference_date
    }

    fn day_counter(&self) -> &dyn DayCounter {
        &*self.day_counter
    }
}

impl YieldTermStructure for InterpolatedDiscountCurve {
    fn discount_impl(&self, t: Time) -> DiscountFactor {
        let n = self.times.len();
        let i = upper_bound(&self.times, t).clamp(1, n - 1);
        let (t0, t1) = (self.times[i - 1], self.times[i]);
        let (l0, l1) = (self.log_discounts[i - 1], self.log_discounts[i]);
        (l0 + (l1 - l0) * (t - t0) / (t1 - t0)).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use lmm_time::Actual365Fixed;

    fn curve() -> InterpolatedDiscountCurve {
        let today = Date::from_ymd_opt(2024, 1, 15).unwrap();
        InterpolatedDiscountCurve::from_times(
            today,
            &[0.0, 1.0, 2.0],
            &[1.0, 0.96, 0.91],
            Arc::new(Actual365Fixed),
        )
        .unwrap()
    }

    #[test]
    fn reproduces_pillars() {
        let c = curve();
        assert_abs_diff_eq!(c.discount(1.0), 0.96, epsilon = 1e-15);
        assert_abs_diff_eq!(c.discount(2.0), 0.91, epsilon = 1e-15);
    }

    #[test]
    fn log_linear_between_and_beyond() {
        let c = curve();
        assert_abs_diff_eq!(c.discount(1.5), (0.96_f64 * 0.91).sqrt(), epsilon = 1e-15);
        // flat forward extrapolation
        assert_abs_diff_eq!(c.discount(3.0), 0.91 * 0.91 / 0.96, epsilon = 1e-14);
    }

    #[test]
    fn rejects_bad_pillars() {
        let today = Date::from_ymd_opt(2024, 1, 15).unwrap();
        let dc: Arc<dyn DayCounter> = Arc::new(Actual365Fixed);
        assert!(InterpolatedDiscountCurve::from_times(today, &[0.0, 1.0], &[0.99, 0.96], dc.clone()).is_err());
        assert!(InterpolatedDiscountCurve::from_times(today, &[0.0, 1.0, 1.0], &[1.0, 0.96, 0.95], dc.clone()).is_err());
        assert!(InterpolatedDiscountCurve::from_times(today, &[0.0, 1.0], &[1.0, -0.96], dc).is_err());
    }
}
