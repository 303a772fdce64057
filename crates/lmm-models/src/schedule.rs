//! Fixing and accrual schedule of a strip of forward rates.

use lmm_core::{ensure, errors::Result, Rate, Real, Time};
use lmm_math::search::upper_bound;
use lmm_termstructures::YieldTermStructure;
use lmm_time::{AccrualPeriod, DayCounter};
use std::sync::Arc;

/// Parallel arrays of fixing, accrual start and end times, accrual
/// fractions and the curve-implied initial forwards.
///
/// Built once and never mutated.
#[derive(Debug, Clone)]
pub struct ForwardRateSchedule {
    fixing_times: Vec<Time>,
    accrual_start_times: Vec<Time>,
    accrual_end_times: Vec<Time>,
    accrual_periods: Vec<Time>,
    initial_forwards: Vec<Rate>,
    curve: Arc<dyn YieldTermStructure>,
}

impl ForwardRateSchedule {
    /// Schedule of `periods` on `curve`.
    ///
    /// Dates are turned into times with the curve's day counter; accrual
    /// fractions use `accrual_day_counter`.
    pub fn new(
        periods: &[AccrualPeriod],
        accrual_day_counter: &dyn DayCounter,
        curve: Arc<dyn YieldTermStructure>,
    ) -> Result<Self> {
        let fixing = periods.iter().map(|p| curve.time_from_reference(p.fixing_date)).collect();
        let start = periods.iter().map(|p| curve.time_from_reference(p.accrual_start)).collect();
        let end = periods.iter().map(|p| curve.time_from_reference(p.accrual_end)).collect();
        let accrual = periods
            .iter()
            .map(|p| accrual_day_counter.year_fraction(p.accrual_start, p.accrual_end))
            .collect();
        Self::from_times(fixing, start, end, accrual, curve)
    }

    /// Schedule given directly in times.
    pub fn from_times(
        fixing_times: Vec<Time>,
        accrual_start_times: Vec<Time>,
        accrual_end_times: Vec<Time>,
        accrual_periods: Vec<Time>,
        curve: Arc<dyn YieldTermStructure>,
    ) -> Result<Self> {
        let n = fixing_times.len();
        ensure!(n > 0, "schedule must contain at least one period");
        ensure!(
            accrual_start_times.len() == n && accrual_end_times.len() == n && accrual_periods.len() == n,
            "schedule arrays differ in length"
        );
        ensure!(fixing_times[0] >= 0.0, "first fixing time {} is in the past", fixing_times[0]);
        ensure!(
            fixing_times.windows(2).all(|w| w[1] > w[0]),
            "fixing times must be strictly increasing"
        );
        for i in 0..n {
            ensure!(
                accrual_end_times[i] > accrual_start_times[i],
                "accrual period {i} ends at {} before it starts at {}",
                accrual_end_times[i],
                accrual_start_times[i]
            );
            ensure!(accrual_periods[i] > 0.0, "accrual fraction {i} must be positive");
        }
        let initial_forwards = (0..n)
            .map(|i| {
                curve.simple_forward_rate(accrual_start_times[i], accrual_end_times[i], accrual_periods[i])
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            fixing_times,
            accrual_start_times,
            accrual_end_times,
            accrual_periods,
            initial_forwards,
            curve,
        })
    }

    /// Number of forward rates.
    pub fn size(&self) -> usize {
        self.fixing_times.len()
    }

    /// Fixing times.
    pub fn fixing_times(&self) -> &[Time] {
        &self.fixing_times
    }

    /// Accrual start times.
    pub fn accrual_start_times(&self) -> &[Time] {
        &self.accrual_start_times
    }

    /// Accrual end (payment) times.
    pub fn accrual_end_times(&self) -> &[Time] {
        &self.accrual_end_times
    }

    /// Accrual fractions `τ_i`.
    pub fn accrual_periods(&self) -> &[Time] {
        &self.accrual_periods
    }

    /// Curve-implied forwards `(P(start)/P(end) − 1)/τ`.
    pub fn initial_forwards(&self) -> &[Rate] {
        &self.initial_forwards
    }

    /// Discount curve the schedule was seeded from.
    pub fn curve(&self) -> &Arc<dyn YieldTermStructure> {
        &self.curve
    }

    /// Index of the first rate whose fixing is after `t`, clamped to the
    /// last rate.
    pub fn next_index_reset(&self, t: Time) -> usize {
        upper_bound(&self.fixing_times, t).min(self.size() - 1)
    }

    /// Accrual weights `τ_i x_i / (1 + τ_i x_i)` of a forward vector.
    pub(crate) fn accrual_weights(&self, x: &[Real]) -> Vec<Real> {
        self.accrual_periods
            .iter()
            .zip(x)
            .map(|(tau, r)| tau * r / (1.0 + tau * r))
            .collect()
    }
}
