//! Lognormal forward-rate dynamics under the spot measure.
//!
//! For every rate not yet reset (`k >= m`, `m` the next reset index)
//!
//! ```text
//! dx_k / x_k = μ_k dt + D_k · dW,
//! μ_k = Σ_{j=m}^{k} τ_j x_j / (1 + τ_j x_j) · C_jk − ½ C_kk
//! ```
//!
//! and rates that have already reset are frozen.

use crate::covariance::CovarianceParameterization;
use crate::schedule::ForwardRateSchedule;
use crate::stochastic_process::StochasticProcess;
use lmm_core::{ensure, errors::Result, DiscountFactor, Rate, Real, Time};
use lmm_math::Matrix;
use std::sync::Arc;

/// Forward-rate process driven by a covariance parameterization.
#[derive(Debug, Clone)]
pub struct LiborForwardProcess {
    schedule: ForwardRateSchedule,
    covariance: Arc<dyn CovarianceParameterization>,
}

impl LiborForwardProcess {
    /// Process on `schedule` with the given covariance.
    pub fn new(schedule: ForwardRateSchedule, covariance: Arc<dyn CovarianceParameterization>) -> Result<Self> {
        ensure!(
            covariance.size() == schedule.size(),
            "covariance describes {} rates, schedule has {}",
            covariance.size(),
            schedule.size()
        );
        Ok(Self { schedule, covariance })
    }

    /// Replace the covariance, e.g. after recalibration.
    pub fn set_covariance(&mut self, covariance: Arc<dyn CovarianceParameterization>) -> Result<()> {
        ensure!(
            covariance.size() == self.schedule.size(),
            "covariance describes {} rates, schedule has {}",
            covariance.size(),
            self.schedule.size()
        );
        self.covariance = covariance;
        Ok(())
    }

    /// Current covariance parameterization.
    pub fn covariance_parameterization(&self) -> &Arc<dyn CovarianceParameterization> {
        &self.covariance
    }

    /// Underlying schedule.
    pub fn schedule(&self) -> &ForwardRateSchedule {
        &self.schedule
    }

    /// Fixing times.
    pub fn fixing_times(&self) -> &[Time] {
        self.schedule.fixing_times()
    }

    /// Accrual start times.
    pub fn accrual_start_times(&self) -> &[Time] {
        self.schedule.accrual_start_times()
    }

    /// Accrual end times.
    pub fn accrual_end_times(&self) -> &[Time] {
        self.schedule.accrual_end_times()
    }

    /// Accrual fractions.
    pub fn accrual_periods(&self) -> &[Time] {
        self.schedule.accrual_periods()
    }

    /// First rate with a fixing after `t`, clamped to the last rate.
    pub fn next_index_reset(&self, t: Time) -> usize {
        self.schedule.next_index_reset(t)
    }

    /// `x0 · exp(dx)` component-wise.
    pub fn apply(&self, x0: &[Real], dx: &[Real]) -> Vec<Real> {
        x0.iter().zip(dx).map(|(x, d)| x * d.exp()).collect()
    }

    /// Path-wise discount factors `Π_{j<=i} 1/(1 + τ_j r_j)` to each
    /// accrual end.
    pub fn discount_bonds(&self, rates: &[Rate]) -> Result<Vec<DiscountFactor>> {
        ensure!(
            rates.len() == self.size(),
            "expected {} rates, got {}",
            self.size(),
            rates.len()
        );
        let mut df = 1.0;
        Ok(rates
            .iter()
            .zip(self.accrual_periods())
            .map(|(r, tau)| {
                df /= 1.0 + tau * r;
                df
            })
            .collect())
    }

    fn check_state(&self, x: &[Real]) -> Result<()> {
        ensure!(
            x.len() == self.size(),
            "state has {} rates, process has {}",
            x.len(),
            self.size()
        );
        Ok(())
    }

    /// `Σ_{j=m}^{k} w_j C_jk − ½ C_kk`.
    fn drift_term(weights: &[Real], covariance: &Matrix, m: usize, k: usize) -> Real {
        let carry: Real = (m..=k).map(|j| weights[j] * covariance[(j, k)]).sum();
        carry - 0.5 * covariance[(k, k)]
    }
}

impl StochasticProcess for LiborForwardProcess {
    fn size(&self) -> usize {
        self.schedule.size()
    }

    fn factors(&self) -> usize {
        self.covariance.factors()
    }

    fn initial_values(&self) -> Vec<Real> {
        self.schedule.initial_forwards().to_vec()
    }

    fn drift(&self, t: Time, x: &[Real]) -> Result<Vec<Real>> {
        self.check_state(x)?;
        let covariance = self.covariance.covariance(t, x)?;
        let m = self.next_index_reset(t);
        let weights = self.schedule.accrual_weights(x);
        Ok((0..self.size())
            .map(|k| if k >= m { Self::drift_term(&weights, &covariance, m, k) } else { 0.0 })
            .collect())
    }

    fn diffusion(&self, t: Time, x: &[Real]) -> Result<Matrix> {
        self.covariance.diffusion(t, x)
    }

    fn expectation(&self, t: Time, x: &[Real], dt: Time) -> Result<Vec<Real>> {
        let mu = self.drift(t, x)?;
        let dx: Vec<Real> = mu.iter().map(|m| m * dt).collect();
        Ok(self.apply(x, &dx))
    }

    /// Predictor-corrector step: the drift is averaged between the start
    /// state and the state predicted with the start drift, with the same
    /// Brownian increment.
    fn evolve(&self, t: Time, x: &[Real], dt: Time, dw: &[Real]) -> Result<Vec<Real>> {
        self.check_state(x)?;
        ensure!(
            dw.len() == self.factors(),
            "expected {} Brownian increments, got {}",
            self.factors(),
            dw.len()
        );
        let n = self.size();
        let m = self.next_index_reset(t);
        let sqrt_dt = dt.sqrt();
        let tau = self.accrual_periods();
        let diffusion = self.covariance.diffusion(t, x)?;
        let covariance = self.covariance.covariance(t, x)?;

        let mut start = vec![0.0; n];
        let mut predicted = vec![0.0; n];
        let mut result = x.to_vec();
        for k in m..n {
            let y = tau[k] * x[k];
            start[k] = y / (1.0 + y);
            let d = Self::drift_term(&start, &covariance, m, k) * dt;
            let r = diffusion.row_dot_vec(k, dw) * sqrt_dt;
            let y_predicted = y * (d + r).exp();
            predicted[k] = y_predicted / (1.0 + y_predicted);
            let d_predicted = Self::drift_term(&predicted, &covariance, m, k) * dt;
            result[k] = x[k] * (0.5 * (d + d_predicted) + r).exp();
        }
        Ok(result)
    }
}
