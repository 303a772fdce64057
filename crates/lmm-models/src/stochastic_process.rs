//! `StochasticProcess`: the contract a path generator evolves.
//!
//! A process `dX = μ(t,X) dt + σ(t,X) dW` is described by its drift, its
//! diffusion and a discretisation step. States are plain slices so that
//! paths can be stored contiguously.

use lmm_core::{errors::Result, Real, Time};
use lmm_math::Matrix;

/// A multi-dimensional stochastic process.
pub trait StochasticProcess: std::fmt::Debug + Send + Sync {
    /// Number of state variables.
    fn size(&self) -> usize;

    /// Number of independent Brownian motions.
    fn factors(&self) -> usize {
        self.size()
    }

    /// State at time zero.
    fn initial_values(&self) -> Vec<Real>;

    /// Drift `μ(t, x)`.
    fn drift(&self, t: Time, x: &[Real]) -> Result<Vec<Real>>;

    /// Diffusion `σ(t, x)`, dimensioned `size() × factors()`.
    fn diffusion(&self, t: Time, x: &[Real]) -> Result<Matrix>;

    /// Euler expectation `x + μ(t,x)·Δt`.
    fn expectation(&self, t: Time, x: &[Real], dt: Time) -> Result<Vec<Real>> {
        let mu = self.drift(t, x)?;
        Ok(x.iter().zip(&mu).map(|(xi, m)| xi + m * dt).collect())
    }

    /// `σ(t,x)·√Δt`.
    fn std_deviation(&self, t: Time, x: &[Real], dt: Time) -> Result<Matrix> {
        Ok(self.diffusion(t, x)?.scale(dt.sqrt()))
    }

    /// Advance `x` from `t` to `t + Δt` given standard normal draws `dw`
    /// (one per factor).
    ///
    /// Default: Euler step `E[x] + σ·√Δt·dw`.
    fn evolve(&self, t: Time, x: &[Real], dt: Time, dw: &[Real]) -> Result<Vec<Real>> {
        let e = self.expectation(t, x, dt)?;
        let s = self.std_deviation(t, x, dt)?;
        Ok(e.iter().enumerate().map(|(i, ei)| ei + s.row_dot_vec(i, dw)).collect())
    }
}
