//! The covariance parameterization contract.
//!
//! An implementation describes the instantaneous covariance of `size()`
//! forward rates through a `size() × factors()` diffusion matrix `D(t, x)`
//! with `C(t, x) = D·Dᵗ`. Implementations with a closed-form time integral
//! override [`CovarianceParameterization::integrated_covariance`]; the
//! default integrates `D·Dᵗ` numerically.

use lmm_core::{errors::Result, Error, Real, Time};
use lmm_math::{Matrix, QuadratureSettings};
use std::cell::RefCell;
use tracing::debug;

/// Instantaneous covariance of the forward-rate vector.
pub trait CovarianceParameterization: std::fmt::Debug + Send + Sync {
    /// Number of forward rates.
    fn size(&self) -> usize;

    /// Number of driving Brownian factors.
    fn factors(&self) -> usize;

    /// Diffusion matrix `D(t, x)`, dimensioned `size() × factors()`.
    fn diffusion(&self, t: Time, x: &[Real]) -> Result<Matrix>;

    /// Covariance matrix `D·Dᵗ`.
    fn covariance(&self, t: Time, x: &[Real]) -> Result<Matrix> {
        let d = self.diffusion(t, x)?;
        Ok(&d * &d.transpose())
    }

    /// `∫₀ᵗ C(s, x) ds`.
    fn integrated_covariance(&self, t: Time, x: &[Real]) -> Result<Matrix> {
        integrated_covariance_by_quadrature(self, t, x, &QuadratureSettings::default())
    }
}

/// Integrate every lower-triangle entry of `D·Dᵗ` over `[0, t]` with the
/// given quadrature and mirror the result.
///
/// The integrand of entry `(i, j)` is `D[i,·] · D[j,·]`.
pub fn integrated_covariance_by_quadrature<P>(
    param: &P,
    t: Time,
    x: &[Real],
    settings: &QuadratureSettings,
) -> Result<Matrix>
where
    P: CovarianceParameterization + ?Sized,
{
    let n = param.size();
    let mut result = Matrix::zeros(n, n);
    if t <= 0.0 {
        return Ok(result);
    }
    debug!(size = n, t, "integrating covariance numerically");

    let failure: RefCell<Option<Error>> = RefCell::new(None);
    for i in 0..n {
        for j in 0..=i {
            let integrand = |s: Real| match param.diffusion(s, x) {
                Ok(d) => d.row_dot(i, j),
                Err(e) => {
                    failure.borrow_mut().get_or_insert(e);
                    Real::NAN
                }
            };
            let value = settings.integrate(integrand, 0.0, t);
            if let Some(e) = failure.borrow_mut().take() {
                return Err(e);
            }
            let value = value?.value;
            result[(i, j)] = value;
            result[(j, i)] = value;
        }
    }
    Ok(result)
}
