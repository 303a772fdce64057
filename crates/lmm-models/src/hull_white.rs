//! Time-homogeneous covariance back-solved from caplet volatilities.
//!
//! Rate `i` with fixing `T_i` is driven, while `T_p <= t < T_{p+1}` and
//! `p < i`, by the base row `λ_{i−p−1}·b_{i−p−1}`, where `b_k` is a unit-norm
//! factor loading taken from the target correlation. The `λ_k` are solved
//! sequentially so that the variance accumulated up to `T_i` equals
//! `σ_caplet(T_i)²·(T_i − T_0)`.

use crate::covariance::CovarianceParameterization;
use lmm_core::{ensure, errors::Result, Error, Real, Time};
use lmm_math::{pseudo_sqrt, search::upper_bound, Matrix, SalvagingAlgorithm};
use lmm_termstructures::CapletVolatilityStructure;
use tracing::debug;

/// Hull-White style covariance of `N` forward rates with `factors` factors.
#[derive(Debug, Clone)]
pub struct HullWhiteParameterization {
    fixing_times: Vec<Time>,
    factors: usize,
    lambda: Vec<Real>,
    /// `(N − 1) × factors`, row `k` driving a rate `k + 1` periods from reset.
    diffusion: Matrix,
    /// `diffusion · diffusionᵗ`.
    covariance: Matrix,
}

impl HullWhiteParameterization {
    /// Calibrate to `caplet_volatility` over `fixing_times`.
    ///
    /// `correlation` is the `(N − 1) × (N − 1)` target correlation between
    /// the rates after the first; pass an empty matrix for a one-factor
    /// model.
    pub fn new(
        fixing_times: Vec<Time>,
        caplet_volatility: &dyn CapletVolatilityStructure,
        correlation: &Matrix,
        factors: usize,
    ) -> Result<Self> {
        let n = fixing_times.len();
        ensure!(n >= 2, "at least two fixing times are required, got {n}");
        ensure!(
            fixing_times.windows(2).all(|w| w[1] > w[0]),
            "fixing times must be strictly increasing"
        );
        ensure!(factors >= 1, "at least one factor is required");
        let size = n - 1;

        let loadings = if correlation.is_empty() {
            ensure!(factors == 1, "a correlation matrix is required for {factors} factors");
            Matrix::from_element(size, 1, 1.0)
        } else {
            ensure!(
                correlation.is_square() && correlation.rows() == size,
                "correlation must be {size} x {size}, got {} x {}",
                correlation.rows(),
                correlation.cols()
            );
            ensure!(factors <= size, "{factors} factors exceed {size} correlated rates");
            let root = pseudo_sqrt(correlation, SalvagingAlgorithm::Spectral)?.leading_columns(factors);
            let mut loadings = root.clone();
            for i in 0..size {
                let norm = root.row_dot(i, i).sqrt();
                ensure!(norm > 0.0, "row {i} of the truncated correlation root vanishes");
                for q in 0..factors {
                    loadings[(i, q)] = root[(i, q)] / norm;
                }
            }
            loadings
        };

        let first_period = fixing_times[1] - fixing_times[0];
        let mut lambda: Vec<Real> = Vec::with_capacity(size);
        for i in 1..n {
            let accumulated: Real = (1..i)
                .map(|j| {
                    let l = lambda[i - j - 1];
                    l * l * (fixing_times[j + 1] - fixing_times[j])
                })
                .sum();
            let vol = caplet_volatility.volatility(fixing_times[i]);
            let target = vol * vol * (fixing_times[i] - fixing_times[0]);
            let residual = target - accumulated;
            if residual < 0.0 {
                return Err(Error::NonConvergence(format!(
                    "caplet variance {target} at fixing {i} is below the variance {accumulated} \
                     already implied by earlier periods"
                )));
            }
            lambda.push((residual / first_period).sqrt());
        }

        let diffusion = Matrix::from_fn(size, factors, |k, q| loadings[(k, q)] * lambda[k]);
        let covariance = &diffusion * &diffusion.transpose();
        debug!(rates = n, factors, "hull-white covariance calibrated");
        Ok(Self {
            fixing_times,
            factors,
            lambda,
            diffusion,
            covariance,
        })
    }

    /// Calibrated period volatilities `λ_k`.
    pub fn lambda(&self) -> &[Real] {
        &self.lambda
    }

    /// Fixing times.
    pub fn fixing_times(&self) -> &[Time] {
        &self.fixing_times
    }

    /// Number of fixings `<= t`.
    fn next_index_reset(&self, t: Time) -> usize {
        upper_bound(&self.fixing_times, t)
    }

    fn shifted(&self, base: &Matrix, t: Time, cols: usize) -> Matrix {
        let n = self.size();
        let m = self.next_index_reset(t);
        if m == 0 || m >= n {
            return Matrix::zeros(n, cols);
        }
        Matrix::from_fn(n, cols, |k, q| if k >= m { base[(k - m, q)] } else { 0.0 })
    }
}

impl CovarianceParameterization for HullWhiteParameterization {
    fn size(&self) -> usize {
        self.fixing_times.len()
    }

    fn factors(&self) -> usize {
        self.factors
    }

    fn diffusion(&self, t: Time, _x: &[Real]) -> Result<Matrix> {
        Ok(self.shifted(&self.diffusion, t, self.factors))
    }

    fn covariance(&self, t: Time, _x: &[Real]) -> Result<Matrix> {
        let n = self.size();
        let m = self.next_index_reset(t);
        if m == 0 || m >= n {
            return Ok(Matrix::zeros(n, n));
        }
        Ok(Matrix::from_fn(n, n, |k, l| {
            if k >= m && l >= m {
                self.covariance[(k - m, l - m)]
            } else {
                0.0
            }
        }))
    }

    fn integrated_covariance(&self, t: Time, _x: &[Real]) -> Result<Matrix> {
        let n = self.size();
        let mut result = Matrix::zeros(n, n);
        for p in 0..n - 1 {
            let start = self.fixing_times[p];
            if t <= start {
                break;
            }
            let dt = t.min(self.fixing_times[p + 1]) - start;
            for k in p + 1..n {
                for l in p + 1..n {
                    result[(k, l)] += self.covariance[(k - p - 1, l - p - 1)] * dt;
                }
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::covariance::integrated_covariance_by_quadrature;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use lmm_math::QuadratureSettings;
    use lmm_termstructures::{CapletVolatilityCurve, ConstantCapletVolatility};

    const FIXINGS: [Time; 5] = [0.5, 1.0, 1.5, 2.0, 2.5];

    fn exponential(size: usize, beta: Real) -> Matrix {
        Matrix::from_fn(size, size, |i, j| (-beta * (i as Real - j as Real).abs()).exp())
    }

    fn humped() -> CapletVolatilityCurve {
        CapletVolatilityCurve::new(&FIXINGS, &[0.18, 0.20, 0.21, 0.205, 0.20]).unwrap()
    }

    #[test]
    fn reproduces_caplet_variances() {
        let caplets = humped();
        let hw = HullWhiteParameterization::new(FIXINGS.to_vec(), &caplets, &exponential(4, 0.2), 2).unwrap();
        for i in 1..FIXINGS.len() {
            let c = hw.integrated_covariance(FIXINGS[i], &[]).unwrap();
            let vol = caplets.volatility(FIXINGS[i]);
            assert_relative_eq!(c[(i, i)], vol * vol * (FIXINGS[i] - FIXINGS[0]), max_relative = 1e-12);
        }
    }

    #[test]
    fn one_factor_flat_volatility() {
        let caplets = ConstantCapletVolatility::new(0.2).unwrap();
        let hw = HullWhiteParameterization::new(FIXINGS.to_vec(), &caplets, &Matrix::zeros(0, 0), 1).unwrap();
        for &l in hw.lambda() {
            assert_abs_diff_eq!(l, 0.2, epsilon = 1e-12);
        }
        let c = hw.covariance(0.7, &[]).unwrap();
        assert_eq!(c[(0, 0)], 0.0);
        assert_eq!(c[(0, 3)], 0.0);
        assert_abs_diff_eq!(c[(1, 1)], 0.04, epsilon = 1e-12);
        assert_abs_diff_eq!(c[(2, 3)], 0.04, epsilon = 1e-12);
    }

    #[test]
    fn diffusion_shifts_with_time() {
        let caplets = humped();
        let hw = HullWhiteParameterization::new(FIXINGS.to_vec(), &caplets, &exponential(4, 0.2), 2).unwrap();
        let d0 = hw.diffusion(0.6, &[]).unwrap();
        let d1 = hw.diffusion(1.2, &[]).unwrap();
        for q in 0..2 {
            assert_eq!(d0[(0, q)], 0.0);
            assert_eq!(d1[(1, q)], 0.0);
            assert_eq!(d0[(2, q)], d1[(3, q)]);
        }
        assert_eq!(hw.diffusion(0.1, &[]).unwrap().max_abs_diff(&Matrix::zeros(5, 2)), 0.0);
        assert_eq!(hw.diffusion(3.0, &[]).unwrap().max_abs_diff(&Matrix::zeros(5, 2)), 0.0);
    }

    #[test]
    fn closed_form_matches_generic_integration() {
        let caplets = humped();
        let hw = HullWhiteParameterization::new(FIXINGS.to_vec(), &caplets, &exponential(4, 0.3), 3).unwrap();
        let closed = hw.integrated_covariance(2.0, &[]).unwrap();
        let generic = integrated_covariance_by_quadrature(&hw, 2.0, &[], &QuadratureSettings::default()).unwrap();
        assert!(closed.max_abs_diff(&generic) < 1e-10);
    }

    #[test]
    fn infeasible_caplet_curve() {
        let caplets = CapletVolatilityCurve::new(&FIXINGS, &[0.30, 0.30, 0.10, 0.10, 0.10]).unwrap();
        let err = HullWhiteParameterization::new(FIXINGS.to_vec(), &caplets, &Matrix::zeros(0, 0), 1).unwrap_err();
        assert!(err.is_non_convergence());
    }

    #[test]
    fn invalid_inputs() {
        let caplets = ConstantCapletVolatility::new(0.2).unwrap();
        let empty = Matrix::zeros(0, 0);
        assert!(HullWhiteParameterization::new(vec![1.0], &caplets, &empty, 1).is_err());
        assert!(HullWhiteParameterization::new(FIXINGS.to_vec(), &caplets, &empty, 2).is_err());
        assert!(HullWhiteParameterization::new(FIXINGS.to_vec(), &caplets, &exponential(3, 0.1), 1).is_err());
        assert!(HullWhiteParameterization::new(FIXINGS.to_vec(), &caplets, &exponential(4, 0.1), 5).is_err());
    }
}
