//! Covariance built from a volatility model and a correlation model.
//!
//! `C(t) = diag(σ(t))·ρ(t)·diag(σ(t))` and `D(t) = diag(σ(t))·B(t)`, where
//! `B` is the correlation model's pseudo square root.

use crate::correlation::CorrelationModel;
use crate::covariance::{integrated_covariance_by_quadrature, CovarianceParameterization};
use crate::parameter::{Parameter, ParameterLayout};
use crate::volatility::VolatilityModel;
use lmm_core::{ensure, errors::Result, Error, Real, Time};
use lmm_math::{get_covariance, Matrix, QuadratureSettings};
use std::cell::RefCell;
use tracing::debug;

const VOLATILITY_BLOCK: &str = "volatility";
const CORRELATION_BLOCK: &str = "correlation";

/// Composition of a [`VolatilityModel`] and a [`CorrelationModel`].
#[derive(Debug, Clone)]
pub struct CovarianceProxy {
    volatility: VolatilityModel,
    correlation: CorrelationModel,
    quadrature: QuadratureSettings,
    layout: ParameterLayout,
}

impl CovarianceProxy {
    /// Both models must describe the same number of rates.
    pub fn new(volatility: VolatilityModel, correlation: CorrelationModel) -> Result<Self> {
        ensure!(
            volatility.size() == correlation.size(),
            "volatility model size {} differs from correlation model size {}",
            volatility.size(),
            correlation.size()
        );
        let mut layout = ParameterLayout::new();
        layout.push(VOLATILITY_BLOCK, volatility.param_count());
        layout.push(CORRELATION_BLOCK, correlation.param_count());
        Ok(Self {
            volatility,
            correlation,
            quadrature: QuadratureSettings::default(),
            layout,
        })
    }

    /// Use `settings` for the numerical fallback.
    pub fn with_quadrature(mut self, settings: QuadratureSettings) -> Self {
        self.quadrature = settings;
        self
    }

    /// Volatility component.
    pub fn volatility_model(&self) -> &VolatilityModel {
        &self.volatility
    }

    /// Correlation component.
    pub fn correlation_model(&self) -> &CorrelationModel {
        &self.correlation
    }

    /// Block offsets of [`Self::params`].
    pub fn layout(&self) -> &ParameterLayout {
        &self.layout
    }

    /// `∫₀ᵗ σ_i ρ_ij σ_j`.
    ///
    /// Uses the volatility closed form when the correlation is time
    /// independent and the closed form exists. Otherwise integrates
    /// numerically, which is only available for state-independent
    /// evaluation (`x` empty).
    pub fn integrated_covariance_entry(&self, i: usize, j: usize, t: Time, x: &[Real]) -> Result<Real> {
        let n = self.size();
        for k in [i, j] {
            if k >= n {
                return Err(Error::IndexOutOfRange { index: k, size: n });
            }
        }
        if self.correlation.is_time_independent() {
            match self.volatility.integrated_variance(j, i, t, x) {
                Ok(v) => return Ok(self.correlation.correlation_at(i, j, 0.0, &[]) * v),
                Err(Error::Unsupported(_)) => {}
                Err(e) => return Err(e),
            }
        }
        if !x.is_empty() {
            return Err(Error::Unsupported(
                "numerical covariance integration requires an empty state vector".into(),
            ));
        }
        if t <= 0.0 {
            return Ok(0.0);
        }

        debug!(i, j, t, "integrating covariance entry numerically");
        let failure: RefCell<Option<Error>> = RefCell::new(None);
        let integrand = |s: Real| {
            let sigma_i = self.volatility.volatility_at(i, s, x);
            let sigma_j = self.volatility.volatility_at(j, s, x);
            match (sigma_i, sigma_j) {
                (Ok(a), Ok(b)) => a * self.correlation.correlation_at(i, j, s, x) * b,
                (Err(e), _) | (_, Err(e)) => {
                    failure.borrow_mut().get_or_insert(e);
                    Real::NAN
                }
            }
        };
        let value = self.quadrature.integrate(integrand, 0.0, t);
        if let Some(e) = failure.borrow_mut().take() {
            return Err(e);
        }
        Ok(value?.value)
    }

    /// All calibration parameters, volatility block first.
    pub fn parameters(&self) -> Vec<Parameter> {
        self.volatility
            .parameters()
            .iter()
            .chain(self.correlation.parameters())
            .cloned()
            .collect()
    }

    /// Flattened parameter values.
    pub fn params(&self) -> Vec<Real> {
        let mut values = self.volatility.params();
        values.extend(self.correlation.params());
        values
    }

    /// Replace both blocks; on failure neither model changes.
    pub fn set_params(&mut self, values: &[Real]) -> Result<()> {
        let blocks = self.layout.split(values)?;
        let (mut volatility, mut correlation) = (self.volatility.clone(), self.correlation.clone());
        volatility.set_params(blocks[0])?;
        correlation.set_params(blocks[1])?;
        self.volatility = volatility;
        self.correlation = correlation;
        Ok(())
    }
}

impl CovarianceParameterization for CovarianceProxy {
    fn size(&self) -> usize {
        self.volatility.size()
    }

    fn factors(&self) -> usize {
        self.correlation.factors()
    }

    fn diffusion(&self, t: Time, x: &[Real]) -> Result<Matrix> {
        let sigma = self.volatility.volatility(t, x)?;
        let root = self.correlation.pseudo_sqrt(t, x);
        Ok(Matrix::from_fn(root.rows(), root.cols(), |i, k| sigma[i] * root[(i, k)]))
    }

    fn covariance(&self, t: Time, x: &[Real]) -> Result<Matrix> {
        let sigma = self.volatility.volatility(t, x)?;
        get_covariance(&sigma, self.correlation.correlation(t, x))
    }

    fn integrated_covariance(&self, t: Time, x: &[Real]) -> Result<Matrix> {
        let n = self.size();
        if !self.correlation.is_time_independent() {
            return integrated_covariance_by_quadrature(self, t, x, &self.quadrature);
        }
        let mut result = Matrix::zeros(n, n);
        for i in 0..n {
            for j in 0..=i {
                let value = match self.volatility.integrated_variance(j, i, t, x) {
                    Ok(v) => self.correlation.correlation_at(i, j, 0.0, &[]) * v,
                    Err(Error::Unsupported(_)) => {
                        return integrated_covariance_by_quadrature(self, t, x, &self.quadrature)
                    }
                    Err(e) => return Err(e),
                };
                result[(i, j)] = value;
                result[(j, i)] = value;
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlation::{ExponentialCorrelation, LinearExponentialCorrelation};
    use crate::volatility::{FixedVolatility, LinearExponentialVolatility};
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn hump_proxy() -> CovarianceProxy {
        let vol = LinearExponentialVolatility::new(vec![1.0, 2.0, 3.0, 4.0], 0.1, 0.5, 0.05, 0.2).unwrap();
        let corr = LinearExponentialCorrelation::new(4, 0.2, 0.3, Some(2)).unwrap();
        CovarianceProxy::new(vol.into(), corr.into()).unwrap()
    }

    #[test]
    fn covariance_is_sigma_rho_sigma() {
        let p = hump_proxy();
        for &t in &[0.0, 0.5, 1.7, 3.2] {
            let c = p.covariance(t, &[]).unwrap();
            let sigma = p.volatility_model().volatility(t, &[]).unwrap();
            let rho = p.correlation_model().correlation(t, &[]);
            for i in 0..4 {
                for j in 0..4 {
                    assert_abs_diff_eq!(c[(i, j)], sigma[i] * rho[(i, j)] * sigma[j], epsilon = 1e-15);
                }
            }
            let d = p.diffusion(t, &[]).unwrap();
            assert_eq!(d.cols(), 2);
            let from_diffusion = &d * &d.transpose();
            assert!(from_diffusion.max_abs_diff(&c) < 1e-14);
        }
    }

    #[test]
    fn closed_form_matches_generic_integration() {
        let p = hump_proxy();
        let closed = p.integrated_covariance(2.0, &[]).unwrap();
        let generic = integrated_covariance_by_quadrature(&p, 2.0, &[], &QuadratureSettings::default()).unwrap();
        for i in 0..4 {
            for j in 0..4 {
                assert_relative_eq!(closed[(i, j)], generic[(i, j)], max_relative = 1e-6, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn fixed_volatility_falls_back_to_quadrature() {
        let vol = FixedVolatility::new(vec![0.2; 4], vec![0.0, 1.0, 2.0, 3.0]).unwrap();
        let corr = ExponentialCorrelation::new(4, 0.1).unwrap();
        let p = CovarianceProxy::new(vol.into(), corr.into()).unwrap();
        // rate 1 carries 0.2 on [0, 2)
        let v = p.integrated_covariance_entry(1, 1, 2.0, &[]).unwrap();
        assert_relative_eq!(v, 0.08, max_relative = 1e-9);
        let c = p.integrated_covariance_entry(2, 1, 1.0, &[]).unwrap();
        assert_relative_eq!(c, 0.04 * (-0.1_f64).exp(), max_relative = 1e-9);
        let err = p.integrated_covariance_entry(1, 1, 2.0, &[0.05; 4]).unwrap_err();
        assert!(err.is_unsupported());
        assert!(p.integrated_covariance_entry(4, 0, 1.0, &[]).is_err());
    }

    #[test]
    fn parameters_are_concatenated() {
        let mut p = hump_proxy();
        assert_eq!(p.params(), vec![0.1, 0.5, 0.05, 0.2, 0.2, 0.3]);
        assert_eq!(p.layout().block("correlation"), Some(4..6));
        p.set_params(&[0.2, 0.4, 0.01, 0.1, 0.5, 0.6]).unwrap();
        assert_eq!(p.params(), vec![0.2, 0.4, 0.01, 0.1, 0.5, 0.6]);
        // correlation alpha out of bounds: nothing changes
        assert!(p.set_params(&[0.3, 0.4, 0.01, 0.1, 1.5, 0.6]).is_err());
        assert_eq!(p.params(), vec![0.2, 0.4, 0.01, 0.1, 0.5, 0.6]);
        assert!(p.set_params(&[0.3]).is_err());
    }

    #[test]
    fn size_mismatch() {
        let vol = LinearExponentialVolatility::new(vec![1.0, 2.0], 0.1, 0.5, 0.05, 0.2).unwrap();
        let corr = ExponentialCorrelation::new(3, 0.1).unwrap();
        assert!(CovarianceProxy::new(vol.into(), corr.into()).unwrap_err().is_configuration());
    }
}
