//! Instantaneous forward-rate volatility models.
//!
//! A volatility model yields `σ_i(t)` for each of `size()` forward rates and,
//! where a closed form exists, the integrated covariance kernel
//! `∫₀ᵘ σ_i(s) σ_j(s) ds`.

use crate::parameter::{assign, Constraint, Parameter};
use lmm_core::{ensure, errors::Result, Error, Real, Time};
use lmm_math::{predecessor, QuadratureSettings};

/// Below this decay the hump closed form loses precision to cancellation.
const SMALL_DECAY: Real = 1e-3;

fn check_index(i: usize, size: usize) -> Result<()> {
    if i < size {
        Ok(())
    } else {
        Err(Error::IndexOutOfRange { index: i, size })
    }
}

// ── Fixed ────────────────────────────────────────────────────────────────────

/// Piecewise-constant volatilities tabulated against start times.
///
/// Between `start_times[k]` and `start_times[k + 1]` rate `i >= k` carries
/// `volatilities[i − k]`; rates with `i < k` have already reset and carry
/// zero.
#[derive(Debug, Clone)]
pub struct FixedVolatility {
    volatilities: Vec<Real>,
    start_times: Vec<Time>,
}

impl FixedVolatility {
    /// One volatility per start time; start times strictly increasing.
    pub fn new(volatilities: Vec<Real>, start_times: Vec<Time>) -> Result<Self> {
        ensure!(
            start_times.len() > 1,
            "at least two start times are required, got {}",
            start_times.len()
        );
        ensure!(
            volatilities.len() == start_times.len(),
            "volatility count {} differs from start time count {}",
            volatilities.len(),
            start_times.len()
        );
        ensure!(
            start_times.windows(2).all(|w| w[1] > w[0]),
            "start times must be strictly increasing"
        );
        ensure!(
            volatilities.iter().all(|v| v.is_finite() && *v >= 0.0),
            "volatilities must be finite and non-negative"
        );
        Ok(Self {
            volatilities,
            start_times,
        })
    }

    fn segment(&self, t: Time) -> Result<usize> {
        let (front, back) = (self.start_times[0], self.start_times[self.start_times.len() - 1]);
        if !(t >= front && t <= back) {
            return Err(Error::ScheduleMismatch(format!(
                "time {t} outside tabulated range [{front}, {back}]"
            )));
        }
        let n = self.start_times.len();
        Ok(predecessor(&self.start_times[..n - 1], t).unwrap_or(0))
    }

    fn value(&self, i: usize, segment: usize) -> Real {
        if i >= segment {
            self.volatilities[i - segment]
        } else {
            0.0
        }
    }
}

// ── Linear-exponential ───────────────────────────────────────────────────────

/// Hump-shaped volatility `σ_i(t) = (a·τ + d)·e^{−b·τ} + c` with
/// `τ = T_i − t`, vanishing once `t >= T_i`.
#[derive(Debug, Clone)]
pub struct LinearExponentialVolatility {
    fixing_times: Vec<Time>,
    params: Vec<Parameter>,
    quadrature: QuadratureSettings,
}

impl LinearExponentialVolatility {
    /// Hump model over the given fixing times; all four coefficients
    /// non-negative.
    pub fn new(fixing_times: Vec<Time>, a: Real, b: Real, c: Real, d: Real) -> Result<Self> {
        ensure!(!fixing_times.is_empty(), "at least one fixing time is required");
        ensure!(
            fixing_times.windows(2).all(|w| w[1] > w[0]),
            "fixing times must be strictly increasing"
        );
        let params = vec![
            Parameter::new("a", a, Constraint::NonNegative)?,
            Parameter::new("b", b, Constraint::NonNegative)?,
            Parameter::new("c", c, Constraint::NonNegative)?,
            Parameter::new("d", d, Constraint::NonNegative)?,
        ];
        Ok(Self {
            fixing_times,
            params,
            quadrature: QuadratureSettings::default(),
        })
    }

    fn coefficients(&self) -> (Real, Real, Real, Real) {
        (
            self.params[0].value(),
            self.params[1].value(),
            self.params[2].value(),
            self.params[3].value(),
        )
    }

    fn sigma(&self, i: usize, t: Time) -> Real {
        let big_t = self.fixing_times[i];
        if t >= big_t {
            return 0.0;
        }
        let (a, b, c, d) = self.coefficients();
        let tau = big_t - t;
        (a * tau + d) * (-b * tau).exp() + c
    }

    /// `∫₀ᵘ σ_i σ_j`, with `u` already clamped to both fixing times.
    fn kernel(&self, i: usize, j: usize, u: Time) -> Result<Real> {
        let (a, b, c, d) = self.coefficients();
        let big_t = self.fixing_times[i];
        let s = self.fixing_times[j];

        if b == 0.0 {
            let alpha_i = a * big_t + d + c;
            let alpha_j = a * s + d + c;
            return Ok(alpha_i * alpha_j * u - a * (alpha_i + alpha_j) * u * u / 2.0
                + a * a * u * u * u / 3.0);
        }
        if b < SMALL_DECAY {
            let r = self
                .quadrature
                .integrate(|t| self.sigma(i, t) * self.sigma(j, t), 0.0, u)?;
            return Ok(r.value);
        }

        // every exponent is non-positive since u <= min(S, T)
        let p = (b * (u - s)).exp();
        let q = (b * (u - big_t)).exp();
        let es = (-b * s).exp();
        let et = (-b * big_t).exp();

        let quadratic = a * a
            * (-es * et * (1.0 + 2.0 * b * b * s * big_t + b * (s + big_t))
                + p * q * (1.0 + b * (s + big_t - 2.0 * u) + 2.0 * b * b * (s - u) * (big_t - u)));
        let level = 2.0
            * b
            * b
            * (2.0 * c * d * (p + q - es - et) + d * d * (p * q - es * et) + 2.0 * b * c * c * u);
        let cross = 2.0
            * a
            * b
            * (d * (-es * et * (1.0 + b * (s + big_t)) + p * q * (1.0 + b * (s + big_t - 2.0 * u)))
                - 2.0
                    * c
                    * (es * (1.0 + b * s) + et * (1.0 + b * big_t)
                        - p * (1.0 + b * (s - u))
                        - q * (1.0 + b * (big_t - u))));

        let value = (quadratic + level + cross) / (4.0 * b * b * b);
        if !value.is_finite() {
            return Err(Error::NonConvergence(format!(
                "integrated covariance ({i}, {j}) up to {u} is not finite for b = {b}"
            )));
        }
        Ok(value)
    }
}

// ── Closed set of models ──────────────────────────────────────────────────────

/// A volatility model for `size()` forward rates.
#[derive(Debug, Clone)]
pub enum VolatilityModel {
    /// Piecewise-constant tabulated volatilities.
    Fixed(FixedVolatility),
    /// Parametric hump shape.
    LinearExponential(LinearExponentialVolatility),
}

impl From<FixedVolatility> for VolatilityModel {
    fn from(m: FixedVolatility) -> Self {
        Self::Fixed(m)
    }
}

impl From<LinearExponentialVolatility> for VolatilityModel {
    fn from(m: LinearExponentialVolatility) -> Self {
        Self::LinearExponential(m)
    }
}

impl VolatilityModel {
    /// Number of rates.
    pub fn size(&self) -> usize {
        match self {
            Self::Fixed(m) => m.volatilities.len(),
            Self::LinearExponential(m) => m.fixing_times.len(),
        }
    }

    /// Volatility vector at `(t, x)`.
    pub fn volatility(&self, t: Time, _x: &[Real]) -> Result<Vec<Real>> {
        match self {
            Self::Fixed(m) => {
                let k = m.segment(t)?;
                Ok((0..m.volatilities.len()).map(|i| m.value(i, k)).collect())
            }
            Self::LinearExponential(m) => {
                Ok((0..m.fixing_times.len()).map(|i| m.sigma(i, t)).collect())
            }
        }
    }

    /// Volatility of rate `i` at `(t, x)`.
    pub fn volatility_at(&self, i: usize, t: Time, _x: &[Real]) -> Result<Real> {
        check_index(i, self.size())?;
        match self {
            Self::Fixed(m) => Ok(m.value(i, m.segment(t)?)),
            Self::LinearExponential(m) => Ok(m.sigma(i, t)),
        }
    }

    /// `∫₀ᵘ σ_i(s) σ_j(s) ds` in closed form.
    ///
    /// Fails with [`Error::Unsupported`] for models without one.
    pub fn integrated_variance(&self, i: usize, j: usize, u: Time, _x: &[Real]) -> Result<Real> {
        check_index(i, self.size())?;
        check_index(j, self.size())?;
        match self {
            Self::Fixed(_) => Err(Error::Unsupported(
                "fixed volatility has no closed-form integrated variance".into(),
            )),
            Self::LinearExponential(m) => {
                let u = u.min(m.fixing_times[i]).min(m.fixing_times[j]);
                if u <= 0.0 {
                    return Ok(0.0);
                }
                m.kernel(i, j, u)
            }
        }
    }

    /// Calibration parameters (empty for tabulated volatilities).
    pub fn parameters(&self) -> &[Parameter] {
        match self {
            Self::Fixed(_) => &[],
            Self::LinearExponential(m) => &m.params,
        }
    }

    /// Number of calibration parameters.
    pub fn param_count(&self) -> usize {
        self.parameters().len()
    }

    /// Current parameter values.
    pub fn params(&self) -> Vec<Real> {
        self.parameters().iter().map(Parameter::value).collect()
    }

    /// Replace every parameter.
    pub fn set_params(&mut self, values: &[Real]) -> Result<()> {
        match self {
            Self::Fixed(_) => {
                ensure!(values.is_empty(), "fixed volatility takes no parameters");
                Ok(())
            }
            Self::LinearExponential(m) => assign(&mut m.params, values),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn hump(b: Real) -> VolatilityModel {
        LinearExponentialVolatility::new(vec![1.0, 2.0, 3.0, 4.0, 5.0], 0.1, b, 0.05, 0.2)
            .unwrap()
            .into()
    }

    fn numerical(m: &VolatilityModel, i: usize, j: usize, u: Time) -> Real {
        let u = u.min(i as Real + 1.0).min(j as Real + 1.0);
        let f = |t: Real| {
            m.volatility_at(i, t, &[]).unwrap() * m.volatility_at(j, t, &[]).unwrap()
        };
        QuadratureSettings::default().integrate(f, 0.0, u).unwrap().value
    }

    #[test]
    fn hump_shape_and_reset() {
        let m = hump(0.5);
        let tau: Real = 4.0;
        let expected = (0.1 * tau + 0.2) * (-0.5 * tau).exp() + 0.05;
        assert_abs_diff_eq!(m.volatility_at(4, 1.0, &[]).unwrap(), expected, epsilon = 1e-15);
        assert_eq!(m.volatility_at(2, 3.0, &[]).unwrap(), 0.0);
        assert_eq!(m.volatility(3.5, &[]).unwrap()[..3], [0.0, 0.0, 0.0]);
        assert!(m.volatility_at(5, 0.0, &[]).is_err());
    }

    #[test]
    fn closed_form_matches_quadrature() {
        let m = hump(0.5);
        for &(i, j, u) in &[(4, 4, 5.0), (4, 3, 3.7), (1, 2, 10.0), (0, 4, 0.4)] {
            let cf = m.integrated_variance(i, j, u, &[]).unwrap();
            let q = numerical(&m, i, j, u);
            assert_relative_eq!(cf, q, max_relative = 1e-6);
        }
        assert_relative_eq!(
            m.integrated_variance(1, 3, 2.5, &[]).unwrap(),
            m.integrated_variance(3, 1, 2.5, &[]).unwrap(),
            max_relative = 1e-12
        );
    }

    #[test]
    fn steep_decay_stays_finite() {
        let m: VolatilityModel = LinearExponentialVolatility::new(vec![5.0, 10.0], 0.1, 40.0, 0.05, 0.2)
            .unwrap()
            .into();
        // c²u + 2c(d/b + a/b²) + d²/2b + ad/2b² + a²/4b³
        let expected = 0.0260125390625;
        assert_relative_eq!(m.integrated_variance(1, 1, 10.0, &[]).unwrap(), expected, max_relative = 1e-10);
        let f = |t: Real| m.volatility_at(0, t, &[]).unwrap() * m.volatility_at(1, t, &[]).unwrap();
        let q = QuadratureSettings::default().integrate(f, 0.0, 5.0).unwrap().value;
        assert_relative_eq!(m.integrated_variance(0, 1, 10.0, &[]).unwrap(), q, max_relative = 1e-7);
    }

    #[test]
    fn zero_and_small_decay() {
        for &b in &[0.0, 1e-5, 5e-4] {
            let m = hump(b);
            let cf = m.integrated_variance(4, 2, 2.5, &[]).unwrap();
            let q = numerical(&m, 4, 2, 2.5);
            assert_relative_eq!(cf, q, max_relative = 1e-8);
        }
    }

    #[test]
    fn integrated_variance_before_start() {
        let m = hump(0.5);
        assert_eq!(m.integrated_variance(2, 2, 0.0, &[]).unwrap(), 0.0);
        assert_eq!(m.integrated_variance(2, 2, -1.0, &[]).unwrap(), 0.0);
    }

    #[test]
    fn fixed_lookup() {
        let m: VolatilityModel = FixedVolatility::new(vec![0.2, 0.25, 0.3, 0.35], vec![0.0, 1.0, 2.0, 3.0])
            .unwrap()
            .into();
        assert_eq!(m.volatility(0.5, &[]).unwrap(), vec![0.2, 0.25, 0.3, 0.35]);
        assert_eq!(m.volatility(1.0, &[]).unwrap(), vec![0.0, 0.2, 0.25, 0.3]);
        assert_eq!(m.volatility(3.0, &[]).unwrap(), vec![0.0, 0.0, 0.2, 0.25]);
        assert!(m.volatility(3.5, &[]).unwrap_err().is_schedule_mismatch());
        assert!(m.volatility(-0.1, &[]).unwrap_err().is_schedule_mismatch());
        assert!(m.integrated_variance(0, 0, 1.0, &[]).unwrap_err().is_unsupported());
        assert_eq!(m.param_count(), 0);
    }

    #[test]
    fn set_params_validates() {
        let mut m = hump(0.5);
        m.set_params(&[0.2, 0.3, 0.0, 0.1]).unwrap();
        assert_eq!(m.params(), vec![0.2, 0.3, 0.0, 0.1]);
        assert!(m.set_params(&[0.2, -0.3, 0.0, 0.1]).is_err());
        assert_eq!(m.params(), vec![0.2, 0.3, 0.0, 0.1]);
    }
}
