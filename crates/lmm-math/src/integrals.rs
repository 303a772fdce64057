//! Numerical integration.
//!
//! Adaptive Gauss-Kronrod (G7/K15) quadrature with an evaluation budget, and
//! [`QuadratureSettings`], the knob set used by every covariance integral of
//! the model: the interval is split into equal sub-intervals and each one is
//! integrated adaptively.

use lmm_core::{
    ensure,
    errors::{Error, Result},
    Real,
};
use serde::{Deserialize, Serialize};

/// Outcome of a quadrature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegrationResult {
    /// Integral estimate.
    pub value: Real,
    /// Sum of the accepted Gauss/Kronrod discrepancies.
    pub error: Real,
    /// Number of integrand evaluations.
    pub evaluations: usize,
}

/// A numerical integrator.
pub trait Integrator {
    /// Integrate `f` on `[a, b]`.
    fn integrate<F: Fn(Real) -> Real>(&self, f: F, a: Real, b: Real) -> Result<IntegrationResult>;
}

// ── Gauss-Kronrod ─────────────────────────────────────────────────────────────

// Kronrod abscissae on [0, 1], largest first; odd positions are Gauss nodes.
const XGK: [Real; 8] = [
    0.991_455_371_120_812_639,
    0.949_107_912_342_758_525,
    0.864_864_423_359_769_073,
    0.741_531_185_599_394_440,
    0.586_087_235_467_691_130,
    0.405_845_151_377_397_167,
    0.207_784_955_007_898_468,
    0.0,
];

const WGK: [Real; 8] = [
    0.022_935_322_010_529_225,
    0.063_092_092_629_978_553,
    0.104_790_010_322_250_184,
    0.140_653_259_715_525_919,
    0.169_004_726_639_267_903,
    0.190_350_578_064_785_410,
    0.204_432_940_075_298_892,
    0.209_482_141_084_727_828,
];

// Gauss weights for XGK[1], XGK[3], XGK[5] and the centre.
const WG: [Real; 4] = [
    0.129_484_966_168_869_693,
    0.279_705_391_489_276_668,
    0.381_830_050_505_118_945,
    0.417_959_183_673_469_388,
];

/// Adaptive 15-point Gauss-Kronrod integration.
///
/// A panel is accepted once its Gauss and Kronrod estimates agree to within
/// the absolute tolerance; otherwise it is bisected. The tolerance is not
/// split between halves, so panels straddling a jump still terminate.
/// Bisection that would exceed `max_evaluations` fails with
/// [`Error::NonConvergence`].
#[derive(Debug, Clone)]
pub struct GaussKronrodAdaptive {
    absolute_accuracy: Real,
    max_evaluations: usize,
}

impl GaussKronrodAdaptive {
    /// Create a new integrator.
    pub fn new(absolute_accuracy: Real, max_evaluations: usize) -> Self {
        Self {
            absolute_accuracy,
            max_evaluations,
        }
    }

    fn panel<F: Fn(Real) -> Real>(f: &F, a: Real, b: Real) -> (Real, Real) {
        let half = 0.5 * (b - a);
        let centre = 0.5 * (a + b);
        let fc = f(centre);
        let mut gauss = fc * WG[3];
        let mut kronrod = fc * WGK[7];
        for (k, (&x, &w)) in XGK[..7].iter().zip(&WGK[..7]).enumerate() {
            let dx = half * x;
            let pair = f(centre - dx) + f(centre + dx);
            kronrod += w * pair;
            if k % 2 == 1 {
                gauss += WG[k / 2] * pair;
            }
        }
        (half * kronrod, half * gauss)
    }

    fn recurse<F: Fn(Real) -> Real>(
        &self,
        f: &F,
        a: Real,
        b: Real,
        acc: &mut IntegrationResult,
    ) -> Result<()> {
        let (kronrod, gauss) = Self::panel(f, a, b);
        acc.evaluations += 15;
        let discrepancy = (kronrod - gauss).abs();
        if discrepancy < self.absolute_accuracy {
            acc.value += kronrod;
            acc.error += discrepancy;
            return Ok(());
        }
        if acc.evaluations + 30 > self.max_evaluations {
            return Err(Error::NonConvergence(format!(
                "Gauss-Kronrod: {} evaluations exceed the budget of {} on [{a}, {b}]",
                acc.evaluations + 30,
                self.max_evaluations
            )));
        }
        let mid = 0.5 * (a + b);
        self.recurse(f, a, mid, acc)?;
        self.recurse(f, mid, b, acc)
    }
}

impl Integrator for GaussKronrodAdaptive {
    fn integrate<F: Fn(Real) -> Real>(&self, f: F, a: Real, b: Real) -> Result<IntegrationResult> {
        ensure!(
            self.absolute_accuracy > 0.0,
            "absolute accuracy must be positive, got {}",
            self.absolute_accuracy
        );
        ensure!(self.max_evaluations >= 15, "evaluation budget must allow one panel");
        let mut acc = IntegrationResult {
            value: 0.0,
            error: 0.0,
            evaluations: 0,
        };
        if a == b {
            return Ok(acc);
        }
        self.recurse(&f, a, b, &mut acc)?;
        Ok(acc)
    }
}

// ── Settings ──────────────────────────────────────────────────────────────────

/// Quadrature configuration for covariance integrals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadratureSettings {
    /// Absolute tolerance per adaptive panel.
    pub tolerance: Real,
    /// Evaluation budget per sub-interval.
    pub max_evaluations: usize,
    /// Number of equal sub-intervals.
    pub sub_intervals: usize,
}

impl Default for QuadratureSettings {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_evaluations: 10_000,
            sub_intervals: 64,
        }
    }
}

impl QuadratureSettings {
    /// Integrate `f` on `[a, b]` over `sub_intervals` equal pieces.
    pub fn integrate<F: Fn(Real) -> Real>(&self, f: F, a: Real, b: Real) -> Result<IntegrationResult> {
        ensure!(self.sub_intervals > 0, "at least one sub-interval is required");
        let integrator = GaussKronrodAdaptive::new(self.tolerance, self.max_evaluations);
        let step = (b - a) / self.sub_intervals as Real;
        let mut total = IntegrationResult {
            value: 0.0,
            error: 0.0,
            evaluations: 0,
        };
        for k in 0..self.sub_intervals {
            let lo = a + k as Real * step;
            let hi = if k + 1 == self.sub_intervals { b } else { lo + step };
            let piece = integrator.integrate(&f, lo, hi)?;
            total.value += piece.value;
            total.error += piece.error;
            total.evaluations += piece.evaluations;
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn polynomials_are_exact_in_one_panel() {
        let gk = GaussKronrodAdaptive::new(1e-12, 1000);
        let r = gk.integrate(|x| x.powi(5) - 3.0 * x * x + 1.0, -1.0, 2.0).unwrap();
        assert_eq!(r.evaluations, 15);
        // [x^6/6 - x^3 + x] from -1 to 2
        assert_abs_diff_eq!(r.value, (64.0 / 6.0 - 8.0 + 2.0) - (1.0 / 6.0 + 1.0 - 1.0), epsilon = 1e-12);
    }

    #[test]
    fn smooth_integrand() {
        let gk = GaussKronrodAdaptive::new(1e-12, 10_000);
        let r = gk.integrate(|x| (-x).exp() * x.sin(), 0.0, 10.0).unwrap();
        let exact = 0.5 * (1.0 - (-10.0_f64).exp() * (10.0_f64.sin() + 10.0_f64.cos()));
        assert_abs_diff_eq!(r.value, exact, epsilon = 1e-10);
        assert!(r.error < 1e-9);
    }

    #[test]
    fn jump_terminates() {
        let gk = GaussKronrodAdaptive::new(1e-10, 10_000);
        let r = gk.integrate(|x| if x < 0.3 { 1.0 } else { 0.0 }, 0.0, 1.0).unwrap();
        assert_abs_diff_eq!(r.value, 0.3, epsilon = 1e-8);
    }

    #[test]
    fn budget_exhaustion_is_non_convergence() {
        let gk = GaussKronrodAdaptive::new(1e-14, 60);
        let err = gk.integrate(|x| x.abs().sqrt().sin() / (x.abs() + 1e-9), -1.0, 1.0).unwrap_err();
        assert!(err.is_non_convergence());
    }

    #[test]
    fn empty_interval() {
        let r = QuadratureSettings::default().integrate(|x| x, 1.0, 1.0).unwrap();
        assert_eq!(r.value, 0.0);
    }

    #[test]
    fn sub_intervals_sum() {
        let settings = QuadratureSettings::default();
        let r = settings.integrate(|x| x * x, 0.0, 3.0).unwrap();
        assert_abs_diff_eq!(r.value, 9.0, epsilon = 1e-12);
        assert_eq!(r.evaluations, 15 * settings.sub_intervals);
    }
}
