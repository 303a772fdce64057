//! Caplet volatility term structures.
//!
//! A caplet volatility `σ(T)` quotes the Black volatility of the caplet
//! fixing at time `T`; its total variance is `σ(T)²·T`.

use lmm_core::{ensure, errors::Result, Real, Time, Volatility};
use lmm_math::search::upper_bound;

/// Black volatilities of caplets by fixing time.
pub trait CapletVolatilityStructure: std::fmt::Debug + Send + Sync {
    /// Volatility of the caplet fixing at `t`.
    fn volatility(&self, t: Time) -> Volatility;

    /// Total Black variance `σ(t)²·t`.
    fn black_variance(&self, t: Time) -> Real {
        let v = self.volatility(t);
        v * v * t
    }
}

/// The same volatility for every fixing.
#[derive(Debug, Clone, Copy)]
pub struct ConstantCapletVolatility {
    volatility: Volatility,
}

impl ConstantCapletVolatility {
    /// Flat volatility; must be non-negative.
    pub fn new(volatility: Volatility) -> Result<Self> {
        ensure!(volatility >= 0.0, "volatility must be non-negative, got {volatility}");
        Ok(Self { volatility })
    }
}

impl CapletVolatilityStructure for ConstantCapletVolatility {
    fn volatility(&self, _t: Time) -> Volatility {
        self.volatility
    }
}

/// Volatilities quoted at fixing times, interpolated linearly and held flat
/// outside the quoted range.
#[derive(Debug, Clone)]
pub struct CapletVolatilityCurve {
    times: Vec<Time>,
    volatilities: Vec<Volatility>,
}

impl CapletVolatilityCurve {
    /// Curve through `(times[i], volatilities[i])`.
    pub fn new(times: &[Time], volatilities: &[Volatility]) -> Result<Self> {
        ensure!(!times.is_empty(), "need at least one quote");
        ensure!(
            times.len() == volatilities.len(),
            "{} times but {} volatilities",
            times.len(),
            volatilities.len()
        );
        ensure!(
            times.windows(2).all(|w| w[1] > w[0]),
            "quote times must be strictly increasing"
        );
        ensure!(volatilities.iter().all(|&v| v >= 0.0), "volatilities must be non-negative");
        Ok(Self {
            times: times.to_vec(),
            volatilities: volatilities.to_vec(),
        })
    }
}

impl CapletVolatilityStructure for CapletVolatilityCurve {
    fn volatility(&self, t: Time) -> Volatility {
        let n = self.times.len();
        let i = upper_bound(&self.times, t);
        if i == 0 {
            return self.volatilities[0];
        }
        if i == n {
            return self.volatilities[n - 1];
        }
        let (t0, t1) = (self.times[i - 1], self.times[i]);
        let (v0, v1) = (self.volatilities[i - 1], self.volatilities[i]);
        v0 + (v1 - v0) * (t - t0) / (t1 - t0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn constant() {
        let v = ConstantCapletVolatility::new(0.2).unwrap();
        assert_eq!(v.volatility(3.0), 0.2);
        assert_abs_diff_eq!(v.black_variance(2.0), 0.08, epsilon = 1e-15);
        assert!(ConstantCapletVolatility::new(-0.1).is_err());
    }

    #[test]
    fn curve_interpolates_linearly() {
        let v = CapletVolatilityCurve::new(&[1.0, 2.0, 4.0], &[0.20, 0.24, 0.18]).unwrap();
        assert_eq!(v.volatility(0.5), 0.20);
        assert_abs_diff_eq!(v.volatility(1.5), 0.22, epsilon = 1e-15);
        assert_abs_diff_eq!(v.volatility(3.0), 0.21, epsilon = 1e-15);
        assert_eq!(v.volatility(2.0), 0.24);
        assert_eq!(v.volatility(9.0), 0.18);
    }
}
