//! Incremental sample statistics.

use lmm_core::Real;

/// Weighted accumulator for mean, variance and the Monte-Carlo error
/// estimate.
#[derive(Debug, Clone)]
pub struct Statistics {
    count: usize,
    sum_w: Real,
    sum_wx: Real,
    sum_wx2: Real,
    min: Real,
    max: Real,
}

impl Default for Statistics {
    fn default() -> Self {
        Self::new()
    }
}

impl Statistics {
    /// Empty accumulator.
    pub fn new() -> Self {
        Self {
            count: 0,
            sum_w: 0.0,
            sum_wx: 0.0,
            sum_wx2: 0.0,
            min: Real::INFINITY,
            max: Real::NEG_INFINITY,
        }
    }

    /// Add a sample with unit weight.
    pub fn add(&mut self, x: Real) {
        self.add_weighted(x, 1.0);
    }

    /// Add a weighted sample.
    pub fn add_weighted(&mut self, x: Real, weight: Real) {
        self.count += 1;
        self.sum_w += weight;
        self.sum_wx += weight * x;
        self.sum_wx2 += weight * x * x;
        self.min = self.min.min(x);
        self.max = self.max.max(x);
    }

    /// Fold another accumulator into this one.
    pub fn merge(&mut self, other: &Statistics) {
        self.count += other.count;
        self.sum_w += other.sum_w;
        self.sum_wx += other.sum_wx;
        self.sum_wx2 += other.sum_wx2;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Number of samples.
    pub fn samples(&self) -> usize {
        self.count
    }

    /// Weighted mean, `None` when empty.
    pub fn mean(&self) -> Option<Real> {
        (self.sum_w > 0.0).then(|| self.sum_wx / self.sum_w)
    }

    /// Bessel-corrected variance, `None` for fewer than two samples.
    pub fn variance(&self) -> Option<Real> {
        if self.sum_w <= 0.0 || self.count < 2 {
            return None;
        }
        let m = self.sum_wx / self.sum_w;
        let s2 = (self.sum_wx2 / self.sum_w - m * m).max(0.0);
        let n = self.count as Real;
        Some(s2 * n / (n - 1.0))
    }

    /// Standard deviation.
    pub fn std_dev(&self) -> Option<Real> {
        self.variance().map(Real::sqrt)
    }

    /// Standard error of the mean, `sqrt(variance / n)`.
    pub fn error_estimate(&self) -> Option<Real> {
        self.variance().map(|v| (v / self.count as Real).sqrt())
    }

    /// Smallest sample.
    pub fn minimum(&self) -> Option<Real> {
        (self.count > 0).then_some(self.min)
    }

    /// Largest sample.
    pub fn maximum(&self) -> Option<Real> {
        (self.count > 0).then_some(self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moments() {
        let mut s = Statistics::new();
        for x in [1.0, 2.0, 3.0, 4.0, 5.0] {
            s.add(x);
        }
        assert_eq!(s.samples(), 5);
        assert!((s.mean().unwrap() - 3.0).abs() < 1e-12);
        assert!((s.variance().unwrap() - 2.5).abs() < 1e-12);
        assert!((s.error_estimate().unwrap() - 0.5_f64.sqrt()).abs() < 1e-12);
        assert_eq!(s.minimum(), Some(1.0));
        assert_eq!(s.maximum(), Some(5.0));
    }

    #[test]
    fn merge_matches_single_pass() {
        let mut all = Statistics::new();
        let mut left = Statistics::new();
        let mut right = Statistics::new();
        for k in 0..10 {
            let x = (k as Real).sin();
            all.add(x);
            if k < 4 {
                left.add(x);
            } else {
                right.add(x);
            }
        }
        left.merge(&right);
        assert_eq!(left.samples(), 10);
        assert!((left.mean().unwrap() - all.mean().unwrap()).abs() < 1e-14);
        assert!((left.variance().unwrap() - all.variance().unwrap()).abs() < 1e-14);
    }

    #[test]
    fn empty() {
        let s = Statistics::default();
        assert!(s.mean().is_none());
        assert!(s.variance().is_none());
        assert!(s.error_estimate().is_none());
        assert!(s.minimum().is_none());
    }
}
