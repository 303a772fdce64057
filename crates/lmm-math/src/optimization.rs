//! Multi-dimensional minimisation.
//!
//! Cost functions, parameter-space constraints, end criteria and the
//! Nelder-Mead simplex used for model calibration.

use crate::array::Array;
use lmm_core::{
    ensure,
    errors::{Error, Result},
    Real,
};
use serde::{Deserialize, Serialize};

// ── Cost function ─────────────────────────────────────────────────────────────

/// A least-squares objective.
pub trait CostFunction {
    /// Residuals at `x`.
    fn values(&self, x: &Array) -> Result<Array>;

    /// Scalar cost `½ Σ r²`.
    fn value(&self, x: &Array) -> Result<Real> {
        Ok(0.5 * self.values(x)?.norm_squared())
    }
}

// ── Constraints ───────────────────────────────────────────────────────────────

/// Feasible region of a parameter vector.
pub trait Constraint {
    /// `true` if `x` lies in the feasible region.
    fn test(&self, x: &Array) -> bool;
}

/// Every point is feasible.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoConstraint;

impl Constraint for NoConstraint {
    fn test(&self, _x: &Array) -> bool {
        true
    }
}

/// Every component must be strictly positive.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositiveConstraint;

impl Constraint for PositiveConstraint {
    fn test(&self, x: &Array) -> bool {
        x.iter().all(|&v| v > 0.0)
    }
}

/// Every component must lie in `[lower, upper]`.
#[derive(Debug, Clone, Copy)]
pub struct BoundaryConstraint {
    /// Lower bound.
    pub lower: Real,
    /// Upper bound.
    pub upper: Real,
}

impl BoundaryConstraint {
    /// Bounds shared by every component.
    pub fn new(lower: Real, upper: Real) -> Self {
        Self { lower, upper }
    }
}

impl Constraint for BoundaryConstraint {
    fn test(&self, x: &Array) -> bool {
        x.iter().all(|&v| v >= self.lower && v <= self.upper)
    }
}

// ── End criteria ──────────────────────────────────────────────────────────────

/// Stopping rules for an optimisation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndCriteria {
    /// Maximum number of iterations.
    pub max_iterations: usize,
    /// Iterations without improvement before stopping.
    pub max_stationary_state_iterations: usize,
    /// Stop once the cost drops below this.
    pub root_epsilon: Real,
    /// Improvement smaller than this counts as stationary.
    pub function_epsilon: Real,
}

impl EndCriteria {
    /// Explicit criteria.
    pub fn new(
        max_iterations: usize,
        max_stationary_state_iterations: usize,
        root_epsilon: Real,
        function_epsilon: Real,
    ) -> Self {
        Self {
            max_iterations,
            max_stationary_state_iterations,
            root_epsilon,
            function_epsilon,
        }
    }
}

impl Default for EndCriteria {
    fn default() -> Self {
        Self::new(1000, 100, 1e-8, 1e-8)
    }
}

/// Why an optimisation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndCriteriaType {
    /// Iteration limit reached.
    MaxIterations,
    /// Cost below the root epsilon.
    RootEpsilon,
    /// No improvement for too long.
    StationaryPoint,
}

/// Result of an optimisation.
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    /// Best parameters found.
    pub x: Array,
    /// Cost at `x`.
    pub value: Real,
    /// Iterations performed.
    pub iterations: usize,
    /// Stopping reason.
    pub end_type: EndCriteriaType,
}

// ── Simplex (Nelder–Mead) ─────────────────────────────────────────────────────

/// Nelder–Mead simplex; infeasible trial points are rejected by giving them
/// an infinite cost.
#[derive(Debug, Clone, Copy)]
pub struct Simplex {
    lambda: Real,
}

impl Simplex {
    /// Simplex whose initial edges have length `lambda`.
    pub fn new(lambda: Real) -> Self {
        Self { lambda }
    }

    fn cost<C: CostFunction, K: Constraint>(cost_fn: &C, constraint: &K, x: &Array) -> Result<Real> {
        if !constraint.test(x) {
            return Ok(Real::INFINITY);
        }
        let v = cost_fn.value(x)?;
        Ok(if v.is_finite() { v } else { Real::INFINITY })
    }

    /// Minimise `cost_fn` from `initial` within `constraint`.
    pub fn minimize<C: CostFunction, K: Constraint>(
        &self,
        cost_fn: &C,
        constraint: &K,
        initial: &Array,
        end_criteria: &EndCriteria,
    ) -> Result<OptimizationResult> {
        ensure!(self.lambda > 0.0, "simplex step must be positive");
        ensure!(!initial.is_empty(), "nothing to optimise");
        ensure!(constraint.test(initial), "initial point violates the constraint");

        let n = initial.size();
        let mut vertices = Vec::with_capacity(n + 1);
        vertices.push(initial.clone());
        for i in 0..n {
            let mut v = initial.clone();
            v[i] += self.lambda;
            if !constraint.test(&v) {
                v[i] = initial[i] - self.lambda;
            }
            vertices.push(v);
        }
        let mut values = vertices
            .iter()
            .map(|v| Self::cost(cost_fn, constraint, v))
            .collect::<Result<Vec<_>>>()?;

        let mut iterations = 0;
        let mut stationary = 0;
        let mut previous_best = Real::INFINITY;

        loop {
            let mut order: Vec<usize> = (0..=n).collect();
            order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
            let (best, worst, second_worst) = (order[0], order[n], order[n.saturating_sub(1)]);

            iterations += 1;
            let finish = |end_type| OptimizationResult {
                x: vertices[best].clone(),
                value: values[best],
                iterations,
                end_type,
            };
            if values[best] < end_criteria.root_epsilon {
                return Ok(finish(EndCriteriaType::RootEpsilon));
            }
            if (previous_best - values[best]).abs() < end_criteria.function_epsilon {
                stationary += 1;
                if stationary >= end_criteria.max_stationary_state_iterations {
                    return Ok(finish(EndCriteriaType::StationaryPoint));
                }
            } else {
                stationary = 0;
            }
            previous_best = values[best];
            if iterations >= end_criteria.max_iterations {
                return Ok(finish(EndCriteriaType::MaxIterations));
            }

            let mut centroid = Array::zeros(n);
            for (i, v) in vertices.iter().enumerate() {
                if i != worst {
                    centroid = &centroid + v;
                }
            }
            let centroid = &centroid / n as Real;

            // reflect, then expand or contract
            let reflected = &(&centroid * 2.0) - &vertices[worst];
            let fr = Self::cost(cost_fn, constraint, &reflected)?;
            if fr < values[best] {
                let expanded = &(&reflected * 2.0) - &centroid;
                let fe = Self::cost(cost_fn, constraint, &expanded)?;
                if fe < fr {
                    vertices[worst] = expanded;
                    values[worst] = fe;
                } else {
                    vertices[worst] = reflected;
                    values[worst] = fr;
                }
                continue;
            }
            if fr < values[second_worst] {
                vertices[worst] = reflected;
                values[worst] = fr;
                continue;
            }
            let contracted = if fr < values[worst] {
                &(&centroid + &reflected) / 2.0
            } else {
                &(&centroid + &vertices[worst]) / 2.0
            };
            let fc = Self::cost(cost_fn, constraint, &contracted)?;
            if fc < values[worst].min(fr) {
                vertices[worst] = contracted;
                values[worst] = fc;
                continue;
            }
            for i in 0..=n {
                if i != best {
                    vertices[i] = &(&vertices[best] + &vertices[i]) / 2.0;
                    values[i] = Self::cost(cost_fn, constraint, &vertices[i])?;
                }
            }
            if values.iter().all(|v| v.is_infinite()) {
                return Err(Error::NonConvergence(
                    "simplex collapsed onto infeasible points".into(),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Rosenbrock;
    impl CostFunction for Rosenbrock {
        fn values(&self, x: &Array) -> Result<Array> {
            Ok(Array::from_slice(&[1.0 - x[0], 10.0 * (x[1] - x[0] * x[0])]))
        }
    }

    struct Shifted;
    impl CostFunction for Shifted {
        fn values(&self, x: &Array) -> Result<Array> {
            Ok(Array::from_slice(&[x[0] - 3.0]))
        }
    }

    #[test]
    fn simplex_quadratic() {
        let ec = EndCriteria::new(1000, 100, 1e-14, 1e-16);
        let r = Simplex::new(0.5)
            .minimize(&Shifted, &NoConstraint, &Array::from_slice(&[0.0]), &ec)
            .unwrap();
        assert!((r.x[0] - 3.0).abs() < 1e-4, "x = {}", r.x[0]);
    }

    #[test]
    fn simplex_rosenbrock() {
        let ec = EndCriteria::new(5000, 500, 1e-14, 1e-16);
        let r = Simplex::new(0.5)
            .minimize(&Rosenbrock, &NoConstraint, &Array::from_slice(&[-1.0, 1.0]), &ec)
            .unwrap();
        assert!((r.x[0] - 1.0).abs() < 5e-2, "x0 = {}", r.x[0]);
        assert!((r.x[1] - 1.0).abs() < 1e-1, "x1 = {}", r.x[1]);
    }

    #[test]
    fn simplex_respects_constraint() {
        let ec = EndCriteria::default();
        let r = Simplex::new(0.5)
            .minimize(
                &Shifted,
                &BoundaryConstraint::new(0.0, 2.0),
                &Array::from_slice(&[1.0]),
                &ec,
            )
            .unwrap();
        assert!(r.x[0] <= 2.0 && (r.x[0] - 2.0).abs() < 1e-3, "x = {}", r.x[0]);
    }

    #[test]
    fn infeasible_start_is_rejected() {
        let err = Simplex::new(0.5)
            .minimize(
                &Shifted,
                &PositiveConstraint,
                &Array::from_slice(&[-1.0]),
                &EndCriteria::default(),
            )
            .unwrap_err();
        assert!(err.is_configuration());
    }
}
