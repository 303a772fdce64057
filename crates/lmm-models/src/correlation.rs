//! Forward-rate correlation models.
//!
//! Both variants are time independent: `ρ` and its pseudo square root `B`
//! are rebuilt eagerly whenever the parameters change and then read many
//! times during simulation.

use crate::parameter::{assign, Constraint, Parameter};
use lmm_core::{ensure, errors::Result, Real, Time};
use lmm_math::{pseudo_sqrt, rank_reduced_sqrt, Matrix, SalvagingAlgorithm};
use tracing::debug;

fn decay_matrix(size: usize, alpha: Real, beta: Real) -> Matrix {
    Matrix::from_fn(size, size, |i, j| {
        alpha + (1.0 - alpha) * (-beta * (i as Real - j as Real).abs()).exp()
    })
}

// ── Exponential ──────────────────────────────────────────────────────────────

/// `ρ_ij = exp(−β |i − j|)` with a full-rank spectral square root.
#[derive(Debug, Clone)]
pub struct ExponentialCorrelation {
    size: usize,
    params: Vec<Parameter>,
    correlation: Matrix,
    pseudo_sqrt: Matrix,
}

impl ExponentialCorrelation {
    /// Correlation of `size` rates with decay `beta >= 0`.
    pub fn new(size: usize, beta: Real) -> Result<Self> {
        ensure!(size > 0, "correlation model needs at least one rate");
        let params = vec![Parameter::new("beta", beta, Constraint::NonNegative)?];
        let mut model = Self {
            size,
            params,
            correlation: Matrix::identity(size),
            pseudo_sqrt: Matrix::identity(size),
        };
        model.rebuild()?;
        Ok(model)
    }

    fn rebuild(&mut self) -> Result<()> {
        let beta = self.beta();
        self.correlation = decay_matrix(self.size, 0.0, beta);
        self.pseudo_sqrt = pseudo_sqrt(&self.correlation, SalvagingAlgorithm::Spectral)?;
        debug!(size = self.size, beta, "exponential correlation rebuilt");
        Ok(())
    }

    /// Decay rate.
    pub fn beta(&self) -> Real {
        self.params[0].value()
    }
}

// ── Linear-exponential ───────────────────────────────────────────────────────

/// `ρ_ij = α + (1 − α) exp(−β |i − j|)`, optionally reduced to `k` factors.
///
/// The stored correlation is always `B·Bᵗ` for the retained square root, so
/// it stays consistent with the factors actually simulated.
#[derive(Debug, Clone)]
pub struct LinearExponentialCorrelation {
    size: usize,
    factors: usize,
    params: Vec<Parameter>,
    correlation: Matrix,
    pseudo_sqrt: Matrix,
}

impl LinearExponentialCorrelation {
    /// `alpha ∈ [−1, 1]`, `beta >= 0`, `factors ∈ [1, size]` (defaults to
    /// `size`).
    pub fn new(size: usize, alpha: Real, beta: Real, factors: Option<usize>) -> Result<Self> {
        ensure!(size > 0, "correlation model needs at least one rate");
        let factors = factors.unwrap_or(size);
        ensure!(
            (1..=size).contains(&factors),
            "factor count must be in [1, {size}], got {factors}"
        );
        let params = vec![
            Parameter::new("alpha", alpha, Constraint::Boundary { lower: -1.0, upper: 1.0 })?,
            Parameter::new("beta", beta, Constraint::NonNegative)?,
        ];
        let mut model = Self {
            size,
            factors,
            params,
            correlation: Matrix::identity(size),
            pseudo_sqrt: Matrix::identity(size),
        };
        model.rebuild()?;
        Ok(model)
    }

    fn rebuild(&mut self) -> Result<()> {
        let (alpha, beta) = (self.alpha(), self.beta());
        let target = decay_matrix(self.size, alpha, beta);
        let root = rank_reduced_sqrt(&target, self.factors, 1.0, SalvagingAlgorithm::None)?;
        self.correlation = &root * &root.transpose();
        self.pseudo_sqrt = root;
        debug!(size = self.size, factors = self.factors, alpha, beta, "linear-exponential correlation rebuilt");
        Ok(())
    }

    /// Long-run correlation level.
    pub fn alpha(&self) -> Real {
        self.params[0].value()
    }

    /// Decay rate.
    pub fn beta(&self) -> Real {
        self.params[1].value()
    }
}

// ── Closed set of models ──────────────────────────────────────────────────────

/// A correlation model for `size()` forward rates.
#[derive(Debug, Clone)]
pub enum CorrelationModel {
    /// Exponential decay.
    Exponential(ExponentialCorrelation),
    /// Linear plus exponential decay with optional rank reduction.
    LinearExponential(LinearExponentialCorrelation),
}

impl From<ExponentialCorrelation> for CorrelationModel {
    fn from(m: ExponentialCorrelation) -> Self {
        Self::Exponential(m)
    }
}

impl From<LinearExponentialCorrelation> for CorrelationModel {
    fn from(m: LinearExponentialCorrelation) -> Self {
        Self::LinearExponential(m)
    }
}

impl CorrelationModel {
    /// Number of rates.
    pub fn size(&self) -> usize {
        match self {
            Self::Exponential(m) => m.size,
            Self::LinearExponential(m) => m.size,
        }
    }

    /// Number of columns of the pseudo square root.
    pub fn factors(&self) -> usize {
        match self {
            Self::Exponential(m) => m.size,
            Self::LinearExponential(m) => m.factors,
        }
    }

    /// `true` when `ρ` depends on neither time nor state.
    pub fn is_time_independent(&self) -> bool {
        true
    }

    /// Correlation matrix at `(t, x)`.
    pub fn correlation(&self, _t: Time, _x: &[Real]) -> &Matrix {
        match self {
            Self::Exponential(m) => &m.correlation,
            Self::LinearExponential(m) => &m.correlation,
        }
    }

    /// Single correlation entry.
    pub fn correlation_at(&self, i: usize, j: usize, t: Time, x: &[Real]) -> Real {
        self.correlation(t, x)[(i, j)]
    }

    /// Pseudo square root `B` with `B·Bᵗ ≈ ρ`, `size() × factors()`.
    pub fn pseudo_sqrt(&self, _t: Time, _x: &[Real]) -> &Matrix {
        match self {
            Self::Exponential(m) => &m.pseudo_sqrt,
            Self::LinearExponential(m) => &m.pseudo_sqrt,
        }
    }

    /// Calibration parameters.
    pub fn parameters(&self) -> &[Parameter] {
        match self {
            Self::Exponential(m) => &m.params,
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

    /// Replace every parameter and rebuild `ρ` and `B`.
    ///
    /// On failure the model keeps its previous parameters.
    pub fn set_params(&mut self, values: &[Real]) -> Result<()> {
        let mut next = self.clone();
        match &mut next {
            Self::Exponential(m) => {
                assign(&mut m.params, values)?;
                m.rebuild()?;
            }
            Self::LinearExponential(m) => {
                assign(&mut m.params, values)?;
                m.rebuild()?;
            }
        }
        *self = next;
        Ok(())
    }
}
