//! Named calibration parameters and their feasible regions.
//!
//! Each sub-model owns a small vector of [`Parameter`]s. Composite models
//! expose a flattened parameter vector whose blocks are recorded in a
//! [`ParameterLayout`], so slicing is checked rather than implied by index
//! arithmetic.

use lmm_core::{ensure, errors::Result, Error, Real};
use lmm_math::optimization;
use lmm_math::Array;
use std::ops::Range;

/// Feasible region of a single scalar parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constraint {
    /// Any finite value.
    None,
    /// `value >= 0`.
    NonNegative,
    /// `lower <= value <= upper`.
    Boundary {
        /// Lower bound (inclusive).
        lower: Real,
        /// Upper bound (inclusive).
        upper: Real,
    },
}

impl Constraint {
    /// `true` if `value` is feasible.
    pub fn test(&self, value: Real) -> bool {
        value.is_finite()
            && match *self {
                Constraint::None => true,
                Constraint::NonNegative => value >= 0.0,
                Constraint::Boundary { lower, upper } => value >= lower && value <= upper,
            }
    }
}

/// A named scalar model parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: &'static str,
    value: Real,
    constraint: Constraint,
}

impl Parameter {
    /// Parameter with an initial value, which must be feasible.
    pub fn new(name: &'static str, value: Real, constraint: Constraint) -> Result<Self> {
        let p = Self {
            name,
            value,
            constraint,
        };
        p.check(value)?;
        Ok(p)
    }

    fn check(&self, value: Real) -> Result<()> {
        if self.constraint.test(value) {
            Ok(())
        } else {
            Err(Error::Configuration(format!(
                "parameter {} = {value} violates {:?}",
                self.name, self.constraint
            )))
        }
    }

    /// Parameter name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Current value.
    pub fn value(&self) -> Real {
        self.value
    }

    /// Feasible region.
    pub fn constraint(&self) -> Constraint {
        self.constraint
    }
}

/// Replace every value in `params` from `values`.
///
/// All values are validated before any is written, so a failed call leaves
/// the parameters untouched.
pub fn assign(params: &mut [Parameter], values: &[Real]) -> Result<()> {
    ensure!(
        values.len() == params.len(),
        "expected {} parameter values, got {}",
        params.len(),
        values.len()
    );
    for (p, &v) in params.iter().zip(values) {
        p.check(v)?;
    }
    for (p, &v) in params.iter_mut().zip(values) {
        p.value = v;
    }
    Ok(())
}

// ── Layout ────────────────────────────────────────────────────────────────────

/// Offsets of sub-model blocks inside a flattened parameter vector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterLayout {
    blocks: Vec<(&'static str, Range<usize>)>,
}

impl ParameterLayout {
    /// Empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a block of `len` parameters and return its range.
    pub fn push(&mut self, name: &'static str, len: usize) -> Range<usize> {
        let start = self.len();
        let range = start..start + len;
        self.blocks.push((name, range.clone()));
        range
    }

    /// Total number of parameters.
    pub fn len(&self) -> usize {
        self.blocks.last().map_or(0, |(_, r)| r.end)
    }

    /// `true` if no parameters are laid out.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Range of the block called `name`.
    pub fn block(&self, name: &str) -> Option<Range<usize>> {
        self.blocks
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, r)| r.clone())
    }

    /// Split `values` into one slice per block, failing on a length mismatch.
    pub fn split<'a>(&self, values: &'a [Real]) -> Result<Vec<&'a [Real]>> {
        ensure!(
            values.len() == self.len(),
            "parameter vector has {} entries, layout expects {}",
            values.len(),
            self.len()
        );
        Ok(self.blocks.iter().map(|(_, r)| &values[r.clone()]).collect())
    }
}

// ── Optimiser bridge ──────────────────────────────────────────────────────────

/// Per-component constraints of a flattened parameter vector, usable by the
/// optimisers.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterConstraint {
    constraints: Vec<Constraint>,
}

impl ParameterConstraint {
    /// Constraints taken from `params`, in order.
    pub fn from_parameters(params: &[Parameter]) -> Self {
        Self {
            constraints: params.iter().map(Parameter::constraint).collect(),
        }
    }
}

impl optimization::Constraint for ParameterConstraint {
    fn test(&self, x: &Array) -> bool {
        x.size() == self.constraints.len()
            && self.constraints.iter().zip(x.iter()).all(|(c, &v)| c.test(v))
    }
}
