//! # lmm-math
//!
//! Numerical primitives for the LIBOR market model: matrix/array newtypes
//! over nalgebra, spectral and rank-reduced pseudo square roots, adaptive
//! Gauss-Kronrod quadrature, the normal distribution (via statrs), the Black
//! formula, Gaussian random sequences, a statistics accumulator, sorted-table
//! search and a Nelder-Mead simplex optimiser.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// One-dimensional real arrays.
pub mod array;

/// Black (lognormal) option formula.
pub mod black_formula;

/// Normal distribution.
pub mod distributions;

/// Numerical integration.
pub mod integrals;

/// Two-dimensional real matrices.
pub mod matrix;

/// Eigen decomposition and pseudo square roots.
pub mod matrix_utilities;

/// Multi-dimensional optimisation.
pub mod optimization;

/// Random number generators.
pub mod random_numbers;

/// Binary search over sorted tables.
pub mod search;

/// Statistics accumulators.
pub mod statistics;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use array::Array;
pub use black_formula::black_formula;
pub use distributions::{normal_cdf, normal_cdf_inverse, normal_pdf};
pub use integrals::{GaussKronrodAdaptive, IntegrationResult, Integrator, QuadratureSettings};
pub use matrix::Matrix;
pub use matrix_utilities::{
    get_covariance, normalize_pseudo_root, pseudo_sqrt, rank_reduced_sqrt, symmetric_eigen,
    SalvagingAlgorithm, SymmetricEigen,
};
pub use search::{lower_bound, predecessor, upper_bound};
pub use statistics::Statistics;
