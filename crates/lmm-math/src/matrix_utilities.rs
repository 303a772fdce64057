//! Symmetric eigen decomposition and pseudo square roots.
//!
//! Both square-root routines return a matrix `B` whose rows are normalised so
//! that `(B·Bᵗ)_ii` equals the input diagonal. For correlation matrices this
//! keeps a unit diagonal after negative eigenvalues are clipped or trailing
//! factors are dropped.

use crate::matrix::Matrix;
use lmm_core::{
    ensure,
    errors::{Error, Result},
    Real,
};
use tracing::{debug, warn};

/// How to treat negative eigenvalues of a matrix that should be positive
/// semi-definite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SalvagingAlgorithm {
    /// Reject matrices with materially negative eigenvalues.
    None,
    /// Clip negative eigenvalues to zero.
    #[default]
    Spectral,
}

/// Eigenvalues in descending order with matching eigenvector columns.
#[derive(Debug, Clone)]
pub struct SymmetricEigen {
    /// Eigenvalues, largest first.
    pub values: Vec<Real>,
    /// Column `k` is the eigenvector of `values[k]`.
    pub vectors: Matrix,
}

/// Eigen decomposition of a symmetric matrix, sorted by descending eigenvalue.
pub fn symmetric_eigen(m: &Matrix) -> Result<SymmetricEigen> {
    ensure!(m.is_square(), "matrix must be square, got {}x{}", m.rows(), m.cols());
    ensure!(!m.is_empty(), "matrix must not be empty");
    let eigen = m.inner().clone().symmetric_eigen();

    let n = m.rows();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));

    let values = order.iter().map(|&k| eigen.eigenvalues[k]).collect();
    let vectors = Matrix::from_fn(n, n, |i, j| eigen.eigenvectors[(i, order[j])]);
    Ok(SymmetricEigen { values, vectors })
}

/// Rescale each row of `root` so that its squared norm equals `m[(i, i)]`.
///
/// Rows with zero norm are left untouched.
pub fn normalize_pseudo_root(m: &Matrix, root: &mut Matrix) -> Result<()> {
    ensure!(
        m.rows() == root.rows(),
        "pseudo root has {} rows, matrix has {}",
        root.rows(),
        m.rows()
    );
    for i in 0..root.rows() {
        let norm = root.row_dot(i, i);
        if norm > 0.0 {
            let scale = (m[(i, i)] / norm).sqrt();
            for j in 0..root.cols() {
                root[(i, j)] *= scale;
            }
        }
    }
    Ok(())
}

fn check_symmetric(m: &Matrix) -> Result<()> {
    ensure!(m.is_square(), "matrix must be square, got {}x{}", m.rows(), m.cols());
    let scale = (0..m.rows()).fold(1.0_f64, |acc, i| acc.max(m[(i, i)].abs()));
    ensure!(m.is_symmetric(1e-12 * scale), "matrix is not symmetric");
    Ok(())
}

fn negative_tolerance(values: &[Real]) -> Real {
    1e-12 * values.first().map_or(1.0, |v| v.abs().max(1.0))
}

/// Clip eigenvalues according to `salvaging`; fail for `None` when a value
/// is materially negative.
fn salvage(values: &mut [Real], salvaging: SalvagingAlgorithm) -> Result<()> {
    let tolerance = negative_tolerance(values);
    let smallest = values.last().copied().unwrap_or(0.0);
    match salvaging {
        SalvagingAlgorithm::None => {
            ensure!(
                smallest >= -tolerance,
                "matrix is not positive semi-definite (smallest eigenvalue {smallest:e})"
            );
        }
        SalvagingAlgorithm::Spectral => {
            if smallest < -tolerance {
                warn!(smallest, "spectral salvaging clips negative eigenvalues");
            }
        }
    }
    for v in values.iter_mut() {
        *v = v.max(0.0);
    }
    Ok(())
}

/// Full-rank pseudo square root `B` with `B·Bᵗ ≈ m`.
pub fn pseudo_sqrt(m: &Matrix, salvaging: SalvagingAlgorithm) -> Result<Matrix> {
    check_symmetric(m)?;
    let SymmetricEigen { mut values, vectors } = symmetric_eigen(m)?;
    salvage(&mut values, salvaging)?;

    let n = m.rows();
    let mut root = Matrix::from_fn(n, n, |i, j| vectors[(i, j)] * values[j].sqrt());
    normalize_pseudo_root(m, &mut root)?;
    Ok(root)
}

/// Pseudo square root with at most `max_rank` columns.
///
/// Keeps the leading eigen-components until `component_retained_percentage`
/// of the spectrum is explained, at least one and at most `max_rank`.
pub fn rank_reduced_sqrt(
    m: &Matrix,
    max_rank: usize,
    component_retained_percentage: Real,
    salvaging: SalvagingAlgorithm,
) -> Result<Matrix> {
    check_symmetric(m)?;
    ensure!(
        component_retained_percentage > 0.0 && component_retained_percentage <= 1.0,
        "retained percentage must be in (0, 1], got {component_retained_percentage}"
    );
    ensure!(max_rank >= 1, "max rank must be at least 1");

    let SymmetricEigen { mut values, vectors } = symmetric_eigen(m)?;
    salvage(&mut values, salvaging)?;

    let total: Real = values.iter().sum();
    let mut enough = component_retained_percentage * total;
    if component_retained_percentage == 1.0 {
        enough *= 1.1;
    }
    let mut explained = values[0];
    let mut retained = 1;
    while explained < enough && retained < values.len() {
        explained += values[retained];
        retained += 1;
    }
    let retained = retained.min(max_rank);
    debug!(size = m.rows(), retained, "rank-reduced square root");

    let mut root = Matrix::from_fn(m.rows(), retained, |i, j| vectors[(i, j)] * values[j].sqrt());
    normalize_pseudo_root(m, &mut root)?;
    Ok(root)
}

/// Covariance `C_ij = σ_i ρ_ij σ_j`.
pub fn get_covariance(volatilities: &[Real], correlation: &Matrix) -> Result<Matrix> {
    let n = volatilities.len();
    if correlation.rows() != n || correlation.cols() != n {
        return Err(Error::Configuration(format!(
            "correlation matrix must be {n}x{n}, got {}x{}",
            correlation.rows(),
            correlation.cols()
        )));
    }
    Ok(Matrix::from_fn(n, n, |i, j| {
        volatilities[i] * correlation[(i, j)] * volatilities[j]
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exponential(n: usize, beta: Real) -> Matrix {
        Matrix::from_fn(n, n, |i, j| (-beta * (i as Real - j as Real).abs()).exp())
    }

    #[test]
    fn eigenvalues_are_sorted_descending() {
        let m = Matrix::from_row_slice(3, 3, &[2.0, 0.0, 0.0, 0.0, 5.0, 0.0, 0.0, 0.0, 1.0]);
        let eig = symmetric_eigen(&m).unwrap();
        assert_eq!(eig.values.len(), 3);
        assert!((eig.values[0] - 5.0).abs() < 1e-12);
        assert!((eig.values[1] - 2.0).abs() < 1e-12);
        assert!((eig.values[2] - 1.0).abs() < 1e-12);
        // leading eigenvector is e_1
        assert!((eig.vectors[(1, 0)].abs() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn pseudo_sqrt_reproduces_correlation() {
        let rho = exponential(6, 0.2);
        let b = pseudo_sqrt(&rho, SalvagingAlgorithm::Spectral).unwrap();
        let rebuilt = &b * &b.transpose();
        assert!(rebuilt.max_abs_diff(&rho) < 1e-10);
    }

    #[test]
    fn spectral_salvaging_keeps_unit_diagonal() {
        // not positive semi-definite
        let m = Matrix::from_row_slice(3, 3, &[1.0, 0.9, -0.9, 0.9, 1.0, 0.9, -0.9, 0.9, 1.0]);
        assert!(pseudo_sqrt(&m, SalvagingAlgorithm::None).unwrap_err().is_configuration());
        let b = pseudo_sqrt(&m, SalvagingAlgorithm::Spectral).unwrap();
        let rebuilt = &b * &b.transpose();
        for i in 0..3 {
            assert!((rebuilt[(i, i)] - 1.0).abs() < 1e-12);
        }
        let eig = symmetric_eigen(&rebuilt).unwrap();
        assert!(eig.values[2] > -1e-12);
    }

    #[test]
    fn rank_reduction_caps_factors() {
        let rho = exponential(8, 0.05);
        let b = rank_reduced_sqrt(&rho, 3, 1.0, SalvagingAlgorithm::None).unwrap();
        assert_eq!(b.cols(), 3);
        let rebuilt = &b * &b.transpose();
        for i in 0..8 {
            assert!((rebuilt[(i, i)] - 1.0).abs() < 1e-12);
        }
        // three factors still explain most of a slowly decaying correlation
        assert!(rebuilt.max_abs_diff(&rho) < 0.06);
    }

    #[test]
    fn rank_one_for_perfect_correlation() {
        let rho = Matrix::from_element(4, 4, 1.0);
        let b = rank_reduced_sqrt(&rho, 4, 0.9, SalvagingAlgorithm::None).unwrap();
        assert_eq!(b.cols(), 1);
        for i in 0..4 {
            assert!((b[(i, 0)].abs() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn rank_reduction_rejects_bad_inputs() {
        let rho = exponential(3, 0.1);
        assert!(rank_reduced_sqrt(&rho, 0, 1.0, SalvagingAlgorithm::None).is_err());
        assert!(rank_reduced_sqrt(&rho, 2, 0.0, SalvagingAlgorithm::None).is_err());
        let asym = Matrix::from_row_slice(2, 2, &[1.0, 0.5, 0.1, 1.0]);
        assert!(rank_reduced_sqrt(&asym, 2, 1.0, SalvagingAlgorithm::None).is_err());
    }

    #[test]
    fn covariance_from_vols() {
        let corr = Matrix::from_row_slice(2, 2, &[1.0, 0.5, 0.5, 1.0]);
        let cov = get_covariance(&[0.2, 0.3], &corr).unwrap();
        assert!((cov[(0, 0)] - 0.04).abs() < 1e-15);
        assert!((cov[(0, 1)] - 0.03).abs() < 1e-15);
        assert!((cov[(1, 1)] - 0.09).abs() < 1e-15);
        assert!(get_covariance(&[0.2], &corr).is_err());
    }
}
