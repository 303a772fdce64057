//! `Matrix`: a two-dimensional matrix of reals.
//!
//! Thin newtype around `nalgebra::DMatrix<f64>` with `(row, col)` indexing.
//! Correlation, pseudo-square-root and covariance matrices of the model are
//! all carried as `Matrix`.

use lmm_core::Real;
use nalgebra::DMatrix;
use std::ops::{Add, Index, IndexMut, Mul, Sub};

/// A dynamically-sized 2D matrix of `Real` values.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix(DMatrix<Real>);

impl Matrix {
    /// Zero-filled `rows × cols` matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self(DMatrix::zeros(rows, cols))
    }

    /// Matrix filled with `value`.
    pub fn from_element(rows: usize, cols: usize, value: Real) -> Self {
        Self(DMatrix::from_element(rows, cols, value))
    }

    /// `n × n` identity.
    pub fn identity(n: usize) -> Self {
        Self(DMatrix::identity(n, n))
    }

    /// Build from a closure over `(row, col)`.
    pub fn from_fn<F: FnMut(usize, usize) -> Real>(rows: usize, cols: usize, f: F) -> Self {
        Self(DMatrix::from_fn(rows, cols, f))
    }

    /// Build from row-major data.
    pub fn from_row_slice(rows: usize, cols: usize, data: &[Real]) -> Self {
        Self(DMatrix::from_row_slice(rows, cols, data))
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.0.nrows()
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.0.ncols()
    }

    /// `true` if rows == cols.
    pub fn is_square(&self) -> bool {
        self.0.is_square()
    }

    /// `true` if the matrix has no elements.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the inner `DMatrix`.
    pub fn inner(&self) -> &DMatrix<Real> {
        &self.0
    }

    /// Transpose.
    pub fn transpose(&self) -> Self {
        Self(self.0.transpose())
    }

    /// Copy of row `i`.
    pub fn row(&self, i: usize) -> Vec<Real> {
        self.0.row(i).iter().copied().collect()
    }

    /// Dot product of row `i` with row `j`.
    pub fn row_dot(&self, i: usize, j: usize) -> Real {
        self.0.row(i).dot(&self.0.row(j))
    }

    /// Dot product of row `i` with a vector.
    pub fn row_dot_vec(&self, i: usize, v: &[Real]) -> Real {
        self.0.row(i).iter().zip(v).map(|(a, b)| a * b).sum()
    }

    /// Matrix-vector product.
    pub fn mul_vec(&self, v: &[Real]) -> Vec<Real> {
        (0..self.rows()).map(|i| self.row_dot_vec(i, v)).collect()
    }

    /// First `k` columns.
    pub fn leading_columns(&self, k: usize) -> Self {
        Self(self.0.columns(0, k.min(self.cols())).into_owned())
    }

    /// Multiply every element by `scalar`.
    pub fn scale(&self, scalar: Real) -> Self {
        Self(&self.0 * scalar)
    }

    /// Largest absolute element-wise difference; infinite on shape mismatch.
    pub fn max_abs_diff(&self, other: &Matrix) -> Real {
        if self.0.shape() != other.0.shape() {
            return Real::INFINITY;
        }
        self.0
            .iter()
            .zip(other.0.iter())
            .fold(0.0, |acc, (a, b)| acc.max((a - b).abs()))
    }

    /// `true` if `|m_ij - m_ji| <= tolerance` for every pair.
    pub fn is_symmetric(&self, tolerance: Real) -> bool {
        self.is_square()
            && (0..self.rows())
                .all(|i| (0..i).all(|j| (self.0[(i, j)] - self.0[(j, i)]).abs() <= tolerance))
    }
}

impl From<DMatrix<Real>> for Matrix {
    fn from(m: DMatrix<Real>) -> Self {
        Self(m)
    }
}

// ── Indexing ──────────────────────────────────────────────────────────────────

impl Index<(usize, usize)> for Matrix {
    type Output = Real;
    fn index(&self, (i, j): (usize, usize)) -> &Real {
        &self.0[(i, j)]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut Real {
        &mut self.0[(i, j)]
    }
}

// ── Arithmetic ────────────────────────────────────────────────────────────────

impl Add for &Matrix {
    type Output = Matrix;
    fn add(self, rhs: &Matrix) -> Matrix {
        Matrix(&self.0 + &rhs.0)
    }
}

impl Sub for &Matrix {
    type Output = Matrix;
    fn sub(self, rhs: &Matrix) -> Matrix {
        Matrix(&self.0 - &rhs.0)
    }
}

impl Mul for &Matrix {
    type Output = Matrix;
    fn mul(self, rhs: &Matrix) -> Matrix {
        Matrix(&self.0 * &rhs.0)
    }
}

impl std::fmt::Display for Matrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for i in 0..self.rows() {
            if i > 0 {
                writeln!(f)?;
            }
            let row: Vec<String> = self.0.row(i).iter().map(|x| format!("{x:.6}")).collect();
            write!(f, "[{}]", row.join(", "))?;
        }
        Ok(())
    }
}
