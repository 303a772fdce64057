//! Property tests for the pseudo square roots.

use lmm_math::{pseudo_sqrt, rank_reduced_sqrt, symmetric_eigen, Matrix, SalvagingAlgorithm};
use proptest::prelude::*;

fn lin_exp(n: usize, alpha: f64, beta: f64) -> Matrix {
    Matrix::from_fn(n, n, |i, j| alpha + (1.0 - alpha) * (-beta * (i as f64 - j as f64).abs()).exp())
}

proptest! {
    #[test]
    fn spectral_root_has_unit_row_norms(n in 2usize..12, alpha in -0.5f64..1.0, beta in 0.0f64..2.0) {
        let rho = lin_exp(n, alpha, beta);
        let b = pseudo_sqrt(&rho, SalvagingAlgorithm::Spectral).unwrap();
        for i in 0..n {
            prop_assert!((b.row_dot(i, i) - 1.0).abs() < 1e-10);
        }
    }

    #[test]
    fn rank_reduced_root_is_a_correlation(n in 3usize..12, k in 1usize..4, beta in 0.01f64..1.0) {
        let rho = lin_exp(n, 0.3, beta);
        let b = rank_reduced_sqrt(&rho, k, 1.0, SalvagingAlgorithm::None).unwrap();
        prop_assert_eq!(b.cols(), k);
        let rebuilt = &b * &b.transpose();
        for i in 0..n {
            prop_assert!((rebuilt[(i, i)] - 1.0).abs() < 1e-10);
        }
        let eig = symmetric_eigen(&rebuilt).unwrap();
        prop_assert!(eig.values.iter().all(|&v| v > -1e-10));
    }
}
