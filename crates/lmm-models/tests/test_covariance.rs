//! Closed-form covariance integrals against numerical integration.

use approx::assert_relative_eq;
use lmm_math::{Matrix, QuadratureSettings};
use lmm_models::{
    integrated_covariance_by_quadrature, CovarianceParameterization, CovarianceProxy, ExponentialCorrelation,
    HullWhiteParameterization, LinearExponentialVolatility, VolatilityModel,
};
use lmm_termstructures::{CapletVolatilityCurve, CapletVolatilityStructure};

#[test]
fn hump_variance_over_five_years() {
    let m: VolatilityModel = LinearExponentialVolatility::new(vec![5.0], 0.1, 0.5, 0.05, 0.2)
        .unwrap()
        .into();
    let closed = m.integrated_variance(0, 0, 5.0, &[]).unwrap();
    let numerical = QuadratureSettings::default()
        .integrate(
            |t| {
                let tau = 5.0 - t;
                ((0.1 * tau + 0.2) * (-0.5 * tau).exp() + 0.05).powi(2)
            },
            0.0,
            5.0,
        )
        .unwrap()
        .value;
    assert_relative_eq!(closed, numerical, max_relative = 1e-6);
}

#[test]
fn proxy_closed_form_agrees_with_generic_path() {
    let fixings: Vec<f64> = (1..=8).map(|i| 0.5 * i as f64).collect();
    let vol = LinearExponentialVolatility::new(fixings, 0.3, 1.2, 0.02, 0.1).unwrap();
    let corr = ExponentialCorrelation::new(8, 0.15).unwrap();
    let proxy = CovarianceProxy::new(vol.into(), corr.into()).unwrap();
    for &t in &[0.25, 1.0, 2.0] {
        let closed = proxy.integrated_covariance(t, &[]).unwrap();
        let generic = integrated_covariance_by_quadrature(&proxy, t, &[], &QuadratureSettings::default()).unwrap();
        for i in 0..8 {
            for j in 0..8 {
                assert_relative_eq!(closed[(i, j)], generic[(i, j)], max_relative = 1e-6, epsilon = 1e-12);
            }
        }
    }
}

#[test]
fn hull_white_matches_caplet_variances() {
    let fixings = vec![0.25, 0.5, 0.75, 1.0, 1.25, 1.5, 1.75, 2.0];
    let caplets = CapletVolatilityCurve::new(&fixings, &[0.15, 0.17, 0.19, 0.2, 0.2, 0.195, 0.19, 0.185]).unwrap();
    let target = Matrix::from_fn(7, 7, |i, j| 0.4 + 0.6 * (-0.3 * (i as f64 - j as f64).abs()).exp());
    let hw = HullWhiteParameterization::new(fixings.clone(), &caplets, &target, 3).unwrap();
    for (i, &t) in fixings.iter().enumerate().skip(1) {
        let integrated = hw.integrated_covariance(t, &[]).unwrap();
        let vol = caplets.volatility(t);
        assert_relative_eq!(integrated[(i, i)], vol * vol * (t - fixings[0]), max_relative = 1e-10);
    }
}
