use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use lmm_math::QuadratureSettings;
use lmm_models::{
    integrated_covariance_by_quadrature, CovarianceParameterization, CovarianceProxy, LinearExponentialCorrelation,
    LinearExponentialVolatility,
};
use std::hint::black_box;

fn proxy(n: usize) -> CovarianceProxy {
    let fixings: Vec<f64> = (1..=n).map(|i| 0.5 * i as f64).collect();
    let vol = LinearExponentialVolatility::new(fixings, 0.1, 0.5, 0.05, 0.2).unwrap();
    let corr = LinearExponentialCorrelation::new(n, 0.3, 0.1, Some(3)).unwrap();
    CovarianceProxy::new(vol.into(), corr.into()).unwrap()
}

fn bench_integrated_covariance(c: &mut Criterion) {
    let mut group = c.benchmark_group("integrated_covariance");
    group.sample_size(20);
    for n in [4usize, 10, 20] {
        let p = proxy(n);
        group.bench_with_input(BenchmarkId::new("closed_form", n), &p, |b, p| {
            b.iter(|| black_box(p.integrated_covariance(black_box(1.0), &[])))
        });
        let settings = QuadratureSettings::default();
        group.bench_with_input(BenchmarkId::new("quadrature", n), &p, |b, p| {
            b.iter(|| black_box(integrated_covariance_by_quadrature(p, black_box(1.0), &[], &settings)))
        });
    }
    group.finish();
}

fn bench_covariance_entry(c: &mut Criterion) {
    c.bench_function("covariance_entry_20", |b| {
        let p = proxy(20);
        b.iter(|| black_box(p.integrated_covariance_entry(black_box(12), 15, 6.0, &[])))
    });
}

criterion_group!(benches, bench_integrated_covariance, bench_covariance_entry);
criterion_main!(benches);
