//! Benchmarks for derivative estimators

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use thermocurve_algorithms::differentiation::{
    adaptive_dtg, central_difference, dtg, electrochemical_derivative, five_point_stencil,
    AdaptiveParams, DtgParams, ElectrochemicalParams,
};
use thermocurve_core::Curve;

fn create_curve(n: usize) -> Curve {
    // Sigmoidal mass-loss step with a small deterministic ripple
    Curve::sampled(25.0, 0.5, n, |t| {
        let step = 100.0 - 40.0 / (1.0 + (-(t - 400.0) / 15.0).exp());
        step + 0.02 * (t * 3.1).sin()
    })
}

fn bench_dtg(c: &mut Criterion) {
    let mut group = c.benchmark_group("dtg");

    for size in [1_000, 10_000, 100_000].iter() {
        let curve = create_curve(*size);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| dtg(black_box(&curve), DtgParams::default()).unwrap())
        });
    }

    group.finish();
}

fn bench_electrochemical(c: &mut Criterion) {
    let mut group = c.benchmark_group("electrochemical");

    for size in [1_000, 10_000, 100_000].iter() {
        let curve = create_curve(*size);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                electrochemical_derivative(black_box(&curve), ElectrochemicalParams::default())
                    .unwrap()
            })
        });
    }

    group.finish();
}

fn bench_stencils(c: &mut Criterion) {
    let mut group = c.benchmark_group("stencils");
    let curve = create_curve(10_000);

    group.bench_function("central_difference", |b| {
        b.iter(|| central_difference(black_box(&curve)).unwrap())
    });
    group.bench_function("five_point_stencil", |b| {
        b.iter(|| five_point_stencil(black_box(&curve)).unwrap())
    });
    group.bench_function("adaptive_dtg", |b| {
        b.iter(|| adaptive_dtg(black_box(&curve), AdaptiveParams::default()).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_dtg, bench_electrochemical, bench_stencils);
criterion_main!(benches);
