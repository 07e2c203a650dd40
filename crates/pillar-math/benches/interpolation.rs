use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pillar_math::{Interpolation1D, Interpolator};
use std::hint::black_box;

fn zero_curve() -> (Vec<f64>, Vec<f64>) {
    let xs = vec![0.0, 0.25, 0.5, 1.0, 2.0, 3.0, 5.0, 7.0, 10.0, 20.0, 30.0];
    let ys = vec![
        0.031, 0.031, 0.0315, 0.032, 0.0335, 0.034, 0.0352, 0.0361, 0.037, 0.0385, 0.0382,
    ];
    (xs, ys)
}

const SCHEMES: [Interpolator; 5] = [
    Interpolator::Linear,
    Interpolator::LogLinear,
    Interpolator::BackwardFlat,
    Interpolator::CubicNatural,
    Interpolator::ConvexMonotone,
];

fn bench_value(c: &mut Criterion) {
    let (xs, ys) = zero_curve();
    let queries: Vec<f64> = (1..=10_000).map(|i| 30.0 * i as f64 / 10_000.0).collect();

    let mut group = c.benchmark_group("interpolation_value");
    group.throughput(Throughput::Elements(queries.len() as u64));
    for scheme in SCHEMES {
        let interp = scheme.interpolate(&xs, &ys).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(scheme), &interp, |b, interp| {
            b.iter(|| {
                let mut acc = 0.0;
                for t in &queries {
                    acc += interp.value_at(black_box(*t));
                }
                black_box(acc)
            })
        });
    }
    group.finish();
}

// one node move, as a bootstrap does per solver evaluation
fn bench_update(c: &mut Criterion) {
    let (xs, ys) = zero_curve();
    let mut group = c.benchmark_group("interpolation_update");
    for scheme in SCHEMES {
        let mut interp = scheme.interpolate(&xs, &ys).unwrap();
        let last = xs.len() - 1;
        group.bench_function(BenchmarkId::from_parameter(scheme), |b| {
            let mut bump = 0.0;
            b.iter(|| {
                bump = if bump == 0.0 { 1e-4 } else { 0.0 };
                interp.update(last, black_box(0.0382 + bump)).unwrap();
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_value, bench_update);
criterion_main!(benches);
