//! Benchmarks for cne5-math kernels.
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use cne5_math::{ewma_covariance, exp_weights, rolling_std, winsorize, wls_ridge};
use ndarray::{Array1, Array2};
use rand::Rng;

fn random_array(n: usize) -> Array1<f64> {
    let mut rng = rand::thread_rng();
    Array1::from_iter((0..n).map(|_| rng.r#gen::<f64>() * 0.1 - 0.05))
}

fn random_matrix(rows: usize, cols: usize) -> Array2<f64> {
    let mut rng = rand::thread_rng();
    Array2::from_shape_fn((rows, cols), |_| rng.r#gen::<f64>())
}

fn bench_winsorize(c: &mut Criterion) {
    let mut group = c.benchmark_group("winsorize");

    for size in [252, 1000, 10000, 100000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let data = random_array(size);
            b.iter(|| winsorize(black_box(&data), black_box(0.01), black_box(0.99)).unwrap());
        });
    }

    group.finish();
}

fn bench_rolling_std(c: &mut Criterion) {
    let mut group = c.benchmark_group("rolling_std");

    for size in [504, 1000, 2520] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let data: Vec<f64> = random_array(size).to_vec();
            b.iter(|| rolling_std(black_box(&data), black_box(252), black_box(126)));
        });
    }

    group.finish();
}

fn bench_exp_weights(c: &mut Criterion) {
    let mut group = c.benchmark_group("exp_weights");

    for (window, half_life) in [(252, 90), (504, 90), (1000, 252)] {
        group.bench_with_input(
            BenchmarkId::new("window", format!("{window}_{half_life}")),
            &(window, half_life),
            |b, &(window, half_life)| {
                b.iter(|| exp_weights(black_box(window), black_box(half_life)));
            },
        );
    }

    group.finish();
}

fn bench_ewma_covariance(c: &mut Criterion) {
    let mut group = c.benchmark_group("ewma_covariance");
    group.sample_size(30);

    for (days, factors) in [(252, 40), (1000, 40)] {
        group.throughput(Throughput::Elements((days * factors) as u64));
        group.bench_with_input(
            BenchmarkId::new("days_factors", format!("{days}x{factors}")),
            &(days, factors),
            |b, &(days, factors)| {
                let matrix = random_matrix(days, factors);
                b.iter(|| ewma_covariance(black_box(&matrix), black_box(90)).unwrap());
            },
        );
    }

    group.finish();
}

fn bench_wls_ridge(c: &mut Criterion) {
    let mut group = c.benchmark_group("wls_ridge");
    group.sample_size(30);

    for (n_securities, n_factors) in [(500, 40), (2000, 40), (5000, 40)] {
        group.throughput(Throughput::Elements((n_securities * n_factors) as u64));
        group.bench_with_input(
            BenchmarkId::new("securities_factors", format!("{n_securities}x{n_factors}")),
            &(n_securities, n_factors),
            |b, &(n_securities, n_factors)| {
                let y = random_array(n_securities);
                let x = random_matrix(n_securities, n_factors);
                let weights =
                    Array1::from_iter((0..n_securities).map(|i| ((i + 1) * 1000) as f64));

                b.iter(|| {
                    wls_ridge(black_box(&x), black_box(&y), black_box(&weights), black_box(0.01))
                        .unwrap()
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_winsorize,
    bench_rolling_std,
    bench_exp_weights,
    bench_ewma_covariance,
    bench_wls_ridge,
);

criterion_main!(benches);
