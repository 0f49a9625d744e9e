//! Benchmarks for weights construction and the global statistics

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use geo_types::Point;
use spatlag_algorithms::prelude::*;

fn create_points(n: usize) -> Vec<(String, Point<f64>)> {
    (0..n)
        .map(|i| {
            let x = ((i * 7919) % 1000) as f64;
            let y = ((i * 104_729) % 997) as f64;
            (format!("p{i}"), Point::new(x, y))
        })
        .collect()
}

fn create_collection(n: usize) -> FeatureCollection {
    create_points(n)
        .into_iter()
        .map(|(id, p)| {
            let v = (p.x() / 100.0).floor() + ((p.y() as usize) % 3) as f64;
            Feature::new(p).with_id(id).with_property("count", v)
        })
        .collect()
}

fn bench_knn(c: &mut Criterion) {
    let mut group = c.benchmark_group("weights/knn");
    for n in [250, 1000, 4000] {
        let points = create_points(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| knn_weights(black_box(&points), 8).unwrap())
        });
    }
    group.finish();
}

fn bench_moran(c: &mut Criterion) {
    let mut group = c.benchmark_group("statistics/moran");
    for n in [250, 1000, 4000] {
        let mut w = knn_weights(&create_points(n), 8).unwrap().matrix;
        w.set_transform(Transform::RowStandardized);
        let values: Vec<f64> = (0..n).map(|i| (i % 17) as f64).collect();
        let params = MoranParams {
            permutations: 99,
            ..MoranParams::default()
        };
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                let mut diag = Diagnostics::new();
                morans_i(black_box(&values), &w, &params, &mut diag).unwrap()
            })
        });
    }
    group.finish();
}

fn bench_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis/analyze");
    group.sample_size(10);
    for n in [250, 1000] {
        let fc = create_collection(n);
        let config = AnalysisConfig::default();
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| analyze(black_box(&fc), &config).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_knn, bench_moran, bench_analyze);
criterion_main!(benches);
