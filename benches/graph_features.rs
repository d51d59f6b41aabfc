use std::f64::consts::PI;
use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use ndarray::{Array1, Array2};
use vgeeg::{extract_features, extract_psd, natural_visibility_graph, FeatureConfig, Group, Recording};

/// A 129-bin spectrum-like series: 1/f decay with a bump at bin 10.
fn spectrum() -> Array1<f64> {
    Array1::from_shape_fn(129, |k| {
        let f = k as f64 + 1.0;
        1.0 / f + 0.5 * (-((f - 11.0) / 2.0).powi(2)).exp() + 0.01 * (k as f64 * 1.7).sin().abs()
    })
}

fn bench_visibility_graph(c: &mut Criterion) {
    let y = spectrum();
    c.bench_function("natural_visibility_graph [129 bins]", |b| {
        b.iter(|| {
            let g = natural_visibility_graph(black_box(y.view())).unwrap();
            black_box(g.n_edges())
        })
    });
}

fn bench_extract_features(c: &mut Criterion) {
    let g = natural_visibility_graph(spectrum().view()).unwrap();
    c.bench_function("extract_features [129 nodes]", |b| {
        b.iter(|| {
            let f = extract_features(black_box(&g)).unwrap();
            black_box(f.global_efficiency)
        })
    });
}

fn bench_psd_1s(c: &mut Criterion) {
    let sfreq = 256.0;
    let data = Array2::from_shape_fn((4, 256), |(ch, t)| {
        (2.0 * PI * (8.0 + ch as f64) * t as f64 / sfreq).sin()
    });
    let rec = Recording::new("bench", data, sfreq, Group::Healthy).unwrap();
    let cfg = FeatureConfig::default();
    c.bench_function("extract_psd [4 ch × 1 s, 5 bands]", |b| {
        b.iter(|| {
            let psd = extract_psd(black_box(&rec), &cfg).unwrap();
            black_box(psd.n_bins())
        })
    });
}

criterion_group!(benches, bench_visibility_graph, bench_extract_features, bench_psd_1s);
criterion_main!(benches);
