mod common;
use approx::assert_abs_diff_eq;
use common::synthetic_recording;
use ndarray::{s, Array1, Array3};
use vgeeg::{
    group_features, run_dataset, run_experiment, scale_split, Band, Dataset, ExperimentConfig,
    FeatureConfig, Group, LogisticRegression, SeedPolicy,
};

fn toy(n: usize) -> (Array3<f64>, Array1<u8>) {
    let labels: Array1<u8> = (0..n).map(|i| u8::from(i % 2 == 0)).collect();
    let x = Array3::from_shape_fn((n, 4, 3), |(i, t, f)| {
        let shift = if i % 2 == 0 { 1.5 } else { -1.5 };
        shift + ((i * 13 + t * 5 + f) % 7) as f64 * 0.3
    });
    (x, labels)
}

#[test]
fn one_roc_curve_per_fold_and_repetition() {
    let (x, y) = toy(100);
    let cfg = ExperimentConfig { n_folds: 5, n_repetitions: 2, ..ExperimentConfig::default() };
    let report = run_experiment(&x, &y, &LogisticRegression::default(), &cfg).unwrap();
    assert_eq!(report.all_fold_fpr.len(), 10);
    assert_eq!(report.all_fold_tpr.len(), 10);
    for (fpr, tpr) in report.all_fold_fpr.iter().zip(&report.all_fold_tpr) {
        assert_eq!(fpr.len(), tpr.len());
        assert_eq!((fpr[0], tpr[0]), (0.0, 0.0));
        assert_eq!((*fpr.last().unwrap(), *tpr.last().unwrap()), (1.0, 1.0));
    }
    for rep in &report.repetitions {
        assert_eq!(rep.folds.len(), 5);
        let test_total: usize = rep.folds.iter().map(|f| f.confusion.total()).sum();
        assert_eq!(test_total, 100);
    }
}

#[test]
fn per_repetition_seeds_vary_the_folds() {
    let (x, y) = toy(60);
    let cfg = ExperimentConfig {
        n_repetitions: 3,
        seed_policy: SeedPolicy::PerRepetition,
        ..ExperimentConfig::default()
    };
    let report = run_experiment(&x, &y, &LogisticRegression::default(), &cfg).unwrap();
    let seeds: Vec<u64> = report.repetitions.iter().map(|r| r.seed).collect();
    assert_eq!(seeds, vec![42, 43, 44]);
}

#[test]
fn scaler_ignores_test_rows() {
    let (x, _) = toy(30);
    let train = x.slice(s![..20, .., ..]).to_owned();
    let test = x.slice(s![20.., .., ..]).to_owned();
    let mut perturbed = test.clone();
    perturbed.mapv_inplace(|v| v * 1e3 - 7.0);

    let (train_a, _, scaler_a) = scale_split(&train, &test).unwrap();
    let (train_b, _, scaler_b) = scale_split(&train, &perturbed).unwrap();
    assert_eq!(scaler_a, scaler_b);
    assert_eq!(train_a, train_b);
}

#[test]
fn synthetic_groups_end_to_end() {
    let cfg = FeatureConfig {
        bands: vec![Band::Theta, Band::Alpha],
        ..FeatureConfig::default()
    };
    let healthy: Vec<_> = (0..3)
        .map(|i| synthetic_recording(&format!("h{i}"), Group::Healthy, 256.0, 4, 3, 0.2, i))
        .collect();
    let patient: Vec<_> = (0..3)
        .map(|i| synthetic_recording(&format!("s{i}"), Group::Patient, 256.0, 4, 3, 3.0, 100 + i))
        .collect();

    let h = group_features(&healthy, &cfg).unwrap();
    let p = group_features(&patient, &FeatureConfig { parallel: true, ..cfg.clone() }).unwrap();
    let ids: Vec<&str> = p.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["s0", "s1", "s2"]);

    let dataset = Dataset::assemble(&p, &h).unwrap();
    assert_eq!(dataset.n_samples(), 24);

    let exp = ExperimentConfig { n_folds: 3, n_repetitions: 2, ..ExperimentConfig::default() };
    let report = run_dataset(&dataset, &LogisticRegression::default(), &exp).unwrap();
    assert_eq!(report.all_fold_fpr.len(), 6);
    let m = report.grand_mean;
    for v in [m.accuracy, m.precision, m.recall, m.f1, m.roc_auc] {
        assert!((0.0..=1.0).contains(&v));
    }
    // Fixed seed: both repetitions agree.
    assert_abs_diff_eq!(report.repetitions[0].mean.accuracy, report.repetitions[1].mean.accuracy, epsilon = 1e-12);
}
