//! Repeated k-fold cross-validation.
//!
//! ```text
//! for repetition r in 0..R:
//!     folds = kfold(N, k, shuffle, seed_for(r))
//!     for fold in folds:
//!         scaler ← fit(train rows only)
//!         model  ← classifier.train(scale(train))
//!         fold metrics ← evaluate(model, scale(test))
//!     repetition mean ← mean of fold metrics
//! grand mean ← mean of repetition means
//! ROC curves ← every fold of every repetition, unaveraged
//! ```
use log::{debug, info, warn};
use ndarray::{Array1, Array3, Axis};
use serde::{Deserialize, Serialize};

use crate::classifier::{evaluate, Classifier};
use crate::config::{ExperimentConfig, SeedPolicy};
use crate::dataset::Dataset;
use crate::error::{Location, PipelineError, Result};
use crate::kfold::kfold;
use crate::metrics::FoldMetrics;
use crate::scaler::scale_split;

/// Arithmetic means of the scalar fold metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub roc_auc: f64,
}

impl MetricSummary {
    fn from_fold(m: &FoldMetrics) -> Self {
        Self {
            accuracy: m.accuracy,
            precision: m.precision,
            recall: m.recall,
            f1: m.f1,
            roc_auc: m.roc_auc,
        }
    }

    /// Mean of `items`; all zeros when empty.
    pub fn mean<'a>(items: impl IntoIterator<Item = &'a MetricSummary>) -> Self {
        let mut acc = Self::default();
        let mut n = 0usize;
        for m in items {
            acc.accuracy += m.accuracy;
            acc.precision += m.precision;
            acc.recall += m.recall;
            acc.f1 += m.f1;
            acc.roc_auc += m.roc_auc;
            n += 1;
        }
        if n > 0 {
            let inv = 1.0 / n as f64;
            acc.accuracy *= inv;
            acc.precision *= inv;
            acc.recall *= inv;
            acc.f1 *= inv;
            acc.roc_auc *= inv;
        }
        acc
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepetitionResult {
    pub repetition: usize,
    pub seed: u64,
    pub folds: Vec<FoldMetrics>,
    pub mean: MetricSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentReport {
    pub repetitions: Vec<RepetitionResult>,
    /// Mean over repetitions of the per-repetition means.
    pub grand_mean: MetricSummary,
    /// One false-positive-rate array per fold, repetitions concatenated.
    pub all_fold_fpr: Vec<Vec<f64>>,
    /// One true-positive-rate array per fold, aligned with `all_fold_fpr`.
    pub all_fold_tpr: Vec<Vec<f64>>,
}

/// Run the cross-validated experiment on sequences `[N, T, F]` with labels `[N]`.
///
/// # Errors
///
/// * [`PipelineError::Input`] for mismatched inputs, zero repetitions or an
///   impossible fold count.
/// * Any failing fold aborts the run; the error carries its repetition and
///   fold index. A test split missing a class surfaces as
///   [`PipelineError::Evaluation`].
pub fn run_experiment<C: Classifier>(
    sequences: &Array3<f64>,
    labels: &Array1<u8>,
    classifier: &C,
    cfg: &ExperimentConfig,
) -> Result<ExperimentReport> {
    let n = sequences.dim().0;
    if labels.len() != n {
        return Err(PipelineError::Input(format!(
            "{n} samples but {} labels",
            labels.len()
        )));
    }
    if cfg.n_repetitions == 0 {
        return Err(PipelineError::Input("n_repetitions must be at least 1".into()));
    }
    if cfg.n_repetitions > 1 && cfg.shuffle && cfg.seed_policy == SeedPolicy::Fixed {
        warn!(
            "seed {} is reused for all {} repetitions: every repetition sees identical folds",
            cfg.seed, cfg.n_repetitions
        );
    }

    let mut repetitions = Vec::with_capacity(cfg.n_repetitions);
    let mut all_fold_fpr = Vec::new();
    let mut all_fold_tpr = Vec::new();

    for rep in 0..cfg.n_repetitions {
        let seed = cfg.seed_for(rep);
        let folds = kfold(n, cfg.n_folds, cfg.shuffle, seed)?;
        let mut fold_metrics = Vec::with_capacity(folds.len());

        for (k, fold) in folds.iter().enumerate() {
            let m = run_fold(sequences, labels, &fold.train, &fold.test, classifier, cfg.threshold)
                .map_err(|e| e.at(Location::fold(rep, k)))?;
            debug!(
                "repetition {rep} fold {k}: acc={:.4} f1={:.4} auc={:.4}",
                m.accuracy, m.f1, m.roc_auc
            );
            all_fold_fpr.push(m.fpr.clone());
            all_fold_tpr.push(m.tpr.clone());
            fold_metrics.push(m);
        }

        let summaries: Vec<MetricSummary> = fold_metrics.iter().map(MetricSummary::from_fold).collect();
        let mean = MetricSummary::mean(&summaries);
        info!(
            "repetition {rep}: acc={:.4} precision={:.4} recall={:.4} f1={:.4} auc={:.4}",
            mean.accuracy, mean.precision, mean.recall, mean.f1, mean.roc_auc
        );
        repetitions.push(RepetitionResult { repetition: rep, seed, folds: fold_metrics, mean });
    }

    let grand_mean = MetricSummary::mean(repetitions.iter().map(|r| &r.mean));
    Ok(ExperimentReport { repetitions, grand_mean, all_fold_fpr, all_fold_tpr })
}

/// [`run_experiment`] on the sequence view of an assembled [`Dataset`].
pub fn run_dataset<C: Classifier>(
    dataset: &Dataset,
    classifier: &C,
    cfg: &ExperimentConfig,
) -> Result<ExperimentReport> {
    run_experiment(&dataset.sequences()?, &dataset.labels, classifier, cfg)
}

fn run_fold<C: Classifier>(
    sequences: &Array3<f64>,
    labels: &Array1<u8>,
    train: &[usize],
    test: &[usize],
    classifier: &C,
    threshold: f64,
) -> Result<FoldMetrics> {
    let (x_train, x_test, _) = scale_split(
        &sequences.select(Axis(0), train),
        &sequences.select(Axis(0), test),
    )?;
    let y_train = labels.select(Axis(0), train);
    let y_test = labels.select(Axis(0), test);

    let model = classifier.train(&x_train, &y_train)?;
    evaluate(&model, &x_test, &y_test, threshold)
}
