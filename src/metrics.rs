//! Binary classification metrics for one evaluated fold.
//!
//! Conventions follow scikit-learn: positive class = 1 (patient), precision
//! and recall are 0 when their denominator is 0, and the ROC curve is built at
//! every distinct score with collinear intermediate points dropped.
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Counts laid out as scikit-learn's `[[tn, fp], [fn, tp]]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub tn: usize,
    pub fp: usize,
    pub fn_: usize,
    pub tp: usize,
}

impl ConfusionMatrix {
    pub fn from_predictions(labels: &[u8], predicted: &[u8]) -> Self {
        let mut cm = Self::default();
        for (&y, &p) in labels.iter().zip(predicted.iter()) {
            match (y != 0, p != 0) {
                (false, false) => cm.tn += 1,
                (false, true) => cm.fp += 1,
                (true, false) => cm.fn_ += 1,
                (true, true) => cm.tp += 1,
            }
        }
        cm
    }

    pub fn to_array(&self) -> [[usize; 2]; 2] {
        [[self.tn, self.fp], [self.fn_, self.tp]]
    }

    pub fn total(&self) -> usize {
        self.tn + self.fp + self.fn_ + self.tp
    }
}

/// Everything measured on one test split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoldMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub confusion: ConfusionMatrix,
    pub roc_auc: f64,
    pub fpr: Vec<f64>,
    pub tpr: Vec<f64>,
}

/// Score a fold from true labels and predicted patient probabilities.
///
/// # Errors
///
/// [`PipelineError::Evaluation`] on length mismatch, an empty split, a
/// non-finite score, or a split containing only one class (ROC undefined).
pub fn evaluate_scores(labels: &[u8], scores: &[f64], threshold: f64) -> Result<FoldMetrics> {
    if labels.len() != scores.len() {
        return Err(PipelineError::Evaluation(format!(
            "{} labels but {} scores",
            labels.len(),
            scores.len()
        )));
    }
    if labels.is_empty() {
        return Err(PipelineError::Evaluation("empty test split".into()));
    }
    if scores.iter().any(|s| !s.is_finite()) {
        return Err(PipelineError::Evaluation("classifier produced a non-finite score".into()));
    }

    let predicted: Vec<u8> = scores.iter().map(|&s| u8::from(s >= threshold)).collect();
    let cm = ConfusionMatrix::from_predictions(labels, &predicted);
    let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
    let precision = ratio(cm.tp, cm.tp + cm.fp);
    let recall = ratio(cm.tp, cm.tp + cm.fn_);
    let f1 = ratio(2 * cm.tp, 2 * cm.tp + cm.fp + cm.fn_);

    let (fpr, tpr, _) = roc_curve(labels, scores)?;
    let roc_auc = auc(&fpr, &tpr);

    Ok(FoldMetrics {
        accuracy: ratio(cm.tp + cm.tn, cm.total()),
        precision,
        recall,
        f1,
        confusion: cm,
        roc_auc,
        fpr,
        tpr,
    })
}

/// ROC curve `(fpr, tpr, thresholds)`, starting at `(0, 0)` with threshold `+∞`.
///
/// # Errors
///
/// [`PipelineError::Evaluation`] unless both classes are present.
pub fn roc_curve(labels: &[u8], scores: &[f64]) -> Result<(Vec<f64>, Vec<f64>, Vec<f64>)> {
    let n_pos = labels.iter().filter(|&&y| y != 0).count();
    let n_neg = labels.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return Err(PipelineError::Evaluation(format!(
            "ROC curve needs both classes, got {n_pos} positive and {n_neg} negative samples"
        )));
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    // Cumulative counts at the last index of every distinct score.
    let (mut tps, mut fps, mut thresholds) = (Vec::new(), Vec::new(), Vec::new());
    let (mut tp, mut fp) = (0usize, 0usize);
    for (rank, &i) in order.iter().enumerate() {
        if labels[i] != 0 { tp += 1 } else { fp += 1 }
        let last_of_run = order
            .get(rank + 1)
            .map_or(true, |&next| scores[next] != scores[i]);
        if last_of_run {
            tps.push(tp);
            fps.push(fp);
            thresholds.push(scores[i]);
        }
    }

    // Drop points collinear with their neighbours.
    let n = tps.len();
    let keep: Vec<usize> = (0..n)
        .filter(|&k| {
            if k == 0 || k + 1 == n {
                return true;
            }
            let d2 = |v: &[usize]| v[k + 1] as i64 - 2 * v[k] as i64 + v[k - 1] as i64;
            d2(&fps) != 0 || d2(&tps) != 0
        })
        .collect();

    let mut fpr = vec![0.0];
    let mut tpr = vec![0.0];
    let mut thr = vec![f64::INFINITY];
    for k in keep {
        fpr.push(fps[k] as f64 / n_neg as f64);
        tpr.push(tps[k] as f64 / n_pos as f64);
        thr.push(thresholds[k]);
    }
    Ok((fpr, tpr, thr))
}

/// Trapezoidal area under a curve with non-decreasing `x`.
pub fn auc(x: &[f64], y: &[f64]) -> f64 {
    x.windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| (xs[1] - xs[0]) * (ys[1] + ys[0]) / 2.0)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_separation() {
        let m = evaluate_scores(&[0, 0, 1, 1], &[0.1, 0.2, 0.8, 0.9], 0.5).unwrap();
        assert_eq!(m.accuracy, 1.0);
        assert_eq!(m.f1, 1.0);
        assert_eq!(m.roc_auc, 1.0);
        assert_eq!(m.confusion.to_array(), [[2, 0], [0, 2]]);
        // The first threshold point is always kept, as in scikit-learn.
        assert_eq!(m.fpr, vec![0.0, 0.0, 0.0, 1.0]);
        assert_eq!(m.tpr, vec![0.0, 0.5, 1.0, 1.0]);
    }

    #[test]
    fn sklearn_reference_curve() {
        // sklearn.metrics.roc_curve([0, 0, 1, 1], [0.1, 0.4, 0.35, 0.8])
        //   fpr = [0, 0, 0.5, 0.5, 1], tpr = [0, 0.5, 0.5, 1, 1], auc = 0.75
        let (fpr, tpr, thr) = roc_curve(&[0, 0, 1, 1], &[0.1, 0.4, 0.35, 0.8]).unwrap();
        assert_eq!(fpr, vec![0.0, 0.0, 0.5, 0.5, 1.0]);
        assert_eq!(tpr, vec![0.0, 0.5, 0.5, 1.0, 1.0]);
        assert_eq!(thr[1], 0.8);
        approx::assert_abs_diff_eq!(auc(&fpr, &tpr), 0.75, epsilon = 1e-12);
    }

    #[test]
    fn tied_scores_form_one_point() {
        let (fpr, tpr, _) = roc_curve(&[0, 1, 0, 1], &[0.5, 0.5, 0.5, 0.5]).unwrap();
        assert_eq!(fpr, vec![0.0, 1.0]);
        assert_eq!(tpr, vec![0.0, 1.0]);
    }

    #[test]
    fn zero_division_gives_zero() {
        let m = evaluate_scores(&[0, 1, 1], &[0.1, 0.2, 0.3], 0.5).unwrap();
        assert_eq!(m.precision, 0.0);
        assert_eq!(m.recall, 0.0);
        assert_eq!(m.f1, 0.0);
        approx::assert_abs_diff_eq!(m.accuracy, 1.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn single_class_split_is_evaluation_error() {
        let err = evaluate_scores(&[1, 1, 1], &[0.2, 0.7, 0.9], 0.5).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Evaluation);
    }
}
