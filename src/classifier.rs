//! Classifier seam used by the experiment runner.
//!
//! A [`Classifier`] is a recipe: every call to [`Classifier::train`] builds a
//! fresh, independent [`TrainedModel`] from one training split. Models output
//! the probability of the patient class for each `[T, F]` sequence.
//!
//! [`LogisticRegression`] is the bundled implementation: the sequence is
//! flattened to `T·F` inputs and fitted by full-batch gradient descent from
//! zero weights, so training is fully deterministic.
use ndarray::{Array1, Array2, Array3};

use crate::config::ClassifierConfig;
use crate::error::{PipelineError, Result};
use crate::metrics::{evaluate_scores, FoldMetrics};

pub trait Classifier {
    type Model: TrainedModel;

    /// Fit a new model on `features` (`[N, T, F]`) and `labels` (`[N]`, 0/1).
    fn train(&self, features: &Array3<f64>, labels: &Array1<u8>) -> Result<Self::Model>;
}

pub trait TrainedModel {
    /// Patient-class probability of every sample of `features` (`[N, T, F]`).
    fn predict_proba(&self, features: &Array3<f64>) -> Result<Array1<f64>>;
}

/// Score `model` on a test split.
pub fn evaluate<M: TrainedModel>(
    model: &M,
    features: &Array3<f64>,
    labels: &Array1<u8>,
    threshold: f64,
) -> Result<FoldMetrics> {
    let scores = model.predict_proba(features)?;
    evaluate_scores(&labels.to_vec(), &scores.to_vec(), threshold)
}

// ── Logistic regression ───────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct LogisticRegression {
    pub config: ClassifierConfig,
}

impl LogisticRegression {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }
}

#[derive(Debug, Clone)]
pub struct LogisticModel {
    pub weights: Array1<f64>,
    pub bias: f64,
}

fn flatten(features: &Array3<f64>) -> Result<Array2<f64>> {
    let (n, t, f) = features.dim();
    features
        .as_standard_layout()
        .into_owned()
        .into_shape_with_order((n, t * f))
        .map_err(|e| PipelineError::ShapeMismatch(format!("flatten sequences: {e}")))
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

impl Classifier for LogisticRegression {
    type Model = LogisticModel;

    fn train(&self, features: &Array3<f64>, labels: &Array1<u8>) -> Result<LogisticModel> {
        let x = flatten(features)?;
        let (n, d) = x.dim();
        if n == 0 {
            return Err(PipelineError::Input("cannot train on an empty split".into()));
        }
        if labels.len() != n {
            return Err(PipelineError::Input(format!(
                "{n} training samples but {} labels",
                labels.len()
            )));
        }
        let y: Array1<f64> = labels.mapv(|l| f64::from(l.min(1)));
        let cfg = &self.config;

        let mut w = Array1::<f64>::zeros(d);
        let mut b = 0.0;
        let inv_n = 1.0 / n as f64;
        for _ in 0..cfg.epochs {
            let p = (x.dot(&w) + b).mapv(sigmoid);
            let err = &p - &y;
            let grad_w = x.t().dot(&err) * inv_n + &w * cfg.l2;
            let grad_b = err.sum() * inv_n;
            w.scaled_add(-cfg.learning_rate, &grad_w);
            b -= cfg.learning_rate * grad_b;
        }
        Ok(LogisticModel { weights: w, bias: b })
    }
}

impl TrainedModel for LogisticModel {
    fn predict_proba(&self, features: &Array3<f64>) -> Result<Array1<f64>> {
        let x = flatten(features)?;
        if x.ncols() != self.weights.len() {
            return Err(PipelineError::ShapeMismatch(format!(
                "model expects {} inputs, got {}",
                self.weights.len(),
                x.ncols()
            )));
        }
        Ok((x.dot(&self.weights) + self.bias).mapv(sigmoid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable(n: usize) -> (Array3<f64>, Array1<u8>) {
        let labels: Array1<u8> = (0..n).map(|i| (i % 2) as u8).collect();
        let x = Array3::from_shape_fn((n, 2, 2), |(i, t, f)| {
            let sign = if i % 2 == 1 { 1.0 } else { -1.0 };
            sign * (1.0 + t as f64) + 0.1 * ((i * 7 + f) % 5) as f64
        });
        (x, labels)
    }

    #[test]
    fn learns_separable_data() {
        let (x, y) = separable(40);
        let model = LogisticRegression::default().train(&x, &y).unwrap();
        let m = evaluate(&model, &x, &y, 0.5).unwrap();
        assert_eq!(m.accuracy, 1.0);
        assert_eq!(m.roc_auc, 1.0);
    }

    #[test]
    fn training_is_deterministic() {
        let (x, y) = separable(20);
        let a = LogisticRegression::default().train(&x, &y).unwrap();
        let b = LogisticRegression::default().train(&x, &y).unwrap();
        assert_eq!(a.weights, b.weights);
        assert_eq!(a.bias, b.bias);
    }

    #[test]
    fn label_count_mismatch() {
        let (x, _) = separable(10);
        let y = Array1::<u8>::zeros(9);
        assert!(LogisticRegression::default().train(&x, &y).is_err());
    }

    #[test]
    fn sigmoid_is_stable() {
        assert_eq!(sigmoid(1e4), 1.0);
        assert_eq!(sigmoid(-1e4), 0.0);
        approx::assert_abs_diff_eq!(sigmoid(0.0), 0.5);
    }
}
