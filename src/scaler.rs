//! Train-only feature standardisation.
//!
//! Per feature `f` (last axis of a `[N, T, F]` sequence tensor):
//!   μ_f = mean over all training samples and steps,  σ_f = std (ddof=0)
//!   x[.., f] = (x[.., f] − μ_f) / σ_f
//!
//! Statistics come from the training split alone and are then applied
//! unchanged to the test split. A constant feature (σ = 0) is only centred.
use ndarray::{Array1, Array3, Axis};

use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    pub mean: Array1<f64>,
    pub std: Array1<f64>,
}

impl StandardScaler {
    /// Fit on `train` (`[N, T, F]`).
    ///
    /// # Errors
    ///
    /// [`PipelineError::Input`] if `train` has no rows.
    pub fn fit(train: &Array3<f64>) -> Result<Self> {
        let (n, t, f) = train.dim();
        if n * t == 0 {
            return Err(PipelineError::Input("cannot fit a scaler on zero training rows".into()));
        }
        let flat = train
            .as_standard_layout()
            .into_owned()
            .into_shape_with_order((n * t, f))
            .map_err(|e| PipelineError::ShapeMismatch(format!("scaler reshape: {e}")))?;
        let mean = flat
            .mean_axis(Axis(0))
            .ok_or_else(|| PipelineError::Input("empty training split".into()))?;
        let std = flat.std_axis(Axis(0), 0.0);
        Ok(Self { mean, std })
    }

    /// Apply the fitted statistics to `x` (`[N, T, F]`).
    pub fn transform(&self, x: &Array3<f64>) -> Result<Array3<f64>> {
        let f = x.dim().2;
        if f != self.mean.len() {
            return Err(PipelineError::ShapeMismatch(format!(
                "scaler fitted on {} features, got {f}",
                self.mean.len()
            )));
        }
        let mut out = x.clone();
        for mut lane in out.lanes_mut(Axis(2)) {
            for ((v, &m), &s) in lane.iter_mut().zip(self.mean.iter()).zip(self.std.iter()) {
                *v -= m;
                if s > 0.0 {
                    *v /= s;
                }
            }
        }
        Ok(out)
    }
}

/// Fit on `train`, scale both splits: `(scaled_train, scaled_test, scaler)`.
pub fn scale_split(
    train: &Array3<f64>,
    test: &Array3<f64>,
) -> Result<(Array3<f64>, Array3<f64>, StandardScaler)> {
    let scaler = StandardScaler::fit(train)?;
    Ok((scaler.transform(train)?, scaler.transform(test)?, scaler))
}
