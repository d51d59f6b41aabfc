//! Fixed-length epoching.
//!
//! Splits continuous [C, T] data into windows of `epoch_samples` samples
//! advanced by `step` samples, dropping any trailing incomplete window.
//! Matches `mne.make_fixed_length_epochs(raw, duration, overlap)` with its
//! default `baseline=None`: epochs are copied verbatim, no baseline removal.
use ndarray::{s, Array2, Array3};

use crate::error::{PipelineError, Result};

/// Number of samples in an epoch of `duration` seconds: `round(duration · sfreq)`.
pub fn epoch_samples(duration: f64, sfreq: f64) -> usize {
    (duration * sfreq).round() as usize
}

/// Epoch `data` ([C, T]) into a 3-D array [E, C, epoch_samples].
///
/// `step` is the distance between epoch starts; `step == epoch_samples` gives
/// non-overlapping windows.
///
/// # Errors
///
/// [`PipelineError::Input`] if the recording is shorter than one epoch, or if
/// `epoch_samples` or `step` is zero.
pub fn epoch(data: &Array2<f64>, epoch_samples: usize, step: usize) -> Result<Array3<f64>> {
    let (n_ch, n_t) = data.dim();
    if epoch_samples == 0 || step == 0 {
        return Err(PipelineError::Input(format!(
            "epoch length ({epoch_samples}) and step ({step}) must be positive"
        )));
    }
    if n_t < epoch_samples {
        return Err(PipelineError::Input(format!(
            "recording has {n_t} samples, fewer than one epoch of {epoch_samples}"
        )));
    }

    let n_epochs = (n_t - epoch_samples) / step + 1;
    let mut out = Array3::<f64>::zeros((n_epochs, n_ch, epoch_samples));
    for e in 0..n_epochs {
        let start = e * step;
        out.slice_mut(s![e, .., ..])
            .assign(&data.slice(s![.., start..start + epoch_samples]));
    }
    Ok(out)
}
