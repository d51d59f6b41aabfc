//! Welch power spectral density estimate.
//!
//! Matches `scipy.signal.welch(x, fs=sfreq, nperseg=nperseg)` with every other
//! argument at its default:
//!   • window   = periodic Hann of length `nperseg`
//!   • noverlap = nperseg / 2
//!   • detrend  = 'constant' (per-segment mean removed)
//!   • one-sided spectrum, `scaling='density'`, `average='mean'`
//!
//! When the signal is shorter than `nperseg`, SciPy shrinks `nperseg` to the
//! signal length (with a warning); so does [`welch`].
//!
//! ```text
//! P[f] = mean_s |FFT(w · (x_s − mean(x_s)))[f]|² / (fs · Σ w²)
//! P[f] *= 2   for 0 < f < nyquist bin
//! ```
use std::f64::consts::PI;

use rustfft::{num_complex::Complex, FftPlanner};

use crate::error::{PipelineError, Result};

/// Segment length actually used for a signal of `n` samples.
pub fn effective_nperseg(nperseg: usize, n: usize) -> usize {
    nperseg.min(n)
}

/// Number of one-sided frequency bins produced for a signal of `n` samples.
pub fn n_freqs(nperseg: usize, n: usize) -> usize {
    effective_nperseg(nperseg, n) / 2 + 1
}

/// Frequencies (Hz) of the one-sided bins.
pub fn frequencies(nperseg: usize, n: usize, fs: f64) -> Vec<f64> {
    let seg = effective_nperseg(nperseg, n);
    (0..n_freqs(nperseg, n)).map(|k| k as f64 * fs / seg as f64).collect()
}

/// Welch PSD of `x` sampled at `fs` Hz.
///
/// Returns `nperseg.min(x.len()) / 2 + 1` non-negative power densities.
pub fn welch(x: &[f64], fs: f64, nperseg: usize) -> Result<Vec<f64>> {
    if nperseg == 0 {
        return Err(PipelineError::Input("welch: nperseg must be positive".into()));
    }
    if x.is_empty() {
        return Err(PipelineError::Input("welch: empty signal".into()));
    }
    let seg = effective_nperseg(nperseg, x.len());
    let noverlap = seg / 2;
    let step = seg - noverlap;
    let n_segments = (x.len() - noverlap) / step;
    let n_out = seg / 2 + 1;

    let win = hann_periodic(seg);
    let win_energy: f64 = win.iter().map(|w| w * w).sum();
    let scale = 1.0 / (fs * win_energy);

    let mut planner: FftPlanner<f64> = FftPlanner::new();
    let fft = planner.plan_fft_forward(seg);

    let mut psd = vec![0.0_f64; n_out];
    let mut buf = vec![Complex::default(); seg];
    for s in 0..n_segments {
        let chunk = &x[s * step..s * step + seg];
        let mean = chunk.iter().sum::<f64>() / seg as f64;
        for ((b, &v), &w) in buf.iter_mut().zip(chunk.iter()).zip(win.iter()) {
            *b = Complex { re: (v - mean) * w, im: 0.0 };
        }
        fft.process(&mut buf);
        for (p, c) in psd.iter_mut().zip(buf.iter()) {
            *p += c.norm_sqr() * scale;
        }
    }

    let inv_segments = 1.0 / n_segments as f64;
    // One-sided: double everything except DC and, for even lengths, Nyquist.
    let last_doubled = if seg % 2 == 0 { n_out - 1 } else { n_out };
    for (k, p) in psd.iter_mut().enumerate() {
        *p *= inv_segments;
        if k > 0 && k < last_doubled {
            *p *= 2.0;
        }
    }
    Ok(psd)
}

/// Periodic (DFT-even) Hann window, as `scipy.signal.get_window('hann', n)`.
fn hann_periodic(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / n as f64).cos())
        .collect()
}
