//! FIR band-pass design matching MNE / `scipy.signal.firwin`.
//!
//! For a band-pass at `[l_freq, h_freq]` Hz with sampling rate `sfreq`
//! (`mne.filter.create_filter(..., fir_design='firwin', fir_window='hamming')`):
//!   • lower transition bandwidth = min(max(0.25 * l_freq, 2.0), l_freq)
//!   • upper transition bandwidth = min(max(0.25 * h_freq, 2.0), nyq - h_freq)
//!   • filter length N            = ceil(3.3 / min(l_tb, h_tb) * sfreq), rounded to odd
//!   • kernel = Σ ± windowed-sinc lowpasses, one per transition, each sized for
//!     its own transition width and centred in the N-tap kernel
use std::f64::consts::PI;

use crate::error::{PipelineError, Result};

/// Main-lobe length factor of the Hamming window.
const HAMMING_LENGTH_FACTOR: f64 = 3.3;

/// MNE transition bandwidth for the lower (highpass) edge.
///
/// Rule: `min(max(0.25 * l_freq, 2.0), l_freq)`
pub fn auto_l_trans_bandwidth(l_freq: f64) -> f64 {
    (0.25 * l_freq).max(2.0).min(l_freq)
}

/// MNE transition bandwidth for the upper (lowpass) edge.
///
/// Rule: `min(max(0.25 * h_freq, 2.0), sfreq / 2 - h_freq)`
pub fn auto_h_trans_bandwidth(h_freq: f64, sfreq: f64) -> f64 {
    (0.25 * h_freq).max(2.0).min(sfreq / 2.0 - h_freq)
}

/// Number of FIR taps for a given transition bandwidth.
/// Returns an odd integer (required for zero-phase linear-phase FIR).
///
/// Formula: `ceil(3.3 / trans_bw * sfreq)` rounded up to odd.
pub fn auto_filter_length(trans_bw: f64, sfreq: f64) -> usize {
    let n_raw = (HAMMING_LENGTH_FACTOR / trans_bw * sfreq).ceil() as usize;
    if n_raw % 2 == 0 { n_raw + 1 } else { n_raw }
}

/// Design a zero-phase band-pass FIR filter for `[l_freq, h_freq]` Hz.
///
/// # Errors
///
/// [`PipelineError::Computation`] when the band cannot be realised at
/// `sfreq`: non-positive lower edge, inverted edges, or an upper edge at or
/// above the Nyquist frequency.
pub fn design_bandpass(l_freq: f64, h_freq: f64, sfreq: f64) -> Result<Vec<f64>> {
    let nyq = sfreq / 2.0;
    if !(l_freq > 0.0 && l_freq < h_freq) {
        return Err(PipelineError::Computation(format!(
            "invalid pass-band [{l_freq}, {h_freq}) Hz"
        )));
    }
    if h_freq >= nyq {
        return Err(PipelineError::Computation(format!(
            "upper edge {h_freq} Hz must be below the Nyquist frequency {nyq} Hz (sfreq = {sfreq} Hz)"
        )));
    }

    let l_tb = auto_l_trans_bandwidth(l_freq);
    let h_tb = auto_h_trans_bandwidth(h_freq, sfreq);
    let n = auto_filter_length(l_tb.min(h_tb), sfreq);

    let l_stop = l_freq - l_tb;
    let h_stop = h_freq + h_tb;

    // Walk the gain profile from Nyquist down to DC:
    //   0 above h_stop, 1 in [l_freq, h_freq], 0 below l_stop.
    // Rising into the pass-band adds a lowpass, falling out of it subtracts one.
    let mut h = vec![0.0_f64; n];
    add_transition(&mut h, h_freq, h_stop, sfreq, 1.0)?;
    add_transition(&mut h, l_stop, l_freq, sfreq, -1.0)?;
    Ok(h)
}

/// Add `sign ×` a lowpass whose cutoff sits midway through `[lo, hi]`,
/// sized for that transition and centred in `h`.
fn add_transition(h: &mut [f64], lo: f64, hi: f64, sfreq: f64, sign: f64) -> Result<()> {
    let n = h.len();
    let width = hi - lo;
    let mut this_n = (HAMMING_LENGTH_FACTOR * sfreq / width).round() as usize;
    this_n += 1 - this_n % 2;
    if this_n > n {
        return Err(PipelineError::Computation(format!(
            "transition [{lo}, {hi}] Hz needs {this_n} taps but the kernel has {n}"
        )));
    }
    let lp = firwin(this_n, (lo + hi) / 2.0, sfreq, true);
    let offset = (n - this_n) / 2;
    for (dst, &v) in h[offset..offset + this_n].iter_mut().zip(lp.iter()) {
        *dst += sign * v;
    }
    Ok(())
}

/// Hamming-windowed sinc FIR, normalised to unit DC gain.
///
/// `pass_zero=true` gives a lowpass; `false` a highpass by spectral inversion.
/// `cutoff_hz` is the -6 dB point. `n` must be odd.
pub fn firwin(n: usize, cutoff_hz: f64, sfreq: f64, pass_zero: bool) -> Vec<f64> {
    debug_assert!(n % 2 == 1, "firwin requires odd N for linear-phase filter");
    let alpha = (n - 1) as f64 / 2.0;
    let fc = cutoff_hz / (sfreq / 2.0); // normalised [0, 1]

    let win = hamming(n);
    let mut h: Vec<f64> = (0..n)
        .map(|i| {
            let x = i as f64 - alpha;
            // f(x) = sin(π·fc·x) / (π·x);  lim_{x→0} f(x) = fc
            let sinc = if x == 0.0 { fc } else { (PI * fc * x).sin() / (PI * x) };
            sinc * win[i]
        })
        .collect();

    let s: f64 = h.iter().sum();
    if s != 0.0 {
        h.iter_mut().for_each(|v| *v /= s);
    }

    if !pass_zero {
        h.iter_mut().for_each(|v| *v = -*v);
        h[n / 2] += 1.0;
    }
    h
}

/// Symmetric Hamming window of length `n`.
pub fn hamming(n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![1.0];
    }
    (0..n)
        .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f64 / (n - 1) as f64).cos())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::band::Band;

    /// |H(f)| of a real FIR evaluated directly.
    fn gain_at(h: &[f64], f: f64, sfreq: f64) -> f64 {
        let w = 2.0 * PI * f / sfreq;
        let (re, im) = h.iter().enumerate().fold((0.0, 0.0), |(re, im), (k, &c)| {
            (re + c * (w * k as f64).cos(), im - c * (w * k as f64).sin())
        });
        (re * re + im * im).sqrt()
    }

    #[test]
    fn filter_length_is_odd() {
        for band in Band::ALL {
            let (lo, hi) = band.range_hz();
            let h = design_bandpass(lo, hi, 256.0).unwrap();
            assert!(h.len() % 2 == 1, "{band}: N={} is even", h.len());
        }
    }

    #[test]
    fn delta_length_at_256hz() {
        // l_tb = 0.5 Hz → ceil(3.3 / 0.5 · 256) = 1690 → 1691 taps.
        let h = design_bandpass(0.5, 4.0, 256.0).unwrap();
        assert_eq!(h.len(), 1691);
    }

    #[test]
    fn bandpass_is_symmetric() {
        let h = design_bandpass(8.0, 12.0, 256.0).unwrap();
        let n = h.len();
        for i in 0..n / 2 {
            approx::assert_abs_diff_eq!(h[i], h[n - 1 - i], epsilon = 1e-12);
        }
    }

    #[test]
    fn bandpass_blocks_dc_passes_centre() {
        let h = design_bandpass(8.0, 12.0, 256.0).unwrap();
        let dc: f64 = h.iter().sum();
        approx::assert_abs_diff_eq!(dc, 0.0, epsilon = 1e-9);
        let centre = gain_at(&h, 10.0, 256.0);
        approx::assert_abs_diff_eq!(centre, 1.0, epsilon = 1e-2);
        assert!(gain_at(&h, 40.0, 256.0) < 1e-2);
    }

    #[test]
    fn gamma_above_nyquist_is_rejected() {
        let err = design_bandpass(30.0, 100.0, 200.0).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Computation);
        assert!(design_bandpass(30.0, 100.0, 160.0).is_err());
    }

    #[test]
    fn inverted_band_is_rejected() {
        assert!(design_bandpass(12.0, 8.0, 256.0).is_err());
        assert!(design_bandpass(0.0, 8.0, 256.0).is_err());
    }

    #[test]
    fn lowpass_dc_gain_unity() {
        let h = firwin(101, 10.0, 256.0, true);
        let dc: f64 = h.iter().sum();
        approx::assert_abs_diff_eq!(dc, 1.0, epsilon = 1e-12);
    }
}
