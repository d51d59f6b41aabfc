//! PSD extractor: one recording → band-filtered Welch spectra per epoch.
//!
//! ```text
//! Recording [C, T]
//!   ├─ reference     common average (optional, on by default)
//!   ├─ epoch         [E, C, S]   S = round(epoch_dur · sfreq)
//!   └─ per band b:
//!        ├─ FIR band-pass (zero phase) of every epoch channel
//!        └─ Welch PSD (nperseg = min(256, S))
//!             │
//!             └─→ PsdTensor [E, C, B, F]   F = min(256, S) / 2 + 1
//! ```
use log::{debug, warn};
use ndarray::{s, Array4, ArrayView1};

use crate::band::Band;
use crate::config::FeatureConfig;
use crate::epoch::epoch;
use crate::error::{Location, PipelineError, Result};
use crate::filter::{apply_fir_zero_phase, design_bandpass};
use crate::recording::Recording;
use crate::reference::average_reference_inplace;
use crate::welch::{frequencies, n_freqs, welch};

/// Band-limited power spectra of one recording, shape `[E, C, B, F]`.
#[derive(Debug, Clone)]
pub struct PsdTensor {
    pub values: Array4<f64>,
    /// Band axis labels.
    pub bands: Vec<Band>,
    /// Frequency (Hz) of each spectral bin.
    pub freqs: Vec<f64>,
}

impl PsdTensor {
    pub fn n_epochs(&self) -> usize {
        self.values.shape()[0]
    }

    pub fn n_channels(&self) -> usize {
        self.values.shape()[1]
    }

    pub fn n_bins(&self) -> usize {
        self.values.shape()[3]
    }

    /// The spectral vector at one `(epoch, channel, band)` leaf.
    pub fn spectrum(&self, epoch: usize, channel: usize, band: usize) -> ArrayView1<'_, f64> {
        self.values.slice(s![epoch, channel, band, ..])
    }
}

/// Compute the [`PsdTensor`] of `recording`.
///
/// # Errors
///
/// * [`PipelineError::Input`] for an invalid configuration or a recording
///   shorter than one epoch.
/// * [`PipelineError::Computation`] when a band's filter cannot be realised at
///   the recording's sampling rate (e.g. Gamma at or below 200 Hz).
///
/// Every error carries the recording id, and the band where relevant.
pub fn extract_psd(recording: &Recording, cfg: &FeatureConfig) -> Result<PsdTensor> {
    let at_recording = |e: PipelineError| e.at(Location::recording(&recording.id));
    cfg.validate().map_err(at_recording)?;

    let sfreq = recording.sfreq;
    let (epoch_len, step) = cfg.epoch_geometry(sfreq);

    // Filters depend only on the band and the sampling rate.
    let kernels: Vec<Vec<f64>> = cfg
        .bands
        .iter()
        .map(|&band| {
            let (lo, hi) = band.range_hz();
            design_bandpass(lo, hi, sfreq).map_err(|e| {
                e.at(Location { band: Some(band), ..Location::recording(&recording.id) })
            })
        })
        .collect::<Result<_>>()?;
    for (band, h) in cfg.bands.iter().zip(kernels.iter()) {
        if h.len() > epoch_len {
            warn!(
                "{}: {band} filter has {} taps, longer than the {epoch_len}-sample epoch",
                recording.id,
                h.len()
            );
        }
    }

    let mut data = recording.data.clone();
    if cfg.average_reference {
        average_reference_inplace(&mut data);
    }
    let epochs = epoch(&data, epoch_len, step).map_err(at_recording)?;
    let (n_epochs, n_channels, _) = epochs.dim();
    let n_bins = n_freqs(cfg.nperseg, epoch_len);

    let mut values = Array4::<f64>::zeros((n_epochs, n_channels, cfg.bands.len(), n_bins));
    for e in 0..n_epochs {
        for (b, (&band, h)) in cfg.bands.iter().zip(kernels.iter()).enumerate() {
            let mut filtered = epochs.slice(s![e, .., ..]).to_owned();
            apply_fir_zero_phase(&mut filtered, h).map_err(|err| {
                err.at(Location { epoch: Some(e), band: Some(band), ..Location::recording(&recording.id) })
            })?;
            for (c, row) in filtered.rows().into_iter().enumerate() {
                let psd = welch(&row.to_vec(), sfreq, cfg.nperseg).map_err(|err| {
                    err.at(Location {
                        recording: Some(recording.id.clone()),
                        ..Location::leaf(e, c, band)
                    })
                })?;
                values.slice_mut(s![e, c, b, ..]).assign(&ArrayView1::from(&psd));
            }
        }
    }

    debug!(
        "{}: PSD tensor {:?} at {sfreq} Hz",
        recording.id,
        values.dim()
    );
    Ok(PsdTensor {
        values,
        bands: cfg.bands.clone(),
        freqs: frequencies(cfg.nperseg, epoch_len, sfreq),
    })
}
