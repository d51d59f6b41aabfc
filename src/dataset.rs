//! Label assembler: stack per-recording feature tensors into one labelled
//! dataset.
//!
//! Row order is fixed: every patient-group epoch first (label 1), then every
//! healthy-group epoch (label 0); within a group, recordings keep their input
//! order and epochs their temporal order.
use log::info;
use ndarray::{concatenate, Array1, Array3, Array4, ArrayView4, Axis};

use crate::error::{PipelineError, Result};
use crate::recording::Group;

/// Graph descriptors of one recording, shape `[E, C, B, 11]`.
#[derive(Debug, Clone)]
pub struct RecordingFeatures {
    pub id: String,
    pub group: Group,
    /// Spectral bins each graph was built from.
    pub n_bins: usize,
    pub features: Array4<f64>,
}

impl RecordingFeatures {
    pub fn n_epochs(&self) -> usize {
        self.features.shape()[0]
    }

    /// Shape of one epoch's feature block `(C, B, 11)`.
    pub fn block_shape(&self) -> (usize, usize, usize) {
        let s = self.features.shape();
        (s[1], s[2], s[3])
    }
}

/// Samples (epochs) with binary labels.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// `[N, C, B, 11]`
    pub features: Array4<f64>,
    /// `[N]`, 1 = patient, 0 = healthy.
    pub labels: Array1<u8>,
}

impl Dataset {
    /// Stack `patient` then `healthy` recordings.
    ///
    /// # Errors
    ///
    /// * [`PipelineError::Input`] if both groups are empty or a recording sits
    ///   in the wrong group's slice.
    /// * [`PipelineError::ShapeMismatch`] if any recording's per-epoch block
    ///   shape or spectral-bin count differs from the first one's (different
    ///   channel counts or sampling rates upstream). Nothing is truncated or
    ///   padded.
    pub fn assemble(patient: &[RecordingFeatures], healthy: &[RecordingFeatures]) -> Result<Self> {
        let ordered: Vec<(&RecordingFeatures, Group)> = patient
            .iter()
            .map(|r| (r, Group::Patient))
            .chain(healthy.iter().map(|r| (r, Group::Healthy)))
            .collect();
        let Some((first, _)) = ordered.first() else {
            return Err(PipelineError::Input("no recordings to assemble".into()));
        };
        let expected = first.block_shape();

        for (rec, slot) in &ordered {
            if rec.group != *slot {
                return Err(PipelineError::Input(format!(
                    "recording '{}' is {:?} but was passed as {slot:?}",
                    rec.id, rec.group
                )));
            }
            if rec.block_shape() != expected {
                return Err(PipelineError::ShapeMismatch(format!(
                    "recording '{}' has per-epoch block {:?}, expected {expected:?} (from '{}')",
                    rec.id,
                    rec.block_shape(),
                    first.id
                )));
            }
            if rec.n_bins != first.n_bins {
                return Err(PipelineError::ShapeMismatch(format!(
                    "recording '{}' graphs span {} spectral bins, expected {} (from '{}')",
                    rec.id, rec.n_bins, first.n_bins, first.id
                )));
            }
        }

        let views: Vec<ArrayView4<'_, f64>> = ordered.iter().map(|(r, _)| r.features.view()).collect();
        let features = concatenate(Axis(0), &views)
            .map_err(|e| PipelineError::ShapeMismatch(format!("stacking features: {e}")))?;
        let labels: Array1<u8> = ordered
            .iter()
            .flat_map(|(r, slot)| std::iter::repeat(slot.label()).take(r.n_epochs()))
            .collect();

        let n_patient: usize = patient.iter().map(RecordingFeatures::n_epochs).sum();
        info!(
            "assembled {} samples ({} patient, {} healthy) from {} recordings",
            labels.len(),
            n_patient,
            labels.len() - n_patient,
            ordered.len()
        );
        Ok(Self { features, labels })
    }

    /// Partition `recordings` by group and [`assemble`](Self::assemble) them.
    pub fn from_recordings(recordings: &[RecordingFeatures]) -> Result<Self> {
        let (patient, healthy): (Vec<_>, Vec<_>) =
            recordings.iter().cloned().partition(|r| r.group == Group::Patient);
        Self::assemble(&patient, &healthy)
    }

    #[inline]
    pub fn n_samples(&self) -> usize {
        self.labels.len()
    }

    /// Sequence view for the classifier: `[N, C, B·11]`, channels as steps,
    /// bands × descriptors as the per-step feature vector.
    pub fn sequences(&self) -> Result<Array3<f64>> {
        let (n, c, b, f) = self.features.dim();
        self.features
            .as_standard_layout()
            .into_owned()
            .into_shape_with_order((n, c, b * f))
            .map_err(|e| PipelineError::ShapeMismatch(format!("sequence reshape: {e}")))
    }
}
