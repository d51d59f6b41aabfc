//! A decoded multi-channel recording and its class group.
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Class membership of a recording. Supplied by the caller; never inferred
/// from file names inside the library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Group {
    Healthy,
    Patient,
}

impl Group {
    /// Binary class label: healthy = 0, patient = 1.
    pub fn label(self) -> u8 {
        match self {
            Group::Healthy => 0,
            Group::Patient => 1,
        }
    }
}

/// One EEG recording held in memory.
#[derive(Debug, Clone)]
pub struct Recording {
    /// Identifier used in log lines and error messages (usually the file stem).
    pub id: String,
    /// Signal, shape `[C, T]`.
    pub data: Array2<f64>,
    /// Sampling rate in Hz.
    pub sfreq: f64,
    /// Channel names; may be empty.
    pub ch_names: Vec<String>,
    pub group: Group,
}

impl Recording {
    /// Build a recording, rejecting empty signals and non-positive rates.
    pub fn new(id: impl Into<String>, data: Array2<f64>, sfreq: f64, group: Group) -> Result<Self> {
        let id = id.into();
        if !(sfreq.is_finite() && sfreq > 0.0) {
            return Err(PipelineError::Input(format!(
                "recording '{id}': invalid sampling rate {sfreq}"
            )));
        }
        if data.nrows() == 0 || data.ncols() == 0 {
            return Err(PipelineError::Input(format!(
                "recording '{id}': empty signal of shape {:?}",
                data.dim()
            )));
        }
        Ok(Self { id, data, sfreq, ch_names: vec![], group })
    }

    pub fn with_ch_names(mut self, ch_names: Vec<String>) -> Self {
        self.ch_names = ch_names;
        self
    }

    #[inline]
    pub fn n_channels(&self) -> usize {
        self.data.nrows()
    }

    #[inline]
    pub fn n_times(&self) -> usize {
        self.data.ncols()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels() {
        assert_eq!(Group::Healthy.label(), 0);
        assert_eq!(Group::Patient.label(), 1);
    }

    #[test]
    fn rejects_bad_sfreq() {
        let data = Array2::zeros((2, 10));
        assert!(Recording::new("r", data.clone(), 0.0, Group::Healthy).is_err());
        assert!(Recording::new("r", data, f64::NAN, Group::Healthy).is_err());
    }

    #[test]
    fn rejects_empty_signal() {
        let data = Array2::zeros((0, 10));
        assert!(Recording::new("r", data, 256.0, Group::Patient).is_err());
    }
}
