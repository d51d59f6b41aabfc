//! Pipeline configuration.
//!
//! [`FeatureConfig`] holds every tunable parameter of the feature chain
//! (PSD → visibility graph → graph descriptors), [`ExperimentConfig`] those of
//! the cross-validated runner and [`ClassifierConfig`] the hyperparameters of
//! the bundled classifier. All fields have defaults reproducing the published
//! study settings, and [`RunConfig`] bundles the three for loading from JSON.
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::band::Band;
use crate::error::{PipelineError, Result};

/// Configuration for the feature-extraction chain.
///
/// All fields are `pub` so you can construct one with struct-update syntax:
///
/// ```
/// use vgeeg::FeatureConfig;
///
/// let cfg = FeatureConfig {
///     epoch_dur: 2.0,     // 2 s epochs instead of 1 s
///     parallel: true,
///     ..FeatureConfig::default()
/// };
/// assert_eq!(cfg.nperseg, 256);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Duration of each epoch in seconds.
    ///
    /// Default: `1.0` s.
    pub epoch_dur: f64,

    /// Overlap between consecutive epochs in seconds. Must be smaller than
    /// `epoch_dur`.
    ///
    /// Default: `0.0` s (non-overlapping).
    pub epoch_overlap: f64,

    /// Welch segment length in samples. Shrinks to the epoch length when the
    /// epoch is shorter.
    ///
    /// Default: `256`.
    pub nperseg: usize,

    /// Bands to filter into, in tensor axis order.
    ///
    /// Default: [`Band::ALL`].
    pub bands: Vec<Band>,

    /// Re-reference every recording to the common average before epoching.
    ///
    /// Default: `true`.
    pub average_reference: bool,

    /// Process recordings of a group on the rayon thread pool. Output order
    /// is identical to the sequential run.
    ///
    /// Default: `false`.
    pub parallel: bool,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            epoch_dur: 1.0,
            epoch_overlap: 0.0,
            nperseg: 256,
            bands: Band::ALL.to_vec(),
            average_reference: true,
            parallel: false,
        }
    }
}

impl FeatureConfig {
    /// `(epoch_samples, step)` at sampling rate `sfreq`.
    ///
    /// # Examples
    ///
    /// ```
    /// use vgeeg::FeatureConfig;
    /// let cfg = FeatureConfig::default();
    /// assert_eq!(cfg.epoch_geometry(256.0), (256, 256));
    /// ```
    pub fn epoch_geometry(&self, sfreq: f64) -> (usize, usize) {
        let n = crate::epoch::epoch_samples(self.epoch_dur, sfreq);
        let overlap = crate::epoch::epoch_samples(self.epoch_overlap, sfreq);
        (n, n.saturating_sub(overlap))
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.epoch_dur > 0.0) {
            return Err(PipelineError::Input(format!(
                "epoch_dur must be positive, got {}",
                self.epoch_dur
            )));
        }
        if !(self.epoch_overlap >= 0.0 && self.epoch_overlap < self.epoch_dur) {
            return Err(PipelineError::Input(format!(
                "epoch_overlap must lie in [0, epoch_dur), got {}",
                self.epoch_overlap
            )));
        }
        if self.nperseg < 2 {
            return Err(PipelineError::Input(format!(
                "nperseg must be at least 2, got {}",
                self.nperseg
            )));
        }
        if self.bands.is_empty() {
            return Err(PipelineError::Input("at least one band is required".into()));
        }
        Ok(())
    }
}

/// How the k-fold shuffle seed evolves across repetitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedPolicy {
    /// The same seed every repetition: identical folds each time.
    Fixed,
    /// `seed + repetition`: a fresh split per repetition.
    PerRepetition,
}

/// Configuration for the cross-validated experiment runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Number of folds `k`.
    ///
    /// Default: `5`.
    pub n_folds: usize,

    /// Outer repetitions of the full k-fold loop.
    ///
    /// Default: `10`.
    pub n_repetitions: usize,

    /// Shuffle sample order before cutting folds.
    ///
    /// Default: `true`.
    pub shuffle: bool,

    /// Shuffle seed.
    ///
    /// Default: `42`.
    pub seed: u64,

    /// Default: [`SeedPolicy::Fixed`].
    pub seed_policy: SeedPolicy,

    /// Probability at or above which a sample is predicted as patient.
    ///
    /// Default: `0.5`.
    pub threshold: f64,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            n_folds: 5,
            n_repetitions: 10,
            shuffle: true,
            seed: 42,
            seed_policy: SeedPolicy::Fixed,
            threshold: 0.5,
        }
    }
}

impl ExperimentConfig {
    /// Seed used for the fold split of `repetition`.
    pub fn seed_for(&self, repetition: usize) -> u64 {
        match self.seed_policy {
            SeedPolicy::Fixed => self.seed,
            SeedPolicy::PerRepetition => self.seed.wrapping_add(repetition as u64),
        }
    }
}

/// Hyperparameters of [`crate::classifier::LogisticRegression`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Gradient-descent step size.
    ///
    /// Default: `0.1`.
    pub learning_rate: f64,

    /// Full-batch gradient steps.
    ///
    /// Default: `500`.
    pub epochs: usize,

    /// L2 penalty on the weights (not the bias).
    ///
    /// Default: `1e-3`.
    pub l2: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self { learning_rate: 0.1, epochs: 500, l2: 1e-3 }
    }
}

/// All configuration of one run, as read from a JSON file. Missing sections
/// and fields take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub features: FeatureConfig,
    pub experiment: ExperimentConfig,
    pub classifier: ClassifierConfig,
}

impl RunConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| {
            PipelineError::Input(format!("config {}: {e}", path.display()))
        })
    }
}
