//! # vgeeg: visibility-graph features of EEG band spectra
//!
//! `vgeeg` turns EEG recordings into graph-theoretic feature vectors and
//! evaluates a classifier on them with repeated k-fold cross-validation. The
//! DSP front end follows MNE-Python / SciPy conventions (firwin band-pass,
//! zero-phase overlap-add, Welch PSD); the graph descriptors follow NetworkX
//! definitions.
//!
//! ## Pipeline overview
//!
//! ```text
//! Recording [C, T] + group (healthy | patient)
//!   │
//!   ├─ psd::extract_psd()             average reference → 1 s epochs →
//!   │                                 FIR band-pass × 5 bands → Welch
//!   │                                 → [E, C, 5, F]
//!   ├─ visibility::natural_visibility_graph()   one graph per spectrum
//!   ├─ features::extract_features()   11 descriptors per graph
//!   │                                 → [E, C, 5, 11]
//!   ├─ dataset::Dataset::assemble()   patient rows, then healthy rows
//!   │                                 → features [N, C, 5, 11], labels [N]
//!   └─ experiment::run_dataset()      R × k-fold: scale(train) → train → evaluate
//!        │
//!        └─→ ExperimentReport  (per-fold metrics, means, every fold's ROC curve)
//! ```
//!
//! ## Quick start
//!
//! ```no_run
//! use vgeeg::{group_features, Dataset, ExperimentConfig, FeatureConfig, LogisticRegression};
//! use vgeeg::io::load_recording;
//! use vgeeg::recording::Group;
//! use std::path::Path;
//!
//! let recordings = vec![
//!     load_recording(Path::new("data/h01.safetensors"), Group::Healthy).unwrap(),
//!     load_recording(Path::new("data/s01.safetensors"), Group::Patient).unwrap(),
//! ];
//! let features = group_features(&recordings, &FeatureConfig::default()).unwrap();
//! let dataset  = Dataset::from_recordings(&features).unwrap();
//!
//! let report = vgeeg::run_dataset(
//!     &dataset,
//!     &LogisticRegression::default(),
//!     &ExperimentConfig::default(),
//! ).unwrap();
//! println!("mean AUC {:.3}", report.grand_mean.roc_auc);
//! ```
//!
//! ## Running individual stages
//!
//! ```no_run
//! use vgeeg::{extract_psd, graph_features, visibility_graphs, FeatureConfig};
//! use vgeeg::recording::{Group, Recording};
//! use ndarray::Array2;
//!
//! let rec = Recording::new("r", Array2::zeros((4, 2560)), 256.0, Group::Healthy).unwrap();
//! let cfg = FeatureConfig::default();
//!
//! let psd    = extract_psd(&rec, &cfg).unwrap();             // [10, 4, 5, 129]
//! let graphs = visibility_graphs(&psd).unwrap();             // [10, 4, 5]
//! let feats  = graph_features(&graphs, &psd.bands).unwrap(); // [10, 4, 5, 11]
//! ```

pub mod band;
pub mod classifier;
pub mod config;
pub mod dataset;
pub mod epoch;
pub mod error;
pub mod experiment;
pub mod features;
pub mod filter;
pub mod graph;
pub mod io;
pub mod kfold;
pub mod metrics;
pub mod psd;
pub mod recording;
pub mod reference;
pub mod scaler;
pub mod visibility;
pub mod welch;

use log::info;
use ndarray::Array4;
use rayon::prelude::*;

// ── Crate-root re-exports ─────────────────────────────────────────────────

pub use band::Band;
pub use classifier::{evaluate, Classifier, LogisticModel, LogisticRegression, TrainedModel};
pub use config::{ClassifierConfig, ExperimentConfig, FeatureConfig, RunConfig, SeedPolicy};
pub use dataset::{Dataset, RecordingFeatures};
pub use error::{ErrorKind, Location, PipelineError, Result};
pub use experiment::{run_dataset, run_experiment, ExperimentReport, MetricSummary};
pub use features::{extract_features, graph_features, GraphFeatures, FEATURE_NAMES, N_FEATURES};
pub use graph::Graph;
pub use metrics::{ConfusionMatrix, FoldMetrics};
pub use psd::{extract_psd, PsdTensor};
pub use recording::{Group, Recording};
pub use scaler::{scale_split, StandardScaler};
pub use visibility::{natural_visibility_graph, visibility_graphs};

/// Run the feature chain on a single recording: `[E, C, B, 11]`.
///
/// Equivalent to `graph_features(&visibility_graphs(&extract_psd(..)?)?, ..)`
/// but builds and measures each graph in turn instead of materialising the
/// whole graph tensor.
///
/// # Errors
///
/// Any stage error, located by recording id and, below the PSD stage, by
/// epoch, channel and band.
pub fn recording_features(recording: &Recording, cfg: &FeatureConfig) -> Result<RecordingFeatures> {
    let psd = extract_psd(recording, cfg)?;
    let (n_e, n_c, n_b, _) = psd.values.dim();

    let mut out = Array4::<f64>::zeros((n_e, n_c, n_b, N_FEATURES));
    for e in 0..n_e {
        for c in 0..n_c {
            for (b, &band) in psd.bands.iter().enumerate() {
                let located = |err: PipelineError| {
                    err.at(Location {
                        recording: Some(recording.id.clone()),
                        ..Location::leaf(e, c, band)
                    })
                };
                let g = natural_visibility_graph(psd.spectrum(e, c, b)).map_err(located)?;
                let f = extract_features(&g).map_err(located)?;
                for (k, v) in f.to_array().into_iter().enumerate() {
                    out[[e, c, b, k]] = v;
                }
            }
        }
    }

    info!(
        "{}: {} epochs × {} channels × {} bands ({} bins per spectrum)",
        recording.id,
        n_e,
        n_c,
        n_b,
        psd.n_bins()
    );
    Ok(RecordingFeatures {
        id: recording.id.clone(),
        group: recording.group,
        n_bins: psd.n_bins(),
        features: out,
    })
}

/// [`recording_features`] for every recording, in input order.
///
/// With [`FeatureConfig::parallel`] the recordings are processed on the rayon
/// pool; the result order is unchanged.
pub fn group_features(recordings: &[Recording], cfg: &FeatureConfig) -> Result<Vec<RecordingFeatures>> {
    if cfg.parallel {
        recordings.par_iter().map(|r| recording_features(r, cfg)).collect()
    } else {
        recordings.iter().map(|r| recording_features(r, cfg)).collect()
    }
}
