//! Error taxonomy for the feature pipeline and the experiment runner.
//!
//! Every stage fails fast. A failure deep inside a tensor walk is wrapped in
//! [`PipelineError::Located`] on the way out so the final message names the
//! recording, epoch, channel, band (or repetition and fold) that caused it.
use std::fmt;

use thiserror::Error;

use crate::band::Band;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// Malformed or too-short recording, degenerate input vector.
    #[error("input error: {0}")]
    Input(String),

    /// Unrealizable filter, disconnected graph, undefined graph metric.
    #[error("computation error: {0}")]
    Computation(String),

    /// Inconsistent per-recording feature block shapes.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Degenerate fold, e.g. a class missing from a split.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{location}: {source}")]
    Located {
        location: Location,
        #[source]
        source: Box<PipelineError>,
    },
}

/// Coarse classification of a [`PipelineError`], ignoring location wrappers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Input,
    Computation,
    ShapeMismatch,
    Evaluation,
    Io,
}

impl PipelineError {
    /// The kind of the innermost error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Input(_) => ErrorKind::Input,
            Self::Computation(_) => ErrorKind::Computation,
            Self::ShapeMismatch(_) => ErrorKind::ShapeMismatch,
            Self::Evaluation(_) => ErrorKind::Evaluation,
            Self::Io(_) => ErrorKind::Io,
            Self::Located { source, .. } => source.kind(),
        }
    }

    /// Wrap `self` with `location`, merging into an existing wrapper so that
    /// nested stages produce one flat location rather than a chain.
    pub fn at(self, location: Location) -> Self {
        match self {
            Self::Located { location: inner, source } => Self::Located {
                location: location.merge(inner),
                source,
            },
            other => Self::Located { location, source: Box::new(other) },
        }
    }

    /// The attached location, if any.
    pub fn location(&self) -> Option<&Location> {
        match self {
            Self::Located { location, .. } => Some(location),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

// ── Location ──────────────────────────────────────────────────────────────

/// Where in the pipeline an error occurred. Unset fields are omitted from the
/// rendered message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub recording: Option<String>,
    pub epoch: Option<usize>,
    pub channel: Option<usize>,
    pub band: Option<Band>,
    pub repetition: Option<usize>,
    pub fold: Option<usize>,
}

impl Location {
    pub fn recording(id: impl Into<String>) -> Self {
        Self { recording: Some(id.into()), ..Self::default() }
    }

    /// Position of one `(epoch, channel, band)` leaf of a tensor.
    pub fn leaf(epoch: usize, channel: usize, band: Band) -> Self {
        Self {
            epoch: Some(epoch),
            channel: Some(channel),
            band: Some(band),
            ..Self::default()
        }
    }

    pub fn fold(repetition: usize, fold: usize) -> Self {
        Self { repetition: Some(repetition), fold: Some(fold), ..Self::default() }
    }

    /// Fill every unset field of `self` from `inner`.
    fn merge(self, inner: Location) -> Self {
        Self {
            recording: self.recording.or(inner.recording),
            epoch: self.epoch.or(inner.epoch),
            channel: self.channel.or(inner.channel),
            band: self.band.or(inner.band),
            repetition: self.repetition.or(inner.repetition),
            fold: self.fold.or(inner.fold),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        if let Some(r) = &self.recording {
            parts.push(format!("recording '{r}'"));
        }
        if let Some(e) = self.epoch {
            parts.push(format!("epoch {e}"));
        }
        if let Some(c) = self.channel {
            parts.push(format!("channel {c}"));
        }
        if let Some(b) = self.band {
            parts.push(format!("band {}", b.name()));
        }
        if let Some(r) = self.repetition {
            parts.push(format!("repetition {r}"));
        }
        if let Some(k) = self.fold {
            parts.push(format!("fold {k}"));
        }
        if parts.is_empty() {
            f.write_str("<unknown location>")
        } else {
            f.write_str(&parts.join(" "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_locations_flatten() {
        let err = PipelineError::Computation("graph is disconnected".into())
            .at(Location::leaf(3, 1, Band::Gamma))
            .at(Location::recording("s07"));
        assert_eq!(err.kind(), ErrorKind::Computation);
        assert_eq!(
            err.to_string(),
            "recording 's07' epoch 3 channel 1 band Gamma: computation error: graph is disconnected"
        );
    }

    #[test]
    fn kind_of_unlocated_error() {
        let err = PipelineError::ShapeMismatch("x".into());
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
        assert!(err.location().is_none());
    }
}
