//! Canonical EEG frequency bands.
//!
//! | Band  | Range (Hz)  |
//! |-------|-------------|
//! | Delta | 0.5 – 4     |
//! | Theta | 4 – 8       |
//! | Alpha | 8 – 12      |
//! | Beta  | 12 – 30     |
//! | Gamma | 30 – 100    |
//!
//! The declaration order is the band axis order of every tensor in the crate.
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Band {
    Delta,
    Theta,
    Alpha,
    Beta,
    Gamma,
}

impl Band {
    /// All bands in axis order.
    pub const ALL: [Band; 5] = [Band::Delta, Band::Theta, Band::Alpha, Band::Beta, Band::Gamma];

    /// Pass-band edges `(low, high)` in Hz.
    pub fn range_hz(self) -> (f64, f64) {
        match self {
            Band::Delta => (0.5, 4.0),
            Band::Theta => (4.0, 8.0),
            Band::Alpha => (8.0, 12.0),
            Band::Beta => (12.0, 30.0),
            Band::Gamma => (30.0, 100.0),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Band::Delta => "Delta",
            Band::Theta => "Theta",
            Band::Alpha => "Alpha",
            Band::Beta => "Beta",
            Band::Gamma => "Gamma",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_are_contiguous_and_ordered() {
        for pair in Band::ALL.windows(2) {
            let (_, hi) = pair[0].range_hz();
            let (lo, _) = pair[1].range_hz();
            assert_eq!(hi, lo, "{} and {} are not contiguous", pair[0], pair[1]);
        }
    }
}
