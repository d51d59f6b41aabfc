//! Common average reference: subtract the mean across channels at each time point.
//!
//! Matches `raw.set_eeg_reference()` with its default `'average'` reference
//! and `projection=False`.
//!
//! `data`: [C, T]  →  `data[c, t] -= mean(data[:, t])`
use ndarray::{Array2, Axis};

pub fn average_reference_inplace(data: &mut Array2<f64>) {
    // `mean_axis` is `None` only for zero channels, where there is nothing to do.
    if let Some(means) = data.mean_axis(Axis(0)) {
        for mut row in data.rows_mut() {
            row -= &means;
        }
    }
}
