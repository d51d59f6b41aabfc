//! FIR filter design and application.
//!
//! - [`design`]: Hamming-windowed sinc band-pass FIR design, matching
//!   `mne.filter.create_filter(fir_design='firwin', fir_window='hamming')`.
//! - [`apply`]: Overlap-add zero-phase convolution, matching MNE's
//!   `_overlap_add_filter` / `_1d_overlap_filter`.

pub mod apply;
pub mod design;

pub use apply::{apply_fir_zero_phase, filter_1d};
pub use design::{
    auto_filter_length, auto_h_trans_bandwidth, auto_l_trans_bandwidth, design_bandpass, firwin,
    hamming,
};
