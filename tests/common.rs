//! Shared helpers: synthetic recordings and a minimal safetensors writer.
use ndarray::Array2;
use std::f64::consts::PI;
use std::path::Path;
use vgeeg::{Group, Recording};

#[allow(unused)]
/// Deterministic pseudo-random values in [-0.5, 0.5).
pub fn noise(seed: u64, n: usize) -> Vec<f64> {
    let mut state = seed.wrapping_mul(0x9E3779B97F4A7C15).wrapping_add(1);
    (0..n)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (state >> 11) as f64 / (1u64 << 53) as f64 - 0.5
        })
        .collect()
}

#[allow(unused)]
/// `channels` × `seconds` of alpha + theta rhythm plus noise at `sfreq` Hz.
///
/// `alpha_gain` scales the 10 Hz component so the two classes can differ.
pub fn synthetic_recording(
    id: &str,
    group: Group,
    sfreq: f64,
    seconds: usize,
    channels: usize,
    alpha_gain: f64,
    seed: u64,
) -> Recording {
    let n = (sfreq * seconds as f64).round() as usize;
    let mut data = Array2::<f64>::zeros((channels, n));
    for c in 0..channels {
        let eps = noise(seed * 131 + c as u64, n);
        for t in 0..n {
            let tt = t as f64 / sfreq;
            data[[c, t]] = alpha_gain * (2.0 * PI * 10.0 * tt + c as f64).sin()
                + 0.5 * (2.0 * PI * 6.0 * tt).sin()
                + 0.3 * (2.0 * PI * (40.0 + c as f64) * tt).sin()
                + eps[t];
        }
    }
    Recording::new(id, data, sfreq, group).unwrap()
}

#[allow(unused)]
/// Write `tensors` (name, dtype, shape, little-endian bytes) as safetensors.
pub fn write_safetensors(path: &Path, tensors: &[(&str, &str, Vec<usize>, Vec<u8>)]) {
    let mut header = serde_json::Map::new();
    let mut offset = 0usize;
    for (name, dtype, shape, data) in tensors {
        header.insert(
            name.to_string(),
            serde_json::json!({
                "dtype": dtype,
                "shape": shape,
                "data_offsets": [offset, offset + data.len()],
            }),
        );
        offset += data.len();
    }
    let mut hdr = serde_json::to_vec(&header).unwrap();
    while hdr.len() % 8 != 0 {
        hdr.push(b' ');
    }
    let mut bytes = (hdr.len() as u64).to_le_bytes().to_vec();
    bytes.extend_from_slice(&hdr);
    for (_, _, _, data) in tensors {
        bytes.extend_from_slice(data);
    }
    std::fs::write(path, bytes).unwrap();
}

#[allow(unused)]
pub fn f32_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}
