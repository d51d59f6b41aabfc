//! Recording loader.
//!
//! Reads a decoded recording from `raw.safetensors`:
//!
//! | key        | dtype | shape    | required |
//! |------------|-------|----------|----------|
//! | `data`     | F32   | `[C, T]` | yes      |
//! | `sfreq`    | F32   | `[1]`    | yes      |
//! | `ch_names` | U8    | `[n]`    | no, newline-separated UTF-8 |
//!
//! The class group is supplied by the caller, never read from the file.
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ndarray::Array2;

use crate::error::{PipelineError, Result};
use crate::recording::{Group, Recording};

// ── Low-level safetensors parser (raw bytes → ndarray) ───────────────────────

fn input_err(path: &Path, msg: impl std::fmt::Display) -> PipelineError {
    PipelineError::Input(format!("{}: {msg}", path.display()))
}

fn parse_header(path: &Path, bytes: &[u8]) -> Result<(HashMap<String, serde_json::Value>, usize)> {
    let len_bytes: [u8; 8] = bytes
        .get(..8)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| input_err(path, "safetensors file too small"))?;
    let data_start = usize::try_from(u64::from_le_bytes(len_bytes))
        .ok()
        .and_then(|n| n.checked_add(8))
        .ok_or_else(|| input_err(path, "safetensors header length out of bounds"))?;
    let header_bytes = bytes
        .get(8..data_start)
        .ok_or_else(|| input_err(path, "truncated safetensors header"))?;
    let header = serde_json::from_slice(header_bytes)
        .map_err(|e| input_err(path, format!("failed to parse safetensors header: {e}")))?;
    Ok((header, data_start))
}

fn tensor_bytes<'a>(
    path: &Path,
    bytes: &'a [u8],
    data_start: usize,
    key: &str,
    entry: &serde_json::Value,
) -> Result<&'a [u8]> {
    let offsets = entry["data_offsets"]
        .as_array()
        .filter(|o| o.len() == 2)
        .ok_or_else(|| input_err(path, format!("'{key}': missing data_offsets")))?;
    // Offsets are relative to the end of the header.
    let bound = |v: &serde_json::Value| {
        v.as_u64()
            .and_then(|x| usize::try_from(x).ok())
            .and_then(|x| data_start.checked_add(x))
            .ok_or_else(|| input_err(path, format!("'{key}': data offset out of bounds")))
    };
    let (s, e) = (bound(&offsets[0])?, bound(&offsets[1])?);
    bytes
        .get(s..e)
        .ok_or_else(|| input_err(path, format!("'{key}': data out of bounds")))
}

fn read_f32_tensor(
    path: &Path,
    bytes: &[u8],
    data_start: usize,
    key: &str,
    entry: &serde_json::Value,
) -> Result<Vec<f32>> {
    if entry["dtype"].as_str() != Some("F32") {
        return Err(input_err(path, format!("'{key}': expected dtype F32")));
    }
    let raw = tensor_bytes(path, bytes, data_start, key, entry)?;
    Ok(raw
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

fn shape_of(path: &Path, key: &str, entry: &serde_json::Value) -> Result<Vec<usize>> {
    entry["shape"]
        .as_array()
        .ok_or_else(|| input_err(path, format!("'{key}': missing shape")))?
        .iter()
        .map(|v| {
            v.as_u64()
                .map(|x| x as usize)
                .ok_or_else(|| input_err(path, format!("'{key}': bad shape")))
        })
        .collect()
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load one recording and tag it with `group`. The id is the file stem.
///
/// # Errors
///
/// [`PipelineError::Io`] if the file cannot be read, [`PipelineError::Input`]
/// if it cannot be parsed.
pub fn load_recording(path: &Path, group: Group) -> Result<Recording> {
    let bytes = std::fs::read(path)?;
    let (header, data_start) = parse_header(path, &bytes)?;

    let data_entry = header.get("data").ok_or_else(|| input_err(path, "missing 'data' key"))?;
    let data_shape = shape_of(path, "data", data_entry)?;
    let &[n_ch, n_t] = data_shape.as_slice() else {
        return Err(input_err(path, format!("'data' must be 2-D, got shape {data_shape:?}")));
    };
    let data_vec = read_f32_tensor(path, &bytes, data_start, "data", data_entry)?;
    let data = Array2::from_shape_vec((n_ch, n_t), data_vec)
        .map_err(|e| input_err(path, format!("'data': {e}")))?
        .mapv(f64::from);

    let sfreq_entry = header.get("sfreq").ok_or_else(|| input_err(path, "missing 'sfreq' key"))?;
    let sfreq = read_f32_tensor(path, &bytes, data_start, "sfreq", sfreq_entry)?
        .first()
        .copied()
        .ok_or_else(|| input_err(path, "'sfreq' is empty"))?;

    // Channel names are optional.
    let ch_names = match header.get("ch_names") {
        Some(entry) => {
            let raw = tensor_bytes(path, &bytes, data_start, "ch_names", entry)?;
            std::str::from_utf8(raw)
                .map_err(|e| input_err(path, format!("'ch_names': {e}")))?
                .split('\n')
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        }
        None => vec![],
    };

    let id = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(Recording::new(id, data, f64::from(sfreq), group)?.with_ch_names(ch_names))
}

/// Expand glob `patterns` into a sorted, de-duplicated file list.
pub fn expand_patterns(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        let entries = glob::glob(pattern)
            .map_err(|e| PipelineError::Input(format!("bad pattern '{pattern}': {e}")))?;
        for entry in entries {
            let path = entry.map_err(|e| PipelineError::Io(e.into_error()))?;
            if path.is_file() {
                paths.push(path);
            }
        }
    }
    paths.sort();
    paths.dedup();
    Ok(paths)
}
