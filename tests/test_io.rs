mod common;
use common::{f32_bytes, write_safetensors};
use vgeeg::io::{expand_patterns, load_recording};
use vgeeg::{ErrorKind, Group};

#[test]
fn loads_data_rate_and_channel_names() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("s07.safetensors");
    let data: Vec<f32> = (0..2 * 512).map(|i| (i as f32 * 0.01).sin()).collect();
    write_safetensors(
        &path,
        &[
            ("data", "F32", vec![2, 512], f32_bytes(&data)),
            ("sfreq", "F32", vec![1], f32_bytes(&[256.0])),
            ("ch_names", "U8", vec![9], b"Fp1\nFp2\n\n".to_vec()),
        ],
    );

    let rec = load_recording(&path, Group::Patient).unwrap();
    assert_eq!(rec.id, "s07");
    assert_eq!(rec.group, Group::Patient);
    assert_eq!((rec.n_channels(), rec.n_times()), (2, 512));
    assert_eq!(rec.sfreq, 256.0);
    assert_eq!(rec.ch_names, vec!["Fp1", "Fp2"]);
    approx::assert_abs_diff_eq!(rec.data[[1, 3]], f64::from(data[515]));
}

#[test]
fn missing_sfreq_is_an_input_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("h01.safetensors");
    write_safetensors(&path, &[("data", "F32", vec![1, 4], f32_bytes(&[1.0, 2.0, 3.0, 4.0]))]);
    let err = load_recording(&path, Group::Healthy).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Input);
    assert!(err.to_string().contains("sfreq"));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_recording(&dir.path().join("absent.safetensors"), Group::Healthy).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn patterns_expand_sorted() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["b.safetensors", "a.safetensors", "notes.txt"] {
        std::fs::write(dir.path().join(name), b"").unwrap();
    }
    let pattern = format!("{}/*.safetensors", dir.path().display());
    let paths = expand_patterns(&[pattern.clone(), pattern]).unwrap();
    let names: Vec<_> = paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.safetensors", "b.safetensors"]);
}

#[test]
fn oversized_header_length_is_an_input_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corrupt.safetensors");
    let mut bytes = u64::MAX.to_le_bytes().to_vec();
    bytes.extend_from_slice(b"{}");
    std::fs::write(&path, bytes).unwrap();
    let err = load_recording(&path, Group::Healthy).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Input);
}

#[test]
fn oversized_data_offsets_are_an_input_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corrupt.safetensors");
    let header = format!(
        r#"{{"data":{{"dtype":"F32","shape":[1,1],"data_offsets":[{},{}]}},"sfreq":{{"dtype":"F32","shape":[1],"data_offsets":[4,8]}}}}"#,
        u64::MAX - 1,
        u64::MAX
    );
    let mut bytes = (header.len() as u64).to_le_bytes().to_vec();
    bytes.extend_from_slice(header.as_bytes());
    bytes.extend_from_slice(&f32_bytes(&[1.0, 256.0]));
    std::fs::write(&path, bytes).unwrap();
    let err = load_recording(&path, Group::Healthy).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Input);
    assert!(err.to_string().contains("out of bounds"), "{err}");
}
