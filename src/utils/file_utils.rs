use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::shared::constants;

/// Video name up to its first dot, so `trial.cam1.mp4` becomes `trial`.
pub fn video_name(video: &Path) -> String {
    let file_name = video
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    match file_name.split('.').next() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => "video".to_string(),
    }
}

/// `<output_dir>/<video name>_attempt_ground_truth.csv`
pub fn record_path(video: &Path, output_dir: &Path) -> PathBuf {
    output_dir.join(format!(
        "{}{}.{}",
        video_name(video),
        constants::OUTPUT_SUFFIX,
        constants::OUTPUT_EXTENSION
    ))
}

/// Writes `contents` to a sibling temp file and renames it over `path`, so a
/// failure never leaves a half-written file at `path`.
pub fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    let mut tmp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    let result = fs::write(&tmp_path, contents)
        .with_context(|| format!("Failed to write {}", tmp_path.display()))
        .and_then(|_| {
            fs::rename(&tmp_path, path)
                .with_context(|| format!("Failed to move {} into place", path.display()))
        });

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_path_uses_name_before_first_dot() {
        assert_eq!(
            record_path(Path::new("/data/videos/trial.cam1.mp4"), Path::new("out")),
            PathBuf::from("out/trial_attempt_ground_truth.csv")
        );
        assert_eq!(video_name(Path::new(".mp4")), "video");
    }

    #[test]
    fn test_write_atomically_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("record.csv");
        fs::write(&path, "old").unwrap();

        write_atomically(&path, b"new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert!(!dir.path().join("record.csv.tmp").exists());
    }

    #[test]
    fn test_write_atomically_fails_for_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("record.csv");
        assert!(write_atomically(&path, b"x").is_err());
        assert!(!path.exists());
    }
}
