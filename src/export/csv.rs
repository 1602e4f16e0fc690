use anyhow::Result;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use super::RecordExporter;
use crate::core::session::AttemptInterval;
use crate::renderer::overlay::frame_seconds;
use crate::shared::constants;
use crate::utils::{file_utils, logger};

/// Writes one CSV row per attempt, replacing any earlier record for the video.
pub struct CsvExporter {
    path: PathBuf,
    fps: f64,
}

impl CsvExporter {
    pub fn new(path: PathBuf, fps: f64) -> Self {
        Self { path, fps }
    }

    pub fn for_video(video: &Path, output_dir: &Path, fps: f64) -> Self {
        Self::new(file_utils::record_path(video, output_dir), fps)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn to_csv(&self, intervals: &[AttemptInterval]) -> String {
        let mut out = constants::CSV_COLUMNS.join(",");
        out.push('\n');
        for attempt in intervals {
            let _ = writeln!(
                out,
                "{},{:.2},{:.2},{},{}",
                attempt.number,
                frame_seconds(attempt.start_frame, self.fps),
                frame_seconds(attempt.end_frame, self.fps),
                attempt.start_frame,
                attempt.end_frame
            );
        }
        out
    }
}

impl RecordExporter for CsvExporter {
    fn export(&self, intervals: &[AttemptInterval]) -> Result<PathBuf> {
        file_utils::write_atomically(&self.path, self.to_csv(intervals).as_bytes())?;
        logger::info(&format!(
            "Exported {} attempts to {}",
            intervals.len(),
            self.path.display()
        ));
        Ok(self.path.clone())
    }
}
