use anyhow::{anyhow, bail, Context, Result};
use fast_image_resize as fr;
use fr::images::Image;
#[cfg(target_os = "macos")]
use opencv::core;
use opencv::{imgproc, prelude::*, videoio};
use std::path::{Path, PathBuf};

use super::frame_data::FrameData;
use super::FrameSource;
use crate::utils::logger;

/// Frame source backed by an OpenCV `VideoCapture`.
///
/// Frames are converted to RGB and scaled to the target size set with
/// `fit_within`, keeping the video's aspect ratio.
pub struct VideoSource {
    capture: videoio::VideoCapture,
    path: PathBuf,
    fps: f64,
    frame_count: usize,
    native_width: u32,
    native_height: u32,
    width: u32,
    height: u32,
    // Index the capture will return on the next plain read.
    next_index: Option<usize>,
    resizer: fr::Resizer,
}

impl VideoSource {
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!("Video file '{}' not found", path.display());
        }
        let path_str = path
            .to_str()
            .ok_or_else(|| anyhow!("Video path is not valid UTF-8: {}", path.display()))?;

        logger::info(&format!("Opening video with OpenCV: {}", path_str));

        let capture = videoio::VideoCapture::from_file(path_str, videoio::CAP_ANY)
            .with_context(|| format!("Could not open video file '{}'", path.display()))?;
        if !capture.is_opened()? {
            bail!("Could not open video file '{}'", path.display());
        }

        let fps = capture.get(videoio::CAP_PROP_FPS)?;
        let frame_count = capture.get(videoio::CAP_PROP_FRAME_COUNT)?.max(0.0) as usize;
        let native_width = capture.get(videoio::CAP_PROP_FRAME_WIDTH)? as u32;
        let native_height = capture.get(videoio::CAP_PROP_FRAME_HEIGHT)? as u32;

        logger::info(&format!(
            "Video loaded: {}x{} @ {:.2} fps, {} frames",
            native_width, native_height, fps, frame_count
        ));

        Ok(Self {
            capture,
            path: path.to_path_buf(),
            fps: if fps.is_finite() && fps > 0.0 { fps } else { 0.0 },
            frame_count,
            native_width: native_width.max(1),
            native_height: native_height.max(1),
            width: native_width.max(1),
            height: native_height.max(1),
            next_index: Some(0),
            resizer: fr::Resizer::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn seek(&mut self, index: usize) -> Result<()> {
        if self.next_index == Some(index) {
            return Ok(());
        }
        self.capture
            .set(videoio::CAP_PROP_POS_FRAMES, index as f64)
            .with_context(|| format!("Failed to seek to frame {}", index))?;
        self.next_index = Some(index);
        Ok(())
    }

    fn to_rgb_scaled(&mut self, frame: &Mat) -> Result<Vec<u8>> {
        let mut rgb = Mat::default();
        #[cfg(target_os = "macos")]
        imgproc::cvt_color(frame, &mut rgb, imgproc::COLOR_BGR2RGB, 0, core::AlgorithmHint::ALGO_HINT_DEFAULT)?;

        #[cfg(not(target_os = "macos"))]
        imgproc::cvt_color(frame, &mut rgb, imgproc::COLOR_BGR2RGB, 0)?;

        if !rgb.is_continuous() {
            bail!("Frame is not continuous");
        }

        let src_w = rgb.cols() as u32;
        let src_h = rgb.rows() as u32;
        let bytes = rgb.data_bytes()?;
        if src_w == self.width && src_h == self.height {
            return Ok(bytes.to_vec());
        }

        let src = Image::from_vec_u8(src_w, src_h, bytes.to_vec(), fr::PixelType::U8x3)?;
        let mut dst = Image::new(self.width, self.height, fr::PixelType::U8x3);
        self.resizer.resize(&src, &mut dst, None)?;
        Ok(dst.buffer().to_vec())
    }
}

impl FrameSource for VideoSource {
    fn frame_count(&self) -> usize {
        self.frame_count
    }

    fn fps(&self) -> f64 {
        self.fps
    }

    fn get_frame(&mut self, index: usize) -> Result<FrameData> {
        let start = std::time::Instant::now();
        self.seek(index)?;

        let mut frame = Mat::default();
        let ok = self.capture.read(&mut frame)?;
        if !ok || frame.empty() {
            // Position is unknown after a failed read; force a seek next time.
            self.next_index = None;
            bail!("Could not read frame {}", index);
        }
        self.next_index = Some(index + 1);

        let buffer = self.to_rgb_scaled(&frame)?;

        let elapsed = start.elapsed();
        if elapsed.as_millis() > 10 {
            logger::debug(&format!("Slow frame {}: {}us", index, elapsed.as_micros()));
        }

        Ok(FrameData::new(index, buffer, self.width, self.height))
    }

    /// Largest size that fits the bounds without distorting the picture.
    fn fit_within(&mut self, max_width: u32, max_height: u32) {
        let (width, height) = fit_size(
            self.native_width,
            self.native_height,
            max_width.max(1),
            max_height.max(1),
        );
        self.width = width;
        self.height = height;
        logger::debug(&format!(
            "Output frame size {}x{} (bounds {}x{})",
            width, height, max_width, max_height
        ));
    }
}

/// Largest size with the source aspect ratio that fits inside the bounds.
pub fn fit_size(src_w: u32, src_h: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    let (src_w, src_h) = (src_w.max(1) as f64, src_h.max(1) as f64);
    let scale = (max_w as f64 / src_w).min(max_h as f64 / src_h);
    let w = ((src_w * scale).round() as u32).clamp(1, max_w.max(1));
    let h = ((src_h * scale).round() as u32).clamp(1, max_h.max(1));
    (w, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_size_keeps_aspect() {
        // 1920x1080 into an 80x44 half-block area
        assert_eq!(fit_size(1920, 1080, 80, 44), (78, 44));
        assert_eq!(fit_size(1920, 1080, 80, 200), (80, 45));
    }

    #[test]
    fn test_fit_size_never_zero() {
        assert_eq!(fit_size(4000, 10, 3, 3), (3, 1));
        assert_eq!(fit_size(0, 0, 10, 10), (10, 10));
    }

    #[test]
    fn test_open_missing_file_fails() {
        let err = VideoSource::open(Path::new("definitely/not/here.mp4"))
            .err()
            .expect("missing file must not open");
        assert!(err.to_string().contains("not found"));
    }
}
