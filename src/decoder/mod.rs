pub mod frame_data;
pub mod video;

use anyhow::Result;

pub use frame_data::FrameData;
pub use video::VideoSource;

/// Random access to a finite, ordered sequence of frames.
pub trait FrameSource {
    fn frame_count(&self) -> usize;

    /// Frames per second, or 0.0 when the container does not say.
    fn fps(&self) -> f64;

    /// Callers only ask for `index < frame_count()`.
    fn get_frame(&mut self, index: usize) -> Result<FrameData>;

    /// Scales frames returned from now on to fit `max_width` x `max_height`
    /// pixels. Sources with a fixed output size ignore it.
    fn fit_within(&mut self, _max_width: u32, _max_height: u32) {}
}
