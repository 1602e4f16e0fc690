pub mod cell;
pub mod display;
pub mod overlay;
pub mod processor;
pub mod sink;

use anyhow::Result;

use crate::core::dispatcher::Action;
use crate::decoder::FrameData;

pub use overlay::Overlay;
pub use sink::TerminalSink;

/// Where frames are shown and operator actions come from.
pub trait DisplaySink {
    fn render(&mut self, frame: &FrameData, overlay: &Overlay) -> Result<()>;

    /// Blocks until the operator produces an action. Held keys yield the same
    /// action once per repeat.
    fn read_action(&mut self) -> Result<Action>;

    /// Frame area in pixels after the display was resized, once per resize.
    fn take_resize(&mut self) -> Option<(u32, u32)> {
        None
    }
}
