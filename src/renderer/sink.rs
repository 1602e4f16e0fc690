use anyhow::Result;
use crossterm::event::{self, Event};

use super::cell::CellData;
use super::display::DisplayManager;
use super::overlay::Overlay;
use super::processor::FrameProcessor;
use super::DisplaySink;
use crate::core::dispatcher::Action;
use crate::decoder::FrameData;
use crate::shared::constants;
use crate::ui::input;

/// Display sink drawing frames as truecolor half blocks in the terminal and
/// reading actions from the keyboard.
pub struct TerminalSink {
    display: DisplayManager,
    processor: FrameProcessor,
    cells: Vec<CellData>,
    large_step: usize,
    resized: Option<(u32, u32)>,
}

impl TerminalSink {
    pub fn new(large_step: usize) -> Result<Self> {
        Ok(Self {
            display: DisplayManager::new()?,
            processor: FrameProcessor::new(0, 0),
            cells: Vec::new(),
            large_step,
            resized: None,
        })
    }

    /// Pixel area available for frames in a terminal of `cols` x `rows`
    /// cells, leaving room for the status lines.
    pub fn frame_area(cols: u16, rows: u16) -> (u32, u32) {
        let usable_rows = rows.saturating_sub(constants::HUD_ROWS as u16).max(1);
        (cols.max(1) as u32, usable_rows as u32 * 2)
    }
}

impl DisplaySink for TerminalSink {
    fn render(&mut self, frame: &FrameData, overlay: &Overlay) -> Result<()> {
        if !self.processor.matches(frame) {
            self.processor = FrameProcessor::for_frame(frame);
            self.cells = vec![CellData::default(); self.processor.cell_count()];
        }

        self.processor.process_frame_into(frame, &mut self.cells);
        self.display.render_cells(&self.cells, self.processor.width)?;
        self.display
            .render_lines(&overlay.lines(), self.processor.rows() as u16)
    }

    fn read_action(&mut self) -> Result<Action> {
        loop {
            match event::read()? {
                Event::Key(key) => {
                    if let Some(action) = input::action_for_key(&key, self.large_step) {
                        return Ok(action);
                    }
                }
                Event::Resize(cols, rows) => {
                    self.display.invalidate();
                    self.resized = Some(Self::frame_area(cols, rows));
                }
                _ => {}
            }
        }
    }

    fn take_resize(&mut self) -> Option<(u32, u32)> {
        self.resized.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_area_reserves_status_rows() {
        assert_eq!(
            TerminalSink::frame_area(120, 40),
            (120, (40 - constants::HUD_ROWS as u32) * 2)
        );
        assert_eq!(TerminalSink::frame_area(0, 2), (1, 2));
    }
}
