use rayon::prelude::*;

use super::cell::CellData;
use crate::decoder::FrameData;

/// Converts RGB frames into half-block cells, two pixel rows per cell row.
pub struct FrameProcessor {
    pub width: usize,
    pub height: usize,
}

impl FrameProcessor {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn for_frame(frame: &FrameData) -> Self {
        Self::new(frame.width as usize, frame.height as usize)
    }

    pub fn rows(&self) -> usize {
        self.height.div_ceil(2)
    }

    pub fn cell_count(&self) -> usize {
        self.width * self.rows()
    }

    pub fn matches(&self, frame: &FrameData) -> bool {
        self.width == frame.width as usize && self.height == frame.height as usize
    }

    /// `cells` must hold exactly `cell_count()` entries; otherwise nothing is written.
    pub fn process_frame_into(&self, frame: &FrameData, cells: &mut [CellData]) {
        if self.width == 0 || cells.len() != self.cell_count() {
            return;
        }

        cells
            .par_chunks_mut(self.width)
            .enumerate()
            .for_each(|(row, line)| {
                for (x, cell) in line.iter_mut().enumerate() {
                    // An odd last pixel row leaves the bottom half black.
                    *cell = CellData::new(frame.pixel(x, row * 2), frame.pixel(x, row * 2 + 1));
                }
            });
    }
}
