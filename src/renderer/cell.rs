pub type Rgb = (u8, u8, u8);

/// One terminal cell drawn as an upper half block: the foreground colours the
/// top pixel, the background colours the bottom pixel.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct CellData {
    pub top: Rgb,
    pub bottom: Rgb,
}

impl CellData {
    pub const GLYPH: char = '▀';

    pub fn new(top: Rgb, bottom: Rgb) -> Self {
        Self { top, bottom }
    }
}
