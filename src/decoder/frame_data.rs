/// One decoded frame as packed RGB24 pixels, row-major.
#[derive(Clone, Debug)]
pub struct FrameData {
    pub index: usize,
    pub buffer: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl FrameData {
    pub fn new(index: usize, buffer: Vec<u8>, width: u32, height: u32) -> Self {
        Self { index, buffer, width, height }
    }

    /// A black frame of the given size, shown when nothing could be decoded.
    pub fn blank(index: usize, width: u32, height: u32) -> Self {
        let len = width as usize * height as usize * 3;
        Self::new(index, vec![0; len], width, height)
    }

    /// Pixel at (x, y); out-of-range coordinates read as black.
    pub fn pixel(&self, x: usize, y: usize) -> (u8, u8, u8) {
        if x >= self.width as usize || y >= self.height as usize {
            return (0, 0, 0);
        }
        let offset = (y * self.width as usize + x) * 3;
        match self.buffer.get(offset..offset + 3) {
            Some(rgb) => (rgb[0], rgb[1], rgb[2]),
            None => (0, 0, 0),
        }
    }
}
