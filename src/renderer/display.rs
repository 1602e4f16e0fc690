use anyhow::Result;
use crossterm::{
    cursor,
    style::Print,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use std::io::{BufWriter, Stdout, Write};

use super::cell::{CellData, Rgb};
use crate::shared::constants;
use crate::utils::logger;

/// Owns the terminal while a session runs: raw mode, alternate screen and a
/// diffing half-block renderer.
pub struct DisplayManager {
    stdout: BufWriter<Stdout>,
    last_cells: Option<Vec<CellData>>,
    last_width: usize,
    render_buffer: Vec<u8>,
}

impl DisplayManager {
    pub fn new() -> Result<Self> {
        let stdout = BufWriter::with_capacity(1024 * 1024, std::io::stdout());
        let mut dm = Self {
            stdout,
            last_cells: None,
            last_width: 0,
            render_buffer: Vec::with_capacity(1024 * 1024),
        };

        dm.initialize_terminal()?;
        Ok(dm)
    }

    fn initialize_terminal(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.stdout.execute(EnterAlternateScreen)?;
        self.stdout.execute(cursor::Hide)?;

        // Disable line wrapping (DECRAWM) so the status lines never scroll
        self.stdout.execute(Print("\x1b[?7l"))?;
        Ok(())
    }

    /// Terminal size in character cells.
    pub fn terminal_size(&self) -> (u16, u16) {
        terminal::size().unwrap_or((80, 24))
    }

    /// Forces the next `render_cells` to repaint everything.
    pub fn invalidate(&mut self) {
        self.last_cells = None;
    }

    /// Draws `cells` (row-major, `width` per row) at the top of the screen,
    /// centred horizontally. Only cells that changed since the previous call
    /// are written.
    pub fn render_cells(&mut self, cells: &[CellData], width: usize) -> Result<()> {
        if width == 0 {
            return Ok(());
        }
        let start = std::time::Instant::now();
        let (term_cols, term_rows) = self.terminal_size();
        let offset_x = (term_cols as usize).saturating_sub(width) / 2;

        let force_redraw = self.last_width != width
            || self.last_cells.as_ref().map(Vec::len) != Some(cells.len());
        if force_redraw {
            self.last_cells = Some(vec![CellData::default(); cells.len()]);
            self.last_width = width;
        }

        let buffer = &mut self.render_buffer;
        buffer.clear();
        // Synchronized update begin
        buffer.extend_from_slice(b"\x1b[?2026h");
        if force_redraw {
            buffer.extend_from_slice(b"\x1b[2J");
        }

        let Some(last_cells) = self.last_cells.as_mut() else {
            return Ok(());
        };

        let mut last_fg: Option<Rgb> = None;
        let mut last_bg: Option<Rgb> = None;
        let mut cursor_at: Option<(usize, usize)> = None;
        let mut written = 0usize;

        for (i, cell) in cells.iter().enumerate() {
            if !force_redraw && last_cells[i] == *cell {
                cursor_at = None;
                continue;
            }

            let x = i % width + offset_x;
            let y = i / width;
            if x >= term_cols as usize || y >= term_rows as usize {
                cursor_at = None;
                continue;
            }

            if cursor_at != Some((x, y)) {
                write!(buffer, "\x1b[{};{}H", y + 1, x + 1)?;
            }
            if last_fg != Some(cell.top) {
                write!(buffer, "\x1b[38;2;{};{};{}m", cell.top.0, cell.top.1, cell.top.2)?;
                last_fg = Some(cell.top);
            }
            if last_bg != Some(cell.bottom) {
                write!(buffer, "\x1b[48;2;{};{};{}m", cell.bottom.0, cell.bottom.1, cell.bottom.2)?;
                last_bg = Some(cell.bottom);
            }
            let mut glyph = [0u8; 4];
            buffer.extend_from_slice(CellData::GLYPH.encode_utf8(&mut glyph).as_bytes());

            last_cells[i] = *cell;
            cursor_at = Some((x + 1, y));
            written += 1;
        }

        buffer.extend_from_slice(b"\x1b[0m");

        self.stdout.write_all(buffer)?;
        self.stdout.flush()?;

        let elapsed = start.elapsed();
        if elapsed.as_millis() > 10 {
            logger::debug(&format!(
                "Slow render: {}us, {} of {} cells written",
                elapsed.as_micros(),
                written,
                cells.len()
            ));
        }
        Ok(())
    }

    /// Writes status lines starting at terminal row `top`, clearing each line
    /// first, then ends the synchronized update opened by `render_cells`.
    pub fn render_lines(&mut self, lines: &[String], top: u16) -> Result<()> {
        let (term_cols, term_rows) = self.terminal_size();
        let mut out = String::new();
        for (offset, line) in lines.iter().enumerate() {
            let row = top as usize + offset;
            if row >= term_rows as usize {
                break;
            }
            let text: String = line.chars().take(term_cols as usize).collect();
            out.push_str(&format!("\x1b[{};1H\x1b[2K{}", row + 1, text));
        }
        out.push_str("\x1b[?2026l");

        self.stdout.write_all(out.as_bytes())?;
        self.stdout.flush()?;
        Ok(())
    }
}

impl Drop for DisplayManager {
    fn drop(&mut self) {
        let _ = self.stdout.execute(Print("\x1b[?7h"));
        let _ = self.stdout.execute(cursor::Show);
        let _ = self.stdout.execute(LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
        logger::debug(&format!("{} display closed", constants::APP_NAME));
    }
}
