//! Screen buffer
//!
//! Character buffer for the node displays: 8 rows of 21 characters, the
//! text grid of a 128x64 panel with a 6x8 font.

use heapless::String;

use crate::backend::{DisplayBackend, DisplayError};

/// Number of character rows
pub const SCREEN_ROWS: usize = 8;

/// Number of character columns
pub const SCREEN_COLS: usize = 21;

/// Text line of one row
pub type Line = String<SCREEN_COLS>;

/// Screen buffer for text-mode displays
#[derive(Clone)]
pub struct Screen {
    lines: [Line; SCREEN_ROWS],
    /// Inverted region per row (start_col, end_col)
    highlights: [Option<(u8, u8)>; SCREEN_ROWS],
    dirty: bool,
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen {
    /// Create a new empty screen
    pub fn new() -> Self {
        Self {
            lines: core::array::from_fn(|_| String::new()),
            highlights: [None; SCREEN_ROWS],
            dirty: true,
        }
    }

    /// Clear text and highlights
    pub fn clear(&mut self) {
        for line in &mut self.lines {
            line.clear();
        }
        self.highlights = [None; SCREEN_ROWS];
        self.dirty = true;
    }

    /// Set the content of a row, truncated to the screen width
    pub fn set_line(&mut self, row: usize, text: &str) {
        if row < SCREEN_ROWS {
            self.lines[row].clear();
            let mut end = text.len().min(SCREEN_COLS);
            while !text.is_char_boundary(end) {
                end -= 1;
            }
            let _ = self.lines[row].push_str(&text[..end]);
            self.dirty = true;
        }
    }

    /// Get the content of a row
    pub fn get_line(&self, row: usize) -> Option<&str> {
        self.lines.get(row).map(|s| s.as_str())
    }

    /// Invert `start_col..end_col` on a row
    pub fn set_highlight(&mut self, row: usize, start_col: u8, end_col: u8) {
        if row < SCREEN_ROWS {
            self.highlights[row] = Some((start_col, end_col));
            self.dirty = true;
        }
    }

    /// Get the inverted region of a row
    pub fn get_highlight(&self, row: usize) -> Option<(u8, u8)> {
        self.highlights.get(row).copied().flatten()
    }

    /// Check if screen needs redrawing
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Get all lines as an iterator
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|s| s.as_str())
    }

    /// Draw the whole screen on a backend
    ///
    /// Skips the backend entirely when nothing changed since the last
    /// draw.
    pub fn draw<B: DisplayBackend>(&mut self, backend: &mut B) -> Result<(), DisplayError> {
        if !self.dirty {
            return Ok(());
        }
        if !backend.is_ready() {
            return Err(DisplayError::NotInitialized);
        }
        let (cols, rows) = backend.dimensions();
        if (cols as usize) < SCREEN_COLS || (rows as usize) < SCREEN_ROWS {
            return Err(DisplayError::InvalidCoordinates);
        }

        backend.clear()?;
        for (row, line) in self.lines.iter().enumerate() {
            if !line.is_empty() {
                backend.draw_text(row as u8, 0, line)?;
            }
            if let Some((start, end)) = self.highlights[row] {
                backend.invert_region(row as u8, start, end)?;
            }
        }
        backend.flush()?;
        self.dirty = false;
        Ok(())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Screen {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Screen[");
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                defmt::write!(f, ", ");
            }
            defmt::write!(f, "{}", line.as_str());
        }
        defmt::write!(f, "]");
    }
}
