//! In-memory backend for host tests

use heapless::String;

use crate::backend::{DisplayBackend, DisplayError};
use crate::screen::{SCREEN_COLS, SCREEN_ROWS};

pub struct TextBackend {
    rows: [String<SCREEN_COLS>; SCREEN_ROWS],
    pub inverted: Option<(u8, u8, u8)>,
    pub flushes: usize,
    pub ready: bool,
    /// Reported (columns, rows)
    pub size: (u8, u8),
    pub fail: bool,
}

impl TextBackend {
    pub fn new() -> Self {
        Self {
            rows: core::array::from_fn(|_| String::new()),
            inverted: None,
            flushes: 0,
            ready: true,
            size: (SCREEN_COLS as u8, SCREEN_ROWS as u8),
            fail: false,
        }
    }

    pub fn row(&self, row: usize) -> &str {
        &self.rows[row]
    }
}

impl DisplayBackend for TextBackend {
    fn clear(&mut self) -> Result<(), DisplayError> {
        if self.fail {
            return Err(DisplayError::Communication);
        }
        for row in &mut self.rows {
            row.clear();
        }
        self.inverted = None;
        Ok(())
    }

    fn draw_text(&mut self, row: u8, col: u8, text: &str) -> Result<(), DisplayError> {
        let slot = self
            .rows
            .get_mut(row as usize)
            .ok_or(DisplayError::InvalidCoordinates)?;
        if col != 0 {
            return Err(DisplayError::InvalidCoordinates);
        }
        slot.clear();
        slot.push_str(text).map_err(|_| DisplayError::InvalidCoordinates)
    }

    fn invert_region(&mut self, row: u8, start_col: u8, end_col: u8) -> Result<(), DisplayError> {
        self.inverted = Some((row, start_col, end_col));
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        self.flushes += 1;
        Ok(())
    }

    fn dimensions(&self) -> (u8, u8) {
        self.size
    }

    fn is_ready(&self) -> bool {
        self.ready
    }
}
