//! Display backend that prints pages over RTT
//!
//! Stands in for the panel: every flushed page is logged line by line,
//! with inverted regions bracketed.

use defmt::*;
use heapless::String;

use slidewatch_display::{DisplayBackend, DisplayError, SCREEN_COLS, SCREEN_ROWS};

pub struct RttDisplay {
    rows: [String<SCREEN_COLS>; SCREEN_ROWS],
    inverted: [Option<(u8, u8)>; SCREEN_ROWS],
}

impl RttDisplay {
    /// Create a blank display
    pub fn new() -> Self {
        Self {
            rows: core::array::from_fn(|_| String::new()),
            inverted: [None; SCREEN_ROWS],
        }
    }
}

impl DisplayBackend for RttDisplay {
    fn clear(&mut self) -> Result<(), DisplayError> {
        for row in &mut self.rows {
            row.clear();
        }
        self.inverted = [None; SCREEN_ROWS];
        Ok(())
    }

    fn draw_text(&mut self, row: u8, col: u8, text: &str) -> Result<(), DisplayError> {
        let line = self
            .rows
            .get_mut(row as usize)
            .ok_or(DisplayError::InvalidCoordinates)?;
        while line.len() < col as usize {
            line.push(' ').map_err(|_| DisplayError::InvalidCoordinates)?;
        }
        line.truncate(col as usize);
        for c in text.chars() {
            if line.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }

    fn invert_region(&mut self, row: u8, start_col: u8, end_col: u8) -> Result<(), DisplayError> {
        let slot = self
            .inverted
            .get_mut(row as usize)
            .ok_or(DisplayError::InvalidCoordinates)?;
        *slot = Some((start_col, end_col));
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        info!("+---------------------+");
        for (row, line) in self.rows.iter().enumerate() {
            match self.inverted[row] {
                Some((start, end)) if (end as usize) <= line.len() && start < end => {
                    let (start, end) = (start as usize, end as usize);
                    info!(
                        "|{}[{}]{}",
                        &line[..start],
                        &line[start..end],
                        &line[end..]
                    );
                }
                _ => info!("|{}", line.as_str()),
            }
        }
        info!("+---------------------+");
        Ok(())
    }

    fn dimensions(&self) -> (u8, u8) {
        (SCREEN_COLS as u8, SCREEN_ROWS as u8)
    }

    fn is_ready(&self) -> bool {
        true
    }
}
