//! Display backend trait
//!
//! A node's panel seen as a character grid. The deployed boards use a
//! 128x64 OLED; the firmware logs pages over RTT instead.

/// Display backend errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Bus error talking to the panel
    Communication,
    /// Text placed outside the panel, or a panel smaller than a page
    InvalidCoordinates,
    /// Display not initialized
    NotInitialized,
}

/// Display backend trait
///
/// Rows and columns are in character units.
pub trait DisplayBackend {
    /// Clear the entire display
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Draw text at the specified row and column
    fn draw_text(&mut self, row: u8, col: u8, text: &str) -> Result<(), DisplayError>;

    /// Invert a region on the specified row
    ///
    /// `end_col` is exclusive.
    fn invert_region(&mut self, row: u8, start_col: u8, end_col: u8) -> Result<(), DisplayError>;

    /// Flush buffered content to the display
    fn flush(&mut self) -> Result<(), DisplayError>;

    /// Display dimensions as (columns, rows)
    fn dimensions(&self) -> (u8, u8);

    /// Check if the display is ready
    fn is_ready(&self) -> bool;
}
