//! Drawing surface the chunk tree renders onto
//!
//! The trait mirrors a classic cursor-based PDF page API: a current
//! position, left/right margins, and text written as flowing runs or as
//! fixed-width cells. Coordinates are points measured from the top-left
//! corner of the page.

use crate::style::{Alignment, Style};

/// Cursor-based drawing surface.
pub trait Canvas {
    /// Current left margin.
    fn left_margin(&self) -> f32;

    /// Move the left margin. A cursor at the start of a line follows it.
    fn set_left_margin(&mut self, margin: f32);

    /// Current right margin.
    fn right_margin(&self) -> f32;

    /// Move the right margin.
    fn set_right_margin(&mut self, margin: f32);

    /// Vertical cursor position.
    fn y(&self) -> f32;

    /// Move the vertical cursor; x returns to the left margin.
    fn set_y(&mut self, y: f32);

    /// Size of the current font in points.
    fn font_size(&self) -> f32;

    /// Width of `text` in the current font.
    fn string_width(&self, text: &str) -> f32;

    /// Switch font, colors and alignment.
    fn apply_style(&mut self, style: &Style);

    /// Flowing text from the current position, wrapping at the right margin.
    fn write(&mut self, height: f32, text: &str);

    /// Text block wrapped into `width` (0 means up to the right margin),
    /// each line aligned. The cursor ends below the block at the left
    /// margin.
    fn multi_cell(&mut self, width: f32, height: f32, text: &str, align: Alignment);

    /// Single-line cell of `width`; the cursor moves right past it.
    fn cell(&mut self, width: f32, height: f32, text: &str, border: bool, align: Alignment);

    /// Move to the start of the next line. `None` uses the height of the
    /// last cell.
    fn line_break(&mut self, height: Option<f32>);

    /// Start a new page.
    fn add_page(&mut self);
}
