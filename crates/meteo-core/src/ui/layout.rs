//! Placement math shared by every layout.
//!
//! All positions are the top-left corner of a text box as returned by
//! [`TextRasterizer::measure`](crate::ui::TextRasterizer::measure). Results
//! may be negative when text is wider or taller than the canvas; drawing
//! clips in that case.

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use heapless::String;

use crate::ui::FontId;

/// Distance between edge-anchored text and the canvas border.
pub const EDGE_MARGIN_PX: i32 = 2;

/// Longest text a placement records; longer strings are cut at a char boundary.
pub const PLACEMENT_TEXT_CAPACITY: usize = 64;

pub fn centered_x(canvas: Size, text: Size) -> i32 {
    (canvas.width as i32 - text.width as i32).div_euclid(2)
}

pub fn centered_y(canvas: Size, text: Size) -> i32 {
    (canvas.height as i32 - text.height as i32).div_euclid(2)
}

pub const fn top_y() -> i32 {
    EDGE_MARGIN_PX
}

pub fn bottom_y(canvas: Size, text: Size) -> i32 {
    canvas.height as i32 - EDGE_MARGIN_PX - text.height as i32
}

pub fn right_aligned_x(canvas: Size, text: Size) -> i32 {
    canvas.width as i32 - EDGE_MARGIN_PX - text.width as i32
}

/// Top of `text` so that its bottom edge lines up with the bottom edge of
/// `anchor` placed at `anchor_y`.
pub fn baseline_aligned_y(anchor_y: i32, anchor: Size, text: Size) -> i32 {
    anchor_y + anchor.height as i32 - text.height as i32
}

/// Vertical positions of a message line and the selection line below it.
///
/// The message sits one line height above center (never above the top
/// edge) and the selection one line below center. When that would put the
/// selection's baseline at or above the message's, the selection starts at
/// the message's baseline instead.
pub fn stacked_pair(canvas: Size, upper: Size, lower: Size) -> (i32, i32) {
    let upper_y = (centered_y(canvas, upper) - upper.height as i32).max(0);
    let mut lower_y = centered_y(canvas, lower) + lower.height as i32;

    let upper_baseline = upper_y + upper.height as i32;
    if lower_y + lower.height as i32 <= upper_baseline {
        lower_y = upper_baseline;
    }

    (upper_y, lower_y)
}

/// Where one piece of text landed in the last frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPlacement {
    pub font: FontId,
    pub origin: Point,
    pub size: Size,
    pub text: String<PLACEMENT_TEXT_CAPACITY>,
}

impl TextPlacement {
    pub fn new(font: FontId, origin: Point, size: Size, text: &str) -> Self {
        let mut stored = String::new();
        for c in text.chars() {
            if stored.push(c).is_err() {
                break;
            }
        }

        Self {
            font,
            origin,
            size,
            text: stored,
        }
    }

    /// Bottom edge of the text box.
    pub fn baseline(&self) -> i32 {
        self.origin.y + self.size.height as i32
    }

    pub fn bounds(&self) -> Rectangle {
        Rectangle::new(self.origin, self.size)
    }
}
