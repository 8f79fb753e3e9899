//! Font identities and text rasterization
//!
//! Layouts refer to fonts by role ([`FontId`]) only. A [`TextRasterizer`]
//! resolves the role to glyphs, measures strings and draws them into the
//! frame buffer.

use embedded_graphics::mono_font::iso_8859_1::{
    FONT_4X6, FONT_6X10, FONT_6X13, FONT_8X13, FONT_9X18, FONT_10X20,
};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::renderer::TextRenderer;
use embedded_graphics::text::{Baseline, Text};

use crate::framebuffer::FrameBuffer;

/// The six font roles used by the layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontId {
    /// Center values, headings and the clock
    Huge,
    Tall,
    /// Messages and selection prompts
    Medium,
    /// Top and bottom value slots
    Thin,
    /// Units, dates and selection values
    Small,
    Tiny,
}

impl FontId {
    pub const COUNT: usize = 6;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Huge,
        Self::Tall,
        Self::Medium,
        Self::Thin,
        Self::Small,
        Self::Tiny,
    ];

    const fn index(self) -> usize {
        self as usize
    }
}

/// Measures and draws text for a set of font roles.
pub trait TextRasterizer {
    /// Whether `font` resolves to real glyphs.
    fn supports(&self, font: FontId) -> bool;

    /// Size of the box `text` occupies when drawn in `font`.
    fn measure(&self, text: &str, font: FontId) -> Size;

    /// Draw `text` with the top-left of its box at `origin`.
    ///
    /// Only glyph pixels are written, in `fill`. Anything outside the
    /// buffer is clipped.
    fn draw(
        &self,
        text: &str,
        font: FontId,
        origin: Point,
        fill: BinaryColor,
        target: &mut FrameBuffer,
    );
}

/// Fixed-width embedded-graphics fonts, one per role.
#[derive(Clone, Copy)]
pub struct MonoFontSet {
    fonts: [Option<&'static MonoFont<'static>>; FontId::COUNT],
}

impl MonoFontSet {
    /// ISO 8859-1 fonts, so the degree sign is available.
    pub const fn standard() -> Self {
        Self {
            fonts: [
                Some(&FONT_10X20),
                Some(&FONT_9X18),
                Some(&FONT_8X13),
                Some(&FONT_6X13),
                Some(&FONT_6X10),
                Some(&FONT_4X6),
            ],
        }
    }

    pub const fn empty() -> Self {
        Self {
            fonts: [None; FontId::COUNT],
        }
    }

    pub const fn with_font(mut self, id: FontId, font: &'static MonoFont<'static>) -> Self {
        self.fonts[id.index()] = Some(font);
        self
    }

    fn style(
        &self,
        font: FontId,
        color: BinaryColor,
    ) -> Option<MonoTextStyle<'static, BinaryColor>> {
        self.fonts[font.index()].map(|f| MonoTextStyle::new(f, color))
    }
}

impl Default for MonoFontSet {
    fn default() -> Self {
        Self::standard()
    }
}

impl core::fmt::Debug for MonoFontSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut list = f.debug_list();
        for id in FontId::ALL {
            if let Some(font) = self.fonts[id.index()] {
                list.entry(&(id, font.character_size));
            }
        }
        list.finish()
    }
}

impl TextRasterizer for MonoFontSet {
    fn supports(&self, font: FontId) -> bool {
        self.fonts[font.index()].is_some()
    }

    fn measure(&self, text: &str, font: FontId) -> Size {
        self.style(font, BinaryColor::On)
            .map(|style| {
                style
                    .measure_string(text, Point::zero(), Baseline::Top)
                    .bounding_box
                    .size
            })
            .unwrap_or_default()
    }

    fn draw(
        &self,
        text: &str,
        font: FontId,
        origin: Point,
        fill: BinaryColor,
        target: &mut FrameBuffer,
    ) {
        let Some(style) = self.style(font, fill) else {
            return;
        };
        Text::with_baseline(text, origin, style, Baseline::Top)
            .draw(target)
            .ok();
    }
}
