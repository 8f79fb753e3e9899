//! Monochrome framebuffer with per-pixel change detection.
//!
//! All screens are drawn into this RAM buffer instead of the panel. After a
//! screen is complete, only the rectangular region containing changed
//! pixels is flushed to the hardware display.
//!
//! Pixels are stored 1 bit each, row-major, most significant bit first, with
//! every row padded to a whole byte. `0` is off and `1` is on, which is the
//! layout `ImageRaw<BinaryColor>` and most OLED controllers expect.

extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;
use core::convert::Infallible;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use log::debug;

use crate::ui::Bitmap;

/// Bytes needed for one row of `width` pixels.
pub(crate) const fn row_stride(width: u32) -> usize {
    (width as usize).div_ceil(8)
}

/// Bounding box of pixels that have changed since the last flush.
#[derive(Debug, Clone, Copy)]
struct DirtyRect {
    min_x: usize,
    min_y: usize,
    max_x: usize,
    max_y: usize,
}

impl DirtyRect {
    /// Expand the dirty region to include the given pixel coordinate.
    fn expand(&mut self, x: usize, y: usize) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    /// Create a new dirty rect covering a single pixel.
    fn from_point(x: usize, y: usize) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }
}

/// Packed 1 bpp framebuffer implementing `DrawTarget<Color = BinaryColor>`.
///
/// A 128x64 panel needs 1 KiB. Tracks a dirty bounding box so that only
/// changed pixels are flushed to the hardware display.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    stride: usize,
    bits: Vec<u8>,
    dirty: Option<DirtyRect>,
}

impl FrameBuffer {
    /// Allocate a new framebuffer with every pixel off.
    pub fn new(size: Size) -> Self {
        let stride = row_stride(size.width);
        Self {
            width: size.width as usize,
            height: size.height as usize,
            stride,
            bits: vec![0; stride * size.height as usize],
            dirty: None,
        }
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> (usize, u8) {
        (y * self.stride + x / 8, 0x80 >> (x % 8))
    }

    #[inline]
    fn get(&self, x: usize, y: usize) -> bool {
        let (byte, mask) = self.index(x, y);
        self.bits[byte] & mask != 0
    }

    /// Write a single pixel, expanding the dirty rect only if the value changed.
    #[inline]
    fn set_pixel(&mut self, x: usize, y: usize, on: bool) {
        if self.get(x, y) == on {
            return;
        }

        let (byte, mask) = self.index(x, y);
        if on {
            self.bits[byte] |= mask;
        } else {
            self.bits[byte] &= !mask;
        }

        match &mut self.dirty {
            Some(rect) => rect.expand(x, y),
            None => self.dirty = Some(DirtyRect::from_point(x, y)),
        }
    }

    /// Replace the whole content with `background`, or with all-off pixels.
    ///
    /// The background must have the framebuffer's size; that is checked once
    /// when the renderer is built.
    pub fn reset(&mut self, background: Option<&Bitmap>) {
        for y in 0..self.height {
            for x in 0..self.width {
                let on = background.is_some_and(|bg| bg.is_on(x, y));
                self.set_pixel(x, y, on);
            }
        }
    }

    /// Color of the pixel at `point`, or `None` outside the buffer.
    pub fn pixel(&self, point: Point) -> Option<BinaryColor> {
        let (x, y) = (point.x, point.y);
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(BinaryColor::from(self.get(x as usize, y as usize)))
    }

    /// Raw packed rows, ready for a 1 bpp display sink.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }

    pub fn lit_pixel_count(&self) -> usize {
        self.bits.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Smallest rectangle containing every lit pixel.
    pub fn lit_bounds(&self) -> Option<Rectangle> {
        let mut rect: Option<DirtyRect> = None;
        for y in 0..self.height {
            for x in 0..self.width {
                if self.get(x, y) {
                    match &mut rect {
                        Some(rect) => rect.expand(x, y),
                        None => rect = Some(DirtyRect::from_point(x, y)),
                    }
                }
            }
        }

        rect.map(|r| {
            Rectangle::new(
                Point::new(r.min_x as i32, r.min_y as i32),
                Size::new((r.max_x - r.min_x + 1) as u32, (r.max_y - r.min_y + 1) as u32),
            )
        })
    }

    /// Whether anything changed since the last flush.
    pub fn is_dirty(&self) -> bool {
        self.dirty.is_some()
    }

    /// Flush the dirty region to a hardware display, then reset the dirty state.
    ///
    /// Only the bounding rectangle of changed pixels is sent via
    /// `fill_contiguous`. If nothing changed, this is a no-op.
    pub fn flush<D>(&mut self, display: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let Some(rect) = self.dirty.take() else {
            return Ok(());
        };

        let width = rect.max_x - rect.min_x + 1;
        let height = rect.max_y - rect.min_y + 1;

        debug!(
            "Flushing {}x{} dirty region at ({}, {})",
            width, height, rect.min_x, rect.min_y
        );

        let area = Rectangle::new(
            Point::new(rect.min_x as i32, rect.min_y as i32),
            Size::new(width as u32, height as u32),
        );

        let this = &*self;
        let pixel_iter = (rect.min_y..=rect.max_y).flat_map(move |y| {
            (rect.min_x..=rect.max_x).map(move |x| BinaryColor::from(this.get(x, y)))
        });

        display.fill_contiguous(&area, pixel_iter)
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(self.width as u32, self.height as u32)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let w = self.width;
        let h = self.height;

        for Pixel(coord, color) in pixels {
            let x = coord.x;
            let y = coord.y;
            if x >= 0 && y >= 0 && (x as usize) < w && (y as usize) < h {
                self.set_pixel(x as usize, y as usize, color.is_on());
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        let Some(bottom_right) = area.bottom_right() else {
            return Ok(());
        };

        for y in area.top_left.y..=bottom_right.y {
            for x in area.top_left.x..=bottom_right.x {
                self.set_pixel(x as usize, y as usize, color.is_on());
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        for y in 0..self.height {
            for x in 0..self.width {
                self.set_pixel(x, y, color.is_on());
            }
        }
        Ok(())
    }
}
