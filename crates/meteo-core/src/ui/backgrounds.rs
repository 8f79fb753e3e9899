//! Background bitmaps
//!
//! Each values screen sits on an icon matching its center quantity, and the
//! shutdown screen is a bitmap of its own. Bitmaps share the frame buffer's
//! packed 1 bpp format so a background can be copied in without conversion.

extern crate alloc;

use alloc::vec::Vec;
use embedded_graphics::geometry::Angle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Arc, Circle, Line, PrimitiveStyle, Rectangle, Triangle};
use thiserror_no_std::Error;

use crate::framebuffer::{FrameBuffer, row_stride};
use crate::sensors::Quantity;
use crate::ui::FontId;

/// Stroke width of the generated power symbol in pixels
const POWER_STROKE_PX: u32 = 2;

/// Diameter of the generated power symbol ring in pixels
const POWER_RING_DIAMETER_PX: u32 = 24;

/// Horizontal center of the generated quantity icons in pixels
const ICON_CENTER_X: i32 = 8;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    #[error("Font {0:?} is not available")]
    MissingFont(FontId),
    #[error("Background {0:?} is not available")]
    MissingBackground(BackgroundKind),
    #[error("Background {kind:?} is {actual:?}, canvas is {expected:?}")]
    SizeMismatch {
        kind: BackgroundKind,
        expected: Size,
        actual: Size,
    },
    #[error("Bitmap data is {actual} bytes, {expected} expected")]
    InvalidBitmapLength { expected: usize, actual: usize },
}

/// Packed monochrome image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    size: Size,
    bits: Vec<u8>,
}

impl Bitmap {
    /// Wrap packed rows (1 bpp, MSB first, rows padded to whole bytes).
    pub fn from_raw(size: Size, bits: impl Into<Vec<u8>>) -> Result<Self, AssetError> {
        let bits = bits.into();
        let expected = row_stride(size.width) * size.height as usize;
        if bits.len() != expected {
            return Err(AssetError::InvalidBitmapLength {
                expected,
                actual: bits.len(),
            });
        }
        Ok(Self { size, bits })
    }

    /// Convert 8-bit grayscale pixels (one byte each, row-major) to
    /// monochrome. Pixels at or above `threshold` are on.
    pub fn from_luma(size: Size, luma: &[u8], threshold: u8) -> Result<Self, AssetError> {
        let expected = size.width as usize * size.height as usize;
        if luma.len() != expected {
            return Err(AssetError::InvalidBitmapLength {
                expected,
                actual: luma.len(),
            });
        }

        let mut fb = FrameBuffer::new(size);
        let pixels = luma.iter().enumerate().map(|(i, &value)| {
            let x = (i % size.width as usize) as i32;
            let y = (i / size.width as usize) as i32;
            Pixel(Point::new(x, y), BinaryColor::from(value >= threshold))
        });
        fb.draw_iter(pixels).ok();

        Ok(Self::from(&fb))
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }

    #[inline]
    pub(crate) fn is_on(&self, x: usize, y: usize) -> bool {
        let byte = y * row_stride(self.size.width) + x / 8;
        self.bits[byte] & (0x80 >> (x % 8)) != 0
    }
}

impl From<&FrameBuffer> for Bitmap {
    fn from(fb: &FrameBuffer) -> Self {
        Self {
            size: fb.size(),
            bits: fb.as_bytes().to_vec(),
        }
    }
}

/// The four named backgrounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundKind {
    Temperature,
    Pressure,
    Humidity,
    Shutdown,
}

impl BackgroundKind {
    pub const ALL: [Self; 4] = [
        Self::Temperature,
        Self::Pressure,
        Self::Humidity,
        Self::Shutdown,
    ];

    pub const fn for_quantity(quantity: Quantity) -> Self {
        match quantity {
            Quantity::Temperature => Self::Temperature,
            Quantity::Pressure => Self::Pressure,
            Quantity::Humidity => Self::Humidity,
        }
    }
}

/// Complete set of background bitmaps.
#[derive(Debug, Clone)]
pub struct Backgrounds {
    temperature: Bitmap,
    pressure: Bitmap,
    humidity: Bitmap,
    shutdown: Bitmap,
}

impl Backgrounds {
    pub fn builder() -> BackgroundsBuilder {
        BackgroundsBuilder::default()
    }

    pub fn get(&self, kind: BackgroundKind) -> &Bitmap {
        match kind {
            BackgroundKind::Temperature => &self.temperature,
            BackgroundKind::Pressure => &self.pressure,
            BackgroundKind::Humidity => &self.humidity,
            BackgroundKind::Shutdown => &self.shutdown,
        }
    }

    /// Check that every bitmap covers exactly `size`.
    pub fn validate(&self, size: Size) -> Result<(), AssetError> {
        for kind in BackgroundKind::ALL {
            let actual = self.get(kind).size();
            if actual != size {
                return Err(AssetError::SizeMismatch {
                    kind,
                    expected: size,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// Built-in artwork for devices without stored bitmaps.
    ///
    /// Quantity icons sit at the left edge, clear of the value slots; the
    /// shutdown screen is a centered power symbol.
    pub fn generated(size: Size) -> Self {
        let mid_y = size.height as i32 / 2;
        let stroke = PrimitiveStyle::with_stroke(BinaryColor::On, 1);
        let fill = PrimitiveStyle::with_fill(BinaryColor::On);

        let mut fb = FrameBuffer::new(size);
        Rectangle::new(Point::new(ICON_CENTER_X - 2, mid_y - 10), Size::new(5, 14))
            .into_styled(stroke)
            .draw(&mut fb)
            .ok();
        Circle::with_center(Point::new(ICON_CENTER_X, mid_y + 6), 9)
            .into_styled(fill)
            .draw(&mut fb)
            .ok();
        let temperature = Bitmap::from(&fb);

        let mut fb = FrameBuffer::new(size);
        Circle::with_center(Point::new(ICON_CENTER_X, mid_y), 15)
            .into_styled(stroke)
            .draw(&mut fb)
            .ok();
        Line::new(
            Point::new(ICON_CENTER_X, mid_y),
            Point::new(ICON_CENTER_X + 4, mid_y - 4),
        )
        .into_styled(stroke)
        .draw(&mut fb)
        .ok();
        let pressure = Bitmap::from(&fb);

        let mut fb = FrameBuffer::new(size);
        Triangle::new(
            Point::new(ICON_CENTER_X, mid_y - 9),
            Point::new(ICON_CENTER_X - 5, mid_y + 1),
            Point::new(ICON_CENTER_X + 5, mid_y + 1),
        )
        .into_styled(fill)
        .draw(&mut fb)
        .ok();
        Circle::with_center(Point::new(ICON_CENTER_X, mid_y + 2), 11)
            .into_styled(fill)
            .draw(&mut fb)
            .ok();
        let humidity = Bitmap::from(&fb);

        let mut fb = FrameBuffer::new(size);
        let center = Point::new(size.width as i32 / 2, mid_y);
        let ring = PrimitiveStyle::with_stroke(BinaryColor::On, POWER_STROKE_PX);
        Arc::with_center(
            center,
            POWER_RING_DIAMETER_PX,
            Angle::from_degrees(-60.0),
            Angle::from_degrees(300.0),
        )
        .into_styled(ring)
        .draw(&mut fb)
        .ok();
        Line::new(
            center - Point::new(0, POWER_RING_DIAMETER_PX as i32 / 2 + 2),
            center,
        )
        .into_styled(ring)
        .draw(&mut fb)
        .ok();
        let shutdown = Bitmap::from(&fb);

        Self {
            temperature,
            pressure,
            humidity,
            shutdown,
        }
    }
}

/// Collects backgrounds one at a time; every kind must be supplied.
#[derive(Debug, Clone, Default)]
pub struct BackgroundsBuilder {
    temperature: Option<Bitmap>,
    pressure: Option<Bitmap>,
    humidity: Option<Bitmap>,
    shutdown: Option<Bitmap>,
}

impl BackgroundsBuilder {
    pub fn with(mut self, kind: BackgroundKind, bitmap: Bitmap) -> Self {
        let slot = match kind {
            BackgroundKind::Temperature => &mut self.temperature,
            BackgroundKind::Pressure => &mut self.pressure,
            BackgroundKind::Humidity => &mut self.humidity,
            BackgroundKind::Shutdown => &mut self.shutdown,
        };
        *slot = Some(bitmap);
        self
    }

    pub fn build(self) -> Result<Backgrounds, AssetError> {
        Ok(Backgrounds {
            temperature: self
                .temperature
                .ok_or(AssetError::MissingBackground(BackgroundKind::Temperature))?,
            pressure: self
                .pressure
                .ok_or(AssetError::MissingBackground(BackgroundKind::Pressure))?,
            humidity: self
                .humidity
                .ok_or(AssetError::MissingBackground(BackgroundKind::Humidity))?,
            shutdown: self
                .shutdown
                .ok_or(AssetError::MissingBackground(BackgroundKind::Shutdown))?,
        })
    }
}
