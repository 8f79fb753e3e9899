//! Screen layouts for the meteo display
//!
//! [`ScreenRenderer`] owns the canvas and turns a [`Screen`] into pixels.
//! Text placement math lives in [`layout`] so it can be checked without
//! rasterizing anything.

pub mod backgrounds;
pub mod fonts;
pub mod layout;
pub mod renderer;
pub mod screen;

pub use backgrounds::{AssetError, BackgroundKind, Backgrounds, BackgroundsBuilder, Bitmap};
pub use fonts::{FontId, MonoFontSet, TextRasterizer};
pub use layout::{EDGE_MARGIN_PX, TextPlacement};
pub use renderer::ScreenRenderer;
pub use screen::{Screen, ValueSlot, ValuesScreen};
