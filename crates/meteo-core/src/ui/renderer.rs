//! Screen renderer
//!
//! Owns the canvas and turns each [`Screen`] into a complete frame. Every
//! draw replaces the whole canvas, starting from a background bitmap or from
//! all-off pixels, so a frame depends only on the renderer's fixed state and
//! the call's arguments.

use chrono::{Datelike, NaiveDateTime};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use log::{debug, error, info};

use crate::clock::WallClock;
use crate::config::DisplayConfig;
use crate::framebuffer::FrameBuffer;
use crate::ui::layout::{
    baseline_aligned_y, bottom_y, centered_x, centered_y, right_aligned_x, stacked_pair, top_y,
};
use crate::ui::screen::{
    format_date, format_slot, format_time, format_value, strip_leading_space, weekday_name,
};
use crate::ui::{
    AssetError, BackgroundKind, Backgrounds, FontId, MonoFontSet, Screen, TextPlacement,
    TextRasterizer, ValuesScreen,
};

/// Most text items any layout places in one frame.
const MAX_PLACEMENTS: usize = 4;

/// Renders layouts into a fixed-size monochrome canvas.
pub struct ScreenRenderer<F = MonoFontSet> {
    size: Size,
    fonts: F,
    backgrounds: Backgrounds,
    canvas: FrameBuffer,
    placements: heapless::Vec<TextPlacement, MAX_PLACEMENTS>,
}

impl<F: TextRasterizer> ScreenRenderer<F> {
    /// Build a renderer for the configured canvas.
    ///
    /// Every font role must be supported by `fonts` and every background
    /// must match the canvas size exactly.
    pub fn new(
        display: DisplayConfig,
        fonts: F,
        backgrounds: Backgrounds,
    ) -> Result<Self, AssetError> {
        let size = display.size();

        if let Some(missing) = FontId::ALL.into_iter().find(|id| !fonts.supports(*id)) {
            error!("Renderer: font {:?} is not available", missing);
            return Err(AssetError::MissingFont(missing));
        }

        backgrounds.validate(size).map_err(|e| {
            error!("Renderer: {}", e);
            e
        })?;

        info!("Renderer ready for a {}x{} canvas", size.width, size.height);

        Ok(Self {
            size,
            fonts,
            backgrounds,
            canvas: FrameBuffer::new(size),
            placements: heapless::Vec::new(),
        })
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// The last rendered frame.
    pub fn canvas(&self) -> &FrameBuffer {
        &self.canvas
    }

    /// Text placed in the last frame, in drawing order.
    ///
    /// Each record keeps at most
    /// [`PLACEMENT_TEXT_CAPACITY`](crate::ui::layout::PLACEMENT_TEXT_CAPACITY)
    /// bytes of its text, cut at a char boundary. Origin and size always
    /// describe the full string as drawn, so a longer heading records a
    /// prefix of what is on the canvas.
    pub fn placements(&self) -> &[TextPlacement] {
        &self.placements
    }

    /// Send pixels changed since the previous flush to `display`.
    pub fn flush<D>(&mut self, display: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        self.canvas.flush(display)
    }

    pub fn render(&mut self, screen: &Screen<'_>) -> &FrameBuffer {
        match *screen {
            Screen::Values(values) => self.values_screen(&values),
            Screen::DateTime { now, show_seconds } => self.draw_datetime_at(now, show_seconds),
            Screen::Shutdown => self.draw_shutdown(),
            Screen::Heading(text) => self.draw_heading(text),
            Screen::Message(text) => self.draw_message(text),
            Screen::Selection { message, selection } => self.draw_selection(message, selection),
        }
    }

    /// Three readings with the center one enlarged.
    ///
    /// The background follows `labels[1]`; a label that names no quantity
    /// leaves the canvas blank behind the text.
    pub fn draw_values(
        &mut self,
        labels: [&str; 3],
        values: [f64; 3],
        units: [&str; 3],
        digits: u8,
    ) -> &FrameBuffer {
        self.values_screen(&ValuesScreen::new(labels, values, units, digits))
    }

    fn values_screen(&mut self, screen: &ValuesScreen<'_>) -> &FrameBuffer {
        self.begin(screen.background());

        let value = format_value(screen.center.value, screen.digits);
        let value_size = self.fonts.measure(&value, FontId::Huge);
        let value_origin = Point::new(
            centered_x(self.size, value_size),
            centered_y(self.size, value_size),
        );
        self.place(&value, FontId::Huge, value_origin, value_size);

        let unit = strip_leading_space(screen.center.unit);
        let unit_size = self.fonts.measure(unit, FontId::Small);
        let unit_origin = Point::new(
            right_aligned_x(self.size, unit_size),
            baseline_aligned_y(value_origin.y, value_size, unit_size),
        );
        self.place(unit, FontId::Small, unit_origin, unit_size);

        let top = format_slot(&screen.top);
        let top_size = self.fonts.measure(&top, FontId::Thin);
        self.place(
            &top,
            FontId::Thin,
            Point::new(centered_x(self.size, top_size), top_y()),
            top_size,
        );

        let bottom = format_slot(&screen.bottom);
        let bottom_size = self.fonts.measure(&bottom, FontId::Thin);
        self.place(
            &bottom,
            FontId::Thin,
            Point::new(
                centered_x(self.size, bottom_size),
                bottom_y(self.size, bottom_size),
            ),
            bottom_size,
        );

        self.finish("values")
    }

    /// Clock screen with the time read from `clock`.
    pub fn draw_datetime(&mut self, show_seconds: bool, clock: &impl WallClock) -> &FrameBuffer {
        self.draw_datetime_at(clock.local_now(), show_seconds)
    }

    /// Time centered, date at the top, weekday at the bottom.
    pub fn draw_datetime_at(&mut self, now: NaiveDateTime, show_seconds: bool) -> &FrameBuffer {
        self.begin(None);

        let time = format_time(&now, show_seconds);
        self.centered(&time, FontId::Huge);

        let date = format_date(&now);
        let date_size = self.fonts.measure(&date, FontId::Small);
        self.place(
            &date,
            FontId::Small,
            Point::new(centered_x(self.size, date_size), top_y()),
            date_size,
        );

        let weekday = weekday_name(now.weekday());
        let weekday_size = self.fonts.measure(weekday, FontId::Small);
        self.place(
            weekday,
            FontId::Small,
            Point::new(
                centered_x(self.size, weekday_size),
                bottom_y(self.size, weekday_size),
            ),
            weekday_size,
        );

        self.finish("datetime")
    }

    pub fn draw_shutdown(&mut self) -> &FrameBuffer {
        self.begin(Some(BackgroundKind::Shutdown));
        self.finish("shutdown")
    }

    pub fn draw_heading(&mut self, heading: &str) -> &FrameBuffer {
        self.begin(None);
        self.centered(heading, FontId::Huge);
        self.finish("heading")
    }

    pub fn draw_message(&mut self, message: &str) -> &FrameBuffer {
        self.begin(None);
        self.centered(message, FontId::Medium);
        self.finish("message")
    }

    /// A prompt with the current choice underneath.
    pub fn draw_selection(&mut self, message: &str, selection: &str) -> &FrameBuffer {
        self.begin(None);

        let message_size = self.fonts.measure(message, FontId::Medium);
        let selection_size = self.fonts.measure(selection, FontId::Small);
        let (message_y, selection_y) = stacked_pair(self.size, message_size, selection_size);

        self.place(
            message,
            FontId::Medium,
            Point::new(centered_x(self.size, message_size), message_y),
            message_size,
        );
        self.place(
            selection,
            FontId::Small,
            Point::new(centered_x(self.size, selection_size), selection_y),
            selection_size,
        );

        self.finish("selection")
    }

    fn begin(&mut self, background: Option<BackgroundKind>) {
        self.placements.clear();
        self.canvas
            .reset(background.map(|kind| self.backgrounds.get(kind)));
    }

    fn centered(&mut self, text: &str, font: FontId) {
        let size = self.fonts.measure(text, font);
        let origin = Point::new(centered_x(self.size, size), centered_y(self.size, size));
        self.place(text, font, origin, size);
    }

    fn place(&mut self, text: &str, font: FontId, origin: Point, size: Size) {
        self.fonts
            .draw(text, font, origin, BinaryColor::On, &mut self.canvas);
        self.placements
            .push(TextPlacement::new(font, origin, size, text))
            .ok();
    }

    fn finish(&self, layout: &str) -> &FrameBuffer {
        debug!(
            "Rendered {} frame: {} text items, {} pixels lit",
            layout,
            self.placements.len(),
            self.canvas.lit_pixel_count()
        );
        &self.canvas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedWallClock;
    use crate::ui::Bitmap;
    use chrono::NaiveDate;
    use core::convert::Infallible;
    use embedded_graphics::primitives::Rectangle;

    fn renderer() -> ScreenRenderer {
        let display = DisplayConfig::default();
        ScreenRenderer::new(
            display,
            MonoFontSet::standard(),
            Backgrounds::generated(display.size()),
        )
        .unwrap()
    }

    fn renderer_for(width: u32, height: u32) -> ScreenRenderer {
        let display = DisplayConfig::new(width, height).unwrap();
        ScreenRenderer::new(
            display,
            MonoFontSet::standard(),
            Backgrounds::generated(display.size()),
        )
        .unwrap()
    }

    fn placement<'a, F>(renderer: &'a ScreenRenderer<F>, text: &str) -> &'a TextPlacement {
        renderer
            .placements
            .iter()
            .find(|p| p.text.as_str() == text)
            .unwrap()
    }

    fn monday_morning() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(7, 5, 9)
            .unwrap()
    }

    /// Every lit pixel lies inside some placed text box.
    fn only_text_is_lit<F>(renderer: &ScreenRenderer<F>) -> bool {
        let size = renderer.size;
        (0..size.height as i32).all(|y| {
            (0..size.width as i32).all(|x| {
                let point = Point::new(x, y);
                renderer.canvas.pixel(point) == Some(BinaryColor::Off)
                    || renderer
                        .placements
                        .iter()
                        .any(|p| p.bounds().contains(point))
            })
        })
    }

    /// Fixed-metric rasterizer that draws every glyph as a solid block.
    struct BlockFont {
        medium: Size,
        other: Size,
    }

    impl BlockFont {
        fn glyph(&self, font: FontId) -> Size {
            if font == FontId::Medium {
                self.medium
            } else {
                self.other
            }
        }
    }

    impl TextRasterizer for BlockFont {
        fn supports(&self, _font: FontId) -> bool {
            true
        }

        fn measure(&self, text: &str, font: FontId) -> Size {
            let count = text.chars().count() as u32;
            if count == 0 {
                return Size::zero();
            }
            let glyph = self.glyph(font);
            Size::new(glyph.width * count, glyph.height)
        }

        fn draw(
            &self,
            text: &str,
            font: FontId,
            origin: Point,
            fill: BinaryColor,
            target: &mut FrameBuffer,
        ) {
            let area = Rectangle::new(origin, self.measure(text, font));
            target.fill_solid(&area, fill).ok();
        }
    }

    struct NullDisplay {
        size: Size,
        flushes: usize,
    }

    impl OriginDimensions for NullDisplay {
        fn size(&self) -> Size {
            self.size
        }
    }

    impl DrawTarget for NullDisplay {
        type Color = BinaryColor;
        type Error = Infallible;

        fn draw_iter<I>(&mut self, _pixels: I) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Self::Color>>,
        {
            Ok(())
        }

        fn fill_contiguous<I>(&mut self, _area: &Rectangle, _colors: I) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Self::Color>,
        {
            self.flushes += 1;
            Ok(())
        }
    }

    #[test]
    fn test_missing_font_is_rejected() {
        let display = DisplayConfig::default();
        let result = ScreenRenderer::new(
            display,
            MonoFontSet::empty(),
            Backgrounds::generated(display.size()),
        );
        assert!(matches!(result, Err(AssetError::MissingFont(FontId::Huge))));

        let mut fonts = MonoFontSet::empty();
        for id in [FontId::Huge, FontId::Tall, FontId::Medium, FontId::Thin, FontId::Small] {
            fonts = fonts.with_font(id, &embedded_graphics::mono_font::iso_8859_1::FONT_6X10);
        }
        let result = ScreenRenderer::new(display, fonts, Backgrounds::generated(display.size()));
        assert!(matches!(result, Err(AssetError::MissingFont(FontId::Tiny))));
    }

    #[test]
    fn test_background_size_must_match_canvas() {
        let result = ScreenRenderer::new(
            DisplayConfig::default(),
            MonoFontSet::standard(),
            Backgrounds::generated(Size::new(128, 32)),
        );
        assert!(matches!(
            result,
            Err(AssetError::SizeMismatch {
                kind: BackgroundKind::Temperature,
                ..
            })
        ));
    }

    #[test]
    fn test_values_on_temperature_background() {
        let mut renderer = renderer();
        renderer.draw_values(
            ["top", "temperature", "bottom"],
            [20.0, 23.4, 1005.2],
            [" hPa", " °C", " hPa"],
            1,
        );

        let value = placement(&renderer, "23.4");
        assert_eq!(value.font, FontId::Huge);
        assert_eq!(value.origin, Point::new(44, 22));

        let unit = placement(&renderer, "°C");
        assert_eq!(unit.font, FontId::Small);
        assert_eq!(unit.origin, Point::new(114, 32));
        assert_eq!(unit.baseline(), value.baseline());

        let top = placement(&renderer, "20.0 hPa");
        assert_eq!((top.font, top.origin), (FontId::Thin, Point::new(40, 2)));

        let bottom = placement(&renderer, "1005.2 hPa");
        assert_eq!((bottom.font, bottom.origin), (FontId::Thin, Point::new(34, 49)));

        // Thermometer bulb from the background is still there
        assert_eq!(renderer.canvas().pixel(Point::new(8, 38)), Some(BinaryColor::On));
        assert!(!only_text_is_lit(&renderer));
    }

    #[test]
    fn test_many_center_digits_draw_whole_value() {
        let mut renderer = renderer();
        renderer.draw_values(["a", "temperature", "b"], [1.0, 23.4, 2.0], ["", "°C", ""], 40);

        let expected = format!("{:.40}", 23.4);
        let value = placement(&renderer, &expected);
        assert_eq!(value.size, Size::new(10 * 43, 20));
        assert_eq!(value.origin.x, (128 - 430) / 2);
        placement(&renderer, "°C");
    }

    #[test]
    fn test_huge_center_value_is_not_cut() {
        let mut renderer = renderer();
        renderer.draw_values(["a", "pressure", "b"], [1.0, 1e30, 2.0], ["", "", ""], 1);

        let value = placement(&renderer, "1000000000000000019884624838656.0");
        assert_eq!(value.size.width, 10 * 33);
        assert!(value.origin.x < 0);
    }

    #[test]
    fn test_values_center_digits() {
        let mut renderer = renderer();
        renderer.draw_values(["a", "pressure", "b"], [1.0, 1003.5342, 2.0], ["", " hPa", ""], 3);

        let value = placement(&renderer, "1003.534");
        assert_eq!(value.origin, Point::new(24, 22));
        placement(&renderer, "hPa");
    }

    #[test]
    fn test_unknown_center_label_gives_blank_background() {
        let mut renderer = renderer();
        renderer.draw_values(["x", "wind", "y"], [1.0, 2.0, 3.0], ["", "", ""], 1);
        assert!(only_text_is_lit(&renderer));
    }

    #[test]
    fn test_background_follows_center_label() {
        let display = DisplayConfig::default();
        let backgrounds = Backgrounds::generated(display.size());
        let mut renderer =
            ScreenRenderer::new(display, MonoFontSet::standard(), backgrounds.clone()).unwrap();

        let sample = crate::sensors::Sample::new(67.0, 1003.53, 23.0342);
        let order = [
            crate::sensors::Quantity::Temperature,
            crate::sensors::Quantity::Humidity,
            crate::sensors::Quantity::Pressure,
        ];
        let screen = ValuesScreen::from_sample(&sample, order);
        renderer.render(&Screen::Values(screen));

        let drawn = Bitmap::from(renderer.canvas());
        let icon = backgrounds.get(BackgroundKind::Humidity);
        // Droplet pixels survive outside the text boxes
        for y in 0..64 {
            for x in 0..20 {
                let point = Point::new(x, y);
                if renderer.placements().iter().any(|p| p.bounds().contains(point)) {
                    continue;
                }
                assert_eq!(drawn.is_on(x as usize, y as usize), icon.is_on(x as usize, y as usize));
            }
        }
    }

    #[test]
    fn test_every_layout_fills_canvas_size() {
        for (width, height) in [(128, 64), (96, 16), (200, 100), (20, 8)] {
            let mut renderer = renderer_for(width, height);
            let expected = Size::new(width, height);

            assert_eq!(
                renderer
                    .draw_values(["a", "humidity", "b"], [1.0, 2.0, 3.0], ["%", "%", "%"], 1)
                    .size(),
                expected
            );
            assert_eq!(renderer.draw_heading("Heading").size(), expected);
            assert_eq!(renderer.draw_message("Switch off?").size(), expected);
            assert_eq!(renderer.draw_datetime_at(monday_morning(), true).size(), expected);
            assert_eq!(renderer.draw_shutdown().size(), expected);
            assert_eq!(renderer.draw_selection("Show seconds", "Enabled").size(), expected);
        }
    }

    #[test]
    fn test_datetime_layout() {
        let mut renderer = renderer();
        renderer.draw_datetime(true, &FixedWallClock(monday_morning()));

        let time = placement(&renderer, "07:05:09");
        assert_eq!((time.font, time.origin), (FontId::Huge, Point::new(24, 22)));
        let date = placement(&renderer, "2026-10-19");
        assert_eq!((date.font, date.origin), (FontId::Small, Point::new(34, 2)));
        let weekday = placement(&renderer, "Monday");
        assert_eq!((weekday.font, weekday.origin), (FontId::Small, Point::new(46, 52)));
        assert!(only_text_is_lit(&renderer));

        renderer.draw_datetime_at(monday_morning(), false);
        assert_eq!(placement(&renderer, "07:05").origin, Point::new(39, 22));
        assert_eq!(renderer.placements().len(), 3);
    }

    #[test]
    fn test_shutdown_is_background_verbatim() {
        let display = DisplayConfig::default();
        let backgrounds = Backgrounds::generated(display.size());
        let mut renderer =
            ScreenRenderer::new(display, MonoFontSet::standard(), backgrounds.clone()).unwrap();

        renderer.draw_heading("Heading");
        let frame = Bitmap::from(renderer.draw_shutdown());

        assert_eq!(&frame, backgrounds.get(BackgroundKind::Shutdown));
        assert!(renderer.placements().is_empty());
    }

    #[test]
    fn test_heading_and_message_are_centered() {
        let mut renderer = renderer();

        renderer.draw_heading("Heading");
        let heading = placement(&renderer, "Heading");
        assert_eq!((heading.font, heading.origin), (FontId::Huge, Point::new(29, 22)));

        renderer.draw_message("Switch off?");
        let message = placement(&renderer, "Switch off?");
        assert_eq!((message.font, message.origin), (FontId::Medium, Point::new(20, 25)));
        assert_eq!(renderer.placements().len(), 1);
        assert!(only_text_is_lit(&renderer));
    }

    #[test]
    fn test_wide_heading_keeps_centering_formula() {
        let mut renderer = renderer();
        renderer.draw_heading("A very long heading");

        let heading = placement(&renderer, "A very long heading");
        assert_eq!(heading.origin.x, -31);
        assert!(renderer.canvas().lit_pixel_count() > 0);
    }

    #[test]
    fn test_long_heading_records_prefix_with_full_box() {
        let mut renderer = renderer();
        let heading = "H".repeat(70);
        renderer.draw_heading(&heading);

        let placement = &renderer.placements()[0];
        assert_eq!(placement.text.as_str(), &heading[..64]);
        assert_eq!(placement.size, Size::new(10 * 70, 20));
        assert_eq!(placement.origin.x, (128 - 700) / 2);
    }

    #[test]
    fn test_selection_layout() {
        let mut renderer = renderer();
        renderer.draw_selection("Show seconds", "Enabled");

        let message = placement(&renderer, "Show seconds");
        let selection = placement(&renderer, "Enabled");
        assert_eq!((message.font, message.origin), (FontId::Medium, Point::new(16, 12)));
        assert_eq!((selection.font, selection.origin), (FontId::Small, Point::new(43, 37)));
        assert!(message.baseline() < selection.baseline());
    }

    #[test]
    fn test_selection_baselines_ordered_on_any_canvas() {
        for (width, height) in [(128, 64), (128, 32), (64, 16), (32, 8), (16, 4)] {
            let mut renderer = renderer_for(width, height);
            renderer.draw_selection("Show seconds", "Enabled");

            let message = placement(&renderer, "Show seconds");
            let selection = placement(&renderer, "Enabled");
            assert!(message.origin.y >= 0);
            assert!(message.baseline() < selection.baseline());
        }
    }

    #[test]
    fn test_selection_pushed_below_tall_message() {
        let display = DisplayConfig::new(64, 16).unwrap();
        let fonts = BlockFont {
            medium: Size::new(4, 20),
            other: Size::new(4, 2),
        };
        let mut renderer =
            ScreenRenderer::new(display, fonts, Backgrounds::generated(display.size())).unwrap();
        renderer.draw_selection("ab", "c");

        let message = placement(&renderer, "ab");
        let selection = placement(&renderer, "c");
        assert_eq!(message.origin.y, 0);
        assert_eq!(selection.origin.y, message.baseline());
    }

    #[test]
    fn test_render_matches_direct_draws() {
        let mut renderer = renderer();
        let via_render = Bitmap::from(renderer.render(&Screen::Selection {
            message: "Show seconds",
            selection: "Enabled",
        }));
        let direct = Bitmap::from(renderer.draw_selection("Show seconds", "Enabled"));
        assert_eq!(via_render, direct);

        let via_render = Bitmap::from(renderer.render(&Screen::DateTime {
            now: monday_morning(),
            show_seconds: false,
        }));
        let direct = Bitmap::from(renderer.draw_datetime_at(monday_morning(), false));
        assert_eq!(via_render, direct);
    }

    #[test]
    fn test_flush_sends_each_frame_once() {
        let mut renderer = renderer();
        let mut display = NullDisplay {
            size: renderer.size(),
            flushes: 0,
        };

        renderer.draw_message("Switch off?");
        renderer.flush(&mut display).unwrap();
        assert_eq!(display.flushes, 1);

        renderer.flush(&mut display).unwrap();
        assert_eq!(display.flushes, 1);

        renderer.draw_message("Switch on?");
        renderer.flush(&mut display).unwrap();
        assert_eq!(display.flushes, 2);
    }

    #[test]
    fn test_new_frame_replaces_previous_one() {
        let mut renderer = renderer();
        renderer.draw_shutdown();
        renderer.draw_message("Switch off?");
        assert!(only_text_is_lit(&renderer));
    }
}
