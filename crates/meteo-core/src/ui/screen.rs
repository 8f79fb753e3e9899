//! Layout variants and the text each one shows.

use core::fmt::Write;

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use heapless::String;

use crate::sensors::{Quantity, Sample};
use crate::ui::BackgroundKind;

/// Capacity of one formatted date or time line.
pub const SCREEN_TEXT_CAPACITY: usize = 32;

/// Longest `f64` printed with up to `u8::MAX` decimals: sign, the 309
/// integer digits of `f64::MAX`, the point and the decimals.
pub const VALUE_TEXT_CAPACITY: usize = 1 + 309 + 1 + u8::MAX as usize;

/// Longest unit suffix kept on an edge slot, in bytes.
pub const UNIT_TEXT_CAPACITY: usize = 32;

pub type ScreenText = String<SCREEN_TEXT_CAPACITY>;

pub type ValueText = String<VALUE_TEXT_CAPACITY>;

pub type SlotText = String<{ VALUE_TEXT_CAPACITY + UNIT_TEXT_CAPACITY }>;

/// One frame's worth of content, tagged by layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Screen<'a> {
    Values(ValuesScreen<'a>),
    DateTime {
        now: NaiveDateTime,
        show_seconds: bool,
    },
    Shutdown,
    Heading(&'a str),
    Message(&'a str),
    Selection {
        message: &'a str,
        selection: &'a str,
    },
}

impl Screen<'_> {
    /// Short layout name for logs and file names.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Values(_) => "values",
            Self::DateTime { .. } => "datetime",
            Self::Shutdown => "shutdown",
            Self::Heading(_) => "heading",
            Self::Message(_) => "message",
            Self::Selection { .. } => "selection",
        }
    }
}

/// A labelled number with its unit suffix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueSlot<'a> {
    pub label: &'a str,
    pub value: f64,
    pub unit: &'a str,
}

impl<'a> ValueSlot<'a> {
    pub const fn new(label: &'a str, value: f64, unit: &'a str) -> Self {
        Self { label, value, unit }
    }
}

impl ValueSlot<'static> {
    pub const fn reading(quantity: Quantity, sample: &Sample) -> Self {
        Self::new(quantity.label(), sample.get(quantity), quantity.unit())
    }
}

/// Three slots stacked top to bottom. The center slot is shown large and
/// picks the background.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValuesScreen<'a> {
    pub top: ValueSlot<'a>,
    pub center: ValueSlot<'a>,
    pub bottom: ValueSlot<'a>,
    /// Decimals of the center value
    pub digits: u8,
}

impl<'a> ValuesScreen<'a> {
    pub const DEFAULT_DIGITS: u8 = 1;

    pub const fn new(
        labels: [&'a str; 3],
        values: [f64; 3],
        units: [&'a str; 3],
        digits: u8,
    ) -> Self {
        Self {
            top: ValueSlot::new(labels[0], values[0], units[0]),
            center: ValueSlot::new(labels[1], values[1], units[1]),
            bottom: ValueSlot::new(labels[2], values[2], units[2]),
            digits,
        }
    }

    /// Background matching the center label, or `None` for a blank canvas.
    pub fn background(&self) -> Option<BackgroundKind> {
        Quantity::from_label(self.center.label).map(BackgroundKind::for_quantity)
    }
}

impl ValuesScreen<'static> {
    /// Lay out one sample with the quantities in `order`, top to bottom.
    pub const fn from_sample(sample: &Sample, order: [Quantity; 3]) -> Self {
        Self {
            top: ValueSlot::reading(order[0], sample),
            center: ValueSlot::reading(order[1], sample),
            bottom: ValueSlot::reading(order[2], sample),
            digits: Self::DEFAULT_DIGITS,
        }
    }
}

/// `value` with `digits` decimals.
///
/// The buffer holds any finite `f64` at any `u8` precision, so the number is
/// never cut short; over-wide text is clipped only when drawn.
pub(crate) fn format_value(value: f64, digits: u8) -> ValueText {
    let mut text = ValueText::new();
    write!(text, "{:.*}", digits as usize, value).ok();
    text
}

/// Edge slot text: one decimal followed by the unit as given.
///
/// A unit longer than [`UNIT_TEXT_CAPACITY`] bytes keeps only its leading
/// whole chars; the number itself is always complete.
pub(crate) fn format_slot(slot: &ValueSlot<'_>) -> SlotText {
    let mut text = SlotText::new();
    text.push_str(&format_value(slot.value, 1)).ok();
    let limit = text.len() + UNIT_TEXT_CAPACITY;
    for c in slot.unit.chars() {
        if text.len() + c.len_utf8() > limit {
            break;
        }
        text.push(c).ok();
    }
    text
}

/// Units beside the center value lose one leading space.
pub(crate) fn strip_leading_space(unit: &str) -> &str {
    unit.strip_prefix(' ').unwrap_or(unit)
}

pub(crate) fn format_time(now: &NaiveDateTime, show_seconds: bool) -> ScreenText {
    let mut text = ScreenText::new();
    write!(text, "{:02}:{:02}", now.hour(), now.minute()).ok();
    if show_seconds {
        write!(text, ":{:02}", now.second()).ok();
    }
    text
}

pub(crate) fn format_date(now: &NaiveDateTime) -> ScreenText {
    let mut text = ScreenText::new();
    write!(text, "{:04}-{:02}-{:02}", now.year(), now.month(), now.day()).ok();
    text
}

pub(crate) const fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
