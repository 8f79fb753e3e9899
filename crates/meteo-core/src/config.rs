//! Configuration surface for meteo
//!
//! Covers the sensor readout interval (clamped, never rejected for being out
//! of range), the sensor bus endpoint and the canvas size. Settings can be
//! persisted as postcard bytes.

extern crate alloc;

use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use embassy_time::Duration;
use log::warn;
use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

/// Shortest allowed readout interval in seconds.
pub const MIN_READOUT_INTERVAL_SECS: f64 = 1.0;

/// Longest allowed readout interval in seconds.
pub const MAX_READOUT_INTERVAL_SECS: f64 = 3600.0;

/// Readout interval used when nothing else is configured.
pub const DEFAULT_READOUT_INTERVAL_SECS: f64 = 1.0;

/// I2C bus number of the sensor on a stock board.
pub const DEFAULT_SENSOR_PORT: u8 = 1;

/// Factory address of the environmental sensor (SDO pulled low).
pub const DEFAULT_SENSOR_ADDRESS: u8 = 0x76;

/// Panel width of the stock 128x64 OLED.
pub const DEFAULT_DISPLAY_WIDTH_PX: u32 = 128;

/// Panel height of the stock 128x64 OLED.
pub const DEFAULT_DISPLAY_HEIGHT_PX: u32 = 64;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Readout interval is not a number")]
    NotNumeric,
    #[error("Canvas size {width}x{height} must be positive")]
    InvalidCanvasSize { width: u32, height: u32 },
    #[error("Failed to encode settings")]
    Encode,
    #[error("Failed to decode settings")]
    Decode,
}

/// Which end of the allowed range an interval was pulled to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalBound {
    Minimum,
    Maximum,
}

impl IntervalBound {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Minimum => "minimum",
            Self::Maximum => "maximum",
        }
    }
}

/// Event describing an out-of-range interval that was clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalClamp {
    /// The value the caller asked for.
    pub requested: f64,
    /// The value that was stored instead.
    pub applied: ReadoutInterval,
    pub bound: IntervalBound,
}

/// Sensor readout interval in seconds, always within
/// `[MIN_READOUT_INTERVAL_SECS, MAX_READOUT_INTERVAL_SECS]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct ReadoutInterval(f64);

impl ReadoutInterval {
    pub const MIN: Self = Self(MIN_READOUT_INTERVAL_SECS);
    pub const MAX: Self = Self(MAX_READOUT_INTERVAL_SECS);

    /// Build an interval, clamping out-of-range values.
    ///
    /// NaN is the only input that fails. Clamping emits a warning and is
    /// reported through the returned [`IntervalClamp`].
    pub fn checked(secs: f64) -> Result<(Self, Option<IntervalClamp>), ConfigError> {
        if secs.is_nan() {
            return Err(ConfigError::NotNumeric);
        }

        let (applied, bound) = if secs < MIN_READOUT_INTERVAL_SECS {
            (Self::MIN, IntervalBound::Minimum)
        } else if secs > MAX_READOUT_INTERVAL_SECS {
            (Self::MAX, IntervalBound::Maximum)
        } else {
            return Ok((Self(secs), None));
        };

        warn!(
            "Readout interval {} replaced by {} value {}",
            secs,
            bound.label(),
            applied.0
        );

        Ok((
            applied,
            Some(IntervalClamp {
                requested: secs,
                applied,
                bound,
            }),
        ))
    }

    /// Build an interval, clamping out-of-range values with a warning.
    pub fn new(secs: f64) -> Result<Self, ConfigError> {
        Self::checked(secs).map(|(interval, _)| interval)
    }

    pub const fn as_secs_f64(self) -> f64 {
        self.0
    }

    /// The staleness window as an embassy duration (microsecond resolution).
    pub fn as_duration(self) -> Duration {
        Duration::from_micros((self.0 * 1_000_000.0) as u64)
    }
}

impl Default for ReadoutInterval {
    fn default() -> Self {
        Self(DEFAULT_READOUT_INTERVAL_SECS)
    }
}

impl TryFrom<f64> for ReadoutInterval {
    type Error = ConfigError;

    fn try_from(secs: f64) -> Result<Self, Self::Error> {
        Self::new(secs)
    }
}

impl From<ReadoutInterval> for f64 {
    fn from(interval: ReadoutInterval) -> Self {
        interval.0
    }
}

impl FromStr for ReadoutInterval {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let secs: f64 = s.trim().parse().map_err(|_| ConfigError::NotNumeric)?;
        Self::new(secs)
    }
}

impl fmt::Display for ReadoutInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// Bus number and device address of the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub port: u8,
    pub address: u8,
}

impl Endpoint {
    pub const fn new(port: u8, address: u8) -> Self {
        Self { port, address }
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::new(DEFAULT_SENSOR_PORT, DEFAULT_SENSOR_ADDRESS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SensorConfig {
    pub readout_interval: ReadoutInterval,
    pub endpoint: Endpoint,
}

/// Canvas dimensions, fixed for the lifetime of a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    width: u32,
    height: u32,
}

impl DisplayConfig {
    pub fn new(width: u32, height: u32) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::InvalidCanvasSize { width, height });
        }
        Ok(Self { width, height })
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    pub const fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> embedded_graphics::prelude::Size {
        embedded_graphics::prelude::Size::new(self.width, self.height)
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_DISPLAY_WIDTH_PX,
            height: DEFAULT_DISPLAY_HEIGHT_PX,
        }
    }
}

/// Complete device settings.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    pub sensor: SensorConfig,
    pub display: DisplayConfig,
}

impl Config {
    /// Encode the settings for storage.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ConfigError> {
        postcard::to_allocvec(self).map_err(|e| {
            log::error!("Failed to encode settings: {:?}", e);
            ConfigError::Encode
        })
    }

    /// Decode stored settings, re-validating the canvas size.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = postcard::from_bytes(bytes).map_err(|e| {
            log::error!("Failed to decode settings: {:?}", e);
            ConfigError::Decode
        })?;
        DisplayConfig::new(config.display.width, config.display.height)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_range_interval_is_kept() {
        let (interval, clamp) = ReadoutInterval::checked(3.0).unwrap();
        assert_eq!(interval.as_secs_f64(), 3.0);
        assert!(clamp.is_none());
    }

    #[test]
    fn test_negative_interval_clamps_to_minimum() {
        let (interval, clamp) = ReadoutInterval::checked(-1.0).unwrap();
        assert_eq!(interval.as_secs_f64(), MIN_READOUT_INTERVAL_SECS);

        let clamp = clamp.expect("clamp must be reported");
        assert_eq!(clamp.requested, -1.0);
        assert_eq!(clamp.bound, IntervalBound::Minimum);
        assert_eq!(clamp.applied, ReadoutInterval::MIN);
    }

    #[test]
    fn test_large_interval_clamps_to_maximum() {
        let (interval, clamp) = ReadoutInterval::checked(9999.0).unwrap();
        assert_eq!(interval.as_secs_f64(), MAX_READOUT_INTERVAL_SECS);
        assert_eq!(clamp.unwrap().bound, IntervalBound::Maximum);
    }

    #[test]
    fn test_infinite_interval_clamps_to_maximum() {
        let interval = ReadoutInterval::new(f64::INFINITY).unwrap();
        assert_eq!(interval, ReadoutInterval::MAX);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        assert!(ReadoutInterval::checked(1.0).unwrap().1.is_none());
        assert!(ReadoutInterval::checked(3600.0).unwrap().1.is_none());
    }

    #[test]
    fn test_nan_interval_is_not_numeric() {
        assert_eq!(ReadoutInterval::new(f64::NAN), Err(ConfigError::NotNumeric));
    }

    #[test]
    fn test_parse_interval_text() {
        assert_eq!(
            " 12.5 ".parse::<ReadoutInterval>().unwrap().as_secs_f64(),
            12.5
        );
        assert_eq!(
            "0".parse::<ReadoutInterval>().unwrap(),
            ReadoutInterval::MIN
        );
        assert_eq!(
            "notanumber".parse::<ReadoutInterval>(),
            Err(ConfigError::NotNumeric)
        );
    }

    #[test]
    fn test_interval_duration() {
        let interval = ReadoutInterval::new(2.5).unwrap();
        assert_eq!(interval.as_duration(), Duration::from_millis(2500));
    }

    #[test]
    fn test_display_config_rejects_zero_size() {
        assert_eq!(
            DisplayConfig::new(0, 64),
            Err(ConfigError::InvalidCanvasSize {
                width: 0,
                height: 64
            })
        );
        assert!(DisplayConfig::new(128, 32).is_ok());
    }

    #[test]
    fn test_defaults_match_stock_hardware() {
        let config = Config::default();
        assert_eq!(config.sensor.endpoint, Endpoint::new(1, 0x76));
        assert_eq!(config.sensor.readout_interval.as_secs_f64(), 1.0);
        assert_eq!(config.display.width(), 128);
        assert_eq!(config.display.height(), 64);
    }

    #[test]
    fn test_settings_survive_storage() {
        let config = Config {
            sensor: SensorConfig {
                readout_interval: ReadoutInterval::new(30.0).unwrap(),
                endpoint: Endpoint::new(0, 0x77),
            },
            display: DisplayConfig::new(128, 32).unwrap(),
        };

        let bytes = config.to_bytes().unwrap();
        assert_eq!(Config::from_bytes(&bytes).unwrap(), config);
    }

    #[test]
    fn test_stored_interval_is_clamped_on_load() {
        let mut config = Config::default();
        config.sensor.readout_interval = ReadoutInterval::MAX;
        let mut bytes = config.to_bytes().unwrap();

        // Patch the stored f64 (first field) to an out-of-range value.
        bytes[..8].copy_from_slice(&10_000.0f64.to_le_bytes());

        let loaded = Config::from_bytes(&bytes).unwrap();
        assert_eq!(loaded.sensor.readout_interval, ReadoutInterval::MAX);
    }

    #[test]
    fn test_truncated_settings_fail_to_decode() {
        let bytes = Config::default().to_bytes().unwrap();
        assert_eq!(
            Config::from_bytes(&bytes[..bytes.len() - 1]),
            Err(ConfigError::Decode)
        );
    }
}
