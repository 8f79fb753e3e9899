//! Sensor traits, sample types and the time-gated sensor cache

#[cfg(feature = "sensor-bme280")]
mod bme280;
mod cache;

#[cfg(feature = "sensor-bme280")]
pub use self::bme280::{Bme280Bus, Bme280Sensor, BME280_PRIMARY_ADDRESS, BME280_SECONDARY_ADDRESS};
pub use cache::{CacheError, Reading, SensorCache};

use crate::config::Endpoint;
use thiserror_no_std::Error;

/// Hardware failures while opening or sampling a sensor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SensorError {
    #[error("{sensor} at address {address:#04x} could not be opened: {details}")]
    OpenFailed {
        sensor: &'static str,
        address: u8,
        details: &'static str,
    },
    #[error("{sensor} failed to {operation}: {details}")]
    ReadFailed {
        sensor: &'static str,
        operation: &'static str,
        details: &'static str,
    },
}

/// The three quantities reported by the environmental sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    Humidity,
    Pressure,
    Temperature,
}

impl Quantity {
    pub const ALL: [Self; 3] = [Self::Humidity, Self::Pressure, Self::Temperature];

    /// Unit suffix as shown on screen. Pressure carries a leading space.
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Humidity => "%",
            Self::Pressure => " hPa",
            Self::Temperature => "°C",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Humidity => "humidity",
            Self::Pressure => "pressure",
            Self::Temperature => "temperature",
        }
    }

    /// Parse a screen label. Labels are matched exactly.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|q| q.label() == label)
    }
}

/// One hardware transaction's worth of readings.
///
/// Humidity in %, pressure in hPa, temperature in °C.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sample {
    pub humidity: f64,
    pub pressure: f64,
    pub temperature: f64,
}

impl Sample {
    pub const fn new(humidity: f64, pressure: f64, temperature: f64) -> Self {
        Self {
            humidity,
            pressure,
            temperature,
        }
    }

    pub const fn get(&self, quantity: Quantity) -> f64 {
        match quantity {
            Quantity::Humidity => self.humidity,
            Quantity::Pressure => self.pressure,
            Quantity::Temperature => self.temperature,
        }
    }
}

/// An opened sensor. Every [`Sensor::read`] call is one hardware transaction.
pub trait Sensor {
    /// Short device name used in log lines and errors.
    fn name(&self) -> &'static str;

    /// Sample humidity, pressure and temperature together.
    fn read(&mut self) -> Result<Sample, SensorError>;
}

/// A bus that can open a [`Sensor`] at an endpoint.
///
/// Opening includes whatever device bring-up the driver needs, such as
/// loading factory calibration.
pub trait SensorBus {
    type Sensor: Sensor;

    fn open(self, endpoint: Endpoint) -> Result<Self::Sensor, SensorError>;
}
