//! Time-gated sensor cache
//!
//! Serves humidity, pressure and temperature from a single cached hardware
//! sample. A new transaction happens only once the staleness window
//! (the readout interval) has passed since the last successful read, so
//! reading all three quantities back to back costs one bus transaction and
//! always yields values from the same sample.
//!
//! The cache is not synchronized. The check-then-refresh sequence assumes a
//! single owner; share it between tasks only behind external serialization.

use embassy_time::Instant;
use log::{debug, error, info};
use thiserror_no_std::Error;

use crate::clock::Clock;
use crate::config::{ConfigError, Endpoint, IntervalClamp, ReadoutInterval, SensorConfig};
use crate::sensors::{Quantity, Sample, Sensor, SensorBus, SensorError};

/// Errors from building a cache out of raw settings.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheError {
    #[error("Invalid sensor configuration: {0}")]
    Config(ConfigError),
    #[error("Sensor hardware error: {0}")]
    Hardware(SensorError),
}

impl From<ConfigError> for CacheError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<SensorError> for CacheError {
    fn from(value: SensorError) -> Self {
        Self::Hardware(value)
    }
}

/// A successful sample and the moment it was taken.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub sample: Sample,
    pub taken_at: Instant,
}

/// Caches one sensor's readings for the configured readout interval.
pub struct SensorCache<S, C> {
    sensor: S,
    clock: C,
    endpoint: Endpoint,
    readout_interval: ReadoutInterval,
    interval_clamp: Option<IntervalClamp>,
    last_reading: Option<Reading>,
}

impl<S, C> SensorCache<S, C>
where
    S: Sensor,
    C: Clock,
{
    /// Open the sensor at `endpoint` with a raw interval in seconds.
    ///
    /// Out-of-range intervals are clamped with a warning and the clamp is
    /// kept for [`SensorCache::interval_clamp`]; NaN is rejected before the
    /// bus is touched.
    pub fn new<B>(
        readout_interval: f64,
        endpoint: Endpoint,
        bus: B,
        clock: C,
    ) -> Result<Self, CacheError>
    where
        B: SensorBus<Sensor = S>,
    {
        let (readout_interval, clamp) = ReadoutInterval::checked(readout_interval)?;
        let mut cache = Self::open(readout_interval, endpoint, bus, clock)?;
        cache.interval_clamp = clamp;
        Ok(cache)
    }

    /// Open the sensor described by already validated settings.
    pub fn from_config<B>(config: &SensorConfig, bus: B, clock: C) -> Result<Self, SensorError>
    where
        B: SensorBus<Sensor = S>,
    {
        Self::open(config.readout_interval, config.endpoint, bus, clock)
    }

    fn open<B>(
        readout_interval: ReadoutInterval,
        endpoint: Endpoint,
        bus: B,
        clock: C,
    ) -> Result<Self, SensorError>
    where
        B: SensorBus<Sensor = S>,
    {
        let sensor = bus.open(endpoint).map_err(|e| {
            error!(
                "Failed to open sensor on bus {} at {:#04x}: {}",
                endpoint.port, endpoint.address, e
            );
            e
        })?;

        info!(
            "{} opened on bus {} at {:#04x}, readout interval {}",
            sensor.name(),
            endpoint.port,
            endpoint.address,
            readout_interval
        );

        Ok(Self {
            sensor,
            clock,
            endpoint,
            readout_interval,
            interval_clamp: None,
            last_reading: None,
        })
    }

    pub fn readout_interval(&self) -> ReadoutInterval {
        self.readout_interval
    }

    /// The clamp applied to the most recently requested interval, if it was
    /// out of range.
    pub fn interval_clamp(&self) -> Option<IntervalClamp> {
        self.interval_clamp
    }

    /// Change the readout interval.
    ///
    /// Out-of-range values are clamped (warning logged, clamp returned). NaN
    /// fails and leaves the current interval untouched.
    pub fn set_readout_interval(
        &mut self,
        secs: f64,
    ) -> Result<Option<IntervalClamp>, ConfigError> {
        let (interval, clamp) = ReadoutInterval::checked(secs)?;
        self.readout_interval = interval;
        self.interval_clamp = clamp;
        Ok(clamp)
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    /// When the cached sample was taken, or `None` before the first success.
    pub fn last_read_at(&self) -> Option<Instant> {
        self.last_reading.map(|reading| reading.taken_at)
    }

    /// The last good reading, whether or not it is still fresh.
    pub fn last_reading(&self) -> Option<Reading> {
        self.last_reading
    }

    /// Whether the next access will trigger a hardware transaction.
    pub fn is_stale(&self) -> bool {
        match self.last_reading {
            None => true,
            Some(reading) => self
                .clock
                .now()
                .checked_duration_since(reading.taken_at)
                .is_some_and(|elapsed| elapsed > self.readout_interval.as_duration()),
        }
    }

    /// Return the cached sample, reading the hardware first if it is stale.
    pub fn refresh_if_stale(&mut self) -> Result<Sample, SensorError> {
        if let Some(reading) = self.last_reading
            && !self.is_stale()
        {
            return Ok(reading.sample);
        }
        self.refresh()
    }

    /// Perform one hardware transaction regardless of staleness.
    ///
    /// On failure the previous reading and its timestamp are kept.
    pub fn refresh(&mut self) -> Result<Sample, SensorError> {
        let sample = self.sensor.read().map_err(|e| {
            error!("{} refresh failed: {}", self.sensor.name(), e);
            e
        })?;

        let taken_at = self.clock.now();
        self.last_reading = Some(Reading { sample, taken_at });

        debug!(
            "{}: humidity={}% pressure={}hPa temperature={}°C",
            self.sensor.name(),
            sample.humidity,
            sample.pressure,
            sample.temperature
        );

        Ok(sample)
    }

    pub fn get(&mut self, quantity: Quantity) -> Result<f64, SensorError> {
        self.refresh_if_stale().map(|sample| sample.get(quantity))
    }

    pub fn humidity(&mut self) -> Result<f64, SensorError> {
        self.get(Quantity::Humidity)
    }

    pub fn pressure(&mut self) -> Result<f64, SensorError> {
        self.get(Quantity::Pressure)
    }

    pub fn temperature(&mut self) -> Result<f64, SensorError> {
        self.get(Quantity::Temperature)
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }
}
