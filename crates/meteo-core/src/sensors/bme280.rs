use ::bme280::i2c::BME280;
use embedded_hal::{delay::DelayNs, i2c::I2c};
use log::{error, info};

use super::{Sample, Sensor, SensorBus, SensorError};
use crate::config::Endpoint;

/// Address with SDO tied to ground.
pub const BME280_PRIMARY_ADDRESS: u8 = 0x76;

/// Address with SDO tied to VDDIO.
pub const BME280_SECONDARY_ADDRESS: u8 = 0x77;

const SENSOR_NAME: &str = "BME280";

/// An I2C bus with a BME280 attached, not yet initialized.
pub struct Bme280Bus<I, D> {
    i2c: I,
    delay: D,
}

impl<I: I2c, D: DelayNs> Bme280Bus<I, D> {
    pub fn new(i2c: I, delay: D) -> Self {
        Self { i2c, delay }
    }
}

impl<I: I2c, D: DelayNs> SensorBus for Bme280Bus<I, D> {
    type Sensor = Bme280Sensor<I, D>;

    /// Bind the driver to the endpoint address and load calibration.
    fn open(mut self, endpoint: Endpoint) -> Result<Self::Sensor, SensorError> {
        let mut sensor = match endpoint.address {
            BME280_PRIMARY_ADDRESS => BME280::new_primary(self.i2c),
            BME280_SECONDARY_ADDRESS => BME280::new_secondary(self.i2c),
            address => {
                error!("BME280 cannot live at address {:#04x}", address);
                return Err(SensorError::OpenFailed {
                    sensor: SENSOR_NAME,
                    address,
                    details: "BME280 only answers on 0x76 or 0x77",
                });
            }
        };

        sensor.init(&mut self.delay).map_err(|e| {
            error!("BME280 init failed: {:?}", e);
            SensorError::OpenFailed {
                sensor: SENSOR_NAME,
                address: endpoint.address,
                details: "Chip ID check or calibration load failed",
            }
        })?;

        info!(
            "BME280: calibration loaded (bus {}, address {:#04x})",
            endpoint.port, endpoint.address
        );

        Ok(Bme280Sensor {
            sensor,
            delay: self.delay,
        })
    }
}

pub struct Bme280Sensor<I, D> {
    sensor: BME280<I>,
    delay: D,
}

impl<I: I2c, D: DelayNs> Sensor for Bme280Sensor<I, D> {
    fn name(&self) -> &'static str {
        SENSOR_NAME
    }

    fn read(&mut self) -> Result<Sample, SensorError> {
        let measurements = self.sensor.measure(&mut self.delay).map_err(|e| {
            error!("BME280 measurement failed: {:?}", e);
            SensorError::ReadFailed {
                sensor: SENSOR_NAME,
                operation: "measure humidity/pressure/temperature",
                details: "I2C communication error or sensor not responding",
            }
        })?;

        // The driver reports pressure in Pa
        Ok(Sample {
            humidity: measurements.humidity as f64,
            pressure: measurements.pressure as f64 / 100.0,
            temperature: measurements.temperature as f64,
        })
    }
}
