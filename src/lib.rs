//! Driver for the Bosch BMP085 barometer and thermometer.
//!
//! ```ignore
//! let mut sensor = Bmp085Builder::new()
//!     .bus(1)
//!     .mode(Mode::Standard)
//!     .pressure_unit(PressureUnit::InchesOfMercury)
//!     .build()
//!     .expect("Failed to build device");
//!
//! let reading = sensor.read().expect("Failed to read sensor");
//! println!("{} inHg at {} C", reading.pressure, reading.temperature);
//! ```

extern crate byteorder;
extern crate i2cdev;
extern crate log;

pub mod calibration;
pub mod compensation;
mod error;
pub mod transport;
pub mod units;

#[cfg(test)]
mod testing;

use byteorder::{BigEndian, ByteOrder};
use i2cdev::linux::LinuxI2CError;
use log::{debug, trace, warn};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub use crate::calibration::{to_signed16, to_unsigned16, Calibration, Mode, CALIBRATION_LEN};
pub use crate::error::{Error, Result};
pub use crate::transport::{LinuxI2CBus, Transport};
pub use crate::units::{PressureUnit, TemperatureUnit};

use crate::compensation::{compensate_pressure, compensate_temperature};
use crate::transport::{
    CALIBRATION_START, CONTROL_REGISTER, CONVERSION_RESULT, DEFAULT_I2C_ADDRESS,
    DEFAULT_I2C_BUS, SELECT_PRESSURE, SELECT_TEMPERATURE,
};

/// How long to wait for a conversion before reading the result register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettleTiming {
    /// 28 ms for pressure and 8 ms for temperature, whatever the mode.
    #[default]
    Fixed,
    /// The datasheet's maximum conversion time for the configured mode, rounded up.
    Datasheet,
}

impl SettleTiming {
    fn pressure_ms(self, mode: Mode) -> u32 {
        match self {
            SettleTiming::Fixed => 28,
            SettleTiming::Datasheet => match mode {
                Mode::UltraLowPower => 5,
                Mode::Standard => 8,
                Mode::HighResolution => 14,
                Mode::UltraHighResolution => 26,
            },
        }
    }

    fn temperature_ms(self) -> u32 {
        match self {
            SettleTiming::Fixed => 8,
            SettleTiming::Datasheet => 5,
        }
    }
}

/// Per-session settings, fixed once the sensor is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Config {
    pub mode: Mode,
    pub temperature_unit: TemperatureUnit,
    pub pressure_unit: PressureUnit,
    pub timing: SettleTiming,
}

/// One compensated measurement, in the units chosen at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub pressure: f64,
    pub temperature: f64,
}

/// Uncompensated counts from a single conversion sequence.
#[derive(Debug, Clone, Copy)]
struct RawMeasurement {
    pressure: i64,
    temperature: i64,
}

/// A single BMP085 sensor.
pub struct Bmp085<T> {
    transport: T,
    config: Config,
    calibration: Option<Calibration>,
}

/// A builder for Bmp085 sensors on a Linux I2C bus.
///
/// ```ignore
/// let mut sensor = Bmp085Builder::new()
///     .address(0x77)
///     .bus(2)
///     .build().expect("Failed to build device");
///
/// // Minimal example
/// let mut sensor = Bmp085Builder::new().build().expect("Failed to build device");
/// let reading = sensor.read();
/// ```
pub struct Bmp085Builder {
    i2c_address: u16,
    i2c_bus: u32,
    config: Config,
}

impl Default for Bmp085Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Bmp085Builder {
    pub fn new() -> Self {
        Bmp085Builder {
            i2c_address: DEFAULT_I2C_ADDRESS,
            i2c_bus: DEFAULT_I2C_BUS,
            config: Config::default(),
        }
    }

    /// Set the address of the I2C device for the sensor. Defaults to 0x77.
    pub fn address(&mut self, address: u16) -> &mut Self {
        self.i2c_address = address;
        self
    }

    /// Set the index of the bus, as in `/dev/i2c-N`. Defaults to 1.
    pub fn bus(&mut self, bus: u32) -> &mut Self {
        self.i2c_bus = bus;
        self
    }

    /// Set the pressure oversampling mode. Defaults to `Mode::UltraLowPower`.
    pub fn mode(&mut self, mode: Mode) -> &mut Self {
        self.config.mode = mode;
        self
    }

    /// Set the oversampling mode from its integer setting, rejecting anything above 3.
    pub fn oss(&mut self, oss: u8) -> Result<&mut Self, LinuxI2CError> {
        self.config.mode = Mode::from_oss(oss)?;
        Ok(self)
    }

    pub fn temperature_unit(&mut self, unit: TemperatureUnit) -> &mut Self {
        self.config.temperature_unit = unit;
        self
    }

    pub fn pressure_unit(&mut self, unit: PressureUnit) -> &mut Self {
        self.config.pressure_unit = unit;
        self
    }

    /// Choose between the fixed reference delays and per-mode datasheet delays.
    pub fn timing(&mut self, timing: SettleTiming) -> &mut Self {
        self.config.timing = timing;
        self
    }

    /// Attempt to open the bus and build a Bmp085 sensor from this builder. Calibration
    /// data is not read until the first measurement.
    pub fn build(&self) -> Result<Bmp085<LinuxI2CBus>, LinuxI2CError> {
        let bus = LinuxI2CBus::open(self.i2c_bus, self.i2c_address).map_err(Error::Open)?;
        debug!(
            "opened /dev/i2c-{} at {:#04x}",
            self.i2c_bus, self.i2c_address
        );

        Ok(Bmp085::new(bus, self.config))
    }
}

impl<T: Transport> Bmp085<T> {
    pub fn new(transport: T, config: Config) -> Self {
        Bmp085 {
            transport,
            config,
            calibration: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The cached calibration data, if it has been read yet.
    pub fn calibration(&self) -> Option<&Calibration> {
        self.calibration.as_ref()
    }

    /// Give back the transport.
    pub fn release(self) -> T {
        self.transport
    }

    /// List the addresses answering on the sensor's bus.
    pub fn scan(&mut self) -> Result<Vec<u16>, T::Error> {
        self.transport.scan().map_err(Error::Io)
    }

    /// Run a full pressure and temperature conversion and compensate the result.
    pub fn read(&mut self) -> Result<Reading, T::Error> {
        let calibration = self.calibrate()?;
        let raw = self.read_raw(calibration.mode)?;

        let temperature =
            compensate_temperature(raw.temperature, &calibration).ok_or(Error::Compensation)?;
        let pressure = compensate_pressure(raw.pressure, temperature.b5, &calibration)
            .ok_or(Error::Compensation)?;
        debug!(
            "compensated {} Pa at {} C",
            pressure,
            temperature.celsius()
        );

        Ok(Reading {
            pressure: self.config.pressure_unit.convert(pressure as f64),
            temperature: self.config.temperature_unit.convert(temperature.celsius()),
        })
    }

    /// Return the cached calibration, reading it from the device on first use. A failed
    /// read leaves the cache empty.
    fn calibrate(&mut self) -> Result<Calibration, T::Error> {
        if let Some(calibration) = self.calibration {
            return Ok(calibration);
        }

        let mut data = [0u8; CALIBRATION_LEN];
        self.read_exact(CALIBRATION_START, &mut data)?;

        let calibration = Calibration::from_bytes(&data, self.config.mode);
        debug!("calibration loaded: {:?}", calibration);
        self.calibration = Some(calibration);

        Ok(calibration)
    }

    fn read_raw(&mut self, mode: Mode) -> Result<RawMeasurement, T::Error> {
        let timing = self.config.timing;

        self.command(SELECT_PRESSURE + (mode.oss() << 6))?;
        self.settle(timing.pressure_ms(mode));

        let mut buf = [0u8; 3];
        self.read_exact(CONVERSION_RESULT, &mut buf)?;
        let pressure = BigEndian::read_u24(&buf) as i64 >> (8 - mode.oss());

        self.command(SELECT_TEMPERATURE)?;
        self.settle(timing.temperature_ms());

        let mut buf = [0u8; 2];
        self.read_exact(CONVERSION_RESULT, &mut buf)?;
        let temperature = to_unsigned16(buf[0], buf[1]) as i64;

        debug!("raw pressure {} raw temperature {}", pressure, temperature);

        Ok(RawMeasurement {
            pressure,
            temperature,
        })
    }

    fn command(&mut self, command: u8) -> Result<(), T::Error> {
        trace!("write {:#04x} to control register", command);
        self.transport
            .write_bytes(CONTROL_REGISTER, &[command])
            .map_err(Error::Io)
    }

    fn settle(&mut self, ms: u32) {
        trace!("waiting {} ms for conversion", ms);
        self.transport.sleep_ms(ms);
    }

    fn read_exact(&mut self, register: u8, buf: &mut [u8]) -> Result<(), T::Error> {
        let actual = self
            .transport
            .read_bytes(register, buf)
            .map_err(Error::Io)?;

        if actual != buf.len() {
            warn!(
                "register {:#04x} returned {} of {} bytes",
                register,
                actual,
                buf.len()
            );
            return Err(Error::ShortRead {
                register,
                expected: buf.len(),
                actual,
            });
        }

        Ok(())
    }
}

/// A sensor that can be shared between threads. Each `read` holds the sensor for the
/// whole conversion sequence, so concurrent callers never interleave bus commands.
pub struct SharedBmp085<T> {
    inner: Arc<Mutex<Bmp085<T>>>,
}

impl<T> Clone for SharedBmp085<T> {
    fn clone(&self) -> Self {
        SharedBmp085 {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Transport> SharedBmp085<T> {
    pub fn new(sensor: Bmp085<T>) -> Self {
        SharedBmp085 {
            inner: Arc::new(Mutex::new(sensor)),
        }
    }

    pub fn read(&self) -> Result<Reading, T::Error> {
        self.lock().read()
    }

    pub fn scan(&self) -> Result<Vec<u16>, T::Error> {
        self.lock().scan()
    }

    pub fn calibration(&self) -> Option<Calibration> {
        self.lock().calibration().copied()
    }

    // A panic mid-sequence cannot leave a partial calibration behind, so the guard is
    // still usable after poisoning.
    fn lock(&self) -> MutexGuard<'_, Bmp085<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
