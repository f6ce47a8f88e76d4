use i2cdev::core::I2CDevice;
use i2cdev::linux::{LinuxI2CDevice, LinuxI2CError};
use log::trace;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

pub const DEFAULT_I2C_ADDRESS: u16 = 0x77;
pub const DEFAULT_I2C_BUS: u32 = 1;

/// Control register; conversion commands are written here.
pub const CONTROL_REGISTER: u8 = 0xF4;
/// First byte of the conversion result (MSB, LSB, XLSB).
pub const CONVERSION_RESULT: u8 = 0xF6;
pub const SELECT_TEMPERATURE: u8 = 0x2E;
pub const SELECT_PRESSURE: u8 = 0x34;
/// Start of the factory calibration block.
pub const CALIBRATION_START: u8 = 0xAA;

/// First and last 7-bit addresses probed by `scan`, skipping the reserved ranges.
const SCAN_FIRST: u16 = 0x03;
const SCAN_LAST: u16 = 0x77;

/// The register-level operations the sensor needs from a bus.
///
/// The sensor only ever talks to one device; implementations decide how that device is
/// addressed.
pub trait Transport {
    type Error: std::error::Error;

    /// List the addresses that answer on the bus.
    fn scan(&mut self) -> Result<Vec<u16>, Self::Error>;

    /// Write `payload` starting at `register`.
    fn write_bytes(&mut self, register: u8, payload: &[u8]) -> Result<(), Self::Error>;

    /// Read into `buf` starting at `register`, returning how many bytes were filled.
    fn read_bytes(&mut self, register: u8, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Block for at least `ms` milliseconds.
    fn sleep_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(ms as u64));
    }
}

/// A sensor on a Linux `/dev/i2c-N` character device.
pub struct LinuxI2CBus {
    path: PathBuf,
    device: LinuxI2CDevice,
}

impl LinuxI2CBus {
    /// Open bus `/dev/i2c-{bus}` and bind it to `address`.
    pub fn open(bus: u32, address: u16) -> Result<Self, LinuxI2CError> {
        let path = PathBuf::from(format!("/dev/i2c-{}", bus));
        let device = LinuxI2CDevice::new(&path, address)?;

        Ok(LinuxI2CBus { path, device })
    }
}

impl Transport for LinuxI2CBus {
    type Error = LinuxI2CError;

    fn scan(&mut self) -> Result<Vec<u16>, Self::Error> {
        let mut found = Vec::new();

        for address in SCAN_FIRST..=SCAN_LAST {
            // Addresses claimed by a kernel driver refuse the bind; they are skipped.
            let mut probe = match LinuxI2CDevice::new(&self.path, address) {
                Ok(probe) => probe,
                Err(_) => continue,
            };

            if probe.smbus_read_byte().is_ok() {
                found.push(address);
            }
        }

        trace!("scan of {} found {:02x?}", self.path.display(), found);

        Ok(found)
    }

    fn write_bytes(&mut self, register: u8, payload: &[u8]) -> Result<(), Self::Error> {
        let mut data = Vec::with_capacity(payload.len() + 1);
        data.push(register);
        data.extend_from_slice(payload);

        self.device.write(&data)
    }

    fn read_bytes(&mut self, register: u8, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.device.write(&[register])?;
        self.device.read(buf)?;

        Ok(buf.len())
    }
}
