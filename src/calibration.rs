use byteorder::{BigEndian, ByteOrder};

use crate::error::Error;

/// Number of bytes in the factory calibration block starting at `CALIBRATION_START`.
pub const CALIBRATION_LEN: usize = 22;

/// Combine a register pair into a signed value. Only the high byte is sign extended.
pub fn to_signed16(high: u8, low: u8) -> i16 {
    let mut high = high as i32;
    if high > 127 {
        high -= 256;
    }

    ((high << 8) + low as i32) as i16
}

/// Combine a register pair into an unsigned value.
pub fn to_unsigned16(high: u8, low: u8) -> u16 {
    BigEndian::read_u16(&[high, low])
}

/// Pressure oversampling setting. Higher settings trade conversion time for resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    UltraLowPower = 0,
    Standard = 1,
    HighResolution = 2,
    UltraHighResolution = 3,
}

impl Mode {
    /// The `oss` value used in the control command and the compensation shifts.
    pub fn oss(self) -> u8 {
        self as u8
    }

    /// Like `TryFrom<u8>`, but with the crate's error type.
    pub fn from_oss<E>(value: u8) -> crate::error::Result<Self, E> {
        Mode::try_from(value).map_err(Error::InvalidMode)
    }
}

impl TryFrom<u8> for Mode {
    type Error = u8;

    /// Rejected values are handed back unchanged.
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Mode::UltraLowPower),
            1 => Ok(Mode::Standard),
            2 => Ok(Mode::HighResolution),
            3 => Ok(Mode::UltraHighResolution),
            other => Err(other),
        }
    }
}

/// Calibration data for the BMP085. Read from the device once per session and never
/// changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calibration {
    pub ac1: i16,
    pub ac2: i16,
    pub ac3: i16,
    pub ac4: u16,
    pub ac5: u16,
    pub ac6: u16,
    pub b1: i16,
    pub b2: i16,
    pub mb: i16,
    pub mc: i16,
    pub md: i16,
    pub mode: Mode,
}

impl Calibration {
    /// Decode the raw calibration block, tagging it with the session's oversampling mode.
    pub fn from_bytes(data: &[u8; CALIBRATION_LEN], mode: Mode) -> Self {
        Calibration {
            ac1: to_signed16(data[0], data[1]),
            ac2: to_signed16(data[2], data[3]),
            ac3: to_signed16(data[4], data[5]),
            ac4: to_unsigned16(data[6], data[7]),
            ac5: to_unsigned16(data[8], data[9]),
            ac6: to_unsigned16(data[10], data[11]),
            b1: to_signed16(data[12], data[13]),
            b2: to_signed16(data[14], data[15]),
            mb: to_signed16(data[16], data[17]),
            mc: to_signed16(data[18], data[19]),
            md: to_signed16(data[20], data[21]),
            mode,
        }
    }
}
