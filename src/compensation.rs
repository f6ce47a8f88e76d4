//! Fixed-point compensation from the BMP085 datasheet.
//!
//! Every intermediate is an `i64`: `b6 * b6`, the shifted `b3` term and `b7 * 2` all
//! overflow 32 bits for real calibration data. Right shifts on signed values are
//! arithmetic, and divisions truncate toward zero as in the reference C code.

use crate::calibration::Calibration;

/// Result of the temperature step. `b5` is needed again by the pressure step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Temperature {
    pub b5: i64,
    /// Temperature in 0.1 degrees Celsius.
    pub tenths_celsius: i64,
}

impl Temperature {
    pub fn celsius(&self) -> f64 {
        self.tenths_celsius as f64 / 10.0
    }
}

/// Compensate a raw temperature count. Returns `None` when `x1 + md` is zero.
pub fn compensate_temperature(ut: i64, cal: &Calibration) -> Option<Temperature> {
    let x1 = ((ut - cal.ac6 as i64) * cal.ac5 as i64) >> 15;
    let x2 = ((cal.mc as i64) << 11).checked_div(x1 + cal.md as i64)?;
    let b5 = x1 + x2;

    Some(Temperature {
        b5,
        tenths_celsius: (b5 + 8) >> 4,
    })
}

/// Compensate a raw pressure count into Pascals, given the `b5` of a temperature
/// conversion taken in the same sequence. Returns `None` when `b4` is zero.
pub fn compensate_pressure(up: i64, b5: i64, cal: &Calibration) -> Option<i64> {
    let oss = cal.mode.oss() as u32;

    let b6 = b5 - 4000;
    let x1 = ((cal.b2 as i64 * b6 * b6) >> 12) >> 11;
    let x2 = (cal.ac2 as i64 * b6) >> 11;
    let x3 = x1 + x2;
    let b3 = (((cal.ac1 as i64 * 4 + x3) << oss) + 2) / 4;

    let x1 = (cal.ac3 as i64 * b6) >> 13;
    let x2 = (cal.b1 as i64 * ((b6 * b6) >> 12)) >> 16;
    let x3 = (x1 + x2 + 2) >> 2;
    let b4 = (cal.ac4 as i64 * (x3 + 32768)) >> 15;
    let b7 = (up - b3) * (50000 >> oss);

    let p = if b7 < 0x8000_0000 {
        (b7 * 2).checked_div(b4)?
    } else {
        b7.checked_div(b4)? * 2
    };

    let x1 = (p >> 8) * (p >> 8);
    let x1 = (x1 * 3038) >> 16;
    let x2 = (-7357 * p) >> 16;

    Some(p + ((x1 + x2 + 3791) >> 4))
}
