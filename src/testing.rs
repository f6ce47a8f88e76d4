use crate::calibration::CALIBRATION_LEN;
use crate::transport::{
    Transport, CALIBRATION_START, CONTROL_REGISTER, CONVERSION_RESULT, SELECT_TEMPERATURE,
};
use std::io;
use std::sync::{Arc, Mutex};
use std::thread;

/// One operation seen by the fake bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Scan,
    Write(u8, Vec<u8>),
    Read(u8, usize),
    Sleep(u32),
}

/// An in-memory BMP085. The conversion result register holds whichever measurement
/// was last selected through the control register.
pub struct FakeBus {
    calibration: [u8; CALIBRATION_LEN],
    temperature: [u8; 2],
    pressure: [u8; 3],
    selected: Option<u8>,
    calls: Arc<Mutex<Vec<Call>>>,
    failure: Option<(Call, usize)>,
    short_register: Option<u8>,
}

impl FakeBus {
    pub fn new(
        calibration: [u8; CALIBRATION_LEN],
        temperature: [u8; 2],
        pressure: [u8; 3],
    ) -> Self {
        FakeBus {
            calibration,
            temperature,
            pressure,
            selected: None,
            calls: Arc::new(Mutex::new(Vec::new())),
            failure: None,
            short_register: None,
        }
    }

    /// Shared handle on the call log, usable after the bus has moved into a sensor.
    pub fn calls(&self) -> Arc<Mutex<Vec<Call>>> {
        Arc::clone(&self.calls)
    }

    /// Fail the next `times` occurrences of `call`.
    pub fn fail_next(&mut self, call: Call, times: usize) {
        self.failure = Some((call, times));
    }

    /// Deliver one byte less than requested from `register`.
    pub fn short_read(&mut self, register: u8) {
        self.short_register = Some(register);
    }

    fn record(&mut self, call: Call) -> io::Result<()> {
        self.calls.lock().unwrap().push(call.clone());

        if let Some((ref failing, ref mut remaining)) = self.failure {
            if *failing == call && *remaining > 0 {
                *remaining -= 1;
                return Err(io::Error::new(io::ErrorKind::Other, "injected failure"));
            }
        }

        Ok(())
    }
}

impl Transport for FakeBus {
    type Error = io::Error;

    fn scan(&mut self) -> io::Result<Vec<u16>> {
        self.record(Call::Scan)?;
        Ok(vec![0x77])
    }

    fn write_bytes(&mut self, register: u8, payload: &[u8]) -> io::Result<()> {
        self.record(Call::Write(register, payload.to_vec()))?;

        if register == CONTROL_REGISTER {
            self.selected = payload.first().copied();
        }

        Ok(())
    }

    fn read_bytes(&mut self, register: u8, buf: &mut [u8]) -> io::Result<usize> {
        self.record(Call::Read(register, buf.len()))?;

        let source: &[u8] = match register {
            CALIBRATION_START => &self.calibration,
            CONVERSION_RESULT if self.selected == Some(SELECT_TEMPERATURE) => &self.temperature,
            CONVERSION_RESULT if self.selected.is_some() => &self.pressure,
            _ => &[],
        };

        let mut n = source.len().min(buf.len());
        if self.short_register == Some(register) {
            n = n.min(buf.len().saturating_sub(1));
        }
        buf[..n].copy_from_slice(&source[..n]);

        Ok(n)
    }

    fn sleep_ms(&mut self, ms: u32) {
        self.calls.lock().unwrap().push(Call::Sleep(ms));
        thread::yield_now();
    }
}
