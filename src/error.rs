use std::fmt;

/// Wrapper type for results. `E` is the error type of the underlying transport.
pub type Result<T, E> = std::result::Result<T, Error<E>>;

/// Errors that all functions could return. Bus failures carry the transport's own error.
#[derive(Debug)]
pub enum Error<E> {
    /// The bus could not be opened.
    Open(E),
    /// A register write or read failed on the bus.
    Io(E),
    /// The transport delivered fewer bytes than were requested.
    ShortRead {
        register: u8,
        expected: usize,
        actual: usize,
    },
    /// Oversampling mode outside of 0-3.
    InvalidMode(u8),
    /// The calibration coefficients produced a zero divisor.
    Compensation,
}

impl<E: fmt::Display> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Open(ref e) => write!(f, "failed to open bus: {}", e),
            Error::Io(ref e) => write!(f, "bus transfer failed: {}", e),
            Error::ShortRead {
                register,
                expected,
                actual,
            } => write!(
                f,
                "short read from register {:#04x}: expected {} bytes, got {}",
                register, expected, actual
            ),
            Error::InvalidMode(mode) => write!(f, "invalid oversampling mode {}", mode),
            Error::Compensation => write!(f, "calibration data yields a zero divisor"),
        }
    }
}

impl<E> std::error::Error for Error<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            Error::Open(ref e) | Error::Io(ref e) => Some(e),
            _ => None,
        }
    }
}
