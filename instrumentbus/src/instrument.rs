//! Generic bus implementation for any byte port.
//!
//! [`Instrument`] can be built from any type that implements [`std::io::Read`] and
//! [`std::io::Write`], such as [`std::net::TcpStream`] or a boxed
//! [`serialport::SerialPort`](https://docs.rs/serialport).

use std::time::Duration;

use crate::{InstrumentBus, InstrumentError};

/// An instrument bus over any port that implements [`std::io::Read`] and
/// [`std::io::Write`].
///
/// Shortcut constructors for common ports are provided by
/// [`SerialInterface`](crate::SerialInterface) and [`TcpIpInterface`](crate::TcpIpInterface),
/// but any other port type can be wrapped directly.
///
/// # Example
///
/// ```no_run
/// use std::{net::TcpStream, time::Duration};
///
/// use instrumentbus::Instrument;
///
/// let port = TcpStream::connect("192.168.10.1:5025").unwrap();
/// let bus = Instrument::new(port, Duration::from_secs(3));
/// ```
pub struct Instrument<P: std::io::Read + std::io::Write> {
    port: P,
    terminator: String,
    timeout: Duration,
}

impl<P: std::io::Read + std::io::Write> Instrument<P> {
    /// Create a new [`Instrument`] bus from a given port.
    ///
    /// The terminator defaults to `"\n"` and can be changed with
    /// [`InstrumentBus::set_terminator`].
    ///
    /// # Arguments
    /// * `port` - The underlying byte port.
    /// * `timeout` - The read timeout for response lines.
    pub fn new(port: P, timeout: Duration) -> Self {
        Self {
            port,
            terminator: "\n".to_string(),
            timeout,
        }
    }
}

impl<P: std::io::Read + std::io::Write> InstrumentBus for Instrument<P> {
    fn write_raw(&mut self, data: &[u8]) -> Result<(), InstrumentError> {
        self.port.write_all(data)?;
        self.port.flush()?;
        Ok(())
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), InstrumentError> {
        self.port.read_exact(buf)?;
        Ok(())
    }

    fn get_terminator(&self) -> &str {
        self.terminator.as_str()
    }

    fn set_terminator(&mut self, terminator: &str) {
        self.terminator = terminator.to_string();
    }

    fn get_timeout(&self) -> Duration {
        self.timeout
    }
}
