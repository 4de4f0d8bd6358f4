//! Bus construction for instruments controlled via a serial port.
//!
//! Provides blocking implementations on top of the [`serialport`] crate.

use std::time::Duration;

use serialport::{SerialPort, SerialPortBuilder};

use crate::{Instrument, InstrumentError};

/// Constructor for a blocking serial bus using the [`serialport`] crate.
#[derive(Debug)]
pub struct SerialInterface {}

impl SerialInterface {
    /// Try to open a serial bus with a simple port configuration.
    ///
    /// The port is opened with the `serialport` defaults (eight data bits, no parity, one
    /// stop bit) and a timeout of three seconds. Use [`SerialInterface::full`] if your
    /// instrument needs a different configuration.
    ///
    /// # Arguments
    /// * `port` - The name of the serial port, e.g., `"/dev/ttyUSB0"` or `"COM3"`.
    /// * `baud_rate` - The baud rate for the connection.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use instrumentbus::SerialInterface;
    ///
    /// let bus = SerialInterface::simple("/dev/ttyUSB0", 9600).unwrap();
    /// ```
    pub fn simple(
        port: &str,
        baud_rate: u32,
    ) -> Result<Instrument<Box<dyn SerialPort>>, InstrumentError> {
        let spb = serialport::new(port, baud_rate).timeout(Duration::from_secs(3));
        Self::full(spb)
    }

    /// Try to open a serial bus from a fully configured [`serialport::SerialPortBuilder`].
    ///
    /// The read timeout of the bus is taken over from the builder configuration.
    ///
    /// # Arguments
    /// * `spb` - A `SerialPortBuilder` with the port configuration for your instrument.
    pub fn full(spb: SerialPortBuilder) -> Result<Instrument<Box<dyn SerialPort>>, InstrumentError> {
        let port = spb.open()?;
        let timeout = port.timeout();
        Ok(Instrument::new(port, timeout))
    }
}
