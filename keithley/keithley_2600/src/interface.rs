//! Provide a serial interface for the Keithley 2600.

use std::time::Duration;

use instrumentbus::{Instrument, InstrumentError, SerialInterface};
use serialport::SerialPort;

/// A serial interface for the Keithley 2600.
///
/// Builds an `instrumentbus` serial bus with the port settings the Keithley 2600 series
/// uses out of the box.
#[derive(Debug)]
pub struct SerialInterfaceKeithley2600 {}

impl SerialInterfaceKeithley2600 {
    /// Try to create an instrument bus with a simple serial port configuration.
    ///
    /// This is analog to the `simple` method of the `SerialInterface` struct in
    /// `instrumentbus`, however, it sets the factory-default line settings of the
    /// Keithley 2600 series: 9600 baud, eight data bits, no parity, one stop bit. The
    /// default timeout is set to 3 seconds.
    ///
    /// Arguments:
    /// * `port` - The name of the serial port, e.g., `"/dev/ttyUSB0"` or `"COM3"`.
    pub fn simple(port: &str) -> Result<Instrument<Box<dyn SerialPort>>, InstrumentError> {
        let timeout = Duration::from_secs(3);
        let port = serialport::new(port, 9600)
            .timeout(timeout)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One);
        SerialInterface::full(port)
    }
}
