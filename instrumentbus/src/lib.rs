//! InstrumentBus: a thin message-based bus layer for laboratory instruments.
//!
//! Many laboratory instruments speak a line-based text protocol: the host sends a command
//! string terminated by a line terminator, and for queries the instrument answers with a
//! single terminated line. This crate provides the [`InstrumentBus`] trait that captures
//! exactly this request/response contract, together with implementations for the common
//! ways such instruments are attached to a host:
//!
//! - [`Instrument`] - a generic wrapper around anything that implements [`std::io::Read`]
//!   and [`std::io::Write`].
//! - [`SerialInterface`] - shortcut constructors for serial ports using the [`serialport`]
//!   crate (feature `serial`).
//! - [`TcpIpInterface`] - shortcut constructor for instruments reachable over a raw TCP
//!   socket via [`std::net::TcpStream`].
//! - [`LoopbackBus`] - a scripted in-memory bus for writing driver tests without hardware.
//!
//! Everything is strictly synchronous and blocking. A command and its response are
//! positionally correlated; there is no multiplexing, buffering, or retry logic. The
//! underlying port is released when the bus value is dropped.
//!
//! Outbound commands and inbound response lines are logged at debug level through the
//! [`log`] facade. The crate never installs a logger itself.

#![warn(missing_docs)]

mod instrument;
mod loopback;
#[cfg(feature = "serial")]
mod serial;
mod tcp_ip;

pub use instrument::Instrument;
pub use loopback::LoopbackBus;
#[cfg(feature = "serial")]
pub use serial::SerialInterface;
pub use tcp_ip::TcpIpInterface;

use std::time::{Duration, Instant};

use thiserror::Error;

/// The error enum for all instrument buses.
///
/// Drivers built on top of an [`InstrumentBus`] should return this error from every
/// operation that talks to the instrument, so that transport failures and parse failures
/// propagate uniformly with the `?` operator.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InstrumentError {
    /// Error when reading from/writing to an interface. See [`std::io::Error`] for more
    /// details.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Instrument response could not be parsed because it was unexpected by the driver.
    /// This error contains the response that was received from the instrument.
    #[error("Response from instrument could not be parsed. Response was: {0}")]
    ResponseParseError(String),
    #[cfg(feature = "serial")]
    /// Serial port errors can occur when opening a serial interface. See the
    /// [`serialport::Error`] documentation for more information.
    #[error(transparent)]
    Serialport(#[from] serialport::Error),
    /// Timeout occured while waiting for a response from the instrument. The error
    /// contains the timeout that was exceeded.
    #[error(
        "Timeout occured while waiting for a response from the instrument. Timeout was set to {0:?}."
    )]
    Timeout(Duration),
    /// Timeout occured while waiting for a response to a query. The error contains the
    /// query that was sent and the timeout that was exceeded.
    #[error(
        "Timeout occured while waiting for a response to query: {query}. Timeout was set to {timeout:?}."
    )]
    TimeoutQuery {
        /// The query that timed out.
        query: String,
        /// The timeout that was set.
        timeout: Duration,
    },
}

/// The `InstrumentBus` trait defines the message-based interface to an instrument.
///
/// Implementors only need to provide the raw byte primitives [`InstrumentBus::write_raw`]
/// and [`InstrumentBus::read_exact`]; the line-oriented `sendcmd`, `query`, and
/// `read_until_terminator` operations are built on top of them. The terminator defaults
/// to `"\n"` and the read timeout to three seconds, both of which can be overridden by
/// the implementor.
pub trait InstrumentBus {
    /// Write raw bytes to the instrument and flush the port.
    ///
    /// # Arguments
    /// * `data` - The bytes to write, including any terminator.
    fn write_raw(&mut self, data: &[u8]) -> Result<(), InstrumentError>;

    /// Read exactly `buf.len()` bytes from the instrument into `buf`, blocking until they
    /// are available or the underlying port gives up.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), InstrumentError>;

    /// Get the current line terminator.
    fn get_terminator(&self) -> &str {
        "\n"
    }

    /// Set the line terminator of the interface from a `&str`.
    ///
    /// # Arguments
    /// * `_terminator` - A string slice that is appended to every command and marks the
    ///   end of every response line.
    fn set_terminator(&mut self, _terminator: &str) {}

    /// Get the read timeout of the interface.
    fn get_timeout(&self) -> Duration {
        Duration::from_secs(3)
    }

    /// Send a command to the instrument, no response expected.
    ///
    /// The terminator is appended to the command before it is written out.
    ///
    /// # Arguments
    /// * `cmd` - The command to send to the instrument.
    fn sendcmd(&mut self, cmd: &str) -> Result<(), InstrumentError> {
        log::debug!("send: {cmd}");
        let full_cmd = format!("{}{}", cmd, self.get_terminator());
        self.write_raw(full_cmd.as_bytes())
    }

    /// Read one response line from the instrument, blocking until the terminator arrives.
    ///
    /// Bytes are read one at a time until the accumulated response ends with the
    /// terminator. If the terminator does not arrive within the timeout, a
    /// [`InstrumentError::Timeout`] is returned. Non-UTF-8 bytes are skipped with a
    /// warning. The returned line is trimmed of surrounding whitespace.
    fn read_until_terminator(&mut self) -> Result<String, InstrumentError> {
        let timeout = self.get_timeout();
        let mut response = String::new();
        let mut single_buf = [0u8];

        let tic = Instant::now();
        while tic.elapsed() < timeout {
            self.read_exact(&mut single_buf)?;
            if let Ok(val) = str::from_utf8(&single_buf) {
                response.push_str(val);
            } else {
                log::warn!("skipping non-UTF-8 byte from instrument: {single_buf:?}");
            }
            if response.ends_with(self.get_terminator()) {
                let line = response.trim().to_string();
                log::debug!("recv: {line}");
                return Ok(line);
            }
        }

        Err(InstrumentError::Timeout(timeout))
    }

    /// Query the instrument with a command and return the response line as a String.
    ///
    /// This sends the command with [`InstrumentBus::sendcmd`] and then blocks on
    /// [`InstrumentBus::read_until_terminator`]. A timeout while waiting for the response
    /// is reported as [`InstrumentError::TimeoutQuery`] with the offending command.
    ///
    /// # Arguments
    /// * `cmd` - The command to send to the instrument for which we expect a response.
    fn query(&mut self, cmd: &str) -> Result<String, InstrumentError> {
        self.sendcmd(cmd)?;
        match self.read_until_terminator() {
            Err(InstrumentError::Timeout(timeout)) => Err(InstrumentError::TimeoutQuery {
                query: cmd.to_string(),
                timeout,
            }),
            other => other,
        }
    }
}
