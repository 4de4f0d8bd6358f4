//! Bus construction for instruments controlled via TCP/IP.
//!
//! Provides a blocking implementation on top of [`std::net::TcpStream`], for instruments
//! that expose their command protocol on a raw socket.

use std::{
    net::{TcpStream, ToSocketAddrs},
    time::Duration,
};

use crate::{Instrument, InstrumentError};

/// Constructor for a blocking TCP/IP bus using [`std::net::TcpStream`].
#[derive(Debug)]
pub struct TcpIpInterface {}

impl TcpIpInterface {
    /// Try to connect to an instrument over TCP/IP.
    ///
    /// The given timeout is installed as both the read and write timeout of the stream.
    /// Instrument communication must never block indefinitely, so a timeout is required
    /// here rather than optional. The terminator defaults to `"\n"` and can be changed
    /// with [`set_terminator`](crate::InstrumentBus::set_terminator).
    ///
    /// # Arguments
    /// * `sock_addr` - Socket address of the instrument, e.g., `"192.168.10.1:5025"`.
    /// * `timeout` - Read and write timeout for the stream.
    pub fn try_new<A: ToSocketAddrs>(
        sock_addr: A,
        timeout: Duration,
    ) -> Result<Instrument<TcpStream>, InstrumentError> {
        let stream = TcpStream::connect(sock_addr)?;
        stream.set_write_timeout(Some(timeout))?;
        stream.set_read_timeout(Some(timeout))?;
        Ok(Instrument::new(stream, timeout))
    }
}
