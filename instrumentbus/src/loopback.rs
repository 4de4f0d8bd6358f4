//! Scripted loopback bus for testing instrument drivers without hardware.
//!
//! The [`LoopbackBus`] plays the role of the instrument: it checks every command the
//! driver sends against a scripted list of expected commands and answers queries with
//! canned response lines, both consumed strictly in order.

use std::collections::VecDeque;

use crate::{InstrumentBus, InstrumentError};

/// A scripted in-memory bus that allows you to simply write tests for your driver.
///
/// Provide the commands you expect the driver to send (`from_host`) and the response
/// lines the instrument would answer with (`from_inst`). Both lists are consumed in
/// order: an unexpected command panics immediately, and when the [`LoopbackBus`] is
/// dropped it panics if any scripted command or response was left unused. This way a
/// test verifies the complete bus traffic of the code under test.
///
/// # Example
///
/// A minimal driver that queries the identification string of its instrument, tested
/// against the loopback bus:
///
/// ```
/// use instrumentbus::{InstrumentBus, InstrumentError, LoopbackBus};
///
/// struct MyDriver<T: InstrumentBus> {
///     bus: T,
/// }
///
/// impl<T: InstrumentBus> MyDriver<T> {
///     fn get_name(&mut self) -> Result<String, InstrumentError> {
///         self.bus.query("*IDN?")
///     }
/// }
///
/// let host2inst = vec!["*IDN?".to_string()];
/// let inst2host = vec!["MyInstrument,1.0,1234".to_string()];
/// let bus = LoopbackBus::new(host2inst, inst2host, "\n");
///
/// let mut driver = MyDriver { bus };
/// assert_eq!("MyInstrument,1.0,1234", driver.get_name().unwrap());
/// // Dropping the driver here checks that no scripted traffic was left over.
/// ```
pub struct LoopbackBus {
    from_host: VecDeque<String>,
    from_inst: VecDeque<String>,
    pending_bytes: VecDeque<u8>,
    terminator_exp: String,
    terminator: String,
}

impl LoopbackBus {
    /// Create a new loopback bus with the given scripted traffic.
    ///
    /// # Arguments
    /// * `from_host` - Commands expected from host to instrument, in order.
    /// * `from_inst` - Response lines from instrument to host, in order.
    /// * `terminator_exp` - The terminator the driver under test is expected to use.
    pub fn new(from_host: Vec<String>, from_inst: Vec<String>, terminator_exp: &str) -> Self {
        LoopbackBus {
            from_host: from_host.into(),
            from_inst: from_inst.into(),
            pending_bytes: VecDeque::new(),
            terminator_exp: terminator_exp.to_string(),
            terminator: "\n".to_string(), // default terminator, as for hardware buses
        }
    }

    /// Panic if any scripted commands or responses are left unused.
    ///
    /// This is automatically called when the [`LoopbackBus`] is dropped, but can also be
    /// called manually at the end of a test.
    pub fn finalize(&mut self) {
        if let Some(cmd) = self.from_host.pop_front() {
            panic!("Leftover expected commands found from host to instrument: {cmd}");
        }
        if let Some(resp) = self.from_inst.pop_front() {
            panic!("Leftover expected commands found from instrument to host: {resp}");
        }
    }

    /// Assert that the driver under test has set the expected terminator.
    ///
    /// The correct terminator is either the default one or the one the driver installed
    /// via [`InstrumentBus::set_terminator`].
    pub fn test_terminator(&self, expected_terminator: &str) {
        assert_eq!(
            expected_terminator, self.terminator,
            "Expected terminator '{expected_terminator}', got '{}'",
            self.terminator
        );
    }

    /// Read one byte of the current response line, refilling from the next scripted
    /// response when the current one is exhausted.
    ///
    /// Panics when no scripted response is left. As this is a test interface, the panic
    /// is the correct way to fail the test.
    fn read_one_byte(&mut self) -> u8 {
        if let Some(byte) = self.pending_bytes.pop_front() {
            return byte;
        }
        let next_resp = self
            .from_inst
            .pop_front()
            .expect("No more commands were expected from instrument to host.");
        self.pending_bytes = format!("{next_resp}{}", self.terminator_exp)
            .into_bytes()
            .into();
        self.pending_bytes
            .pop_front()
            .expect("Scripted response plus terminator should never be empty")
    }
}

impl InstrumentBus for LoopbackBus {
    fn write_raw(&mut self, data: &[u8]) -> Result<(), InstrumentError> {
        let exp = self
            .from_host
            .pop_front()
            .expect("No more commands were expected from host to instrument.");
        let exp = format!("{exp}{}", self.terminator_exp);
        assert_eq!(
            exp.as_bytes(),
            data,
            "Expected command '{exp}', got '{:?}'",
            str::from_utf8(data)
        );
        Ok(())
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), InstrumentError> {
        for byte in buf.iter_mut() {
            *byte = self.read_one_byte();
        }
        Ok(())
    }

    fn get_terminator(&self) -> &str {
        self.terminator.as_str()
    }

    fn set_terminator(&mut self, terminator: &str) {
        self.terminator = terminator.to_string();
    }
}

impl Drop for LoopbackBus {
    fn drop(&mut self) {
        // Skip the leftover check while already panicking, a double panic would abort the
        // test process instead of failing the test.
        if !std::thread::panicking() {
            self.finalize();
        }
    }
}
