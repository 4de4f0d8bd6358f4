//! A rust driver for the Keithley 2600 series source-measure unit.
//!
//! The driver exposes the TSP command set of the instrument's `smua` channel as typed
//! accessors: sourcing levels, limits, measurement ranges, autorange flags, the
//! integration aperture, and one-shot resistance, power, and paired current/voltage
//! measurements. Every accessor is one blocking round trip on the bus; no state is
//! cached on the host side.
//!
//! The interface is suitable for making a single measurement per command. Multi-point
//! buffered acquisition and triggering are out of scope for this driver.
//!
//! # Example
//!
//! This example shows the usage via the serial interface.
//! ```no_run
//! use keithley_2600::{Keithley2600, SerialInterfaceKeithley2600};
//! use measurements::Current;
//!
//! // The port where the Keithley 2600 is connected to
//! let port = "/dev/ttyUSB0";
//!
//! // Get the serial interface for the Keithley 2600 and open it. This interface already
//! // sets the correct baud rate, data bits, parity, and stop bits for the instrument.
//! let serial_inst = SerialInterfaceKeithley2600::simple(port).expect("Failed to open serial port");
//!
//! // Opening the driver resets the instrument and applies the default setup.
//! let mut smu = Keithley2600::try_new(serial_inst).unwrap();
//!
//! // Query the identification string of the instrument
//! println!("{}", smu.get_name().unwrap());
//!
//! // Source 1 mA and read back a resistance
//! smu.setup_resistance_measurement().unwrap();
//! smu.set_output(true).unwrap();
//! println!("Resistance: {}", smu.measure_resistance().unwrap());
//!
//! // Force the output off and reset before releasing the bus.
//! smu.close().unwrap();
//! ```

#![warn(missing_docs)]

mod interface;

pub use interface::SerialInterfaceKeithley2600;

use std::{
    fmt::Display,
    sync::{Arc, Mutex},
    thread,
    time::Duration,
};

use instrumentbus::{InstrumentBus, InstrumentError};
use measurements::{Current, Power, Resistance, Voltage};

/// Default settle delay between triggering a paired measurement and reading it back.
const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Source function of the SMU channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFunction {
    /// DC current source.
    Current,
    /// DC voltage source.
    Voltage,
}

impl SourceFunction {
    /// Convert the source function to the numeric token the instrument expects.
    pub(crate) fn as_cmd_str(&self) -> &str {
        match self {
            SourceFunction::Current => "0",
            SourceFunction::Voltage => "1",
        }
    }

    /// Convert a numeric response from the instrument to a `SourceFunction`.
    pub(crate) fn from_response(resp: &str) -> Result<Self, InstrumentError> {
        match parse_f64(resp)? as i64 {
            0 => Ok(SourceFunction::Current),
            1 => Ok(SourceFunction::Voltage),
            _ => Err(InstrumentError::ResponseParseError(resp.to_string())),
        }
    }
}

impl Display for SourceFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceFunction::Current => write!(f, "Current"),
            SourceFunction::Voltage => write!(f, "Voltage"),
        }
    }
}

/// A rust driver for the Keithley 2600 source-measure unit.
///
/// Creating the driver resets the instrument and applies a known default setup (voltage
/// source at 0 V, both autoranges on, output off). On teardown, call
/// [`Keithley2600::close`] to force the output off and reset the instrument before the
/// bus is released; this is the supported way to leave the hardware in a safe state.
///
/// See the top-level documentation for an example on how to use this driver.
pub struct Keithley2600<T: InstrumentBus> {
    interface: Arc<Mutex<T>>,
    settle_delay: Duration,
}

impl<T: InstrumentBus> Keithley2600<T> {
    /// Create a new Keithley2600 instance with the given instrument bus.
    ///
    /// The instrument is reset and brought into the default setup, see
    /// [`Keithley2600::default_setup`]. The settle delay for paired measurements starts
    /// out at 100 ms and can be changed with [`Keithley2600::set_settle_delay`].
    ///
    /// # Arguments
    /// * `interface` - An instrument bus that implements the [`InstrumentBus`] trait.
    pub fn try_new(interface: T) -> Result<Self, InstrumentError> {
        let interface = Arc::new(Mutex::new(interface));
        let mut instrument = Keithley2600 {
            interface,
            settle_delay: DEFAULT_SETTLE_DELAY,
        };
        instrument.reset()?;
        instrument.default_setup()?;
        Ok(instrument)
    }

    /// Get the settle delay used by [`Keithley2600::measure_iv`].
    ///
    /// This is host-side configuration, no bus traffic is involved.
    pub fn get_settle_delay(&self) -> Duration {
        self.settle_delay
    }

    /// Set the settle delay used by [`Keithley2600::measure_iv`].
    pub fn set_settle_delay(&mut self, delay: Duration) {
        self.settle_delay = delay;
    }

    /// Query the identification string of the instrument.
    ///
    /// Returns the manufacturer, model, serial number, and firmware revision as a single
    /// free-text line.
    pub fn get_name(&mut self) -> Result<String, InstrumentError> {
        self.query("print(smua.idn())")
    }

    /// Reset the SMU channel to its default state.
    pub fn reset(&mut self) -> Result<(), InstrumentError> {
        self.sendcmd("smua.reset()")
    }

    /// Set the instrument to the default setup:
    ///
    /// - DC voltage source, 0 V
    /// - autorange current
    /// - autorange voltage
    /// - output off
    pub fn default_setup(&mut self) -> Result<(), InstrumentError> {
        self.set_source_function(SourceFunction::Voltage)?;
        self.set_voltage_level(Voltage::from_volts(0.0))?;
        self.set_autorange_current(true)?;
        self.set_autorange_voltage(true)?;
        self.set_output(false)
    }

    /// Set up the instrument for resistance measurements:
    ///
    /// - DC current source, 1 mA
    /// - autorange voltage
    /// - NPLC = 5
    /// - measure delay = 0.1 s
    /// - voltage range = 20 V
    /// - current range = 1 mA
    ///
    /// One reading is taken into the internal buffer and discarded before the
    /// configuration is applied.
    pub fn setup_resistance_measurement(&mut self) -> Result<(), InstrumentError> {
        self.sendcmd("smua.measure.r(smua.nvbuffer1)")?;
        self.reset()?;
        self.set_source_function(SourceFunction::Current)?;
        self.set_current_level(Current::from_amperes(1e-3))?;
        self.set_autorange_voltage(true)?;
        self.set_nplc(5.0)?;
        self.set_measure_delay(0.1)?;
        self.set_voltage_range(Voltage::from_volts(20.0))?;
        self.set_current_range(Current::from_amperes(1e-3))
    }

    /// Set up the instrument for IV measurements:
    ///
    /// - DC voltage source, 0 V
    /// - autorange current
    /// - autorange voltage
    /// - the given current limit and integration aperture
    ///
    /// # Arguments
    /// * `current_limit` - Compliance limit for the current output.
    /// * `nplc` - Integration aperture in number of power line cycles.
    pub fn setup_iv_measurement(
        &mut self,
        current_limit: Current,
        nplc: f64,
    ) -> Result<(), InstrumentError> {
        self.reset()?;
        self.set_source_function(SourceFunction::Voltage)?;
        self.set_voltage_level(Voltage::from_volts(0.0))?;
        self.set_autorange_current(true)?;
        self.set_autorange_voltage(true)?;
        self.set_current_limit(current_limit)?;
        self.set_nplc(nplc)
    }

    /// Get a single resistance measurement.
    pub fn measure_resistance(&mut self) -> Result<Resistance, InstrumentError> {
        let resp = self.query("print(smua.measure.r())")?;
        Ok(Resistance::from_ohms(parse_f64(&resp)?))
    }

    /// Get a single power measurement.
    pub fn measure_power(&mut self) -> Result<Power, InstrumentError> {
        let resp = self.query("print(smua.measure.p())")?;
        Ok(Power::from_watts(parse_f64(&resp)?))
    }

    /// Get a single pair of current and voltage measurements.
    ///
    /// The paired reading is triggered on the instrument, then the driver sleeps for the
    /// configured settle delay before reading the result back as a comma-separated pair.
    pub fn measure_iv(&mut self) -> Result<(Current, Voltage), InstrumentError> {
        self.sendcmd("ireading, vreading = smua.measure.iv()")?;
        thread::sleep(self.settle_delay);
        let resp = self.query("printnumber(ireading,vreading)")?;
        let parts = split_check_resp(&resp, 2)?;
        let i = parse_f64(parts[0])?;
        let v = parse_f64(parts[1])?;
        Ok((Current::from_amperes(i), Voltage::from_volts(v)))
    }

    /// Get the source function of the SMU channel.
    pub fn get_source_function(&mut self) -> Result<SourceFunction, InstrumentError> {
        let resp = self.query("print(smua.source.func)")?;
        SourceFunction::from_response(&resp)
    }

    /// Set the source function of the SMU channel.
    pub fn set_source_function(&mut self, func: SourceFunction) -> Result<(), InstrumentError> {
        self.sendcmd(&format!("smua.source.func = {}", func.as_cmd_str()))
    }

    /// Get the integration aperture for measurements in number of power line cycles.
    ///
    /// This attribute controls the integration aperture for the analog-to-digital
    /// converter (ADC). The integration aperture is based on the number of power line
    /// cycles (NPLC), where 1 PLC for 60 Hz is 16.67 ms (1/60) and 1 PLC for 50 Hz is
    /// 20 ms (1/50).
    pub fn get_nplc(&mut self) -> Result<f64, InstrumentError> {
        let resp = self.query("print(smua.measure.nplc)")?;
        parse_f64(&resp)
    }

    /// Set the integration aperture for measurements in number of power line cycles.
    pub fn set_nplc(&mut self, nplc: f64) -> Result<(), InstrumentError> {
        self.sendcmd(&format!("smua.measure.nplc = {nplc}"))
    }

    /// Get the delay between triggering and taking a measurement, in seconds.
    ///
    /// A negative value means the instrument chooses the delay automatically.
    pub fn get_measure_delay(&mut self) -> Result<f64, InstrumentError> {
        let resp = self.query("print(smua.measure.delay)")?;
        parse_f64(&resp)
    }

    /// Set the delay between triggering and taking a measurement, in seconds.
    pub fn set_measure_delay(&mut self, delay: f64) -> Result<(), InstrumentError> {
        self.sendcmd(&format!("smua.measure.delay = {delay}"))
    }

    /// Get the current measurement range.
    pub fn get_current_range(&mut self) -> Result<Current, InstrumentError> {
        let resp = self.query("print(smua.measure.rangei)")?;
        Ok(Current::from_amperes(parse_f64(&resp)?))
    }

    /// Set the current measurement range.
    pub fn set_current_range(&mut self, range: Current) -> Result<(), InstrumentError> {
        self.sendcmd(&format!("smua.measure.rangei = {}", range.as_amperes()))
    }

    /// Get the voltage measurement range.
    pub fn get_voltage_range(&mut self) -> Result<Voltage, InstrumentError> {
        let resp = self.query("print(smua.measure.rangev)")?;
        Ok(Voltage::from_volts(parse_f64(&resp)?))
    }

    /// Set the voltage measurement range.
    pub fn set_voltage_range(&mut self, range: Voltage) -> Result<(), InstrumentError> {
        self.sendcmd(&format!("smua.measure.rangev = {}", range.as_volts()))
    }

    /// Get the autorange state of the current measurement.
    pub fn get_autorange_current(&mut self) -> Result<bool, InstrumentError> {
        let resp = self.query("print(smua.measure.autorangei)")?;
        parse_flag(&resp)
    }

    /// Set the autorange state of the current measurement.
    pub fn set_autorange_current(&mut self, autorange: bool) -> Result<(), InstrumentError> {
        self.sendcmd(&format!("smua.measure.autorangei = {}", autorange as u8))
    }

    /// Get the autorange state of the voltage measurement.
    pub fn get_autorange_voltage(&mut self) -> Result<bool, InstrumentError> {
        let resp = self.query("print(smua.measure.autorangev)")?;
        parse_flag(&resp)
    }

    /// Set the autorange state of the voltage measurement.
    pub fn set_autorange_voltage(&mut self, autorange: bool) -> Result<(), InstrumentError> {
        self.sendcmd(&format!("smua.measure.autorangev = {}", autorange as u8))
    }

    /// Get the voltage output level.
    pub fn get_voltage_level(&mut self) -> Result<Voltage, InstrumentError> {
        let resp = self.query("print(smua.source.levelv)")?;
        Ok(Voltage::from_volts(parse_f64(&resp)?))
    }

    /// Set the voltage output level.
    pub fn set_voltage_level(&mut self, level: Voltage) -> Result<(), InstrumentError> {
        self.sendcmd(&format!("smua.source.levelv = {}", level.as_volts()))
    }

    /// Get the current output level.
    pub fn get_current_level(&mut self) -> Result<Current, InstrumentError> {
        let resp = self.query("print(smua.source.leveli)")?;
        Ok(Current::from_amperes(parse_f64(&resp)?))
    }

    /// Set the current output level.
    pub fn set_current_level(&mut self, level: Current) -> Result<(), InstrumentError> {
        self.sendcmd(&format!("smua.source.leveli = {}", level.as_amperes()))
    }

    /// Get the compliance limit of the current output.
    pub fn get_current_limit(&mut self) -> Result<Current, InstrumentError> {
        let resp = self.query("print(smua.source.limiti)")?;
        Ok(Current::from_amperes(parse_f64(&resp)?))
    }

    /// Set the compliance limit of the current output.
    pub fn set_current_limit(&mut self, limit: Current) -> Result<(), InstrumentError> {
        self.sendcmd(&format!("smua.source.limiti = {}", limit.as_amperes()))
    }

    /// Get the compliance limit of the voltage output.
    pub fn get_voltage_limit(&mut self) -> Result<Voltage, InstrumentError> {
        let resp = self.query("print(smua.source.limitv)")?;
        Ok(Voltage::from_volts(parse_f64(&resp)?))
    }

    /// Set the compliance limit of the voltage output.
    pub fn set_voltage_limit(&mut self, limit: Voltage) -> Result<(), InstrumentError> {
        self.sendcmd(&format!("smua.source.limitv = {}", limit.as_volts()))
    }

    /// Get the current state of the output.
    ///
    /// Returns `true` if the output is switched on, otherwise `false`.
    pub fn get_output(&mut self) -> Result<bool, InstrumentError> {
        let resp = self.query("print(smua.source.output)")?;
        parse_flag(&resp)
    }

    /// Turn the output on or off.
    pub fn set_output(&mut self, enable: bool) -> Result<(), InstrumentError> {
        self.sendcmd(&format!("smua.source.output = {}", enable as u8))
    }

    /// Force the instrument into a safe state and release the bus.
    ///
    /// The output is switched off, then the channel is reset, in that order. The reset is
    /// issued even if switching the output off failed; the first error encountered is
    /// returned after both commands were attempted. The underlying bus handle is released
    /// when this method returns.
    pub fn close(mut self) -> Result<(), InstrumentError> {
        let output_off = self.set_output(false);
        let reset = self.reset();
        output_off.and(reset)
    }

    /// Send a command to the instrument.
    fn sendcmd(&mut self, cmd: &str) -> Result<(), InstrumentError> {
        let mut intf = self.interface.lock().expect("Mutex should not be poisoned");
        intf.sendcmd(cmd)
    }

    /// Query the instrument with a command and return the response as a String.
    fn query(&mut self, cmd: &str) -> Result<String, InstrumentError> {
        let mut intf = self.interface.lock().expect("Mutex should not be poisoned");
        intf.query(cmd)
    }
}

/// Parse a single numeric token from an instrument response.
fn parse_f64(resp: &str) -> Result<f64, InstrumentError> {
    resp.trim()
        .parse::<f64>()
        .map_err(|_| InstrumentError::ResponseParseError(resp.to_string()))
}

/// Parse a flag-like numeric response: any value that truncates to a nonzero integer
/// counts as `true`.
fn parse_flag(resp: &str) -> Result<bool, InstrumentError> {
    Ok(parse_f64(resp)? as i64 != 0)
}

/// Split a response into its comma-separated parts and check the expected length.
fn split_check_resp(resp: &str, exp_len: usize) -> Result<Vec<&str>, InstrumentError> {
    let parts = resp.split(',').collect::<Vec<&str>>();
    if parts.len() != exp_len {
        return Err(InstrumentError::ResponseParseError(resp.to_string()));
    }
    Ok(parts)
}
