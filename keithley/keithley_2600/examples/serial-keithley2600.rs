use keithley_2600::{Keithley2600, SerialInterfaceKeithley2600};
use measurements::Current;

fn main() {
    let port = "/dev/ttyUSB0";

    // Get our serial instrument bus
    let serial_inst = SerialInterfaceKeithley2600::simple(port).expect("Failed to open serial port");

    // Now we can open the Keithley 2600 with the serial bus.
    let mut smu = Keithley2600::try_new(serial_inst).unwrap();
    println!("Instrument ID: {}", smu.get_name().unwrap());

    // Set up for an IV measurement with a 100 uA compliance limit and read one pair.
    smu.setup_iv_measurement(Current::from_amperes(1e-4), 1.0)
        .unwrap();
    smu.set_output(true).unwrap();
    let (current, voltage) = smu.measure_iv().unwrap();
    println!("I = {current}, V = {voltage}");

    smu.close().unwrap();
}
