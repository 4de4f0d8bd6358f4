use std::time::Duration;

use instrumentbus::TcpIpInterface;
use keithley_2600::Keithley2600;
use measurements::Current;

fn main() {
    // Raw socket of the instrument's LAN interface.
    let addr = "192.168.10.20:5025";

    let interface =
        TcpIpInterface::try_new(addr, Duration::from_secs(3)).expect("Failed to connect");

    // Opening the driver resets the instrument and applies the default setup.
    let mut smu = Keithley2600::try_new(interface).unwrap();
    println!("Instrument ID: {}", smu.get_name().unwrap());

    // Source 1 mA.
    smu.set_current_level(Current::from_amperes(1e-3)).unwrap();

    // Output off, reset, and release the bus.
    smu.close().unwrap();
}
