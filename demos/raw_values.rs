use ina219_monitor::address::Address;
use ina219_monitor::register::Register;
use ina219_monitor::SyncMonitor;
use linux_embedded_hal::I2cdev;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let device = I2cdev::new("/dev/i2c-1")?;
    let mut ina = SyncMonitor::new(device, Address::default())?;

    println!("Shunt voltage: {} (10µV)", ina.raw_shunt_voltage()?);
    println!("Bus voltage:   {} (4mV)", ina.raw_bus_voltage()?);
    println!("Current:       {} (LSB)", ina.raw_current()?);
    println!("Power:         {} (LSB)", ina.raw_power()?);

    let registers = ina.registers();
    for register in [
        Register::Configuration,
        Register::ShuntVoltage,
        Register::BusVoltage,
        Register::Power,
        Register::Current,
        Register::Calibration,
    ] {
        println!("{register:?}: {:#06x}", registers.read_raw(register)?);
    }

    Ok(())
}
