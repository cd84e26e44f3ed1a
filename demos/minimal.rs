use ina219_monitor::address::Address;
use ina219_monitor::SyncMonitor;
use linux_embedded_hal::I2cdev;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let device = I2cdev::new("/dev/i2c-1")?;
    let mut ina = SyncMonitor::new(device, Address::from_byte(0x40)?)?;

    // Wait until a result is ready
    if let Some(conversion_time) = ina.configuration()?.conversion_time() {
        std::thread::sleep(conversion_time);
    }

    println!("Bus Voltage:   {:.3} V", ina.bus_voltage()?);
    println!("Shunt Voltage: {:.5} V", ina.shunt_voltage()?);
    println!("Current:       {:.1} mA", ina.current()?);
    println!("Power:         {:.3} W", ina.power()?);

    Ok(())
}
