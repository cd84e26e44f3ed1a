use ina219_monitor::address::Address;
use ina219_monitor::configuration::{MeasuredSignals, Mode};
use ina219_monitor::SyncMonitor;
use linux_embedded_hal::I2cdev;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let device = I2cdev::new("/dev/i2c-1")?;
    let mut ina = SyncMonitor::new(device, Address::default())?;

    // Only measure if we kindly ask, writing the mode starts the first conversion
    let mode = Mode::Triggered(MeasuredSignals::ShuntAndBusVoltage);
    ina.set_mode(mode)?;

    let conversion_time = ina.configuration()?.conversion_time().unwrap_or_default();

    for _ in 0..3 {
        std::thread::sleep(conversion_time);
        println!("Ready: {}", ina.conversion_ready()?);
        println!("Bus: {:.3} V, Current: {:.1} mA", ina.bus_voltage()?, ina.current()?);

        // Reading the power register clears the ready flag, writing the mode triggers again
        println!("Power: {:.3} W", ina.power()?);
        ina.set_mode(mode)?;
    }

    Ok(())
}
