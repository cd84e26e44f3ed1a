use ina219_monitor::address::Address;
use ina219_monitor::calibration::Calibration;
use ina219_monitor::configuration::{BusVoltageRange, Gain};
use ina219_monitor::SyncMonitor;
use linux_embedded_hal::I2cdev;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    // 1mA per bit over a 10 mOhm shunt, good for up to about 32A
    let calib = Calibration::from_shunt(1_000, 10_000).ok_or("Calibration out of range")?;

    let device = I2cdev::new("/dev/i2c-1")?;
    let mut ina = SyncMonitor::new(device, Address::default())?;

    ina.calibrate(calib)?;
    ina.set_bus_voltage_range(BusVoltageRange::Fsr16v)?;
    ina.set_gain(Gain::Div8)?;

    while !ina.conversion_ready()? {
        std::thread::yield_now();
    }

    println!("{:#?}", ina.calibration_state());
    println!("Current: {:.1} mA", ina.current()?);
    println!("Power:   {:.3} W", ina.power()?);

    if ina.overflow()? {
        println!("The current or power calculation overflowed, values are not reliable");
    }

    Ok(())
}
