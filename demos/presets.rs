use ina219_monitor::address::Address;
use ina219_monitor::calibration::Preset;
use ina219_monitor::SyncMonitor;
use linux_embedded_hal::I2cdev;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let device = I2cdev::new("/dev/i2c-1")?;
    let mut ina = SyncMonitor::new(device, Address::default())?;

    for preset in [Preset::Range32V2A, Preset::Range32V1A, Preset::Range16V400mA] {
        ina.apply_preset(preset)?;

        let conversion_time = ina.configuration()?.conversion_time().unwrap_or_default();
        std::thread::sleep(conversion_time);

        println!("{preset:?} (calibration {})", ina.calibration());
        println!("  Bus:     {:.3} V", ina.bus_voltage()?);
        println!("  Current: {:.2} mA", ina.current()?);
        println!("  Power:   {:.4} W", ina.power()?);
    }

    Ok(())
}
