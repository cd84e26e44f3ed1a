use ina219_monitor::address::Address;
use ina219_monitor::configuration::{AdcResolution, BusVoltageRange, Gain, MeasuredSignals, Mode};
use ina219_monitor::SyncMonitor;
use linux_embedded_hal::I2cdev;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let device = I2cdev::new("/dev/i2c-1")?;
    let mut ina = SyncMonitor::new(device, Address::from_byte(0x40)?)?;

    // Be extra precise, but take some extra time
    ina.set_bus_adc_resolution(AdcResolution::Avg128)?;
    ina.set_shunt_adc_resolution(AdcResolution::Avg128)?;

    // We only care about low voltage bus and shunt, values larger are truncated to the max
    ina.set_bus_voltage_range(BusVoltageRange::Fsr16v)?;
    ina.set_gain(Gain::Div1)?;

    // Measure both signals continuously (default)
    ina.set_mode(Mode::Continuous(MeasuredSignals::ShuntAndBusVoltage))?;

    let configuration = ina.configuration()?;
    println!("{configuration:#?}");

    // Wait for the measurement to be done
    std::thread::sleep(configuration.conversion_time().unwrap_or_default());

    println!("Bus:   {:.2}  V", ina.bus_voltage()?);
    println!("Shunt: {:.2} mV", ina.shunt_voltage()? * 1000.0);

    Ok(())
}
