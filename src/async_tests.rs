use crate::address::Address;
use crate::configuration::Gain;
use crate::register::Register;
use crate::{AsyncMonitor, AsyncRegisterMap};
use embassy_futures::block_on;
use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction};

const DEV_ADDR: u8 = 0x40;
const CONFIG_RESET: u16 = 0x399F;

fn read_reg(reg: Register, value: u16) -> Transaction {
    Transaction::write_read(DEV_ADDR, vec![reg as u8], value.to_be_bytes().to_vec())
}

fn write_reg(reg: Register, value: u16) -> Transaction {
    let [msb, lsb] = value.to_be_bytes();
    Transaction::write(DEV_ADDR, vec![reg as u8, msb, lsb])
}

#[test]
fn monitor_initialization_and_readings() {
    let mut transactions = vec![write_reg(Register::Calibration, 12412)];
    for _ in 0..5 {
        transactions.push(read_reg(Register::Configuration, CONFIG_RESET));
        transactions.push(write_reg(Register::Configuration, CONFIG_RESET));
    }
    transactions.extend([
        read_reg(Register::BusVoltage, 0x0258 << 3),
        write_reg(Register::Calibration, 12412),
        read_reg(Register::Current, 0x00C8),
        read_reg(Register::Power, 40),
    ]);
    let mock = I2cMock::new(&transactions);

    let mut ina = block_on(AsyncMonitor::new(mock, Address::default())).unwrap();
    assert_eq!(ina.calibration(), 12412);

    let volts = block_on(ina.bus_voltage()).unwrap();
    assert!((volts - 2.4).abs() < 1e-9);

    let milli_amps = block_on(ina.current()).unwrap();
    assert!((milli_amps - 20.0).abs() < 1e-9);

    assert_eq!(block_on(ina.raw_power()).unwrap(), 40);

    ina.destroy().done();
}

#[test]
fn register_map_masks_field_writes() {
    let mock = I2cMock::new(&[
        read_reg(Register::Configuration, CONFIG_RESET),
        write_reg(Register::Configuration, 0x299F),
        read_reg(Register::Configuration, 0x299F),
    ]);
    let mut map = AsyncRegisterMap::new(mock, Address::default());

    block_on(map.write_bits(Register::Configuration, 2, 11, 5)).unwrap();
    let gain = block_on(map.read_bits(Register::Configuration, 2, 11)).unwrap();
    assert_eq!(gain, Gain::Div2 as u16);

    map.destroy().done();
}
