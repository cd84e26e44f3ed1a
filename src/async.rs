use crate::address::Address;
use crate::calibration::{
    Calibration, ConfigurationStep, Preset, BUS_VOLTAGE_LSB_V, SHUNT_VOLTAGE_LSB_V,
};
use crate::configuration::{AdcResolution, BusVoltageRange, Configuration, Gain, Mode, Reset};
use crate::errors::DeviceError;
use crate::register::{self, Field, FieldValue, Register};
use embedded_hal_async::i2c::I2c;

/// Bit exact access to the registers of one INA219
///
/// Field writes are read-modify-write sequences of two bus transactions. They are **not** atomic:
/// if something else writes the same register in between, that write is lost. Callers sharing a
/// device have to serialize access themselves.
pub struct RegisterMap<I2C> {
    i2c: I2C,
    address: Address,
}

impl<I2C> RegisterMap<I2C>
where
    I2C: I2c,
{
    /// Access the INA219 listening on `address`, without any bus traffic
    pub const fn new(i2c: I2C, address: Address) -> Self {
        Self { i2c, address }
    }

    /// Destroy the register map returning the underlying I2C device
    pub fn destroy(self) -> I2C {
        self.i2c
    }

    /// Address of the device on the bus
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Read a full register
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn read_raw(&mut self, register: Register) -> Result<u16, I2C::Error> {
        let mut buf: [u8; 2] = [0x00; 2];
        self.i2c
            .write_read(self.address.as_byte(), &[register.address()], &mut buf)
            .await?;
        let value = u16::from_be_bytes(buf);
        trace!("INA219 read {} from register {}", value, register.address());
        Ok(value)
    }

    /// Overwrite a full register
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn write_raw(&mut self, register: Register, value: u16) -> Result<(), I2C::Error> {
        trace!("INA219 write {} to register {}", value, register.address());
        let [msb, lsb] = value.to_be_bytes();
        self.i2c
            .write(self.address.as_byte(), &[register.address(), msb, lsb])
            .await
    }

    /// Read a full register as two's complement number
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn read_signed(&mut self, register: Register) -> Result<i16, I2C::Error> {
        debug_assert!(register.is_signed(), "{register:?} is not a signed register");
        Ok(register::decode_signed16(self.read_raw(register).await?))
    }

    /// Read the `width` bits starting at bit `offset` of `register`
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn read_bits(
        &mut self,
        register: Register,
        width: u8,
        offset: u8,
    ) -> Result<u16, I2C::Error> {
        let word = self.read_raw(register).await?;
        Ok(register::extract_bits(word, width, offset))
    }

    /// Replace the `width` bits starting at bit `offset` of `register` with `value`
    ///
    /// `value` is truncated to `width` bits, it is never rejected. All other bits of the register
    /// are written back as they were read.
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error. If the read succeeded but
    /// the write failed the register is unchanged.
    pub async fn write_bits(
        &mut self,
        register: Register,
        width: u8,
        offset: u8,
        value: u16,
    ) -> Result<(), I2C::Error> {
        let word = self.read_raw(register).await?;
        let updated = register::insert_bits(word, width, offset, value);
        self.write_raw(register, updated).await
    }

    /// Read a named [`Field`]
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn read_field(&mut self, field: Field) -> Result<u16, I2C::Error> {
        self.read_bits(field.register, field.width, field.offset)
            .await
    }

    /// Write a named [`Field`], see [`Self::write_bits`]
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn write_field(&mut self, field: Field, value: u16) -> Result<(), I2C::Error> {
        self.write_bits(field.register, field.width, field.offset, value)
            .await
    }
}

/// Embedded HAL compatible driver for the INA219 with cached calibration
///
/// All current and power readings are scaled with the cached [`Calibration`]. Before each of them
/// the calibration register is written again, the shunt and bus voltage readings do not need it.
pub struct Monitor<I2C> {
    registers: RegisterMap<I2C>,
    calibration: Calibration,
}

impl<I2C> Monitor<I2C>
where
    I2C: I2c,
{
    /// Open an INA219 and apply the [`Preset::Range32V2A`] calibration and configuration
    ///
    /// # Errors
    /// Returns a [`DeviceError`] containing the I2C device if any of the writes fails.
    pub async fn new(i2c: I2C, address: Address) -> Result<Self, DeviceError<I2C, I2C::Error>> {
        let preset = Preset::default();
        let mut new = Self::new_unchecked(i2c, address, preset.calibration());

        match new.apply_preset(preset).await {
            Ok(()) => Ok(new),
            Err(e) => {
                warn!("INA219 at {} did not accept its calibration", address.as_byte());
                Err(DeviceError::new(e, new.destroy()))
            }
        }
    }

    /// Create a new `Monitor` assuming the device is already set up for `calibration`
    ///
    /// Nothing is written to the device.
    pub const fn new_unchecked(i2c: I2C, address: Address, calibration: Calibration) -> Self {
        Self {
            registers: RegisterMap::new(i2c, address),
            calibration,
        }
    }

    /// Destroy the driver returning the underlying I2C device
    ///
    /// This does leave the device in its current state.
    pub fn destroy(self) -> I2C {
        self.registers.destroy()
    }

    /// Direct access to the registers, bypassing the cached calibration
    pub fn registers(&mut self) -> &mut RegisterMap<I2C> {
        &mut self.registers
    }

    /// The cached calibration register value
    ///
    /// The device is never asked, the register does not reliably read back what was written.
    pub const fn calibration(&self) -> u16 {
        self.calibration.cal_value()
    }

    /// The full cached calibration
    pub const fn calibration_state(&self) -> Calibration {
        self.calibration
    }

    /// Store `cal_value` in the cache **and** write it to the calibration register
    ///
    /// Only the register value changes. The current and power LSB stay as they were, so unless
    /// `cal_value` matches them the following [`Self::current`] and [`Self::power`] readings are
    /// scaled wrong. Use [`Self::calibrate`] to change all three together.
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn set_calibration(&mut self, cal_value: u16) -> Result<(), I2C::Error> {
        debug!("INA219 calibration value set to {}", cal_value);
        self.calibration = self.calibration.with_cal_value(cal_value);
        self.write_calibration().await
    }

    /// Replace the cached calibration and write it to the calibration register
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn calibrate(&mut self, calibration: Calibration) -> Result<(), I2C::Error> {
        debug!("INA219 calibrated to {}", calibration.cal_value());
        self.calibration = calibration;
        self.write_calibration().await
    }

    /// Calibrate and configure the device according to `preset`
    ///
    /// The calibration is written first, then bus voltage range, gain, bus and shunt ADC resolution
    /// and the mode, each as its own field write.
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error. The writes up to the failing
    /// one stay in effect.
    pub async fn apply_preset(&mut self, preset: Preset) -> Result<(), I2C::Error> {
        self.calibrate(preset.calibration()).await?;

        for step in preset.configuration_steps() {
            match step {
                ConfigurationStep::BusVoltageRange(range) => {
                    self.set_bus_voltage_range(range).await?;
                }
                ConfigurationStep::Gain(gain) => self.set_gain(gain).await?,
                ConfigurationStep::BusAdcResolution(res) => {
                    self.set_bus_adc_resolution(res).await?;
                }
                ConfigurationStep::ShuntAdcResolution(res) => {
                    self.set_shunt_adc_resolution(res).await?;
                }
                ConfigurationStep::Mode(mode) => self.set_mode(mode).await?,
            }
        }

        Ok(())
    }

    /// Configure for up to 32V and 2A, see [`Preset::Range32V2A`]
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn set_calibration_32v_2a(&mut self) -> Result<(), I2C::Error> {
        self.apply_preset(Preset::Range32V2A).await
    }

    /// Configure for up to 32V and 1A, see [`Preset::Range32V1A`]
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn set_calibration_32v_1a(&mut self) -> Result<(), I2C::Error> {
        self.apply_preset(Preset::Range32V1A).await
    }

    /// Configure for up to 16V and 400mA, see [`Preset::Range16V400mA`]
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn set_calibration_16v_400ma(&mut self) -> Result<(), I2C::Error> {
        self.apply_preset(Preset::Range16V400mA).await
    }

    /// Shunt voltage in V
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn shunt_voltage(&mut self) -> Result<f64, I2C::Error> {
        let raw = self.raw_shunt_voltage().await?;
        Ok(f64::from(raw) * SHUNT_VOLTAGE_LSB_V)
    }

    /// Bus voltage in V
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn bus_voltage(&mut self) -> Result<f64, I2C::Error> {
        let raw = self.raw_bus_voltage().await?;
        Ok(f64::from(raw) * BUS_VOLTAGE_LSB_V)
    }

    /// Current in mA, after refreshing the calibration register
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn current(&mut self) -> Result<f64, I2C::Error> {
        self.write_calibration().await?;
        let bits = self.registers.read_raw(Register::Current).await?;
        Ok(self.calibration.current_from_register(bits))
    }

    /// Power in W, after refreshing the calibration register
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn power(&mut self) -> Result<f64, I2C::Error> {
        self.write_calibration().await?;
        let bits = self.registers.read_raw(Register::Power).await?;
        Ok(self.calibration.power_from_register(bits))
    }

    /// Shunt voltage register in 10µV steps
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn raw_shunt_voltage(&mut self) -> Result<i16, I2C::Error> {
        self.registers.read_signed(Register::ShuntVoltage).await
    }

    /// Bus voltage field in 4mV steps, without the flags
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn raw_bus_voltage(&mut self) -> Result<u16, I2C::Error> {
        self.registers.read_field(Field::RAW_BUS_VOLTAGE).await
    }

    /// Current register in steps of the current LSB
    ///
    /// Unlike [`Self::current`] the calibration register is not written first.
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn raw_current(&mut self) -> Result<i16, I2C::Error> {
        self.registers.read_signed(Register::Current).await
    }

    /// Power register in steps of the power LSB
    ///
    /// Unlike [`Self::power`] the calibration register is not written first.
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn raw_power(&mut self) -> Result<u16, I2C::Error> {
        self.registers.read_raw(Register::Power).await
    }

    /// Read the whole configuration register at once
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn configuration(&mut self) -> Result<Configuration, I2C::Error> {
        let word = self.registers.read_raw(Register::Configuration).await?;
        Ok(Configuration::from_bits(word))
    }

    /// Reset bit, reads as [`Reset::Run`] once a reset is done
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn reset(&mut self) -> Result<Reset, I2C::Error> {
        self.read_setting(Field::RESET).await
    }

    /// Write the reset bit
    ///
    /// A reset restores all registers to their defaults, including calibration. The cached
    /// calibration is kept and written again by the next current or power reading.
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn set_reset(&mut self, reset: Reset) -> Result<(), I2C::Error> {
        self.write_setting(Field::RESET, reset).await
    }

    /// Configured bus voltage range
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn bus_voltage_range(&mut self) -> Result<BusVoltageRange, I2C::Error> {
        self.read_setting(Field::BUS_VOLTAGE_RANGE).await
    }

    /// Set the bus voltage range
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn set_bus_voltage_range(
        &mut self,
        range: BusVoltageRange,
    ) -> Result<(), I2C::Error> {
        self.write_setting(Field::BUS_VOLTAGE_RANGE, range).await
    }

    /// Configured gain of the shunt amplifier
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn gain(&mut self) -> Result<Gain, I2C::Error> {
        self.read_setting(Field::GAIN).await
    }

    /// Set the gain of the shunt amplifier
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn set_gain(&mut self, gain: Gain) -> Result<(), I2C::Error> {
        self.write_setting(Field::GAIN, gain).await
    }

    /// Configured resolution of the bus voltage ADC
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn bus_adc_resolution(&mut self) -> Result<AdcResolution, I2C::Error> {
        self.read_setting(Field::BUS_ADC_RESOLUTION).await
    }

    /// Set the resolution of the bus voltage ADC
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn set_bus_adc_resolution(
        &mut self,
        resolution: AdcResolution,
    ) -> Result<(), I2C::Error> {
        self.write_setting(Field::BUS_ADC_RESOLUTION, resolution)
            .await
    }

    /// Configured resolution of the shunt voltage ADC
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn shunt_adc_resolution(&mut self) -> Result<AdcResolution, I2C::Error> {
        self.read_setting(Field::SHUNT_ADC_RESOLUTION).await
    }

    /// Set the resolution of the shunt voltage ADC
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn set_shunt_adc_resolution(
        &mut self,
        resolution: AdcResolution,
    ) -> Result<(), I2C::Error> {
        self.write_setting(Field::SHUNT_ADC_RESOLUTION, resolution)
            .await
    }

    /// Configured operating mode
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn mode(&mut self) -> Result<Mode, I2C::Error> {
        self.read_setting(Field::MODE).await
    }

    /// Set the operating mode
    ///
    /// Writing a triggered mode starts a conversion.
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn set_mode(&mut self, mode: Mode) -> Result<(), I2C::Error> {
        self.write_setting(Field::MODE, mode).await
    }

    /// Check if a conversion finished since the flag was last cleared
    ///
    /// The flag is cleared by writing the configuration register (except for power down and ADC
    /// off) and by reading the power register.
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn conversion_ready(&mut self) -> Result<bool, I2C::Error> {
        self.read_setting(Field::CONVERSION_READY).await
    }

    /// Check if the last power or current calculation overflowed
    ///
    /// # Errors
    /// Returns an error if the underlying I2C device returns an error.
    pub async fn overflow(&mut self) -> Result<bool, I2C::Error> {
        self.read_setting(Field::OVERFLOW).await
    }

    async fn read_setting<V: FieldValue>(&mut self, field: Field) -> Result<V, I2C::Error> {
        let bits = self.registers.read_field(field).await?;
        Ok(V::from_bits(bits))
    }

    async fn write_setting<V: FieldValue>(
        &mut self,
        field: Field,
        value: V,
    ) -> Result<(), I2C::Error> {
        self.registers.write_field(field, value.as_bits()).await
    }

    async fn write_calibration(&mut self) -> Result<(), I2C::Error> {
        self.registers
            .write_raw(Register::Calibration, self.calibration.cal_value())
            .await
    }
}
