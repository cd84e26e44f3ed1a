//! Calibration of the INA219 and the fixed presets
//!
//! The calibration register value and the two LSB scale factors always belong together, they are
//! derived from one shunt resistor and one expected maximum current. [`Calibration`] keeps them
//! as a triple so they can not drift apart by accident.

use crate::configuration::{AdcResolution, BusVoltageRange, Gain, MeasuredSignals, Mode};
use crate::register::decode_signed16;
use core::ops::RangeInclusive;

/// Value of one bit of the shunt voltage register in V
pub const SHUNT_VOLTAGE_LSB_V: f64 = 0.000_01;

/// Value of one bit of the bus voltage field in V
pub const BUS_VOLTAGE_LSB_V: f64 = 0.004;

/// Scaling factor derived from datasheet and µ SI prefix: 0.04096 * (1/µ)^2
const SCALING_FACTOR: u64 = 40_960_000_000;
const RANGE: RangeInclusive<u64> = (SCALING_FACTOR / (u16::MAX as u64))..=(SCALING_FACTOR / 2);

/// Calibration register value together with the scale factors it results in
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    cal_value: u16,
    current_lsb_ma: f64,
    power_lsb_w: f64,
}

impl Calibration {
    /// Combine a calibration register value with the matching LSB values
    ///
    /// Nothing is checked here, the caller has to make sure the three values describe the same
    /// calibration.
    #[must_use]
    pub const fn new(cal_value: u16, current_lsb_ma: f64, power_lsb_w: f64) -> Self {
        Self {
            cal_value,
            current_lsb_ma,
            power_lsb_w,
        }
    }

    /// Derive a calibration from the wanted current LSB in µA and the shunt resistor in µOhm
    ///
    /// The power LSB is always 20 times the current LSB.
    ///
    /// # Example
    /// ```rust
    /// use ina219_monitor::calibration::Calibration;
    ///
    /// // 100µA per bit over a 0.1 Ohm shunt
    /// let cal = Calibration::from_shunt(100, 100_000).unwrap();
    /// assert_eq!(cal.cal_value(), 4096);
    /// assert_eq!(cal.current_lsb_ma(), 0.1);
    /// assert_eq!(cal.power_lsb_w(), 0.002);
    /// ```
    ///
    /// Returns `None` if the resulting register value does not fit the calibration register.
    #[must_use]
    pub fn from_shunt(current_lsb_ua: u32, r_shunt_uohm: u32) -> Option<Self> {
        let product = u64::from(current_lsb_ua) * u64::from(r_shunt_uohm);
        if !RANGE.contains(&product) {
            return None;
        }

        // According to Figure 27 of the datasheet the lowest bit is always 0
        let cal_value = u16::try_from(SCALING_FACTOR / product).ok()? & !1;

        Some(Self {
            cal_value,
            current_lsb_ma: f64::from(current_lsb_ua) / 1_000.0,
            power_lsb_w: f64::from(current_lsb_ua) * 20.0 / 1_000_000.0,
        })
    }

    /// The value written to the calibration register
    #[must_use]
    pub const fn cal_value(self) -> u16 {
        self.cal_value
    }

    /// Value of one bit in the current register in mA
    #[must_use]
    pub const fn current_lsb_ma(self) -> f64 {
        self.current_lsb_ma
    }

    /// Value of one bit in the power register in W
    #[must_use]
    pub const fn power_lsb_w(self) -> f64 {
        self.power_lsb_w
    }

    /// Replace only the register value, keeping the scale factors as they are
    #[must_use]
    pub(crate) const fn with_cal_value(self, cal_value: u16) -> Self {
        Self { cal_value, ..self }
    }

    /// Current in mA from the raw, signed, current register
    #[must_use]
    pub fn current_from_register(self, bits: u16) -> f64 {
        f64::from(decode_signed16(bits)) * self.current_lsb_ma
    }

    /// Power in W from the raw, unsigned, power register
    #[must_use]
    pub fn power_from_register(self, bits: u16) -> f64 {
        f64::from(bits) * self.power_lsb_w
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Preset::default().calibration()
    }
}

/// Fixed calibrations for the common 0.1 Ohm shunt breakout boards
///
/// Every preset also sets up the configuration register, see [`Preset::configuration_steps`].
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Preset {
    /// Up to 32V and 2A, 0.1mA and 2mW per bit
    #[default]
    Range32V2A,
    /// Up to 32V and 1A, 0.04mA and 0.8mW per bit
    Range32V1A,
    /// Up to 16V and 400mA, 0.05mA and 1mW per bit
    Range16V400mA,
}

/// One configuration field write performed while applying a [`Preset`]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigurationStep {
    /// Write the bus voltage range
    BusVoltageRange(BusVoltageRange),
    /// Write the gain
    Gain(Gain),
    /// Write the bus ADC resolution
    BusAdcResolution(AdcResolution),
    /// Write the shunt ADC resolution
    ShuntAdcResolution(AdcResolution),
    /// Write the operating mode
    Mode(Mode),
}

impl Preset {
    /// Calibration triple of this preset
    #[must_use]
    pub const fn calibration(self) -> Calibration {
        match self {
            Self::Range32V2A => Calibration::new(12412, 0.1, 0.002),
            Self::Range32V1A => Calibration::new(31030, 0.04, 0.0008),
            Self::Range16V400mA => Calibration::new(24824, 0.05, 0.001),
        }
    }

    /// Bus voltage range of this preset
    #[must_use]
    pub const fn bus_voltage_range(self) -> BusVoltageRange {
        match self {
            Self::Range32V2A | Self::Range32V1A => BusVoltageRange::Fsr32v,
            Self::Range16V400mA => BusVoltageRange::Fsr16v,
        }
    }

    /// Gain of the shunt amplifier of this preset
    #[must_use]
    pub const fn gain(self) -> Gain {
        match self {
            Self::Range32V2A | Self::Range32V1A => Gain::Div8,
            Self::Range16V400mA => Gain::Div1,
        }
    }

    /// The configuration writes, in the order they have to reach the device
    #[must_use]
    pub const fn configuration_steps(self) -> [ConfigurationStep; 5] {
        [
            ConfigurationStep::BusVoltageRange(self.bus_voltage_range()),
            ConfigurationStep::Gain(self.gain()),
            ConfigurationStep::BusAdcResolution(AdcResolution::Res12Bit),
            ConfigurationStep::ShuntAdcResolution(AdcResolution::Res12Bit),
            ConfigurationStep::Mode(Mode::Continuous(MeasuredSignals::ShuntAndBusVoltage)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(clippy::cast_precision_loss)] // This is only used in tests
    fn cal_value_datasheet(current_lsb_ua: u32, r_shunt_uohm: u32) -> u16 {
        let micro = 1.0 / 1_000_000.0;
        let current_lsb = f64::from(current_lsb_ua) * micro;
        let r_shunt = f64::from(r_shunt_uohm) * micro;

        let cal = 0.04096 / (current_lsb * r_shunt);
        assert!(
            !(cal < 0.0 || cal > f64::from(u16::MAX)),
            "Calculation out of range"
        );

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            cal as u16 & !1
        }
    }

    #[test]
    fn from_shunt_fits_datasheet() {
        for i in (10..=1_000).step_by(10) {
            for r in (10_000..=1_000_000).step_by(10_000) {
                if let Some(cal) = Calibration::from_shunt(i, r) {
                    let expected = cal_value_datasheet(i, r);
                    // Floating point may land just below an integer the exact division reaches
                    assert!(expected.abs_diff(cal.cal_value()) <= 2, "{i}µA {r}µOhm");
                    assert!((cal.power_lsb_w() * 1_000.0 - cal.current_lsb_ma() * 20.0).abs() < 1e-12);
                }
            }
        }
    }

    #[test]
    fn from_shunt_rejects_out_of_range() {
        assert!(Calibration::from_shunt(0, 100_000).is_none());
        assert!(Calibration::from_shunt(100, 0).is_none());
        // Would need a calibration value larger than 16 bits
        assert!(Calibration::from_shunt(1, 1_000).is_none());
    }

    #[test]
    fn presets_match_table() {
        let cal = Preset::Range32V2A.calibration();
        assert_eq!(cal.cal_value(), 12412);
        assert_eq!(cal.current_lsb_ma(), 0.1);
        assert_eq!(cal.power_lsb_w(), 0.002);

        let cal = Preset::Range32V1A.calibration();
        assert_eq!(cal.cal_value(), 31030);
        assert_eq!(cal.current_lsb_ma(), 0.04);
        assert_eq!(cal.power_lsb_w(), 0.0008);

        let cal = Preset::Range16V400mA.calibration();
        assert_eq!(cal.cal_value(), 24824);
        assert_eq!(cal.current_lsb_ma(), 0.05);
        assert_eq!(cal.power_lsb_w(), 0.001);

        assert_eq!(Calibration::default(), Preset::Range32V2A.calibration());
    }

    #[test]
    fn preset_configuration() {
        let steps = Preset::Range16V400mA.configuration_steps();
        assert_eq!(
            steps,
            [
                ConfigurationStep::BusVoltageRange(BusVoltageRange::Fsr16v),
                ConfigurationStep::Gain(Gain::Div1),
                ConfigurationStep::BusAdcResolution(AdcResolution::Res12Bit),
                ConfigurationStep::ShuntAdcResolution(AdcResolution::Res12Bit),
                ConfigurationStep::Mode(Mode::Continuous(MeasuredSignals::ShuntAndBusVoltage)),
            ]
        );

        assert_eq!(
            Preset::Range32V1A.configuration_steps()[..2],
            [
                ConfigurationStep::BusVoltageRange(BusVoltageRange::Fsr32v),
                ConfigurationStep::Gain(Gain::Div8),
            ]
        );
    }

    #[test]
    fn scaling() {
        let cal = Preset::Range32V2A.calibration();
        assert!((cal.current_from_register(200) - 20.0).abs() < 1e-9);
        assert!((cal.current_from_register(0xFF38) + 20.0).abs() < 1e-9);
        assert!((cal.power_from_register(0xFFFF) - 131.07).abs() < 1e-9);
    }
}
