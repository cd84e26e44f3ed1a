//! Typed values of the fields inside the configuration register
//!
//! Each type maps to one [`Field`] and converts from and to its bits through
//! [`FieldValue`]. Decoding is total, the INA219 treats some bit patterns as aliases of others
//! and so do these types.
//!
//! # Example
//! ```rust
//! use ina219_monitor::configuration::{AdcResolution, Configuration};
//!
//! let conf = Configuration::from_bits(0x399F);
//! assert_eq!(conf, Configuration::default());
//! assert_eq!(conf.bus_resolution, AdcResolution::Res12Bit);
//! ```

use crate::register::{Field, FieldValue};
use core::time::Duration;

/// Perform a system reset or continue work as normal
///
/// If set to `Reset` all registers are set to their defaults. The flag clears itself once the
/// reset is done, so this should always read as `Run`.
#[derive(Default, Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Reset {
    /// Continue normal operation
    #[default]
    Run = 0,
    /// Perform system reset
    Reset = 1,
}

impl FieldValue for Reset {
    fn from_bits(bits: u16) -> Self {
        match bits & 1 {
            0 => Self::Run,
            _ => Self::Reset,
        }
    }

    fn as_bits(self) -> u16 {
        self as u16
    }
}

/// Measurement range for the bus voltage
#[derive(Default, Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum BusVoltageRange {
    /// Maximum bus voltage of 16V
    Fsr16v = 0,
    /// Maximum bus voltage of 32V (still limited by 26V IC maximum)
    #[default]
    Fsr32v = 1,
}

impl BusVoltageRange {
    /// The full scale voltage in Volts
    #[must_use]
    pub const fn full_scale_v(self) -> u16 {
        match self {
            Self::Fsr16v => 16,
            Self::Fsr32v => 32,
        }
    }
}

impl FieldValue for BusVoltageRange {
    fn from_bits(bits: u16) -> Self {
        match bits & 1 {
            0 => Self::Fsr16v,
            _ => Self::Fsr32v,
        }
    }

    fn as_bits(self) -> u16 {
        self as u16
    }
}

/// Gain of the [PGA](https://en.wikipedia.org/wiki/Programmable-gain_amplifier) in front of the
/// shunt ADC, which sets the maximum shunt voltage that can be measured
#[derive(Default, Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Gain {
    /// Gain of 1, range of ±40mV
    Div1 = 0,
    /// Gain of 1/2, range of ±80mV
    Div2 = 1,
    /// Gain of 1/4, range of ±160mV
    Div4 = 2,
    /// Gain of 1/8, range of ±320mV
    #[default]
    Div8 = 3,
}

impl Gain {
    /// Largest shunt voltage magnitude in mV that can be measured with this gain
    #[must_use]
    pub const fn range_mv(self) -> u16 {
        match self {
            Self::Div1 => 40,
            Self::Div2 => 80,
            Self::Div4 => 160,
            Self::Div8 => 320,
        }
    }
}

impl FieldValue for Gain {
    fn from_bits(bits: u16) -> Self {
        match bits & 0b11 {
            0 => Self::Div1,
            1 => Self::Div2,
            2 => Self::Div4,
            _ => Self::Div8,
        }
    }

    fn as_bits(self) -> u16 {
        self as u16
    }
}

/// Resolution / averaging mode for the shunt or bus voltage ADC
#[derive(Default, Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AdcResolution {
    /// Single 9 bit sample
    Res9Bit = 0b0000,
    /// Single 10 bit sample
    Res10Bit = 0b0001,
    /// Single 11 bit sample
    Res11Bit = 0b0010,
    /// Single 12 bit sample
    #[default]
    Res12Bit = 0b0011,
    /// 2 averaged 12 bit samples
    Avg2 = 0b1001,
    /// 4 averaged 12 bit samples
    Avg4 = 0b1010,
    /// 8 averaged 12 bit samples
    Avg8 = 0b1011,
    /// 16 averaged 12 bit samples
    Avg16 = 0b1100,
    /// 32 averaged 12 bit samples
    Avg32 = 0b1101,
    /// 64 averaged 12 bit samples
    Avg64 = 0b1110,
    /// 128 averaged 12 bit samples
    Avg128 = 0b1111,
}

impl AdcResolution {
    /// Conversion time in µs when this resolution is active
    ///
    /// Values according to Table 5 in the datasheet.
    #[must_use]
    pub const fn conversion_time_us(self) -> u32 {
        match self {
            Self::Res9Bit => 84,
            Self::Res10Bit => 148,
            Self::Res11Bit => 276,
            Self::Res12Bit => 532,
            Self::Avg2 => 1_060,
            Self::Avg4 => 2_130,
            Self::Avg8 => 4_260,
            Self::Avg16 => 8_510,
            Self::Avg32 => 17_020,
            Self::Avg64 => 34_050,
            Self::Avg128 => 68_100,
        }
    }
}

impl FieldValue for AdcResolution {
    fn from_bits(bits: u16) -> Self {
        // Bit 2 is a don't care for single samples, 0b1000 is another single 12 bit sample
        match bits & 0b1111 {
            0b0000 | 0b0100 => Self::Res9Bit,
            0b0001 | 0b0101 => Self::Res10Bit,
            0b0010 | 0b0110 => Self::Res11Bit,
            0b0011 | 0b0111 | 0b1000 => Self::Res12Bit,
            0b1001 => Self::Avg2,
            0b1010 => Self::Avg4,
            0b1011 => Self::Avg8,
            0b1100 => Self::Avg16,
            0b1101 => Self::Avg32,
            0b1110 => Self::Avg64,
            _ => Self::Avg128,
        }
    }

    fn as_bits(self) -> u16 {
        self as u16
    }
}

/// Which signals are measured during a conversion
#[derive(Default, Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum MeasuredSignals {
    /// Only the shunt voltage is measured
    ShuntVoltage = 1,
    /// Only the bus voltage is measured
    BusVoltage = 2,
    /// Both voltages are measured
    #[default]
    ShuntAndBusVoltage = 3,
}

/// Operating mode of the INA219
///
/// The driver does not track the mode, polling [`conversion_ready`] is up to the caller.
///
/// [`conversion_ready`]: crate::SyncMonitor::conversion_ready
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Reduce power usage and disable current into the input pins
    ///
    /// Recovery takes 40µs.
    PowerDown,
    /// Stop the conversions
    AdcOff,
    /// Trigger a single conversion of the given signals
    Triggered(MeasuredSignals),
    /// Continuously measure the given signals
    Continuous(MeasuredSignals),
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Continuous(MeasuredSignals::ShuntAndBusVoltage)
    }
}

impl FieldValue for Mode {
    fn from_bits(bits: u16) -> Self {
        use MeasuredSignals::{BusVoltage, ShuntAndBusVoltage, ShuntVoltage};

        match bits & 0b111 {
            0b000 => Self::PowerDown,
            0b001 => Self::Triggered(ShuntVoltage),
            0b010 => Self::Triggered(BusVoltage),
            0b011 => Self::Triggered(ShuntAndBusVoltage),
            0b100 => Self::AdcOff,
            0b101 => Self::Continuous(ShuntVoltage),
            0b110 => Self::Continuous(BusVoltage),
            _ => Self::Continuous(ShuntAndBusVoltage),
        }
    }

    fn as_bits(self) -> u16 {
        match self {
            Self::PowerDown => 0b000,
            Self::AdcOff => 0b100,
            Self::Triggered(signals) => signals as u16,
            Self::Continuous(signals) => signals as u16 | 0b100,
        }
    }
}

/// Snapshot of the whole configuration register
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Configuration {
    /// Indicate to perform a reset or continue to run normally
    pub reset: Reset,
    /// Maximum measurement range for the bus voltage
    pub bus_voltage_range: BusVoltageRange,
    /// Gain and thus range of the shunt voltage measurement
    pub gain: Gain,
    /// Resolution / averaging mode for the bus voltage measurement
    pub bus_resolution: AdcResolution,
    /// Resolution / averaging mode for the shunt voltage measurement
    pub shunt_resolution: AdcResolution,
    /// Which signals to measure and if continuous or triggered operation is set up
    pub mode: Mode,
}

impl Configuration {
    /// Decode a full configuration register word
    #[must_use]
    pub fn from_bits(word: u16) -> Self {
        Self {
            reset: FieldValue::from_bits(Field::RESET.extract(word)),
            bus_voltage_range: FieldValue::from_bits(Field::BUS_VOLTAGE_RANGE.extract(word)),
            gain: FieldValue::from_bits(Field::GAIN.extract(word)),
            bus_resolution: FieldValue::from_bits(Field::BUS_ADC_RESOLUTION.extract(word)),
            shunt_resolution: FieldValue::from_bits(Field::SHUNT_ADC_RESOLUTION.extract(word)),
            mode: FieldValue::from_bits(Field::MODE.extract(word)),
        }
    }

    /// Encode into a full configuration register word
    #[must_use]
    pub fn as_bits(self) -> u16 {
        let mut word = 0;
        word = Field::RESET.insert(word, self.reset.as_bits());
        word = Field::BUS_VOLTAGE_RANGE.insert(word, self.bus_voltage_range.as_bits());
        word = Field::GAIN.insert(word, self.gain.as_bits());
        word = Field::BUS_ADC_RESOLUTION.insert(word, self.bus_resolution.as_bits());
        word = Field::SHUNT_ADC_RESOLUTION.insert(word, self.shunt_resolution.as_bits());
        word = Field::MODE.insert(word, self.mode.as_bits());
        word
    }

    /// Time until a new measurement is available after a trigger or configuration write
    ///
    /// Returns `None` when no conversions are performed.
    #[must_use]
    pub fn conversion_time(self) -> Option<Duration> {
        let signals = match self.mode {
            Mode::PowerDown | Mode::AdcOff => return None,
            Mode::Triggered(signals) | Mode::Continuous(signals) => signals,
        };

        let us = match signals {
            MeasuredSignals::ShuntVoltage => self.shunt_resolution.conversion_time_us(),
            MeasuredSignals::BusVoltage => self.bus_resolution.conversion_time_us(),
            MeasuredSignals::ShuntAndBusVoltage => {
                self.shunt_resolution.conversion_time_us() + self.bus_resolution.conversion_time_us()
            }
        };

        Some(Duration::from_micros(u64::from(us)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_datasheet() {
        let reset_value = 0b0011_1001_1001_1111;

        assert_eq!(Configuration::default().as_bits(), reset_value);
        assert_eq!(
            Configuration::from_bits(reset_value),
            Configuration::default()
        );
    }

    #[test]
    fn decoding_is_total_and_stable() {
        // Every pattern decodes, and re-encoding the decoded value decodes to the same thing
        for word in 0..=u16::MAX {
            let conf = Configuration::from_bits(word);
            assert_eq!(Configuration::from_bits(conf.as_bits()), conf);
        }
    }

    #[test]
    fn mode_covers_all_bits() {
        for bits in 0..=0b111 {
            assert_eq!(Mode::from_bits(bits).as_bits(), bits);
        }
        assert_eq!(Mode::from_bits(0b111), Mode::default());
    }

    #[test]
    fn resolution_aliases() {
        assert_eq!(AdcResolution::from_bits(0b1000), AdcResolution::Res12Bit);
        assert_eq!(AdcResolution::from_bits(0b0111), AdcResolution::Res12Bit);
        assert_eq!(AdcResolution::from_bits(0b0100), AdcResolution::Res9Bit);
        assert_eq!(AdcResolution::from_bits(0b1111), AdcResolution::Avg128);
    }

    #[test]
    fn conversion_time() {
        let conf = Configuration::default();
        assert_eq!(conf.conversion_time(), Some(Duration::from_micros(1_064)));

        let conf = Configuration {
            mode: Mode::Triggered(MeasuredSignals::BusVoltage),
            bus_resolution: AdcResolution::Avg128,
            ..Configuration::default()
        };
        assert_eq!(conf.conversion_time(), Some(Duration::from_micros(68_100)));

        let conf = Configuration {
            mode: Mode::AdcOff,
            ..Configuration::default()
        };
        assert_eq!(conf.conversion_time(), None);
    }
}
