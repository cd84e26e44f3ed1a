//! I2C address of the INA219
//!
//! The two address pins A0 and A1 select one of 16 addresses in `0x40..=0x4F`, see table 1 of
//! the datasheet. Breakout boards usually leave both pins on GND, which gives the default
//! address `0x40`.

use core::fmt::Formatter;
use core::ops::RangeInclusive;

/// Signal an address pin is tied to
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Pin {
    /// Tied to GND
    Gnd = 0,
    /// Tied to Vs
    Vs = 1,
    /// Tied to SDA
    Sda = 2,
    /// Tied to SCL
    Scl = 3,
}

/// Seven bit I2C address of an INA219
///
/// # Example
/// ```rust
/// use ina219_monitor::address::{Address, Pin};
///
/// assert_eq!(Address::default().as_byte(), 0x40);
/// assert_eq!(Address::from_pins(Pin::Sda, Pin::Scl).as_byte(), 0x4E);
/// assert_eq!(Address::from_byte(0x41).unwrap().as_byte(), 0x41);
/// assert!(Address::from_byte(0x20).is_err());
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Address(u8);

impl Address {
    const VALID: RangeInclusive<u8> = 0x40..=0x4F;

    /// Address selected by the wiring of A0 and A1
    #[must_use]
    pub const fn from_pins(a0: Pin, a1: Pin) -> Self {
        Self(0x40 | a0 as u8 | (a1 as u8) << 2)
    }

    /// Use an address given as byte
    ///
    /// # Errors
    /// Returns [`OutOfRange`] if no INA219 can answer on this address.
    pub fn from_byte(byte: u8) -> Result<Self, OutOfRange> {
        if Self::VALID.contains(&byte) {
            Ok(Self(byte))
        } else {
            Err(OutOfRange(byte))
        }
    }

    /// The address as used on the bus
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self.0
    }
}

impl Default for Address {
    fn default() -> Self {
        Self::from_pins(Pin::Gnd, Pin::Gnd)
    }
}

impl TryFrom<u8> for Address {
    type Error = OutOfRange;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_byte(value)
    }
}

/// The given byte is not an address an INA219 can be configured for
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutOfRange(pub u8);

impl core::fmt::Display for OutOfRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "Address {:#04x} out of range, should be in {:#04x}..={:#04x}",
            self.0,
            Address::VALID.start(),
            Address::VALID.end(),
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for OutOfRange {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pins_cover_all_addresses() {
        let pins = [Pin::Gnd, Pin::Vs, Pin::Sda, Pin::Scl];
        let mut bytes = vec![];

        for a1 in pins {
            for a0 in pins {
                bytes.push(Address::from_pins(a0, a1).as_byte());
            }
        }

        // Table 1 of the datasheet lists them in exactly this order
        assert_eq!(bytes, (0x40..=0x4F).collect::<Vec<u8>>());
    }

    #[test]
    fn byte_range() {
        assert_eq!(Address::try_from(0x4F), Ok(Address::from_pins(Pin::Scl, Pin::Scl)));
        assert_eq!(Address::from_byte(0x3F), Err(OutOfRange(0x3F)));
        assert_eq!(Address::from_byte(0x50), Err(OutOfRange(0x50)));
    }
}
