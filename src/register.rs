//! Register addresses, bit-field descriptors and the pure helpers to pack and unpack them
//!
//! Everything in here works on plain 16-bit words. The bus traffic lives in
//! [`RegisterMap`](crate::SyncRegisterMap), which composes these helpers with a read and/or
//! write of the addressed register.
#![allow(clippy::module_name_repetitions)]

/// Addresses of the internal registers of the INA219
///
/// Every register is a 16-bit word transferred most significant byte first.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    /// Configuration register, see [`Configuration`](crate::configuration::Configuration)
    Configuration = 0x00,
    /// Shunt voltage, signed, 10µV per bit
    ShuntVoltage = 0x01,
    /// Bus voltage in bits 3..=14 plus the conversion ready and overflow flags
    BusVoltage = 0x02,
    /// Power, unsigned, scaled by the power LSB of the active calibration
    Power = 0x03,
    /// Current, signed, scaled by the current LSB of the active calibration
    Current = 0x04,
    /// Calibration register, see [`Calibration`](crate::calibration::Calibration)
    Calibration = 0x05,
}

impl Register {
    /// The register pointer sent on the bus
    #[must_use]
    pub const fn address(self) -> u8 {
        self as u8
    }

    /// Whether the register content is a two's complement number
    #[must_use]
    pub const fn is_signed(self) -> bool {
        matches!(self, Self::ShuntVoltage | Self::Current)
    }
}

/// A contiguous range of bits inside one register
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Field {
    /// Register holding the field
    pub register: Register,
    /// Number of bits
    pub width: u8,
    /// Position of the lowest bit
    pub offset: u8,
}

impl Field {
    /// Perform a system reset, self-clearing
    pub const RESET: Self = Self::new(Register::Configuration, 1, 15);
    /// Full scale range of the bus voltage ADC
    pub const BUS_VOLTAGE_RANGE: Self = Self::new(Register::Configuration, 1, 13);
    /// Programmable gain of the shunt amplifier
    pub const GAIN: Self = Self::new(Register::Configuration, 2, 11);
    /// Resolution / averaging of the bus voltage ADC
    pub const BUS_ADC_RESOLUTION: Self = Self::new(Register::Configuration, 4, 7);
    /// Resolution / averaging of the shunt voltage ADC
    pub const SHUNT_ADC_RESOLUTION: Self = Self::new(Register::Configuration, 4, 3);
    /// Operating mode
    pub const MODE: Self = Self::new(Register::Configuration, 3, 0);

    /// Bus voltage measurement in 4mV steps
    pub const RAW_BUS_VOLTAGE: Self = Self::new(Register::BusVoltage, 12, 3);
    /// Set when a conversion finished, cleared by reading the power register
    pub const CONVERSION_READY: Self = Self::new(Register::BusVoltage, 1, 1);
    /// Set when the power or current calculation overflowed
    pub const OVERFLOW: Self = Self::new(Register::BusVoltage, 1, 0);

    /// Describe a field of `width` bits starting at bit `offset` of `register`
    ///
    /// # Panics
    /// When the field does not fit into 16 bits. For the constants above this is checked at
    /// compile time.
    #[must_use]
    pub const fn new(register: Register, width: u8, offset: u8) -> Self {
        assert!(width >= 1 && width as u16 + offset as u16 <= 16);
        Self {
            register,
            width,
            offset,
        }
    }

    /// Get the value of this field out of the full register `word`
    #[must_use]
    pub const fn extract(self, word: u16) -> u16 {
        extract_bits(word, self.width, self.offset)
    }

    /// Replace this field inside `word` with `value`, truncating `value` to the field width
    #[must_use]
    pub const fn insert(self, word: u16, value: u16) -> u16 {
        insert_bits(word, self.width, self.offset, value)
    }
}

/// Values that can be stored in a [`Field`]
///
/// Decoding has to be total: every bit pattern of the field width maps to some value, the same
/// way the INA219 interprets reserved encodings.
pub trait FieldValue: Sized {
    /// Decode the already shifted and masked field bits
    fn from_bits(bits: u16) -> Self;

    /// Encode into the unshifted field bits
    fn as_bits(self) -> u16;
}

impl FieldValue for bool {
    fn from_bits(bits: u16) -> Self {
        bits & 1 != 0
    }

    fn as_bits(self) -> u16 {
        u16::from(self)
    }
}

/// Mask with the lowest `width` bits set
#[must_use]
pub const fn mask(width: u8) -> u16 {
    if width >= 16 {
        u16::MAX
    } else {
        (1 << width) - 1
    }
}

/// Read `width` bits starting at bit `offset` out of `word`
#[must_use]
pub const fn extract_bits(word: u16, width: u8, offset: u8) -> u16 {
    if offset >= 16 {
        return 0;
    }
    (word >> offset) & mask(width)
}

/// Replace `width` bits starting at `offset` inside `word` by `value`
///
/// Bits of `value` above `width` are silently dropped, exactly like the hardware would if the
/// whole word was written. All bits of `word` outside of the field are kept.
#[must_use]
pub const fn insert_bits(word: u16, width: u8, offset: u8, value: u16) -> u16 {
    if offset >= 16 {
        return word;
    }
    let field_mask = mask(width) << offset;
    (word & !field_mask) | ((value << offset) & field_mask)
}

/// Reinterpret a register word as a two's complement number
#[must_use]
pub const fn decode_signed16(bits: u16) -> i16 {
    i16::from_be_bytes(bits.to_be_bytes())
}

/// Inverse of [`decode_signed16`]
#[must_use]
pub const fn encode_signed16(value: i16) -> u16 {
    u16::from_be_bytes(value.to_be_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_addresses() {
        assert_eq!(Register::Configuration.address(), 0x00);
        assert_eq!(Register::ShuntVoltage.address(), 0x01);
        assert_eq!(Register::BusVoltage.address(), 0x02);
        assert_eq!(Register::Power.address(), 0x03);
        assert_eq!(Register::Current.address(), 0x04);
        assert_eq!(Register::Calibration.address(), 0x05);

        assert!(Register::ShuntVoltage.is_signed());
        assert!(Register::Current.is_signed());
        assert!(!Register::Power.is_signed());
        assert!(!Register::BusVoltage.is_signed());
    }

    #[test]
    fn signed_decoding() {
        for bits in 0..=u16::MAX {
            let expected = if bits <= 32767 {
                i32::from(bits)
            } else {
                i32::from(bits) - 65536
            };
            assert_eq!(i32::from(decode_signed16(bits)), expected);
        }

        for value in i16::MIN..=i16::MAX {
            assert_eq!(decode_signed16(encode_signed16(value)), value);
        }

        // Samples from table 7 of the datasheet
        assert_eq!(decode_signed16(0b0111_1100_1111_1111), 31999);
        assert_eq!(decode_signed16(0b1111_0000_0101_1111), -4001);
        assert_eq!(decode_signed16(0b1000_0011_0000_0000), -32000);
    }

    #[test]
    fn fields_pack_and_unpack() {
        let words = [0x0000, 0xFFFF, 0x399F, 0xA5A5, 0x5A5A];

        for width in 1..=16u8 {
            for offset in 0..=(16 - width) {
                let field_mask = mask(width) << offset;
                let max = mask(width);

                for word in words {
                    for value in [0, 1, max / 2, max] {
                        let packed = insert_bits(word, width, offset, value);

                        assert_eq!(extract_bits(packed, width, offset), value);
                        assert_eq!(packed & !field_mask, word & !field_mask);
                    }
                }
            }
        }
    }

    #[test]
    fn oversized_values_are_truncated() {
        // A gain of 5 does not fit two bits, only the lowest two bits (0b01) end up in the word
        let word = Field::GAIN.insert(0x399F, 5);
        assert_eq!(Field::GAIN.extract(word), 1);
        assert_eq!(word, 0x299F);
    }

    #[test]
    fn configuration_fields_do_not_overlap() {
        let fields = [
            Field::RESET,
            Field::BUS_VOLTAGE_RANGE,
            Field::GAIN,
            Field::BUS_ADC_RESOLUTION,
            Field::SHUNT_ADC_RESOLUTION,
            Field::MODE,
        ];

        let mut seen = 0u16;
        for field in fields {
            let bits = mask(field.width) << field.offset;
            assert_eq!(seen & bits, 0, "{field:?} overlaps a previous field");
            seen |= bits;
        }

        // Only bit 14 is unused
        assert_eq!(seen, !(1 << 14));
    }

    #[test]
    fn bus_voltage_fields() {
        let word = (800 << 3) | 0b10;
        assert_eq!(Field::RAW_BUS_VOLTAGE.extract(word), 800);
        assert_eq!(Field::CONVERSION_READY.extract(word), 1);
        assert_eq!(Field::OVERFLOW.extract(word), 0);
    }
}
