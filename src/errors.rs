//! Errors that can be returned while bringing up the monitor
//!
//! Every other operation returns the error type of the I2C bus unchanged, the driver never
//! retries and has nothing to roll back.

use core::fmt::{Debug, Display, Formatter};

/// The initial calibration of a monitor could not be written
///
/// Contains the bus so it can be reused or inspected.
pub struct DeviceError<I2C, I2cErr> {
    /// The error reported by the bus
    pub cause: I2cErr,
    /// The bus that was passed to the constructor
    pub device: I2C,
}

impl<I2C, I2cErr> DeviceError<I2C, I2cErr> {
    pub(crate) const fn new(cause: I2cErr, device: I2C) -> Self {
        Self { cause, device }
    }

    /// Take back the bus, dropping the error
    pub fn into_device(self) -> I2C {
        self.device
    }
}

impl<I2C, I2cErr: Debug> Debug for DeviceError<I2C, I2cErr> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DeviceError")
            .field("cause", &self.cause)
            .finish_non_exhaustive()
    }
}

impl<I2C, I2cErr: Debug> Display for DeviceError<I2C, I2cErr> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "Failed to calibrate the INA219, I2C error: {:?}", self.cause)
    }
}

#[cfg(feature = "std")]
impl<I2C, I2cErr> std::error::Error for DeviceError<I2C, I2cErr>
where
    I2cErr: Debug + std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}
