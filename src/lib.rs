//! Register-level driver for the INA219 current/power monitor
//!
//! The driver comes in two layers:
//! - [`SyncRegisterMap`] / [`AsyncRegisterMap`] give bit exact access to the six registers.
//! - [`SyncMonitor`] / [`AsyncMonitor`] own a register map and a cached [`Calibration`], apply one
//!   of the calibration [`Preset`]s and return scaled measurements.
//!
//! # Example
//! ```rust,no_run
//! # #[cfg(feature = "sync")]
//! # {
//! use ina219_monitor::address::Address;
//! use ina219_monitor::SyncMonitor;
//! use linux_embedded_hal::I2cdev;
//!
//! let device = I2cdev::new("/dev/i2c-1").unwrap();
//!
//! // Uses the 32V / 2A preset
//! let mut ina = SyncMonitor::new(device, Address::default()).unwrap();
//!
//! println!("Bus voltage: {} V", ina.bus_voltage().unwrap());
//! println!("Current: {} mA", ina.current().unwrap());
//! # }
//! ```
//!
//! Sharing one driver between tasks or threads needs external locking, field writes are
//! read-modify-write sequences.
//!
//! [`Calibration`]: calibration::Calibration
//! [`Preset`]: calibration::Preset

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(clippy::pedantic)]
#![warn(clippy::missing_const_for_fn)]
#![allow(clippy::module_name_repetitions)]

#[macro_use]
mod fmt;

pub mod address;
pub mod calibration;
pub mod configuration;
pub mod errors;
pub mod register;

#[cfg(feature = "async")]
mod r#async;

#[cfg(feature = "sync")]
mod sync {
    include!(concat!(env!("OUT_DIR"), "/de-asynced.rs"));
}

#[cfg(feature = "async")]
pub use r#async::{Monitor as AsyncMonitor, RegisterMap as AsyncRegisterMap};

#[cfg(feature = "sync")]
pub use sync::{Monitor as SyncMonitor, RegisterMap as SyncRegisterMap};


#[cfg(all(test, feature = "async"))]
mod async_tests;
