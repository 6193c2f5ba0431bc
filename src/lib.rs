#![cfg_attr(not(test), no_std)]

#[cfg(all(feature = "defmt", feature = "log"))]
compile_error!("Features \"defmt\" and \"log\" are mutually exclusive and cannot be enabled together");

#[macro_use]
mod fmt;

/// Driver for the DS18B20 digital thermometer on a dedicated single-wire line.
///
/// Refer to [this datasheet](https://datasheets.maximintegrated.com/en/ds/DS18B20.pdf) for more
/// information about the device.
pub mod ds18b20;
/// Bit-banged single-wire link and byte layers.
pub mod onewire;
/// Decoding of the DS18B20 temperature register.
pub mod temperature;
/// Blocking microsecond time bases.
pub mod timebase;
