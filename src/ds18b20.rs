use crate::onewire::{self, OneWire};
use crate::temperature::{Reading, SignHandling, Temperature};
use crate::timebase::TimeBase;
use embedded_hal::digital::{InputPin, OutputPin};

/// The size of the sensor's scratchpad memory, in bytes.
pub const SCRATCHPAD_SIZE: usize = 9;

// The 750ms worst-case 12-bit conversion, split so each delay fits a 16-bit counter.
const CONVERSION_WAIT_STEP_US: u16 = 7_500;
const CONVERSION_WAIT_STEPS: u8 = 100;

#[derive(Debug, PartialEq)]
pub enum Error<TPinError, TTimeError> {
    /// Wrapped error from the GPIO line.
    WrappedPin(TPinError),
    /// Wrapped error from the time base.
    WrappedTime(TTimeError),
    /// No presence pulse followed the reset that opens the given phase.
    ///
    /// Only returned with [`PresencePolicy::Abort`].
    BusAbsent(Phase),
}

impl<TPinError, TTimeError> From<onewire::Error<TPinError, TTimeError>>
    for Error<TPinError, TTimeError>
{
    fn from(error: onewire::Error<TPinError, TTimeError>) -> Self {
        match error {
            onewire::Error::WrappedPin(err) => Error::WrappedPin(err),
            onewire::Error::WrappedTime(err) => Error::WrappedTime(err),
        }
    }
}

/// The reset-delimited phases of a temperature read.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Skip ROM, Convert T, then the conversion wait.
    Convert,
    /// Skip ROM, Read Scratchpad, then the nine scratchpad bytes.
    ReadScratchpad,
    /// The final reset that returns the bus to idle.
    Release,
}

/// What to do when a reset is not answered by a presence pulse.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PresencePolicy {
    /// Skip that phase's commands and carry on with the next phase.
    ///
    /// The scratchpad and decoded values keep their previous contents if the read phase is
    /// skipped. Check [`ReadOutcome::is_fresh`].
    Continue,
    /// Stop the read and return [`Error::BusAbsent`].
    Abort,
}

/// Options to modify the behavior of the DS18B20 driver.
#[derive(Clone, Copy, Debug)]
pub struct Options {
    pub presence_policy: PresencePolicy,
    /// How [`Ds18b20::integer_part`] and [`Ds18b20::fractional_part`] treat negative readings.
    ///
    /// [`Ds18b20::temperature`] is exact in either mode.
    pub sign_handling: SignHandling,
}

pub const DEFAULT_OPTIONS: Options = Options {
    presence_policy: PresencePolicy::Continue,
    sign_handling: SignHandling::Legacy,
};

/// The presence result of each phase of [`Ds18b20::read_temperature`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReadOutcome {
    /// The sensor answered the first reset and was asked to convert.
    pub conversion_started: bool,
    /// The sensor answered the second reset and the scratchpad was read.
    pub scratchpad_fresh: bool,
    /// The sensor answered the final reset.
    pub bus_released: bool,
}

impl ReadOutcome {
    /// Whether the scratchpad and decoded values were updated by this read.
    ///
    /// This does not imply that the sensor performed a new conversion. If only the first reset
    /// went unanswered, the scratchpad holds whatever the sensor converted last.
    pub fn is_fresh(&self) -> bool {
        self.scratchpad_fresh
    }
}

// Necessary access sequence:
// 1. Initialization.
// 2. ROM command (followed by required data, if any).
// 3. DS18B20 function command (followed by data, if any).

/// Administrative commands for operating the 1-bit data line.
#[derive(Clone, Copy, Debug)]
pub enum RomCommand {
    /// Addresses all devices simultaneously.
    ///
    /// The only addressing mode this driver uses, since it expects exactly one device on the line.
    Skip = 0xCC,
}

/// Requests the sensor perform some operation.
///
/// These commands can only be sent after a [`RomCommand`].
#[derive(Clone, Copy, Debug)]
pub enum FunctionCommand {
    /// Stores the current temperature in the 2-byte temperature register in the scratchpad memory.
    ///
    /// After this command, the sensor returns to its low-power state.
    ConvertTemperature = 0x44,
    /// Reads the contents of the sensor's scratchpad.
    ///
    /// Bytes:
    ///
    /// 1. Byte 0: Temperature least-significant byte.
    /// 2. Byte 1: Temperature most-significant byte.
    /// 3. Byte 2: High temperature threshold for the alarm (T<sub>H</sub>).
    /// 4. Byte 3: Low temperature threshold for the alarm (T<sub>L</sub>).
    /// 5. Byte 4: Configuration.
    /// 6. Byte 5: Reserved (0xFF)
    /// 7. Byte 6: Reserved
    /// 8. Byte 7: Reserved (0x10)
    /// 9. Byte 8: The CRC byte.
    ReadScratchpad = 0xBE,
}

/// A DS18B20 alone on a dedicated single-wire line.
///
/// Holds the most recent scratchpad contents and the values decoded from them. Neither is
/// cleared when a read fails, so check the [`ReadOutcome`] of each read before trusting them.
#[derive(Debug)]
pub struct Ds18b20<P, T> {
    bus: OneWire<P, T>,
    options: Options,
    scratchpad: [u8; SCRATCHPAD_SIZE],
    temperature: i32,
    reading: Reading,
}

impl<P, T> Ds18b20<P, T>
where
    P: InputPin + OutputPin,
    T: TimeBase,
{
    /// Binds the driver to a GPIO line and starts the time base.
    ///
    /// The line must be open-drain with a pull-up, and the time base must count microseconds.
    /// Both may be lent by `&mut` reference if the rest of the firmware needs them back. If
    /// options is `None`, then [`DEFAULT_OPTIONS`] are used.
    pub fn new(
        pin: P,
        mut time_base: T,
        options: Option<Options>,
    ) -> Result<Ds18b20<P, T>, Error<P::Error, T::Error>> {
        time_base.start().map_err(Error::WrappedTime)?;
        Ok(Ds18b20 {
            bus: OneWire::new(pin, time_base),
            options: options.unwrap_or(DEFAULT_OPTIONS),
            scratchpad: [0u8; SCRATCHPAD_SIZE],
            temperature: 0,
            reading: Reading {
                negative: false,
                integer_part: 0,
                fractional_part: 0,
            },
        })
    }

    /// Returns the GPIO line and the time base.
    pub fn release(self) -> (P, T) {
        self.bus.release()
    }

    /// Direct access to the link and byte layers.
    pub fn bus(&mut self) -> &mut OneWire<P, T> {
        &mut self.bus
    }

    /// Runs a full conversion and scratchpad read.
    ///
    /// Blocks for a little over 750ms while the sensor converts. Each of the three resets in the
    /// sequence is checked for a presence pulse; with [`PresencePolicy::Continue`] an unanswered
    /// reset only skips the commands of its own phase, and the result of every check is
    /// reported in the returned [`ReadOutcome`].
    pub fn read_temperature(&mut self) -> Result<ReadOutcome, Error<P::Error, T::Error>> {
        let conversion_started = self.begin_phase(Phase::Convert)?;
        if conversion_started {
            self.bus.write_byte(RomCommand::Skip as u8)?;
            self.bus
                .write_byte(FunctionCommand::ConvertTemperature as u8)?;
            self.wait_for_conversion()?;
        }

        let scratchpad_fresh = self.begin_phase(Phase::ReadScratchpad)?;
        if scratchpad_fresh {
            self.bus.write_byte(RomCommand::Skip as u8)?;
            self.bus
                .write_byte(FunctionCommand::ReadScratchpad as u8)?;
            self.bus.read_bytes(&mut self.scratchpad)?;
            self.decode();
        }

        let bus_released = self.begin_phase(Phase::Release)?;

        Ok(ReadOutcome {
            conversion_started,
            scratchpad_fresh,
            bus_released,
        })
    }

    /// The last temperature read, in thousandths of a degree Celsius.
    pub fn temperature(&self) -> i32 {
        self.temperature
    }

    /// Whole degrees of the last temperature read, per [`Options::sign_handling`].
    pub fn integer_part(&self) -> i16 {
        self.reading.integer_part
    }

    /// Tenths of a degree of the last temperature read, per [`Options::sign_handling`].
    pub fn fractional_part(&self) -> u8 {
        self.reading.fractional_part
    }

    /// Whether the last temperature read was below zero.
    pub fn is_negative(&self) -> bool {
        self.reading.negative
    }

    pub fn reading(&self) -> Reading {
        self.reading
    }

    /// The exact last temperature read.
    pub fn exact_temperature(&self) -> Temperature {
        Temperature::from_bytes(self.scratchpad[0], self.scratchpad[1])
    }

    /// The raw scratchpad from the last successful read.
    pub fn scratchpad(&self) -> &[u8; SCRATCHPAD_SIZE] {
        &self.scratchpad
    }

    pub fn options(&self) -> Options {
        self.options
    }

    /// Sends a reset and applies the presence policy to its result.
    fn begin_phase(&mut self, phase: Phase) -> Result<bool, Error<P::Error, T::Error>> {
        let present = self.bus.reset_pulse()?;
        if !present {
            if self.options.presence_policy == PresencePolicy::Abort {
                warn!("no presence pulse, aborting read");
                return Err(Error::BusAbsent(phase));
            }
            if phase != Phase::Release {
                warn!("no presence pulse, skipping phase");
            }
        }
        Ok(present)
    }

    fn wait_for_conversion(&mut self) -> Result<(), Error<P::Error, T::Error>> {
        let time_base = self.bus.time_base();
        for _ in 0..CONVERSION_WAIT_STEPS {
            time_base
                .delay_us(CONVERSION_WAIT_STEP_US)
                .map_err(Error::WrappedTime)?;
        }
        Ok(())
    }

    fn decode(&mut self) {
        let (low_sig, high_sig) = (self.scratchpad[0], self.scratchpad[1]);
        self.reading = Reading::from_bytes(low_sig, high_sig, self.options.sign_handling);
        self.temperature = Temperature::from_bytes(low_sig, high_sig).millidegrees();
        debug!(
            "decoded {}mC (integer {}, fraction {})",
            self.temperature,
            self.reading.integer_part,
            self.reading.fractional_part
        );
    }
}
