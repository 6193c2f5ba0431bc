use crate::timebase::TimeBase;
use embedded_hal::digital::{InputPin, OutputPin};

const RESET_TIME_US: u16 = 480;
// The sensor waits 15-60us after the line is released, then holds it low for 60-240us.
const PRESENCE_SAMPLE_DELAY_US: u16 = 70;
const POST_PRESENCE_SAMPLE_DELAY_US: u16 = 410;

const WRITE_1_LOW_US: u16 = 10;
const WRITE_1_HIGH_US: u16 = 65;
const WRITE_0_LOW_US: u16 = 65;
const WRITE_0_HIGH_US: u16 = 10;

const READ_REQUEST_DURATION_US: u16 = 5;
const READ_SAMPLE_DELAY_US: u16 = 5;
const READ_POST_SAMPLE_DELAY_US: u16 = 55;

/// Duration of a single write slot, low and high phases included.
pub const WRITE_SLOT_DURATION_US: u16 = WRITE_1_LOW_US + WRITE_1_HIGH_US;

#[derive(Debug, PartialEq)]
pub enum Error<TPinError, TTimeError> {
    /// Wrapped error from the GPIO line.
    WrappedPin(TPinError),
    /// Wrapped error from the time base.
    WrappedTime(TTimeError),
}

/// A single-wire bus on one open-drain GPIO line.
///
/// Driving the line high releases it to the pull-up, which lets the device pull it low during
/// presence and read slots.
#[derive(Debug)]
pub struct OneWire<P, T> {
    pin: P,
    time_base: T,
}

impl<P, T> OneWire<P, T>
where
    P: InputPin + OutputPin,
    T: TimeBase,
{
    pub fn new(pin: P, time_base: T) -> Self {
        OneWire { pin, time_base }
    }

    /// Returns the line and the time base.
    pub fn release(self) -> (P, T) {
        (self.pin, self.time_base)
    }

    pub(crate) fn time_base(&mut self) -> &mut T {
        &mut self.time_base
    }

    /// Sends a reset pulse and checks for the device's presence pulse.
    ///
    /// Returns true only if the line was low at the first sample (the device is pulling it down)
    /// and high again at the second (the device has let go). A line that satisfies only one of
    /// those, such as one stuck low, is reported as absent.
    pub fn reset_pulse(&mut self) -> Result<bool, Error<P::Error, T::Error>> {
        self.set_low()?;
        self.delay(RESET_TIME_US)?;
        self.set_high()?;
        self.delay(PRESENCE_SAMPLE_DELAY_US)?;

        let pulled_low = self.pin.is_low().map_err(Error::WrappedPin)?;
        self.delay(POST_PRESENCE_SAMPLE_DELAY_US)?;
        let released = self.pin.is_high().map_err(Error::WrappedPin)?;

        let present = pulled_low && released;
        trace!("reset pulse: low={} high={} present={}", pulled_low, released, present);
        Ok(present)
    }

    /// Writes a single bit in one 75us slot.
    pub fn write_bit(&mut self, bit: bool) -> Result<(), Error<P::Error, T::Error>> {
        let (low_us, high_us) = if bit {
            (WRITE_1_LOW_US, WRITE_1_HIGH_US)
        } else {
            (WRITE_0_LOW_US, WRITE_0_HIGH_US)
        };
        self.set_low()?;
        self.delay(low_us)?;
        self.set_high()?;
        self.delay(high_us)
    }

    /// Reads a single bit.
    pub fn read_bit(&mut self) -> Result<bool, Error<P::Error, T::Error>> {
        // Request bit.
        self.set_low()?;
        self.delay(READ_REQUEST_DURATION_US)?;
        self.set_high()?;

        self.delay(READ_SAMPLE_DELAY_US)?;
        let bit = self.pin.is_high().map_err(Error::WrappedPin)?;

        // Wait out the rest of the slot, whenever the device let go of the line.
        self.delay(READ_POST_SAMPLE_DELAY_US)?;
        Ok(bit)
    }

    /// Writes a byte, least-significant bit first.
    pub fn write_byte(&mut self, byte: u8) -> Result<(), Error<P::Error, T::Error>> {
        let mut byte = byte;
        for _ in 0..8 {
            self.write_bit(byte & 1 != 0)?;
            byte >>= 1;
        }
        Ok(())
    }

    /// Reads a byte, least-significant bit first.
    pub fn read_byte(&mut self) -> Result<u8, Error<P::Error, T::Error>> {
        let mut byte = 0u8;
        for _ in 0..8 {
            byte >>= 1;
            if self.read_bit()? {
                byte |= 0x80;
            }
        }
        Ok(byte)
    }

    /// Fills `buffer` with consecutive bytes from the line.
    pub fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<(), Error<P::Error, T::Error>> {
        for byte in buffer.iter_mut() {
            *byte = self.read_byte()?;
        }
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Error<P::Error, T::Error>> {
        self.pin.set_low().map_err(Error::WrappedPin)
    }

    fn set_high(&mut self) -> Result<(), Error<P::Error, T::Error>> {
        self.pin.set_high().map_err(Error::WrappedPin)
    }

    fn delay(&mut self, us: u16) -> Result<(), Error<P::Error, T::Error>> {
        self.time_base.delay_us(us).map_err(Error::WrappedTime)
    }
}
