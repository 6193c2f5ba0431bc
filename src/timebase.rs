use core::convert::Infallible;
use embedded_hal::delay::DelayNs;

/// A blocking source of microsecond delays.
///
/// The single-wire protocol is timed entirely by this trait. Implementations must block for *at
/// least* the requested number of microseconds.
pub trait TimeBase {
    type Error;

    /// Prepares the time base for use. Called once when a driver is constructed.
    fn start(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Blocks until at least `us` microseconds have passed.
    fn delay_us(&mut self, us: u16) -> Result<(), Self::Error>;
}

impl<T: TimeBase + ?Sized> TimeBase for &mut T {
    type Error = T::Error;

    fn start(&mut self) -> Result<(), Self::Error> {
        (**self).start()
    }

    fn delay_us(&mut self, us: u16) -> Result<(), Self::Error> {
        (**self).delay_us(us)
    }
}

/// A free-running hardware counter, such as a general purpose timer's `CNT` register.
///
/// The counter must increment exactly once per microsecond, and must not wrap within any single
/// delay requested from a [`CounterDelay`] (at most 7500us for the DS18B20 driver).
pub trait FreeRunningCounter {
    type Error;

    /// Enables the counter.
    fn start(&mut self) -> Result<(), Self::Error>;

    /// Sets the counter back to zero.
    fn reset(&mut self) -> Result<(), Self::Error>;

    /// The current counter value.
    fn count(&mut self) -> Result<u16, Self::Error>;
}

impl<C: FreeRunningCounter + ?Sized> FreeRunningCounter for &mut C {
    type Error = C::Error;

    fn start(&mut self) -> Result<(), Self::Error> {
        (**self).start()
    }

    fn reset(&mut self) -> Result<(), Self::Error> {
        (**self).reset()
    }

    fn count(&mut self) -> Result<u16, Self::Error> {
        (**self).count()
    }
}

/// Busy-waits on a [`FreeRunningCounter`].
///
/// Every delay resets the counter, so the counter cannot be shared with anything else that
/// depends on its value while a delay is in progress.
#[derive(Debug)]
pub struct CounterDelay<C> {
    counter: C,
}

impl<C: FreeRunningCounter> CounterDelay<C> {
    pub fn new(counter: C) -> Self {
        CounterDelay { counter }
    }

    /// Returns the wrapped counter.
    pub fn release(self) -> C {
        self.counter
    }

    /// Completes once the counter has passed `us` since the last reset.
    fn poll_elapsed(&mut self, us: u16) -> nb::Result<(), C::Error> {
        let count = self.counter.count().map_err(nb::Error::Other)?;
        if count <= us {
            return Err(nb::Error::WouldBlock);
        }
        Ok(())
    }
}

impl<C: FreeRunningCounter> TimeBase for CounterDelay<C> {
    type Error = C::Error;

    fn start(&mut self) -> Result<(), Self::Error> {
        self.counter.start()
    }

    fn delay_us(&mut self, us: u16) -> Result<(), Self::Error> {
        self.counter.reset()?;
        nb::block!(self.poll_elapsed(us))
    }
}

/// Uses any `embedded-hal` delay as a time base.
#[derive(Debug)]
pub struct HalDelay<D> {
    delay: D,
}

impl<D: DelayNs> HalDelay<D> {
    pub fn new(delay: D) -> Self {
        HalDelay { delay }
    }

    /// Returns the wrapped delay.
    pub fn release(self) -> D {
        self.delay
    }
}

impl<D: DelayNs> TimeBase for HalDelay<D> {
    type Error = Infallible;

    fn delay_us(&mut self, us: u16) -> Result<(), Self::Error> {
        self.delay.delay_us(us as u32);
        Ok(())
    }
}
