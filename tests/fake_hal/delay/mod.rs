use super::concurrent;
use embedded_hal::delay::DelayNs;
use simple_ds18b20::timebase::FreeRunningCounter;

/// A delay that advances the named simulated clock instead of sleeping.
#[derive(Debug)]
pub struct Delay {
    name: &'static str,
    calls_us: Vec<u32>,
}

impl Delay {
    pub fn new(name: &'static str) -> Delay {
        Delay {
            name: name,
            calls_us: Vec::new(),
        }
    }

    /// Every requested delay, in microseconds.
    pub fn calls_us(&self) -> &[u32] {
        &self.calls_us
    }

    pub fn total_us(&self) -> u64 {
        self.calls_us.iter().map(|us| *us as u64).sum()
    }
}

impl DelayNs for Delay {
    fn delay_ns(&mut self, ns: u32) {
        self.delay_us((ns + 999) / 1000);
    }

    fn delay_us(&mut self, us: u32) {
        self.calls_us.push(us);
        concurrent::advance_named_clock(self.name, us as u64);
    }
}

#[derive(Debug, PartialEq)]
pub enum CounterError {
    NotStarted,
}

/// A free-running counter that ticks once per poll, advancing the named clock by 1us each time.
#[derive(Debug)]
pub struct Counter {
    name: &'static str,
    value: u16,
    started: bool,
    resets: usize,
}

impl Counter {
    pub fn new(name: &'static str) -> Counter {
        Counter {
            name: name,
            value: 0,
            started: false,
            resets: 0,
        }
    }

    pub fn resets(&self) -> usize {
        self.resets
    }

    pub fn is_started(&self) -> bool {
        self.started
    }
}

impl FreeRunningCounter for Counter {
    type Error = CounterError;

    fn start(&mut self) -> Result<(), Self::Error> {
        self.started = true;
        Ok(())
    }

    fn reset(&mut self) -> Result<(), Self::Error> {
        self.value = 0;
        self.resets += 1;
        Ok(())
    }

    fn count(&mut self) -> Result<u16, Self::Error> {
        if !self.started {
            return Err(CounterError::NotStarted);
        }
        self.value = self.value.wrapping_add(1);
        concurrent::advance_named_clock(self.name, 1);
        Ok(self.value)
    }
}
