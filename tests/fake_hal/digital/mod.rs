use super::concurrent;
use embedded_hal::digital::{self, ErrorKind, ErrorType, InputPin, OutputPin, PinState};

#[derive(Debug, PartialEq)]
pub enum Error {
    Disconnected,
}

impl digital::Error for Error {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// A level driven onto the line by the controller, stamped with the simulated clock.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    pub at_us: u64,
    pub state: PinState,
}

/// An open-drain line that replays a scripted sequence of sampled levels.
///
/// Every `is_high` or `is_low` call consumes the next entry of the data set with `set_data`. Once
/// the data is used up, the line reads as the default level (high, from the pull-up).
#[derive(Debug)]
pub struct Pin {
    data_to_read: Option<Vec<u8>>,
    name: &'static str,
    default_data: bool,
    disconnected: bool,
    edges: Vec<Edge>,
    samples: Vec<u64>,
}

impl Pin {
    pub fn new(name: &'static str) -> Pin {
        concurrent::set_named_value(name, 0);
        concurrent::reset_named_clock(name);
        Pin {
            data_to_read: None,
            name: name,
            default_data: true,
            disconnected: false,
            edges: Vec::new(),
            samples: Vec::new(),
        }
    }

    pub fn set_default_data(&mut self, default: bool) {
        self.default_data = default;
        self.data_to_read = None;
    }

    pub fn set_data(&mut self, data: Vec<u8>) {
        self.data_to_read = Some(data);
        concurrent::set_named_value(self.name, 0);
    }

    /// Makes every subsequent pin operation fail.
    pub fn disconnect(&mut self) {
        self.disconnected = true;
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Times at which the line was sampled.
    pub fn samples(&self) -> &[u64] {
        &self.samples
    }

    /// How many scripted levels have been consumed.
    pub fn reads(&self) -> usize {
        self.samples.len()
    }

    /// Each driven level and how long it was held, up to the current simulated time.
    pub fn phases(&self) -> Vec<(PinState, u64)> {
        let now = concurrent::get_named_clock(self.name);
        self.edges
            .iter()
            .enumerate()
            .map(|(i, edge)| {
                let end = self.edges.get(i + 1).map_or(now, |next| next.at_us);
                (edge.state, end - edge.at_us)
            })
            .collect()
    }

    fn sample(&mut self) -> Result<bool, Error> {
        if self.disconnected {
            return Err(Error::Disconnected);
        }
        self.samples.push(concurrent::get_named_clock(self.name));
        let data_index = concurrent::get_and_increment_named_value(self.name);
        Ok(self
            .data_to_read
            .as_ref()
            .and_then(|data| data.get(data_index))
            .map_or(self.default_data, |level| *level > 0))
    }

    fn drive(&mut self, state: PinState) -> Result<(), Error> {
        if self.disconnected {
            return Err(Error::Disconnected);
        }
        self.edges.push(Edge {
            at_us: concurrent::get_named_clock(self.name),
            state: state,
        });
        Ok(())
    }
}

impl ErrorType for Pin {
    type Error = Error;
}

impl InputPin for Pin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.sample()
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.sample().map(|high| !high)
    }
}

impl OutputPin for Pin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(PinState::Low)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(PinState::High)
    }
}
