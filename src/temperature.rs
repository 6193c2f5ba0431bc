/// The resolution of the sensor when in 12-bit mode.
pub const MAX_RESOLUTION_F32: f32 = 0.0625;
/// The resolution of the sensor when in 12-bit mode.
pub const MAX_RESOLUTION_F64: f64 = 0.0625;

/// How the sign of a negative reading is applied to [`Reading`]'s parts.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SignHandling {
    /// Matches the long-standing firmware decode.
    ///
    /// The MSB is inverted and the LSB is inverted and incremented without carrying into the MSB.
    /// Only the integer part is negated. The fractional part is always a positive magnitude, so
    /// -10.5 is reported as `-10` and `5`, and exact negative whole degrees (an LSB low nibble of
    /// zero) lose the carry.
    Legacy,
    /// Decodes the full 16-bit two's-complement value.
    ///
    /// Both parts are magnitudes of the same value. The integer part carries the sign, and
    /// [`Reading::negative`] marks readings between -1 and 0 whose integer part is zero.
    Corrected,
}

/// The decoded integer and fractional parts of a temperature register.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    /// The sign bit of the temperature register was set.
    pub negative: bool,
    /// Whole degrees Celsius.
    pub integer_part: i16,
    /// Tenths of a degree, truncated. Always in `0..=9`.
    pub fractional_part: u8,
}

impl Reading {
    /// Decodes the temperature register's LSB and MSB.
    pub fn from_bytes(low_sig: u8, high_sig: u8, sign_handling: SignHandling) -> Self {
        match sign_handling {
            SignHandling::Legacy => Reading::legacy(low_sig, high_sig),
            SignHandling::Corrected => Reading::corrected(low_sig, high_sig),
        }
    }

    fn legacy(low_sig: u8, high_sig: u8) -> Self {
        let negative = high_sig & 0x80 != 0;
        let (low_sig, high_sig) = if negative {
            ((!low_sig).wrapping_add(1), !high_sig)
        } else {
            (low_sig, high_sig)
        };

        let mut integer_part = (((high_sig & 0x07) << 4) | (low_sig >> 4)) as i16;
        if negative {
            integer_part = -integer_part;
        }
        Reading {
            negative,
            integer_part,
            fractional_part: tenths(low_sig),
        }
    }

    fn corrected(low_sig: u8, high_sig: u8) -> Self {
        let raw = i16::from_le_bytes([low_sig, high_sig]);
        let magnitude = raw.unsigned_abs();
        let whole = (magnitude >> 4) as i16;
        Reading {
            negative: raw < 0,
            integer_part: if raw < 0 { -whole } else { whole },
            fractional_part: tenths(magnitude as u8),
        }
    }
}

/// Sixteenths of a degree in the low nibble, as truncated tenths.
fn tenths(low_sig: u8) -> u8 {
    ((low_sig & 0x0F) as u16 * 625 / 1000) as u8
}

/// Represents a temperature reading from the sensor.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Temperature {
    raw: i16,
}

impl Temperature {
    pub fn from_bytes(low_sig: u8, high_sig: u8) -> Self {
        Temperature {
            raw: i16::from_le_bytes([low_sig, high_sig]),
        }
    }

    /// The raw register value, in sixteenths of a degree.
    pub fn raw(&self) -> i16 {
        self.raw
    }

    /// The integer part of the temperature measurement, truncated towards zero.
    pub fn integer_part(&self) -> i16 {
        self.raw / 16
    }

    /// The decimal part of the temperature measurement, in sixteenths of a degree.
    ///
    /// Has the same sign as the measurement. Can be multiplied by [`MAX_RESOLUTION_F32`] or
    /// [`MAX_RESOLUTION_F64`] to convert it to a floating point value.
    pub fn decimal_part(&self) -> i8 {
        (self.raw % 16) as i8
    }

    /// The measurement in thousandths of a degree, truncated towards zero.
    pub fn millidegrees(&self) -> i32 {
        self.raw as i32 * 625 / 10
    }

    /// The nearest integer of the temperature measurement.
    ///
    /// Calculated without performing floating-point operations. Halves round away from zero.
    pub fn nearest_integer(&self) -> i16 {
        let decimal = self.decimal_part();
        self.integer_part() + (decimal.signum() * (decimal.abs() >> 3)) as i16
    }
}

impl From<Temperature> for f32 {
    fn from(temp: Temperature) -> Self {
        temp.raw() as f32 * MAX_RESOLUTION_F32
    }
}

impl From<Temperature> for f64 {
    fn from(temp: Temperature) -> Self {
        temp.raw() as f64 * MAX_RESOLUTION_F64
    }
}
