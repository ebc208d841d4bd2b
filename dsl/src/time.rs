//! Time and date literal values.
//!
//! The values are kept as the individual fields written in the source
//! rather than as an absolute instant so that the output describes exactly
//! what the literal said (there is no calendar validation).
use serde::Serialize;

/// A duration literal (`T#1H30M`) normalized so that each field is below
/// the next larger unit except for the hour.
///
/// See section 2.2.3.1.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize)]
pub struct Duration {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub millisecond: u16,
}

impl Duration {
    pub fn new(hour: u8, minute: u8, second: u8, millisecond: u16) -> Self {
        Self {
            hour,
            minute,
            second,
            millisecond,
        }
    }

    /// Returns the total length of the duration in milliseconds.
    ///
    /// ```rust
    /// use ironil_dsl::time::Duration;
    /// assert_eq!(Duration::new(0, 1, 30, 0).total_milliseconds(), 90_000);
    /// ```
    pub fn total_milliseconds(&self) -> u64 {
        (((self.hour as u64 * 60 + self.minute as u64) * 60) + self.second as u64) * 1_000
            + self.millisecond as u64
    }
}

/// A time of day literal (`TOD#12:30:00.250`).
///
/// See section 2.2.3.2.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize)]
pub struct TimeOfDay {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub millisecond: u16,
}

impl TimeOfDay {
    pub fn new(hour: u8, minute: u8, second: u8, millisecond: u16) -> Self {
        Self {
            hour,
            minute,
            second,
            millisecond,
        }
    }
}

/// A calendar date literal (`D#2023-01-31`).
///
/// See section 2.2.3.2.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize)]
pub struct Date {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl Date {
    pub fn new(year: u16, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }
}

/// A date and time literal (`DT#2023-01-31-12:30:00`).
///
/// See section 2.2.3.2.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize)]
pub struct DateAndTime {
    pub date: Date,
    pub time: TimeOfDay,
}

impl DateAndTime {
    pub fn new(date: Date, time: TimeOfDay) -> Self {
        Self { date, time }
    }
}
