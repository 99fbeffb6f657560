use std::{fmt, str::FromStr};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid time format: {input:?}")]
pub struct TimeFormatError {
    pub input: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeOfDay {
    pub hours: u8,
    pub minutes: u8,
}

impl TimeOfDay {
    pub fn new(hours: u8, minutes: u8) -> Option<Self> {
        (hours < 24 && minutes < 60).then_some(Self { hours, minutes })
    }
}

/// Parses `HH:MM` (one or two digits per field).
pub fn parse_time(input: &str) -> Result<TimeOfDay, TimeFormatError> {
    let err = || TimeFormatError {
        input: input.to_string(),
    };

    let (hours, minutes) = input.trim().split_once(':').ok_or_else(err)?;
    let hours = parse_field(hours).ok_or_else(err)?;
    let minutes = parse_field(minutes).ok_or_else(err)?;
    TimeOfDay::new(hours, minutes).ok_or_else(err)
}

fn parse_field(field: &str) -> Option<u8> {
    if field.is_empty() || field.len() > 2 || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

pub fn format_time(hours: u8, minutes: u8) -> String {
    format!("{hours:02}:{minutes:02}")
}

pub fn format_time_12h(hours: u8, minutes: u8) -> String {
    let period = if hours >= 12 { "pm" } else { "am" };
    let hours = match hours % 12 {
        0 => 12,
        h => h,
    };
    format!("{hours}:{minutes:02} {period}")
}

pub fn next_hour(hour: u8) -> u8 {
    if hour >= 23 { 0 } else { hour + 1 }
}

impl FromStr for TimeOfDay {
    type Err = TimeFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_time(s)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_time(self.hours, self.minutes))
    }
}

const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

pub fn day_name(day: u8) -> Option<&'static str> {
    DAY_NAMES.get(usize::from(day)).copied()
}

const FULL_DAY_NAMES: [&str; 7] = [
    "sunday",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
];

/// Accepts a weekday number (`0`-`6`, Sunday first) or a prefix of at least
/// three letters of a day name, such as `mon`, `tues` or `Wednesday`.
pub fn parse_day(input: &str) -> Option<u8> {
    let input = input.trim();
    if let Ok(day) = input.parse::<u8>() {
        return (day < 7).then_some(day);
    }
    if input.len() < 3 {
        return None;
    }
    let lower = input.to_ascii_lowercase();
    FULL_DAY_NAMES
        .iter()
        .position(|name| name.starts_with(&lower))
        .and_then(|idx| u8::try_from(idx).ok())
}
