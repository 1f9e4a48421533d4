//! Size and duration normalization.
//!
//! Every size in an event is carried in kilobytes and every duration in
//! microseconds. Durations are scaled from their decimal text without
//! going through floating point, so `0.0010000 secs` is exactly 1000 µs.

use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while normalizing a captured size or duration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UnitError {
    #[error("Invalid size: {0:?}")]
    InvalidSize(String),

    #[error("Invalid duration: {0:?}")]
    InvalidDuration(String),

    #[error("Unknown unit: {0:?}")]
    UnknownUnit(String),
}

/// Unit letter of a memory size in the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SizeUnit {
    Bytes,
    Kilobytes,
    Megabytes,
    Gigabytes,
}

impl SizeUnit {
    pub fn from_suffix(suffix: char) -> Option<Self> {
        match suffix.to_ascii_uppercase() {
            'B' => Some(SizeUnit::Bytes),
            'K' => Some(SizeUnit::Kilobytes),
            'M' => Some(SizeUnit::Megabytes),
            'G' => Some(SizeUnit::Gigabytes),
            _ => None,
        }
    }

    /// How many kilobytes one of this unit is worth.
    pub fn kilobytes(self) -> f64 {
        match self {
            SizeUnit::Bytes => 1.0 / 1024.0,
            SizeUnit::Kilobytes => 1.0,
            SizeUnit::Megabytes => 1024.0,
            SizeUnit::Gigabytes => 1024.0 * 1024.0,
        }
    }
}

/// A memory size in kilobytes.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Memory(i64);

impl Memory {
    pub const ZERO: Memory = Memory(0);

    pub const fn from_kilobytes(kilobytes: i64) -> Self {
        Memory(kilobytes)
    }

    /// Converts `value` of `unit` to kilobytes, rounding to the nearest whole KB.
    pub fn new(value: f64, unit: SizeUnit) -> Self {
        Memory((value * unit.kilobytes()).round() as i64)
    }

    pub const fn kilobytes(self) -> i64 {
        self.0
    }

    /// The value expressed in `unit` (inverse of [`Memory::new`]).
    pub fn in_unit(self, unit: SizeUnit) -> f64 {
        self.0 as f64 / unit.kilobytes()
    }
}

impl Add for Memory {
    type Output = Memory;

    fn add(self, rhs: Memory) -> Memory {
        Memory(self.0 + rhs.0)
    }
}

impl Sub for Memory {
    type Output = Memory;

    fn sub(self, rhs: Memory) -> Memory {
        Memory(self.0 - rhs.0)
    }
}

impl fmt::Display for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}K", self.0)
    }
}

/// Parses a size token such as `1024K`, `1.5M`, `3072.0K` or `1000 K`.
///
/// Both `.` and `,` are accepted as the decimal separator.
pub fn parse_size(text: &str) -> Result<Memory, UnitError> {
    let trimmed = text.trim();
    let suffix = trimmed
        .chars()
        .last()
        .ok_or_else(|| UnitError::InvalidSize(text.to_string()))?;

    if suffix.is_ascii_digit() {
        return Err(UnitError::InvalidSize(text.to_string()));
    }
    let unit =
        SizeUnit::from_suffix(suffix).ok_or_else(|| UnitError::UnknownUnit(suffix.to_string()))?;

    let number = trimmed[..trimmed.len() - suffix.len_utf8()]
        .trim_end()
        .replace(',', ".");
    let value: f64 = number
        .parse()
        .map_err(|_| UnitError::InvalidSize(text.to_string()))?;

    Ok(Memory::new(value, unit))
}

/// Parses seconds (`0.0047930`, `-0,0005950`) into microseconds.
pub fn parse_seconds(text: &str) -> Result<i64, UnitError> {
    scale_decimal(text, 6).ok_or_else(|| UnitError::InvalidDuration(text.to_string()))
}

/// Parses milliseconds (`3.867`, `0.419`) into microseconds.
pub fn parse_millis(text: &str) -> Result<i64, UnitError> {
    scale_decimal(text, 3).ok_or_else(|| UnitError::InvalidDuration(text.to_string()))
}

/// Parses nanoseconds into microseconds, rounding half up.
pub fn parse_nanos(text: &str) -> Result<i64, UnitError> {
    let nanos = scale_decimal(text, 0).ok_or_else(|| UnitError::InvalidDuration(text.to_string()))?;
    Ok(round_div(nanos, 1000))
}

/// Parses a seconds value with two decimals into centiseconds (`user=0.01`).
pub fn parse_centis(text: &str) -> Result<i64, UnitError> {
    scale_decimal(text, 2).ok_or_else(|| UnitError::InvalidDuration(text.to_string()))
}

/// Parses an uptime in seconds (`2.345`) into milliseconds.
pub fn parse_uptime_millis(text: &str) -> Result<i64, UnitError> {
    scale_decimal(text, 3).ok_or_else(|| UnitError::InvalidDuration(text.to_string()))
}

/// Converts microseconds to milliseconds, rounding half away from zero.
pub fn micros_to_millis(micros: i64) -> i64 {
    round_div(micros, 1000)
}

fn round_div(value: i64, divisor: i64) -> i64 {
    let half = divisor / 2;
    if value >= 0 {
        (value + half) / divisor
    } else {
        -((-value + half) / divisor)
    }
}

/// Multiplies the decimal `text` by 10^`scale` and rounds half away from zero
/// on the first dropped digit.
fn scale_decimal(text: &str, scale: u32) -> Option<i64> {
    let text = text.trim();
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let (whole, fraction) = match digits.find(['.', ',']) {
        Some(idx) => (&digits[..idx], &digits[idx + 1..]),
        None => (digits, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    let mut value: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut frac_digits = fraction.bytes();
    for _ in 0..scale {
        let digit = frac_digits.next().map(|b| i64::from(b - b'0')).unwrap_or(0);
        value = value.checked_mul(10)?.checked_add(digit)?;
    }
    if let Some(next) = frac_digits.next() {
        if next >= b'5' {
            value = value.checked_add(1)?;
        }
    }

    Some(if negative { -value } else { value })
}
