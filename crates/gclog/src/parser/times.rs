//! CPU timing blocks and the parallelism ratio derived from them.

use serde::Serialize;

use super::units::{self, UnitError};

/// Thread CPU time and wall-clock time of a collection, in centiseconds.
///
/// Parsed from `[Times: user=0.02 sys=0.00, real=0.01 secs]` or the unified
/// `User=0.02s Sys=0.00s Real=0.01s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimesData {
    pub user_centis: i64,
    pub sys_centis: i64,
    pub real_centis: i64,
}

impl TimesData {
    pub fn new(user_centis: i64, sys_centis: i64, real_centis: i64) -> Self {
        Self {
            user_centis,
            sys_centis,
            real_centis,
        }
    }

    pub fn parse(user: &str, sys: &str, real: &str) -> Result<Self, UnitError> {
        Ok(Self::new(
            units::parse_centis(user)?,
            units::parse_centis(sys)?,
            units::parse_centis(real)?,
        ))
    }

    pub fn parallelism(&self) -> Option<f64> {
        parallelism(self.user_centis, self.sys_centis, self.real_centis)
    }
}

/// `(user + sys) / real`.
///
/// `None` when `real` is zero, the same value reported for events without
/// timing data.
pub fn parallelism(user: i64, sys: i64, real: i64) -> Option<f64> {
    if real == 0 {
        return None;
    }
    Some((user + sys) as f64 / real as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_times() {
        let times = TimesData::parse("0.02", "0.01", "0.01").unwrap();
        assert_eq!(times, TimesData::new(2, 1, 1));
        assert_eq!(times.parallelism(), Some(3.0));
    }

    #[test]
    fn test_parse_times_comma_decimals() {
        let times = TimesData::parse("1,20", "0,05", "0,50").unwrap();
        assert_eq!(times, TimesData::new(120, 5, 50));
        assert_eq!(times.parallelism(), Some(2.5));
    }

    #[test]
    fn test_zero_real_has_no_parallelism() {
        assert_eq!(parallelism(5, 1, 0), None);
        assert_eq!(TimesData::new(0, 0, 0).parallelism(), None);
    }

    #[test]
    fn test_parallelism_below_one() {
        assert_eq!(parallelism(1, 0, 4), Some(0.25));
    }

    #[test]
    fn test_parse_times_rejects_garbage() {
        assert!(TimesData::parse("x", "0.00", "0.01").is_err());
    }
}
