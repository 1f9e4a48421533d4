//! Leading timestamp resolution.
//!
//! Legacy logs prefix a line with `DATE: `, `UPTIME: ` or both
//! (`2016-10-26T08:49:51.540+0100: 2.345: [GC ...`). Unified logs carry
//! bracketed decorations (`[2.345s][info][gc] GC(3) ...`). The resolver
//! recognizes either, returns the decorator and the byte length of the
//! prefix, and leaves the rest of the line to the grammars.

use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset};
use regex::Regex;
use serde::Serialize;

use super::units;

/// Absolute datetime as printed by the JVM, `T` separated, with a numeric
/// offset or `Z`.
pub(crate) const DATESTAMP: &str =
    r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}[.,]\d{3}(?:[+-]\d{4}|Z)";

/// Seconds since JVM start with millisecond precision.
pub(crate) const UPTIME: &str = r"\d+[.,]\d{3}";

static LEGACY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^(?:(?P<datestamp>{DATESTAMP}): )?(?:(?P<uptime>{UPTIME}): )?"
    ))
    .expect("Invalid legacy decorator regex")
});

static UNIFIED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^(?:\[(?P<datestamp>{DATESTAMP})\])?(?:\[(?P<uptime>\d+[.,]\d+)s\])?(?:\[(?P<uptime_millis>\d+)ms\])?(?:\[[^\]]*\])* ?"
    ))
    .expect("Invalid unified decorator regex")
});

/// Which logging framework produced the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecoratorStyle {
    Legacy,
    Unified,
}

/// The timestamp carried by a line, in one of the four supported bases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "basis", rename_all = "snake_case")]
pub enum Decorator {
    /// Seconds since JVM start (`2.345: ` or `[2.345s]`).
    Uptime { millis: i64 },
    /// Milliseconds since JVM start (`[2345ms]`).
    UptimeMillis { millis: i64 },
    /// Absolute datetime only.
    Datestamp { at: DateTime<FixedOffset> },
    /// Absolute datetime followed by uptime.
    DatestampUptime { at: DateTime<FixedOffset>, millis: i64 },
}

impl Decorator {
    /// Milliseconds since JVM start, when the decorator carries them.
    pub fn relative_millis(&self) -> Option<i64> {
        match *self {
            Decorator::Uptime { millis }
            | Decorator::UptimeMillis { millis }
            | Decorator::DatestampUptime { millis, .. } => Some(millis),
            Decorator::Datestamp { .. } => None,
        }
    }

    pub fn datestamp(&self) -> Option<DateTime<FixedOffset>> {
        match *self {
            Decorator::Datestamp { at } | Decorator::DatestampUptime { at, .. } => Some(at),
            _ => None,
        }
    }

    /// Milliseconds since JVM start.
    ///
    /// A datestamp-only decorator is measured from `origin`; without an
    /// origin it resolves to 0.
    pub fn millis_since(&self, origin: Option<DateTime<FixedOffset>>) -> i64 {
        if let Some(millis) = self.relative_millis() {
            return millis;
        }
        match (self.datestamp(), origin) {
            (Some(at), Some(origin)) => (at - origin).num_milliseconds(),
            _ => 0,
        }
    }

    /// JVM start implied by this decorator, when it carries a datestamp.
    pub fn implied_origin(&self) -> Option<DateTime<FixedOffset>> {
        let at = self.datestamp()?;
        Some(at - chrono::Duration::milliseconds(self.relative_millis().unwrap_or(0)))
    }
}

/// Outcome of resolving a line's leading timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub decorator: Decorator,
    pub style: DecoratorStyle,
    /// Byte length of the prefix; the grammar matches `&line[prefix_len..]`.
    pub prefix_len: usize,
}

impl Resolved {
    pub fn rest<'a>(&self, line: &'a str) -> &'a str {
        &line[self.prefix_len..]
    }
}

/// Recognizes the decorator at the start of `line`.
///
/// Returns `None` when neither notation matches or when a matched datestamp
/// is not a valid calendar datetime.
pub fn resolve(line: &str) -> Option<Resolved> {
    if line.starts_with('[') {
        resolve_unified(line)
    } else {
        resolve_legacy(line)
    }
}

fn resolve_legacy(line: &str) -> Option<Resolved> {
    let caps = LEGACY.captures(line)?;
    let datestamp = caps.name("datestamp").map(|m| m.as_str());
    let uptime = caps.name("uptime").map(|m| m.as_str());
    let prefix_len = caps.get(0)?.end();

    let decorator = build(datestamp, uptime.map(units::parse_uptime_millis))?;
    Some(Resolved {
        decorator,
        style: DecoratorStyle::Legacy,
        prefix_len,
    })
}

fn resolve_unified(line: &str) -> Option<Resolved> {
    let caps = UNIFIED.captures(line)?;
    let datestamp = caps.name("datestamp").map(|m| m.as_str());
    let millis = match (caps.name("uptime"), caps.name("uptime_millis")) {
        (Some(up), _) => Some(units::parse_uptime_millis(up.as_str())),
        (None, Some(ms)) => Some(
            ms.as_str()
                .parse::<i64>()
                .map_err(|_| units::UnitError::InvalidDuration(ms.as_str().to_string())),
        ),
        (None, None) => None,
    };
    let prefix_len = caps.get(0)?.end();

    let mut decorator = build(datestamp, millis)?;
    if caps.name("uptime").is_none() {
        if let Decorator::Uptime { millis } = decorator {
            decorator = Decorator::UptimeMillis { millis };
        }
    }
    Some(Resolved {
        decorator,
        style: DecoratorStyle::Unified,
        prefix_len,
    })
}

fn build(
    datestamp: Option<&str>,
    millis: Option<Result<i64, units::UnitError>>,
) -> Option<Decorator> {
    let millis = match millis {
        Some(Ok(millis)) => Some(millis),
        Some(Err(_)) => return None,
        None => None,
    };
    let at = match datestamp {
        Some(text) => Some(parse_datestamp(text)?),
        None => None,
    };
    match (at, millis) {
        (Some(at), Some(millis)) => Some(Decorator::DatestampUptime { at, millis }),
        (Some(at), None) => Some(Decorator::Datestamp { at }),
        (None, Some(millis)) => Some(Decorator::Uptime { millis }),
        (None, None) => None,
    }
}

/// Parses `2016-10-26T08:49:51.540+0100` (also `,540` and `Z`).
pub fn parse_datestamp(text: &str) -> Option<DateTime<FixedOffset>> {
    let mut normalized = text.replace(',', ".");
    if normalized.ends_with('Z') {
        normalized.pop();
        normalized.push_str("+0000");
    }
    DateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.3f%z").ok()
}

/// Start time of an event logged at `end_millis` that lasted `duration_micros`.
pub fn derive_start(end_millis: i64, duration_micros: i64) -> i64 {
    end_millis - units::micros_to_millis(duration_micros)
}
