//! Turns the captures of a matched grammar into a typed [`Event`].
//!
//! Extraction is driven by capture names, never positions: any grammar that
//! names a `young_before`/`young_after`/`young_cap` triple gets a young block,
//! any grammar with `dur_ms` gets a millisecond duration, and so on.

use chrono::{DateTime, FixedOffset};
use regex::Captures;

use super::decorator::{self, Resolved};
use super::grammar::{Clock, CompiledGrammar, Derive};
use super::model::{CollectorKind, Event, EventKind, ExtractError, LogicalLine, MemoryBlock};
use super::times::TimesData;
use super::trigger::Trigger;
use super::units::{self, Memory};

/// Per-line inputs that do not come from the line itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchContext {
    /// Collector to report for shapes every collector prints identically.
    pub collector_hint: Option<CollectorKind>,
    /// JVM start, used to place datestamp-only decorators on the uptime axis.
    pub origin: Option<DateTime<FixedOffset>>,
}

struct RegionGroups {
    before: &'static str,
    after: &'static str,
    cap: &'static str,
    used: &'static str,
}

const YOUNG: RegionGroups = RegionGroups {
    before: "young_before",
    after: "young_after",
    cap: "young_cap",
    used: "young_used",
};
const OLD: RegionGroups = RegionGroups {
    before: "old_before",
    after: "old_after",
    cap: "old_cap",
    used: "old_used",
};
const COMBINED: RegionGroups = RegionGroups {
    before: "combined_before",
    after: "combined_after",
    cap: "combined_cap",
    used: "combined_used",
};
const CLASS: RegionGroups = RegionGroups {
    before: "class_before",
    after: "class_after",
    cap: "class_cap",
    used: "class_used",
};

pub(crate) fn extract(
    compiled: &CompiledGrammar,
    caps: &Captures<'_>,
    resolved: Option<&Resolved>,
    line: &LogicalLine,
    ctx: &MatchContext,
) -> Result<Event, ExtractError> {
    let grammar = &compiled.grammar;
    let kind = grammar.kind;

    let mut event = Event::bare(kind, line.number, line.text.clone());
    event.collector = match (grammar.collector, ctx.collector_hint) {
        (CollectorKind::Unknown, Some(hint)) if !kind.is_throwaway() => hint,
        (collector, _) => collector,
    };
    event.decorator = resolved.map(|r| r.decorator);

    if let Some(id) = caps.name("gc_id") {
        let id = id.as_str();
        event.gc_id = Some(id.parse().map_err(|_| ExtractError::GcId {
            kind,
            text: id.to_string(),
        })?);
    }

    event.duration_micros = duration(kind, caps)?;

    event.young = region(kind, caps, &YOUNG)?;
    event.old = region(kind, caps, &OLD)?;
    event.combined = region(kind, caps, &COMBINED)?;
    event.class_space = region(kind, caps, &CLASS)?;
    apply_derive(grammar.derive, kind, caps, &mut event)?;

    event.trigger = Trigger::resolve(
        compiled
            .trigger_groups
            .iter()
            .filter_map(|group| caps.name(group).map(|m| m.as_str())),
    );

    if let (Some(user), Some(sys), Some(real)) =
        (caps.name("user"), caps.name("sys"), caps.name("real"))
    {
        let times = TimesData::parse(user.as_str(), sys.as_str(), real.as_str()).map_err(
            |source| ExtractError::Unit {
                kind,
                group: "times".to_string(),
                source,
            },
        )?;
        event.times = Some(times);
    }

    if let Some(decorator) = event.decorator {
        let at = decorator.millis_since(ctx.origin);
        event.timestamp_ms = match grammar.clock {
            Clock::Start => at,
            Clock::End => decorator::derive_start(at, event.duration_micros),
        };
    }

    Ok(event)
}

fn duration(kind: EventKind, caps: &Captures<'_>) -> Result<i64, ExtractError> {
    let parsers: [(&str, fn(&str) -> Result<i64, units::UnitError>); 3] = [
        ("dur_secs", units::parse_seconds),
        ("dur_ms", units::parse_millis),
        ("dur_ns", units::parse_nanos),
    ];
    for (group, parse) in parsers {
        if let Some(m) = caps.name(group) {
            return parse(m.as_str()).map_err(|source| ExtractError::Unit {
                kind,
                group: group.to_string(),
                source,
            });
        }
    }
    Ok(0)
}

fn size(kind: EventKind, caps: &Captures<'_>, group: &'static str) -> Result<Memory, ExtractError> {
    let m = caps
        .name(group)
        .ok_or(ExtractError::MissingGroup { kind, group })?;
    units::parse_size(m.as_str()).map_err(|source| ExtractError::Unit {
        kind,
        group: group.to_string(),
        source,
    })
}

fn region(
    kind: EventKind,
    caps: &Captures<'_>,
    groups: &RegionGroups,
) -> Result<Option<MemoryBlock>, ExtractError> {
    if caps.name(groups.before).is_some() {
        return Ok(Some(MemoryBlock::new(
            size(kind, caps, groups.before)?,
            size(kind, caps, groups.after)?,
            size(kind, caps, groups.cap)?,
        )));
    }
    if caps.name(groups.used).is_some() {
        return Ok(Some(MemoryBlock::occupancy(
            size(kind, caps, groups.used)?,
            size(kind, caps, groups.cap)?,
        )));
    }
    Ok(None)
}

fn apply_derive(
    derive: Derive,
    kind: EventKind,
    caps: &Captures<'_>,
    event: &mut Event,
) -> Result<(), ExtractError> {
    match derive {
        Derive::None => {}
        Derive::OldFromCombined => {
            if let (Some(combined), Some(young)) = (event.combined, event.young) {
                event.old = Some(combined - young);
            }
        }
        Derive::YoungFromCombined => {
            if let (Some(combined), Some(old)) = (event.combined, event.old) {
                event.young = Some(combined - old);
            }
        }
        Derive::G1Details => {
            let eden_before = size(kind, caps, "eden_before")?;
            let eden_after = size(kind, caps, "eden_after")?;
            let eden_cap = size(kind, caps, "eden_cap")?;
            let surv_before = size(kind, caps, "surv_before")?;
            let surv_after = size(kind, caps, "surv_after")?;

            let young = MemoryBlock::new(
                eden_before + surv_before,
                eden_after + surv_after,
                eden_cap + surv_after,
            );
            event.young = Some(young);
            if let Some(combined) = event.combined {
                event.old = Some(combined - young);
            }
        }
    }
    Ok(())
}
