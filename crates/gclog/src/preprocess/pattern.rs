//! Line-shape detection for multi-line constructs.
//!
//! Pure helpers used by [`super::group::Preprocessor`] to decide whether a
//! raw line starts a construct, continues the pending one, or ends it.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::parser::decorator::{DATESTAMP, UPTIME};
use crate::parser::grammar::SIZE;

static UNIFIED_GC_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^GC\((?P<id>\d+)\) (?P<body>.*)$").expect("Invalid unified gc id regex")
});

static UNIFIED_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Pause [A-Za-z ]+?(?: \([^()]*(?:\(\))?[^()]*\))*\s*$")
        .expect("Invalid unified start regex")
});

static UNIFIED_SUMMARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^(?P<head>Pause .+?)(?P<tail>(?: {SIZE}->{SIZE}\({SIZE}\))? -?\d+(?:[.,]\d+)? ?ms)\s*$"
    ))
    .expect("Invalid unified summary regex")
});

static UNIFIED_FRAGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:DefNew|Tenured|PSYoungGen|ParOldGen|PSOldGen|ParNew|CMS|Metaspace|(?:Eden|Survivor|Old|Archive|Humongous) regions): .+$",
    )
    .expect("Invalid unified fragment regex")
});

static UNIFIED_CPU: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^User=\S+s Sys=\S+s Real=\S+s\s*$").expect("Invalid unified cpu regex")
});

// 44.684: [Full GC (Allocation Failure) 44.684: [CMS44.877: [CMS-concurrent-mark: 1.508/2.428 secs]
static CMS_INTERLEAVED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\[CMS(?P<phase>(?:{DATESTAMP}: )?(?:{UPTIME}: )?\[CMS-concurrent-[a-z-]+: -?\d+[.,]\d+/-?\d+[.,]\d+ secs\](?: ?\[Times: [^\]]*\])?)\s*$"
    ))
    .expect("Invalid CMS interleaved regex")
});

static CMS_MODE_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\(concurrent mode (?:failure|interrupted)\)").expect("Invalid CMS mode regex")
});

static TIMES_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\[Times: user=[^\]]* secs\]\s*$").expect("Invalid times regex")
});

// 1.000: [GC (Allocation Failure) 1.000: [ParNew
static SPLIT_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^\[(?:Full GC|GC pause|GC)(?: \([^()]*(?:\(\))?[^()]*\))*(?: ?(?:{DATESTAMP}: )?(?:{UPTIME}: )?\[(?:ParNew|DefNew|PSYoungGen))?\s*$"
    ))
    .expect("Invalid split head regex")
});

// 1.240: Total time for which application threads were stopped: 0.0001234 seconds
static STOPPED_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?:{DATESTAMP}: )?(?:{UPTIME}: )?Total time for which application threads were stopped: "
    ))
    .expect("Invalid stopped time regex")
});

static TENURING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:Desired survivor size \d+ bytes, new threshold \d+ \(max \d+\)|- age +\d+: +\d+ bytes, +\d+ total)\s*$")
        .expect("Invalid tenuring regex")
});

static REMARK_PHASE_STAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?:{DATESTAMP}: )?{UPTIME}: \[")).expect("Invalid remark stamp regex")
});

static G1_ERGONOMICS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^\s*(?:{DATESTAMP}: )?(?:{UPTIME}: )?\[G1Ergonomics \("
    ))
    .expect("Invalid G1 ergonomics regex")
});

/// Splits a unified rest into its `GC(n)` id and the text after it.
pub(crate) fn unified_gc_id(rest: &str) -> Option<(u64, &str)> {
    let caps = UNIFIED_GC_ID.captures(rest)?;
    let id = caps.name("id")?.as_str().parse().ok()?;
    Some((id, caps.name("body")?.as_str()))
}

/// `Pause Young (Allocation Failure)` with no sizes or duration.
pub(crate) fn is_unified_start(body: &str) -> bool {
    UNIFIED_START.is_match(body)
}

/// Splits a unified summary into the pause description and the
/// `sizes duration` tail, keeping the tail's leading space.
pub(crate) fn unified_summary(body: &str) -> Option<(&str, &str)> {
    let caps = UNIFIED_SUMMARY.captures(body)?;
    Some((caps.name("head")?.as_str(), caps.name("tail")?.as_str()))
}

pub(crate) fn is_unified_fragment(body: &str) -> bool {
    UNIFIED_FRAGMENT.is_match(body)
}

pub(crate) fn is_unified_cpu(body: &str) -> bool {
    UNIFIED_CPU.is_match(body)
}

/// Byte offset where an interleaved CMS concurrent phase starts, when the
/// line is a CMS pause head cut by one.
pub(crate) fn cms_interleaved_phase(line: &str) -> Option<usize> {
    CMS_INTERLEAVED
        .captures(line)
        .and_then(|caps| caps.name("phase"))
        .map(|m| m.start())
}

pub(crate) fn is_cms_mode_end(line: &str) -> bool {
    CMS_MODE_END.is_match(line)
}

pub(crate) fn is_times_only(line: &str) -> bool {
    TIMES_ONLY.is_match(line)
}

pub(crate) fn is_split_head(rest: &str) -> bool {
    SPLIT_HEAD.is_match(rest)
}

/// Byte offset of a safepoint `Total time for which application threads
/// were stopped` record, decorator included, within `line`.
pub(crate) fn stopped_time_at(line: &str) -> Option<usize> {
    STOPPED_TIME.find(line).map(|m| m.start())
}

pub(crate) fn is_tenuring(line: &str) -> bool {
    TENURING.is_match(line)
}

/// A legacy event line closed with `secs]` but still missing its
/// `[Times: ...]` block.
pub(crate) fn awaits_trailer(rest: &str) -> bool {
    let trimmed = rest.trim_end();
    trimmed.starts_with('[') && trimmed.ends_with("secs]") && !trimmed.contains("[Times:")
}

/// An indented `[...]` detail line of a G1 pause.
pub(crate) fn is_detail(line: &str) -> bool {
    line.starts_with(char::is_whitespace) && line.trim_start().starts_with('[')
}

pub(crate) fn is_eden_detail(line: &str) -> bool {
    line.trim_start().starts_with("[Eden:")
}

pub(crate) fn is_g1_ergonomics(line: &str) -> bool {
    G1_ERGONOMICS.is_match(line)
}

/// Removes the timestamps printed in front of each sub-phase of a CMS or G1
/// remark.
pub(crate) fn strip_remark_stamps(rest: &str) -> Cow<'_, str> {
    let is_remark = rest.starts_with("[GC remark") || rest.contains("[YG occupancy:");
    if !is_remark {
        return Cow::Borrowed(rest);
    }
    REMARK_PHASE_STAMP.replace_all(rest, "[")
}
