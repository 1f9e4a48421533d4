use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::decorator::Decorator;
use super::times::TimesData;
use super::trigger::Trigger;
use super::units::{Memory, UnitError};

/// One physical line of input, numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    pub number: usize,
    pub text: String,
}

impl RawLine {
    pub fn new(number: usize, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }
}

/// How a logical line came out of the preprocessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineOrigin {
    /// One raw line, passed through (possibly normalized in place).
    Single,
    /// Several raw lines folded into one.
    Merged,
    /// A raw line released unmodified from an abandoned block.
    Abandoned,
}

/// One line as seen by the matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    /// Number of the first raw line it was built from.
    pub number: usize,
    pub text: String,
    /// How many raw lines it covers.
    pub raw_lines: usize,
    pub origin: LineOrigin,
}

impl LogicalLine {
    pub fn single(raw: RawLine) -> Self {
        Self {
            number: raw.number,
            text: raw.text,
            raw_lines: 1,
            origin: LineOrigin::Single,
        }
    }
}

/// Collector family an event belongs to.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CollectorKind {
    Serial,
    ParallelScavenge,
    ParallelSerialOld,
    ParallelOld,
    Cms,
    G1,
    Shenandoah,
    #[default]
    Unknown,
}

impl CollectorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectorKind::Serial => "serial",
            CollectorKind::ParallelScavenge => "parallel_scavenge",
            CollectorKind::ParallelSerialOld => "parallel_serial_old",
            CollectorKind::ParallelOld => "parallel_old",
            CollectorKind::Cms => "cms",
            CollectorKind::G1 => "g1",
            CollectorKind::Shenandoah => "shenandoah",
            CollectorKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CollectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "serial" => Ok(CollectorKind::Serial),
            "parallel_scavenge" | "parallel" => Ok(CollectorKind::ParallelScavenge),
            "parallel_serial_old" => Ok(CollectorKind::ParallelSerialOld),
            "parallel_old" => Ok(CollectorKind::ParallelOld),
            "cms" => Ok(CollectorKind::Cms),
            "g1" => Ok(CollectorKind::G1),
            "shenandoah" => Ok(CollectorKind::Shenandoah),
            "unknown" => Ok(CollectorKind::Unknown),
            other => Err(format!("unknown collector '{}'", other)),
        }
    }
}

/// Every log shape the registry recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    // Serial
    SerialNew,
    SerialOld,
    UnifiedSerialNew,
    UnifiedSerialOld,

    // Parallel
    ParallelScavenge,
    ParallelSerialOld,
    ParallelCompactingOld,
    UnifiedParallelScavenge,
    UnifiedParallelSerialOld,
    UnifiedParallelCompactingOld,

    // CMS
    ParNew,
    CmsSerialOld,
    CmsInitialMark,
    CmsRemark,
    CmsConcurrent,
    UnifiedParNew,
    UnifiedCmsInitialMark,

    // G1
    G1YoungPause,
    G1MixedPause,
    G1YoungInitialMark,
    G1Remark,
    G1Cleanup,
    G1FullGc,
    G1Concurrent,
    UnifiedG1YoungPause,
    UnifiedG1MixedPause,
    UnifiedG1Cleanup,
    UnifiedG1FullGc,

    // Shenandoah
    ShenandoahInitMark,
    ShenandoahFinalMark,
    ShenandoahInitUpdate,
    ShenandoahFinalUpdate,
    ShenandoahDegeneratedGc,
    ShenandoahFullGc,
    ShenandoahConcurrent,

    // Collector-ambiguous
    VerboseGcYoung,
    VerboseGcOld,
    UnifiedYoung,
    UnifiedOld,
    UnifiedRemark,
    UnifiedConcurrent,

    // Safepoints
    ApplicationStoppedTime,
    UnifiedSafepoint,

    // Throwaway
    Header,
    UnifiedHeader,
    HeapAtGc,
    ClassHistogram,
    ThreadDump,
    FlsStatistics,
    TenuringDistribution,
    ApplicationConcurrentTime,
    G1Ergonomics,

    Unrecognized,
}

/// Which data an event kind can carry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    /// Application threads are stopped for the duration.
    pub blocking: bool,
    pub concurrent: bool,
    /// Recognized only so it is not misclassified; carries no data.
    pub throwaway: bool,
    pub young: bool,
    pub old: bool,
    pub combined: bool,
    pub class_space: bool,
    pub trigger: bool,
    pub times: bool,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::SerialNew => "serial_new",
            EventKind::SerialOld => "serial_old",
            EventKind::UnifiedSerialNew => "unified_serial_new",
            EventKind::UnifiedSerialOld => "unified_serial_old",
            EventKind::ParallelScavenge => "parallel_scavenge",
            EventKind::ParallelSerialOld => "parallel_serial_old",
            EventKind::ParallelCompactingOld => "parallel_compacting_old",
            EventKind::UnifiedParallelScavenge => "unified_parallel_scavenge",
            EventKind::UnifiedParallelSerialOld => "unified_parallel_serial_old",
            EventKind::UnifiedParallelCompactingOld => "unified_parallel_compacting_old",
            EventKind::ParNew => "par_new",
            EventKind::CmsSerialOld => "cms_serial_old",
            EventKind::CmsInitialMark => "cms_initial_mark",
            EventKind::CmsRemark => "cms_remark",
            EventKind::CmsConcurrent => "cms_concurrent",
            EventKind::UnifiedParNew => "unified_par_new",
            EventKind::UnifiedCmsInitialMark => "unified_cms_initial_mark",
            EventKind::G1YoungPause => "g1_young_pause",
            EventKind::G1MixedPause => "g1_mixed_pause",
            EventKind::G1YoungInitialMark => "g1_young_initial_mark",
            EventKind::G1Remark => "g1_remark",
            EventKind::G1Cleanup => "g1_cleanup",
            EventKind::G1FullGc => "g1_full_gc",
            EventKind::G1Concurrent => "g1_concurrent",
            EventKind::UnifiedG1YoungPause => "unified_g1_young_pause",
            EventKind::UnifiedG1MixedPause => "unified_g1_mixed_pause",
            EventKind::UnifiedG1Cleanup => "unified_g1_cleanup",
            EventKind::UnifiedG1FullGc => "unified_g1_full_gc",
            EventKind::ShenandoahInitMark => "shenandoah_init_mark",
            EventKind::ShenandoahFinalMark => "shenandoah_final_mark",
            EventKind::ShenandoahInitUpdate => "shenandoah_init_update",
            EventKind::ShenandoahFinalUpdate => "shenandoah_final_update",
            EventKind::ShenandoahDegeneratedGc => "shenandoah_degenerated_gc",
            EventKind::ShenandoahFullGc => "shenandoah_full_gc",
            EventKind::ShenandoahConcurrent => "shenandoah_concurrent",
            EventKind::VerboseGcYoung => "verbose_gc_young",
            EventKind::VerboseGcOld => "verbose_gc_old",
            EventKind::UnifiedYoung => "unified_young",
            EventKind::UnifiedOld => "unified_old",
            EventKind::UnifiedRemark => "unified_remark",
            EventKind::UnifiedConcurrent => "unified_concurrent",
            EventKind::ApplicationStoppedTime => "application_stopped_time",
            EventKind::UnifiedSafepoint => "unified_safepoint",
            EventKind::Header => "header",
            EventKind::UnifiedHeader => "unified_header",
            EventKind::HeapAtGc => "heap_at_gc",
            EventKind::ClassHistogram => "class_histogram",
            EventKind::ThreadDump => "thread_dump",
            EventKind::FlsStatistics => "fls_statistics",
            EventKind::TenuringDistribution => "tenuring_distribution",
            EventKind::ApplicationConcurrentTime => "application_concurrent_time",
            EventKind::G1Ergonomics => "g1_ergonomics",
            EventKind::Unrecognized => "unrecognized",
        }
    }

    pub fn is_throwaway(&self) -> bool {
        matches!(
            self,
            EventKind::Header
                | EventKind::UnifiedHeader
                | EventKind::HeapAtGc
                | EventKind::ClassHistogram
                | EventKind::ThreadDump
                | EventKind::FlsStatistics
                | EventKind::TenuringDistribution
                | EventKind::ApplicationConcurrentTime
                | EventKind::G1Ergonomics
        )
    }

    /// Throwaway kinds the preprocessor drops before matching.
    pub fn is_noise(&self) -> bool {
        matches!(
            self,
            EventKind::HeapAtGc
                | EventKind::ClassHistogram
                | EventKind::ThreadDump
                | EventKind::FlsStatistics
                | EventKind::TenuringDistribution
                | EventKind::G1Ergonomics
        )
    }

    pub fn is_concurrent(&self) -> bool {
        matches!(
            self,
            EventKind::CmsConcurrent
                | EventKind::G1Concurrent
                | EventKind::ShenandoahConcurrent
                | EventKind::UnifiedConcurrent
        )
    }

    pub fn is_blocking(&self) -> bool {
        !self.is_throwaway() && !self.is_concurrent() && *self != EventKind::Unrecognized
    }

    pub fn capabilities(&self) -> Capabilities {
        use EventKind::*;

        let mut caps = Capabilities {
            blocking: self.is_blocking(),
            concurrent: self.is_concurrent(),
            throwaway: self.is_throwaway(),
            ..Capabilities::default()
        };

        match self {
            SerialNew | ParallelScavenge | ParNew | G1YoungPause | G1MixedPause
            | G1YoungInitialMark | VerboseGcYoung => {
                caps.combined = true;
                caps.young = true;
                caps.old = true;
                caps.trigger = true;
                caps.times = true;
            }
            SerialOld | ParallelSerialOld | ParallelCompactingOld | CmsSerialOld | G1FullGc => {
                caps.combined = true;
                caps.young = true;
                caps.old = true;
                caps.class_space = true;
                caps.trigger = true;
                caps.times = true;
            }
            VerboseGcOld => {
                caps.combined = true;
                caps.trigger = true;
                caps.times = true;
            }
            UnifiedSerialNew | UnifiedSerialOld | UnifiedParallelScavenge
            | UnifiedParallelSerialOld | UnifiedParallelCompactingOld | UnifiedParNew => {
                caps.combined = true;
                caps.young = true;
                caps.old = true;
                caps.class_space = true;
                caps.trigger = true;
                caps.times = true;
            }
            CmsInitialMark | CmsRemark => {
                caps.combined = true;
                caps.young = true;
                caps.old = true;
                caps.trigger = true;
                caps.times = true;
            }
            UnifiedG1YoungPause | UnifiedG1MixedPause | UnifiedG1FullGc | UnifiedYoung
            | UnifiedOld => {
                caps.combined = true;
                caps.class_space = true;
                caps.trigger = true;
                caps.times = true;
            }
            UnifiedCmsInitialMark | UnifiedRemark | UnifiedG1Cleanup | G1Cleanup => {
                caps.combined = true;
                caps.times = true;
            }
            ShenandoahFinalMark | ShenandoahFinalUpdate | ShenandoahDegeneratedGc
            | ShenandoahConcurrent | UnifiedConcurrent => {
                caps.combined = true;
            }
            ShenandoahFullGc => {
                caps.combined = true;
                caps.trigger = true;
            }
            G1Remark | CmsConcurrent => {
                caps.times = true;
            }
            ShenandoahInitMark | ShenandoahInitUpdate | G1Concurrent | ApplicationStoppedTime
            | UnifiedSafepoint => {}
            Header | UnifiedHeader | HeapAtGc | ClassHistogram | ThreadDump | FlsStatistics
            | TenuringDistribution | ApplicationConcurrentTime | G1Ergonomics | Unrecognized => {}
        }
        caps
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Occupancy of one memory region around a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemoryBlock {
    pub before: Memory,
    pub after: Memory,
    /// Allocated capacity after the collection.
    pub capacity: Memory,
}

impl MemoryBlock {
    pub fn new(before: Memory, after: Memory, capacity: Memory) -> Self {
        Self {
            before,
            after,
            capacity,
        }
    }

    /// A point-in-time occupancy (`used(capacity)`) with no before/after change.
    pub fn occupancy(used: Memory, capacity: Memory) -> Self {
        Self::new(used, used, capacity)
    }
}

impl std::ops::Sub for MemoryBlock {
    type Output = MemoryBlock;

    fn sub(self, rhs: MemoryBlock) -> MemoryBlock {
        MemoryBlock::new(
            self.before - rhs.before,
            self.after - rhs.after,
            self.capacity - rhs.capacity,
        )
    }
}

/// A classified log line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub kind: EventKind,
    pub collector: CollectorKind,
    /// First raw line number of the logical line.
    pub line_number: usize,
    /// Unified `GC(n)` id when printed.
    pub gc_id: Option<u64>,
    pub decorator: Option<Decorator>,
    /// Milliseconds since JVM start at which the event began.
    pub timestamp_ms: i64,
    /// Microseconds. Negative values are kept as logged.
    pub duration_micros: i64,
    pub trigger: Trigger,
    pub young: Option<MemoryBlock>,
    pub old: Option<MemoryBlock>,
    pub combined: Option<MemoryBlock>,
    pub class_space: Option<MemoryBlock>,
    pub times: Option<TimesData>,
    /// The logical line the event was built from.
    pub log_entry: String,
}

impl Event {
    /// A data-free event for `kind` at `line_number`.
    pub fn bare(kind: EventKind, line_number: usize, log_entry: impl Into<String>) -> Self {
        Self {
            kind,
            collector: CollectorKind::Unknown,
            line_number,
            gc_id: None,
            decorator: None,
            timestamp_ms: 0,
            duration_micros: 0,
            trigger: Trigger::None,
            young: None,
            old: None,
            combined: None,
            class_space: None,
            times: None,
            log_entry: log_entry.into(),
        }
    }

    pub fn unrecognized(line: &LogicalLine) -> Self {
        Self::bare(EventKind::Unrecognized, line.number, line.text.clone())
    }

    pub fn is_unrecognized(&self) -> bool {
        self.kind == EventKind::Unrecognized
    }

    pub fn capabilities(&self) -> Capabilities {
        self.kind.capabilities()
    }

    /// `(user + sys) / real` of the timing block, `None` without one or when
    /// `real` is zero.
    pub fn parallelism(&self) -> Option<f64> {
        self.times.and_then(|t| t.parallelism())
    }
}

/// A grammar matched but its captures could not be decoded.
///
/// Indicates a defect in the grammar table, not bad input.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("{kind}: capture '{group}' is missing")]
    MissingGroup { kind: EventKind, group: &'static str },

    #[error("{kind}: capture '{group}' could not be decoded: {source}")]
    Unit {
        kind: EventKind,
        group: String,
        #[source]
        source: UnitError,
    },

    #[error("{kind}: gc id '{text}' is not a number")]
    GcId { kind: EventKind, text: String },
}
