use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use super::model::{CollectorKind, Event};

/// A wrapper that forces the wrapped data onto its own cache line(s).
///
/// Shard pipelines may share one [`ParsingMetrics`] through an `Arc`, each
/// counter group then sits on its own 64-byte line.
#[repr(align(64))]
#[derive(Debug, Default)]
pub struct CacheAligned<T>(pub T);

/// Line accounting across the preprocessor
#[derive(Debug, Default)]
pub struct LineMetrics {
    pub raw: AtomicU64,
    pub logical: AtomicU64,
    pub merged_blocks: AtomicU64,
    pub abandoned_blocks: AtomicU64,
    pub noise_discarded: AtomicU64,
}

/// Events per collector family (hottest path - updated per logical line)
#[derive(Debug, Default)]
pub struct CollectorMetrics {
    pub serial: AtomicU64,
    pub parallel: AtomicU64,
    pub cms: AtomicU64,
    pub g1: AtomicU64,
    pub shenandoah: AtomicU64,
    pub unknown: AtomicU64,
}

/// Classification outcomes that are not collector events
#[derive(Debug, Default)]
pub struct OutcomeMetrics {
    pub throwaway: AtomicU64,
    pub unrecognized: AtomicU64,
    /// Events whose trigger is a collector fallback, see
    /// [`crate::parser::trigger::Trigger::is_failure`].
    pub failures: AtomicU64,
}

/// Classify timing totals
#[derive(Debug, Default)]
pub struct TotalMetrics {
    pub time_nanos: AtomicU64,
    pub count: AtomicU64,
}

/// Counters for one or more pipelines.
///
/// All operations use `Ordering::Relaxed`; `snapshot()` reads are not
/// transactional across groups.
#[derive(Debug, Default)]
pub struct ParsingMetrics {
    pub lines: CacheAligned<LineMetrics>,
    pub collectors: CacheAligned<CollectorMetrics>,
    pub outcomes: CacheAligned<OutcomeMetrics>,
    pub totals: CacheAligned<TotalMetrics>,
}

impl ParsingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_raw_line(&self) {
        self.lines.0.raw.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_logical_line(&self) {
        self.lines.0.logical.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_merged(&self) {
        self.lines.0.merged_blocks.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_abandoned(&self) {
        self.lines.0.abandoned_blocks.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_noise(&self) {
        self.lines.0.noise_discarded.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one classified event
    ///
    /// Called once per logical line.
    #[inline]
    pub fn record_event(&self, event: &Event, time_nanos: u64) {
        self.totals.0.count.fetch_add(1, Ordering::Relaxed);
        self.totals.0.time_nanos.fetch_add(time_nanos, Ordering::Relaxed);

        if event.is_unrecognized() {
            self.outcomes.0.unrecognized.fetch_add(1, Ordering::Relaxed);
            return;
        }
        if event.kind.is_throwaway() {
            self.outcomes.0.throwaway.fetch_add(1, Ordering::Relaxed);
            return;
        }

        let c = &self.collectors.0;
        match event.collector {
            CollectorKind::Serial => c.serial.fetch_add(1, Ordering::Relaxed),
            CollectorKind::ParallelScavenge
            | CollectorKind::ParallelSerialOld
            | CollectorKind::ParallelOld => c.parallel.fetch_add(1, Ordering::Relaxed),
            CollectorKind::Cms => c.cms.fetch_add(1, Ordering::Relaxed),
            CollectorKind::G1 => c.g1.fetch_add(1, Ordering::Relaxed),
            CollectorKind::Shenandoah => c.shenandoah.fetch_add(1, Ordering::Relaxed),
            CollectorKind::Unknown => c.unknown.fetch_add(1, Ordering::Relaxed),
        };
        if event.trigger.is_failure() {
            self.outcomes.0.failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let classified = self.totals.0.count.load(Ordering::Relaxed);
        let time_ns = self.totals.0.time_nanos.load(Ordering::Relaxed);
        let unrecognized = self.outcomes.0.unrecognized.load(Ordering::Relaxed);

        MetricsSnapshot {
            raw_lines: self.lines.0.raw.load(Ordering::Relaxed),
            logical_lines: self.lines.0.logical.load(Ordering::Relaxed),
            merged_blocks: self.lines.0.merged_blocks.load(Ordering::Relaxed),
            abandoned_blocks: self.lines.0.abandoned_blocks.load(Ordering::Relaxed),
            noise_discarded: self.lines.0.noise_discarded.load(Ordering::Relaxed),

            serial_events: self.collectors.0.serial.load(Ordering::Relaxed),
            parallel_events: self.collectors.0.parallel.load(Ordering::Relaxed),
            cms_events: self.collectors.0.cms.load(Ordering::Relaxed),
            g1_events: self.collectors.0.g1.load(Ordering::Relaxed),
            shenandoah_events: self.collectors.0.shenandoah.load(Ordering::Relaxed),
            unknown_collector_events: self.collectors.0.unknown.load(Ordering::Relaxed),

            throwaway_events: self.outcomes.0.throwaway.load(Ordering::Relaxed),
            unrecognized,
            failure_events: self.outcomes.0.failures.load(Ordering::Relaxed),

            classified,
            avg_classify_time_us: if classified > 0 {
                (time_ns as f64 / classified as f64) / 1000.0
            } else {
                0.0
            },
            recognition_rate: if classified > 0 {
                (classified - unrecognized) as f64 / classified as f64
            } else {
                1.0
            },
        }
    }
}

/// A read-only snapshot of [`ParsingMetrics`].
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    // Lines
    pub raw_lines: u64,
    pub logical_lines: u64,
    pub merged_blocks: u64,
    pub abandoned_blocks: u64,
    pub noise_discarded: u64,

    // Collectors
    pub serial_events: u64,
    pub parallel_events: u64,
    pub cms_events: u64,
    pub g1_events: u64,
    pub shenandoah_events: u64,
    pub unknown_collector_events: u64,

    // Outcomes
    pub throwaway_events: u64,
    pub unrecognized: u64,
    pub failure_events: u64,

    // Performance
    pub classified: u64,
    pub avg_classify_time_us: f64,
    pub recognition_rate: f64,
}
