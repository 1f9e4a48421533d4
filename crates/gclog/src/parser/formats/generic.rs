//! Shapes that every collector prints identically. The collector is taken
//! from the caller's hint when one is configured.

use crate::parser::grammar::{Clock, Grammar, Prefix};
use crate::parser::model::{CollectorKind, EventKind};

const U: CollectorKind = CollectorKind::Unknown;

pub(crate) const GRAMMARS: &[Grammar] = &[
    // 1.000: [GC (Allocation Failure)  8192K->4224K(31744K), 0.0070510 secs]
    Grammar::legacy(
        EventKind::VerboseGcYoung,
        U,
        r"\[GC%trg% +%mem:combined%, %secs%\]%times%",
    ),
    Grammar::legacy(
        EventKind::VerboseGcOld,
        U,
        r"\[Full GC%trg% +%mem:combined%, %secs%\]%times%",
    ),
    Grammar::unified(
        EventKind::UnifiedYoung,
        U,
        r"%gcid%Pause Young%trg%(?: %meta%)? %mem:combined% %ms%%utimes%",
    ),
    Grammar::unified(
        EventKind::UnifiedOld,
        U,
        r"%gcid%Pause Full%trg%(?: %meta%)? %mem:combined% %ms%%utimes%",
    ),
    Grammar::unified(
        EventKind::UnifiedRemark,
        U,
        r"%gcid%Pause Remark %mem:combined% %ms%%utimes%",
    ),
    // [0.600s][info][gc] GC(1) Concurrent Mark (0.552s, 0.583s) 31.000ms
    Grammar::unified(
        EventKind::UnifiedConcurrent,
        U,
        r"%gcid%Concurrent [A-Za-z ]+?(?: \([^()]*\))*(?: %mem:combined%)?(?: %ms%)?",
    ),
    // 2.345: Total time for which application threads were stopped: 0.0001234 seconds, Stopping threads took: 0.0000456 seconds
    Grammar::legacy(
        EventKind::ApplicationStoppedTime,
        U,
        r"Total time for which application threads were stopped: %dsecs% seconds(?:, Stopping threads took: -?\d+[.,]\d+ seconds)?",
    )
    .prefix(Prefix::Any)
    .clock(Clock::End),
    // [1.000s][info][safepoint] Safepoint "G1CollectForAllocation", Time since last: 123456 ns, Reaching safepoint: 1234 ns, At safepoint: 45678 ns, Total: 46912 ns
    Grammar::unified(
        EventKind::UnifiedSafepoint,
        U,
        r#"Safepoint "[A-Za-z0-9_]+", Time since last: \d+ ns, Reaching safepoint: \d+ ns, (?:Cleanup: \d+ ns, )?At safepoint: \d+ ns, Total: %ns%"#,
    ),
];

#[cfg(test)]
mod tests {
    use crate::parser::model::{CollectorKind, EventKind};
    use crate::parser::registry::tests::{classify, classify_with_hint};
    use crate::parser::trigger::Trigger;

    #[test]
    fn test_verbose_gc_uses_hint() {
        let line = "1.000: [GC (Allocation Failure)  8192K->4224K(31744K), 0.0070510 secs]";
        let event = classify(line);
        assert_eq!(event.kind, EventKind::VerboseGcYoung);
        assert_eq!(event.collector, CollectorKind::Unknown);
        assert_eq!(event.trigger, Trigger::AllocationFailure);

        let event = classify_with_hint(line, CollectorKind::ParallelScavenge);
        assert_eq!(event.kind, EventKind::VerboseGcYoung);
        assert_eq!(event.collector, CollectorKind::ParallelScavenge);
    }

    #[test]
    fn test_hint_never_overrides_specific_collector() {
        let event = classify_with_hint(
            "1.234: [GC pause (G1 Evacuation Pause) (young) 24M->4096K(256M), 0.0047930 secs]",
            CollectorKind::Cms,
        );
        assert_eq!(event.collector, CollectorKind::G1);
    }

    #[test]
    fn test_verbose_gc_old_jdk6() {
        let event = classify("3.000: [Full GC 50000K->30000K(100000K), 0.2000000 secs]");
        assert_eq!(event.kind, EventKind::VerboseGcOld);
        assert_eq!(event.trigger, Trigger::None);
        assert_eq!(event.duration_micros, 200_000);
    }

    #[test]
    fn test_unified_generic_pauses() {
        let event = classify(
            "[1.000s][info][gc] GC(3) Pause Young (Allocation Failure) 1M->0M(2M) 1.234ms",
        );
        assert_eq!(event.kind, EventKind::UnifiedYoung);
        assert_eq!(event.timestamp_ms, 999);

        let event = classify("[2.000s][info][gc] GC(4) Pause Full (Ergonomics) 10M->5M(20M) 20.000ms");
        assert_eq!(event.kind, EventKind::UnifiedOld);
        assert_eq!(event.trigger, Trigger::Ergonomics);

        let event = classify_with_hint(
            "[3.000s][info][gc] GC(5) Pause Remark 23M->23M(256M) 1.036ms",
            CollectorKind::G1,
        );
        assert_eq!(event.kind, EventKind::UnifiedRemark);
        assert_eq!(event.collector, CollectorKind::G1);
    }

    #[test]
    fn test_unified_concurrent() {
        let event = classify("[0.600s][info][gc] GC(1) Concurrent Mark (0.552s, 0.583s) 31.000ms");
        assert_eq!(event.kind, EventKind::UnifiedConcurrent);
        assert_eq!(event.duration_micros, 31_000);
        assert_eq!(event.timestamp_ms, 569);

        let event = classify("[0.552s][info][gc] GC(1) Concurrent Cycle");
        assert_eq!(event.kind, EventKind::UnifiedConcurrent);
        assert_eq!(event.duration_micros, 0);
    }

    #[test]
    fn test_application_stopped_time() {
        let event = classify(
            "2.345: Total time for which application threads were stopped: 0.0001234 seconds, Stopping threads took: 0.0000456 seconds",
        );
        assert_eq!(event.kind, EventKind::ApplicationStoppedTime);
        assert_eq!(event.duration_micros, 123);
        assert_eq!(event.timestamp_ms, 2345);

        let event = classify(
            "[5.000s][info][safepoint] Total time for which application threads were stopped: 0.0100000 seconds, Stopping threads took: 0.0000100 seconds",
        );
        assert_eq!(event.kind, EventKind::ApplicationStoppedTime);
        assert_eq!(event.timestamp_ms, 4990);
    }

    #[test]
    fn test_unified_safepoint() {
        let event = classify(
            "[1.000s][info][safepoint] Safepoint \"G1CollectForAllocation\", Time since last: 123456 ns, Reaching safepoint: 1234 ns, At safepoint: 45678 ns, Total: 46912 ns",
        );
        assert_eq!(event.kind, EventKind::UnifiedSafepoint);
        assert_eq!(event.duration_micros, 47);
        assert_eq!(event.timestamp_ms, 1000);
    }
}
