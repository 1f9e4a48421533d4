//! Concurrent Mark Sweep: `ParNew` young collections, the blocking
//! initial-mark and remark phases, the concurrent phases, and the serial
//! old fallback taken on promotion failure or concurrent mode failure.

use crate::parser::grammar::{Derive, Grammar, Prefix};
use crate::parser::model::{CollectorKind, EventKind};

pub(crate) const GRAMMARS: &[Grammar] = &[
    // 44.684: [Full GC (Allocation Failure) 44.684: [CMS (concurrent mode failure): 1218548K->413373K(1465840K), 1.3656970 secs] 1229657K->413373K(1581168K), [Metaspace: ...], 1.3659420 secs]
    // 10.000: [GC (Allocation Failure) 10.000: [ParNew (promotion failed): 153344K->153344K(153344K), 0.0520000 secs]10.052: [CMS: ...
    Grammar::legacy(
        EventKind::CmsSerialOld,
        CollectorKind::Cms,
        r"\[(?:Full GC|GC)%trg% ?%ts%(?:\[ParNew(?: \((?P<trigger_2>promotion failed)\))?%refs% ?: %mem%, %s%\] ?%ts%)?\[CMS ?(?:\((?P<trigger_3>concurrent mode (?:failure|interrupted))\))?: %mem:old%, %s%\] %mem:combined%(?:, %perm%)?, %secs%\]%times%",
    )
    .derive(Derive::YoungFromCombined),
    // 10.000: [GC (Allocation Failure) 10.000: [ParNew: 153344K->17024K(153344K), 0.0520000 secs] 300000K->180000K(1000000K), 0.0521000 secs]
    Grammar::legacy(
        EventKind::ParNew,
        CollectorKind::Cms,
        r"\[GC%trg% ?%ts%\[ParNew%refs%: %mem:young%, %s%\] %mem:combined%, %secs%\]%times%",
    )
    .derive(Derive::OldFromCombined),
    // 2.000: [GC (CMS Initial Mark) [1 CMS-initial-mark: 10000K(20000K)] 15000K(30000K), 0.0010000 secs]
    Grammar::legacy(
        EventKind::CmsInitialMark,
        CollectorKind::Cms,
        r"\[GC(?: \((?P<trigger>CMS Initial Mark)\))? ?\[1 CMS-initial-mark: %occ:old%\] %occ:combined%, %secs%\]%times%",
    )
    .derive(Derive::YoungFromCombined),
    // 2.100: [GC (CMS Final Remark) [YG occupancy: 5000 K (9216 K)][Rescan (parallel) , 0.0010000 secs]...[1 CMS-remark: 10000K(20000K)] 15000K(29216K), 0.0030000 secs]
    Grammar::legacy(
        EventKind::CmsRemark,
        CollectorKind::Cms,
        r"\[GC(?: \((?P<trigger>CMS Final Remark)\))? ?\[YG occupancy: %yg%\]%phases% ?\[1 CMS-remark: %occ:old%\] %occ:combined%, %secs%\]%times%",
    ),
    // 2.600: [CMS-concurrent-mark: 0.100/0.150 secs]
    //  CMS: abort preclean due to time 7.700: [CMS-concurrent-abortable-preclean: 0.500/5.000 secs]
    Grammar::legacy(
        EventKind::CmsConcurrent,
        CollectorKind::Cms,
        r" ?(?:CMS: abort preclean due to time %ts%)?\[CMS-concurrent-(?:mark|preclean|abortable-preclean|sweep|reset)(?:-start\]|: -?\d+[.,]\d+/%dsecs% secs\]%times%)",
    )
    .prefix(Prefix::Any),
    Grammar::unified(
        EventKind::UnifiedParNew,
        CollectorKind::Cms,
        r"%gcid%Pause Young%trg% ParNew: %gen:young% CMS: %gen:old%(?: %meta%)? %mem:combined% %ms%%utimes%",
    ),
    Grammar::unified(
        EventKind::UnifiedCmsInitialMark,
        CollectorKind::Cms,
        r"%gcid%Pause Initial Mark %mem:combined% %ms%%utimes%",
    ),
];

#[cfg(test)]
mod tests {
    use crate::parser::model::{CollectorKind, EventKind};
    use crate::parser::registry::tests::classify;
    use crate::parser::trigger::Trigger;

    #[test]
    fn test_par_new() {
        let event = classify(
            "10.000: [GC (Allocation Failure) 10.000: [ParNew: 153344K->17024K(153344K), 0.0520000 secs] 300000K->180000K(1000000K), 0.0521000 secs] [Times: user=0.20 sys=0.01, real=0.05 secs]",
        );
        assert_eq!(event.kind, EventKind::ParNew);
        assert_eq!(event.collector, CollectorKind::Cms);
        assert_eq!(event.timestamp_ms, 10_000);
        assert_eq!(event.duration_micros, 52_100);
        let old = event.old.unwrap();
        assert_eq!(old.before.kilobytes(), 146656);
        assert_eq!(old.after.kilobytes(), 162976);
        assert_eq!(old.capacity.kilobytes(), 846656);
        assert_eq!(event.parallelism(), Some(21.0 / 5.0));
    }

    #[test]
    fn test_promotion_failed_becomes_serial_old() {
        let event = classify(
            "10.000: [GC (Allocation Failure) 10.000: [ParNew (promotion failed): 153344K->153344K(153344K), 0.0520000 secs]10.052: [CMS: 500000K->400000K(600000K), 2.5000000 secs] 650000K->400000K(753344K), [Metaspace: 20000K->20000K(1067008K)], 2.5520000 secs] [Times: user=2.60 sys=0.01, real=2.55 secs]",
        );
        assert_eq!(event.kind, EventKind::CmsSerialOld);
        assert_eq!(event.trigger, Trigger::PromotionFailed);
        let young = event.young.unwrap();
        assert_eq!(young.before.kilobytes(), 150000);
        assert_eq!(young.after.kilobytes(), 0);
        assert_eq!(young.capacity.kilobytes(), 153344);
    }

    #[test]
    fn test_concurrent_mode_failure_normalized() {
        let event = classify(
            "44.684: [Full GC (Allocation Failure) 44.684: [CMS (concurrent mode failure): 1218548K->413373K(1465840K), 1.3656970 secs] 1229657K->413373K(1581168K), [Metaspace: 83932K->83932K(1126400K)], 1.3659420 secs] [Times: user=1.33 sys=0.00, real=1.37 secs]",
        );
        assert_eq!(event.kind, EventKind::CmsSerialOld);
        assert_eq!(event.trigger, Trigger::ConcurrentModeFailure);
        assert_eq!(event.duration_micros, 1_365_942);
        assert_eq!(event.old.unwrap().before.kilobytes(), 1218548);
    }

    #[test]
    fn test_concurrent_mode_interrupted_jdk6() {
        let event = classify(
            "5.000: [Full GC (System) 5.000: [CMS: 1000K->900K(2000K), 0.1000000 secs] 1500K->900K(3000K), [CMS Perm : 2000K->2000K(4000K)], 0.1000000 secs]",
        );
        assert_eq!(event.kind, EventKind::CmsSerialOld);
        assert_eq!(event.trigger, Trigger::SystemGc);
        assert_eq!(event.class_space.unwrap().capacity.kilobytes(), 4000);

        let event = classify(
            "6.000: [GC 6.000: [CMS (concurrent mode interrupted): 1000K->900K(2000K), 0.1000000 secs] 1500K->900K(3000K), 0.1000000 secs]",
        );
        assert_eq!(event.trigger, Trigger::ConcurrentModeInterrupted);
    }

    #[test]
    fn test_initial_mark() {
        let event = classify(
            "2.000: [GC (CMS Initial Mark) [1 CMS-initial-mark: 10000K(20000K)] 15000K(30000K), 0.0010000 secs] [Times: user=0.00 sys=0.00, real=0.00 secs]",
        );
        assert_eq!(event.kind, EventKind::CmsInitialMark);
        assert_eq!(event.trigger, Trigger::CmsInitialMark);
        let young = event.young.unwrap();
        assert_eq!(young.before.kilobytes(), 5000);
        assert_eq!(young.capacity.kilobytes(), 10000);
        assert_eq!(event.parallelism(), None);
    }

    #[test]
    fn test_remark_with_sub_phases() {
        let event = classify(
            "2.100: [GC (CMS Final Remark) [YG occupancy: 5000 K (9216 K)][Rescan (parallel) , 0.0010000 secs][weak refs processing, 0.0000100 secs][class unloading, 0.0010000 secs][scrub symbol table, 0.0010000 secs][scrub string table, 0.0001000 secs][1 CMS-remark: 10000K(20000K)] 15000K(29216K), 0.0030000 secs] [Times: user=0.01 sys=0.00, real=0.00 secs]",
        );
        assert_eq!(event.kind, EventKind::CmsRemark);
        assert_eq!(event.trigger, Trigger::CmsFinalRemark);
        assert_eq!(event.young.unwrap().before.kilobytes(), 5000);
        assert_eq!(event.old.unwrap().capacity.kilobytes(), 20000);
        assert_eq!(event.combined.unwrap().after.kilobytes(), 15000);
        assert_eq!(event.duration_micros, 3000);
    }

    #[test]
    fn test_remark_with_embedded_timestamps_jdk6() {
        let event = classify(
            "2.100: [GC[YG occupancy: 5000 K (9216 K)]2.100: [Rescan (parallel) , 0.0010000 secs]2.101: [weak refs processing, 0.0000100 secs] [1 CMS-remark: 10000K(20000K)] 15000K(29216K), 0.0030000 secs]",
        );
        assert_eq!(event.kind, EventKind::CmsRemark);
        assert_eq!(event.trigger, Trigger::None);
    }

    #[test]
    fn test_concurrent_phases() {
        let event = classify("2.500: [CMS-concurrent-mark-start]");
        assert_eq!(event.kind, EventKind::CmsConcurrent);
        assert_eq!(event.duration_micros, 0);
        assert!(!event.capabilities().blocking);

        let event = classify(
            "2.600: [CMS-concurrent-mark: 0.100/0.150 secs] [Times: user=0.20 sys=0.00, real=0.15 secs]",
        );
        assert_eq!(event.kind, EventKind::CmsConcurrent);
        assert_eq!(event.duration_micros, 150_000);

        let event = classify(
            " CMS: abort preclean due to time 7.700: [CMS-concurrent-abortable-preclean: 0.500/5.000 secs] [Times: user=0.50 sys=0.00, real=5.00 secs]",
        );
        assert_eq!(event.kind, EventKind::CmsConcurrent);
        assert_eq!(event.duration_micros, 5_000_000);
    }

    #[test]
    fn test_unified_par_new_and_initial_mark() {
        let event = classify(
            "[0.300s][info][gc] GC(1) Pause Young (Allocation Failure) ParNew: 974K->128K(1152K) CMS: 0K->518K(960K) Metaspace: 1000K->1000K(1056768K) 974K->646K(2112K) 3.045ms User=0.00s Sys=0.00s Real=0.00s",
        );
        assert_eq!(event.kind, EventKind::UnifiedParNew);
        assert_eq!(event.old.unwrap().after.kilobytes(), 518);

        let event = classify("[0.400s][info][gc] GC(2) Pause Initial Mark 1M->1M(2M) 0.157ms");
        assert_eq!(event.kind, EventKind::UnifiedCmsInitialMark);
        assert_eq!(event.collector, CollectorKind::Cms);
        assert_eq!(event.timestamp_ms, 400);
    }

    #[test]
    fn test_par_new_with_reference_processing() {
        let event = classify(
            "10.000: [GC (Allocation Failure) 10.000: [ParNew10.010: [SoftReference, 0 refs, 0.0000100 secs]10.010: [WeakReference, 5 refs, 0.0000200 secs]10.010: [FinalReference, 10 refs, 0.0000300 secs]10.010: [PhantomReference, 0 refs, 0 refs, 0.0000100 secs]10.010: [JNI Weak Reference, 0.0000050 secs]: 153344K->17024K(153344K), 0.0520000 secs] 300000K->180000K(1000000K), 0.0521000 secs] [Times: user=0.20 sys=0.01, real=0.05 secs]",
        );
        assert_eq!(event.kind, EventKind::ParNew);
        assert_eq!(event.young.unwrap().after.kilobytes(), 17024);
        assert_eq!(event.duration_micros, 52_100);
    }

    #[test]
    fn test_remark_with_reference_processing() {
        let stamped = "2.100: [GC (CMS Final Remark) [YG occupancy: 17215 K (306688 K)]2.100: [Rescan (parallel) , 0.0052130 secs]2.105: [weak refs processing2.105: [SoftReference, 0 refs, 0.0000123 secs]2.105: [WeakReference, 8 refs, 0.0000072 secs]2.105: [FinalReference, 1060 refs, 0.0011204 secs]2.106: [PhantomReference, 0 refs, 1 refs, 0.0000106 secs]2.106: [JNI Weak Reference, 0.0000111 secs], 0.0012009 secs]2.106: [class unloading, 0.0024427 secs]2.109: [scrub symbol table, 0.0035048 secs]2.112: [scrub string table, 0.0006103 secs][1 CMS-remark: 1077K(1048576K)] 18293K(1355264K), 0.0125484 secs] [Times: user=0.04 sys=0.00, real=0.01 secs]";
        let stripped = "2.100: [GC (CMS Final Remark) [YG occupancy: 17215 K (306688 K)][Rescan (parallel) , 0.0052130 secs][weak refs processing[SoftReference, 0 refs, 0.0000123 secs][WeakReference, 8 refs, 0.0000072 secs][FinalReference, 1060 refs, 0.0011204 secs][PhantomReference, 0 refs, 1 refs, 0.0000106 secs][JNI Weak Reference, 0.0000111 secs], 0.0012009 secs][class unloading, 0.0024427 secs][scrub symbol table, 0.0035048 secs][scrub string table, 0.0006103 secs][1 CMS-remark: 1077K(1048576K)] 18293K(1355264K), 0.0125484 secs] [Times: user=0.04 sys=0.00, real=0.01 secs]";
        for line in [stamped, stripped] {
            let event = classify(line);
            assert_eq!(event.kind, EventKind::CmsRemark, "line: {line}");
            assert_eq!(event.old.unwrap().after.kilobytes(), 1077);
            assert_eq!(event.duration_micros, 12_548);
        }
    }
}
