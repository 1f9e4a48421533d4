//! Garbage First: evacuation pauses (young, mixed, initial-mark), remark,
//! cleanup, full collections and the concurrent cycle phases.
//!
//! Legacy pauses appear either as a single line with combined occupancy or,
//! with `-XX:+PrintGCDetails`, as the pause line merged with its
//! `[Eden: ... Survivors: ... Heap: ...]` summary by the preprocessor.

use crate::parser::grammar::{Derive, Grammar};
use crate::parser::model::{CollectorKind, EventKind};

pub(crate) const GRAMMARS: &[Grammar] = &[
    // 1.234: [GC pause (G1 Evacuation Pause) (young) 24M->4096K(256M), 0.0047930 secs]
    Grammar::legacy(
        EventKind::G1YoungPause,
        CollectorKind::G1,
        r"\[GC pause%trg% \(young\)(?: \((?P<trigger_2>to-space exhausted|to-space overflow)\))? %mem:combined%, %secs%\]%times%",
    ),
    // 0.500: [GC pause (G1 Evacuation Pause) (young), 0.0100000 secs][Eden: 24.0M(24.0M)->0.0B(13.0M) Survivors: 0.0B->3072.0K Heap: 24.0M(256.0M)->4096.0K(256.0M)] [Times: ...]
    Grammar::legacy(
        EventKind::G1YoungPause,
        CollectorKind::G1,
        r"\[GC pause%trg% \(young\)(?: \((?P<trigger_2>to-space exhausted|to-space overflow)\))?, %secs%\] ?%g1heap%%times%",
    )
    .derive(Derive::G1Details),
    Grammar::legacy(
        EventKind::G1MixedPause,
        CollectorKind::G1,
        r"\[GC pause%trg% \(mixed\)(?: \((?P<trigger_2>to-space exhausted|to-space overflow)\))? %mem:combined%, %secs%\]%times%",
    ),
    Grammar::legacy(
        EventKind::G1MixedPause,
        CollectorKind::G1,
        r"\[GC pause%trg% \(mixed\)(?: \((?P<trigger_2>to-space exhausted|to-space overflow)\))?, %secs%\] ?%g1heap%%times%",
    )
    .derive(Derive::G1Details),
    Grammar::legacy(
        EventKind::G1YoungInitialMark,
        CollectorKind::G1,
        r"\[GC pause%trg% \(young\) \(initial-mark\)(?: \((?P<trigger_2>to-space exhausted|to-space overflow)\))? %mem:combined%, %secs%\]%times%",
    ),
    Grammar::legacy(
        EventKind::G1YoungInitialMark,
        CollectorKind::G1,
        r"\[GC pause%trg% \(young\) \(initial-mark\)(?: \((?P<trigger_2>to-space exhausted|to-space overflow)\))?, %secs%\] ?%g1heap%%times%",
    )
    .derive(Derive::G1Details),
    // 1.500: [GC remark [Finalize Marking, 0.0001070 secs] [GC ref-proc, 0.0000710 secs] [Unloading, 0.0012850 secs], 0.0024750 secs]
    Grammar::legacy(
        EventKind::G1Remark,
        CollectorKind::G1,
        r"\[GC remark%phases%, %secs%\]%times%",
    ),
    Grammar::legacy(
        EventKind::G1Cleanup,
        CollectorKind::G1,
        r"\[GC cleanup(?: %mem:combined%)?, %secs%\]%times%",
    ),
    // 2.000: [Full GC (Allocation Failure)  1000M->500M(1024M), 2.5000000 secs][Eden: ...], [Metaspace: 3000K->3000K(1056768K)] [Times: ...]
    Grammar::legacy(
        EventKind::G1FullGc,
        CollectorKind::G1,
        r"\[Full GC%trg% +%mem%, %secs%\] ?%g1heap%(?:, %perm%)?%times%",
    )
    .derive(Derive::G1Details),
    Grammar::legacy(
        EventKind::G1Concurrent,
        CollectorKind::G1,
        r"\[GC concurrent-(?:root-region-scan|mark|cleanup|string-deduplication)(?:-start\]|-end, %dsecs% secs\]|-abort\])|\[GC concurrent-mark-reset-for-overflow\]",
    ),
    // [0.010s][info][gc] GC(0) Pause Young (Normal) (G1 Evacuation Pause) Eden regions: 1->0(9) ... 24M->4M(256M) 3.867ms
    Grammar::unified(
        EventKind::UnifiedG1YoungPause,
        CollectorKind::G1,
        r"%gcid%Pause Young (?:\((?:Normal|Concurrent Start|Prepare Mixed)\) \((?P<trigger>[^()]+(?:\(\))?)\)|\((?P<trigger_2>G1 [^()]+)\))(?: \((?P<trigger_3>To-space exhausted)\))?(?:%regions%)?(?: %meta%)? %mem:combined% %ms%%utimes%",
    ),
    Grammar::unified(
        EventKind::UnifiedG1YoungPause,
        CollectorKind::G1,
        r"%gcid%Pause Initial Mark \((?P<trigger>G1 [^()]+)\)(?:%regions%)?(?: %meta%)? %mem:combined% %ms%%utimes%",
    ),
    Grammar::unified(
        EventKind::UnifiedG1MixedPause,
        CollectorKind::G1,
        r"%gcid%Pause (?:Young \(Mixed\)|Mixed) \((?P<trigger>[^()]+(?:\(\))?)\)(?: \((?P<trigger_2>To-space exhausted)\))?(?:%regions%)?(?: %meta%)? %mem:combined% %ms%%utimes%",
    ),
    Grammar::unified(
        EventKind::UnifiedG1Cleanup,
        CollectorKind::G1,
        r"%gcid%Pause Cleanup %mem:combined% %ms%%utimes%",
    ),
    Grammar::unified(
        EventKind::UnifiedG1FullGc,
        CollectorKind::G1,
        r"%gcid%Pause Full%trg%%regions%(?: %meta%)? %mem:combined% %ms%%utimes%",
    ),
];
