//! Parallel collector: `PSYoungGen` scavenges with `PSOldGen` (serial old)
//! or `ParOldGen` (parallel compacting old) full collections.

use crate::parser::grammar::{Derive, Grammar};
use crate::parser::model::{CollectorKind, EventKind};

pub(crate) const GRAMMARS: &[Grammar] = &[
    // 1.000: [GC (Allocation Failure) [PSYoungGen: 33280K->5118K(38400K)] 33280K->28081K(125952K), 0.0244780 secs]
    Grammar::legacy(
        EventKind::ParallelScavenge,
        CollectorKind::ParallelScavenge,
        r"\[GC(?:--)?%trg% ?%refs%\[PSYoungGen: %mem:young%\] %mem:combined%, %secs%\]%times%",
    )
    .derive(Derive::OldFromCombined),
    Grammar::legacy(
        EventKind::ParallelSerialOld,
        CollectorKind::ParallelSerialOld,
        r"\[Full GC%trg% ?\[PSYoungGen: %mem:young%\] \[PSOldGen: %mem:old%\] %mem:combined%(?:,? %perm%)?, %secs%\]%times%",
    ),
    // 2.000: [Full GC (Ergonomics) [PSYoungGen: 5118K->0K(38400K)] [ParOldGen: 80000K->60000K(87552K)] 85118K->60000K(125952K), [Metaspace: ...], 0.5000000 secs]
    Grammar::legacy(
        EventKind::ParallelCompactingOld,
        CollectorKind::ParallelOld,
        r"\[Full GC%trg% ?\[PSYoungGen: %mem:young%\] \[ParOldGen: %mem:old%\] %mem:combined%(?:,? %perm%)?, %secs%\]%times%",
    ),
    Grammar::unified(
        EventKind::UnifiedParallelScavenge,
        CollectorKind::ParallelScavenge,
        r"%gcid%Pause Young%trg% PSYoungGen: %gen:young% (?:ParOldGen|PSOldGen): %gen:old%(?: %meta%)? %mem:combined% %ms%%utimes%",
    ),
    Grammar::unified(
        EventKind::UnifiedParallelSerialOld,
        CollectorKind::ParallelSerialOld,
        r"%gcid%Pause Full%trg% PSYoungGen: %gen:young% PSOldGen: %gen:old%(?: %meta%)? %mem:combined% %ms%%utimes%",
    ),
    Grammar::unified(
        EventKind::UnifiedParallelCompactingOld,
        CollectorKind::ParallelOld,
        r"%gcid%Pause Full%trg% PSYoungGen: %gen:young% ParOldGen: %gen:old%(?: %meta%)? %mem:combined% %ms%%utimes%",
    ),
];
