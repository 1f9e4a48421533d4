//! Serial collector: `DefNew` young collections and `Tenured` full
//! collections.

use crate::parser::grammar::{Derive, Grammar};
use crate::parser::model::{CollectorKind, EventKind};

pub(crate) const GRAMMARS: &[Grammar] = &[
    // 2.457: [Full GC (Metadata GC Threshold) 2.457: [Tenured: 0K->3000K(21888K), 0.0250000 secs] 5010K->3000K(31680K), [Metaspace: 20000K->20000K(1067008K)], 0.0251000 secs]
    // 3.000: [GC (Allocation Failure) 3.000: [DefNew: 9000K->9000K(9792K), 0.0000100 secs]3.000: [Tenured: ...
    Grammar::legacy(
        EventKind::SerialOld,
        CollectorKind::Serial,
        r"\[(?:Full GC|GC)%trg% ?%ts%(?:\[DefNew(?: \((?P<trigger_2>promotion failed)\))?%refs% ?: %mem%, %s%\] ?%ts%)?\[Tenured: %mem:old%, %s%\] %mem:combined%(?:, %perm%)?, %secs%\]%times%",
    )
    .derive(Derive::YoungFromCombined),
    // 2.218: [GC (Allocation Failure) 2.218: [DefNew: 8704K->1087K(9792K), 0.0057233 secs] 8704K->3478K(31616K), 0.0058053 secs]
    Grammar::legacy(
        EventKind::SerialNew,
        CollectorKind::Serial,
        r"\[GC%trg% %ts%\[DefNew%refs%: %mem:young%, %s%\] %mem:combined%, %secs%\]%times%",
    )
    .derive(Derive::OldFromCombined),
    Grammar::unified(
        EventKind::UnifiedSerialNew,
        CollectorKind::Serial,
        r"%gcid%Pause Young%trg% DefNew: %gen:young% Tenured: %gen:old%(?: %meta%)? %mem:combined% %ms%%utimes%",
    ),
    Grammar::unified(
        EventKind::UnifiedSerialOld,
        CollectorKind::Serial,
        r"%gcid%Pause Full%trg% DefNew: %gen:young% Tenured: %gen:old%(?: %meta%)? %mem:combined% %ms%%utimes%",
    ),
];
