//! Shenandoah: the short init/final pauses around each concurrent phase,
//! degenerated and full fallbacks, and the concurrent phases themselves.
//! JDK 8 backports print these with legacy decorators, JDK 11+ with
//! unified ones.

use crate::parser::grammar::Grammar;
use crate::parser::model::{CollectorKind, EventKind};

const C: CollectorKind = CollectorKind::Shenandoah;

pub(crate) const GRAMMARS: &[Grammar] = &[
    // 0.427: [Pause Init Mark, 0.419 ms]
    Grammar::legacy(
        EventKind::ShenandoahInitMark,
        C,
        r"\[Pause Init Mark(?: \([a-z ]+\))*, %ms%\]",
    ),
    Grammar::legacy(
        EventKind::ShenandoahFinalMark,
        C,
        r"\[Pause Final Mark(?: \([a-z ]+\))*(?: %mem:combined%)?, %ms%\]",
    ),
    Grammar::legacy(
        EventKind::ShenandoahInitUpdate,
        C,
        r"\[Pause Init Update Refs, %ms%\]",
    ),
    Grammar::legacy(
        EventKind::ShenandoahFinalUpdate,
        C,
        r"\[Pause Final Update Refs(?: %mem:combined%)?, %ms%\]",
    ),
    Grammar::legacy(
        EventKind::ShenandoahDegeneratedGc,
        C,
        r"\[Pause Degenerated GC \((?:Outside of Cycle|Mark|Evacuation|Update Refs)\) %mem:combined%, %ms%\]",
    ),
    Grammar::legacy(
        EventKind::ShenandoahFullGc,
        C,
        r"\[Pause Full%trg% %mem:combined%, %ms%\]",
    ),
    // 0.440: [Concurrent marking 32M->33M(64M), 12.969 ms]
    Grammar::legacy(
        EventKind::ShenandoahConcurrent,
        C,
        r"\[Concurrent (?:reset|marking|precleaning|evacuation|update references|cleanup|uncommit|class unloading|weak roots|strong roots|thread roots|weak references)(?: \([a-z ]+\))*(?:, start\]|(?: +%mem:combined%)?, %ms%\])",
    ),
    // [0.512s][info][gc] GC(0) Pause Init Mark (unload classes) 0.123ms
    Grammar::unified(
        EventKind::ShenandoahInitMark,
        C,
        r"%gcid%Pause Init Mark(?: \([a-z ]+\))* %ms%",
    ),
    Grammar::unified(
        EventKind::ShenandoahFinalMark,
        C,
        r"%gcid%Pause Final Mark(?: \([a-z ]+\))* %ms%",
    ),
    Grammar::unified(
        EventKind::ShenandoahInitUpdate,
        C,
        r"%gcid%Pause Init Update Refs %ms%",
    ),
    Grammar::unified(
        EventKind::ShenandoahFinalUpdate,
        C,
        r"%gcid%Pause Final Update Refs %ms%",
    ),
    Grammar::unified(
        EventKind::ShenandoahDegeneratedGc,
        C,
        r"%gcid%Pause Degenerated GC \((?:Outside of Cycle|Mark|Evacuation|Update Refs)\) %mem:combined% %ms%",
    ),
    // Only Shenandoah prints a full pause without a cause.
    Grammar::unified(
        EventKind::ShenandoahFullGc,
        C,
        r"%gcid%Pause Full %mem:combined% %ms%",
    ),
    Grammar::unified(
        EventKind::ShenandoahConcurrent,
        C,
        r"(?:%gcid%)?Concurrent (?:reset|marking|precleaning|evacuation|update references|cleanup|uncommit|class unloading|weak roots|strong roots|thread roots|weak references)(?: \([a-z ]+\))*(?:(?: %mem:combined%)? %ms%)?",
    ),
];
