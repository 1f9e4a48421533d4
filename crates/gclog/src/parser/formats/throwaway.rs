//! Recognized lines that carry no event data: JVM banners, heap dumps,
//! histograms, statistics blocks and thread dumps.
//!
//! These are matched whole-line (or after whatever decorator precedes them)
//! so a dump body never reaches an event grammar by accident.

use crate::parser::grammar::{Grammar, Prefix};
use crate::parser::model::EventKind;

pub(crate) const GRAMMARS: &[Grammar] = &[
    Grammar::throwaway(
        EventKind::Header,
        r"(?:OpenJDK|Java HotSpot\(TM\)) .*VM \(.+\).*|Memory: \d+k page, physical \d+k\(\d+k free\)(?:, swap \d+k\(\d+k free\))?|CommandLine flags: .*",
    ),
    Grammar::throwaway(
        EventKind::UnifiedHeader,
        r"(?:GC\(\d+\) )?(?:Using (?:Serial|Parallel|Concurrent Mark Sweep|G1|Shenandoah|The Z Garbage Collector)|Version: .+|CPUs: \d+ total, \d+ available|Memory: \d+(?:[.,]\d+)?[BKMG]|Large Page Support: .+|NUMA Support: .+|Compressed Oops: .+|Heap (?:Region Size|Min Capacity|Initial Capacity|Max Capacity): .+|Pre-touch: .+|Parallel Workers: \d+|Concurrent Workers: \d+|Concurrent Refinement Workers: \d+|Periodic GC: .+|Heuristics ergonomically .+|Shenandoah heuristics: .+|Initialize Shenandoah heap: .+|Safepointing mechanism: .+|Soft Max Heap Size: .+|Heap address: .+|CDS .+|Compressed class space .+|Narrow klass .+|Humongous object threshold: .+|Max TLAB size: .+|GC threads: .+|Reference processing: .+|Regions: .+|Trigger: .+|Free: .+|Evacuation Reserve: .+|Pacer for .+|Adaptive CSet Selection.+|Collectable Garbage: .+|Good progress for .+|Cancelling GC: .+)",
    )
    .prefix(Prefix::Unified),
    // {Heap before GC invocations=1 (full 0):
    //  par new generation   total 153344K, used 153344K [0x..., 0x..., 0x...)
    Grammar::throwaway(
        EventKind::HeapAtGc,
        r"\{?(?:GC\(\d+\) )?Heap(?: (?:before|after) GC invocations=\d+ \(full \d+\):.*)?|\}|(?:GC\(\d+\) )?\s+(?:par new generation|def new generation|eden space|from space|to +space|concurrent mark-sweep generation|concurrent-mark-sweep perm gen|tenured generation|the space|compacting perm gen|ro space|rw space|PSYoungGen|ParOldGen|PSOldGen|PSPermGen|object space|garbage-first heap|region size|Metaspace|class space|Shenandoah Heap|No shared spaces|Status: |Reserved region:|Collection set:|- \[|- map|\d+ x \d+ ?[KMG] regions|\d+ ?[KMG] (?:max|soft max|total|committed)).*",
    ),
    // 2.000: [Class Histogram (before full gc):
    Grammar::throwaway(
        EventKind::ClassHistogram,
        r"\[Class Histogram(?: \((?:before|after) full gc\))?:?|\s*num +#instances +#bytes +class name(?: \(module\))?|-{20,}|\s*\d+: +\d+ +\d+ +.+|Total +\d+ +\d+|, -?\d+[.,]\d+ secs\]",
    ),
    Grammar::throwaway(
        EventKind::ThreadDump,
        r#"Full thread dump .+|"[^"]+" .*(?:prio|tid)=.+|\s+java\.lang\.Thread\.State: .+|\s+at [\w$.<>/-]+\(.*\)|\s+- (?:locked|waiting on|waiting to lock|parking to wait for) .+|JNI global refs?(?:erences)?: .+|\s+Locked ownable synchronizers:|\s+- None"#,
    ),
    Grammar::throwaway(
        EventKind::FlsStatistics,
        r"Statistics for (?:BinaryTreeDictionary|IndexedFreeLists):|Total Free Space: -?\d+|Max +Chunk Size: -?\d+|Number of Blocks: \d+|Av\. +Block +Size: \d+|Tree +Height: \d+|Before GC:|After GC:|CMS: Large (?:block|Block) .+",
    ),
    // Desired survivor size 1048576 bytes, new threshold 7 (max 15)
    // - age   1:     123456 bytes,     123456 total
    Grammar::throwaway(
        EventKind::TenuringDistribution,
        r"(?:GC\(\d+\) )?(?:Desired survivor size \d+ bytes, new threshold \d+ \(max(?: threshold)? \d+\)|Age table with threshold \d+ \(max threshold \d+\)|- age +\d+: +\d+ bytes, +\d+ total)",
    ),
    Grammar::throwaway(
        EventKind::ApplicationConcurrentTime,
        r"Application time: -?\d+[.,]\d+ seconds",
    ),
    //  0.500: [G1Ergonomics (CSet Construction) start choosing CSet, _pending_cards: 0, ...]
    Grammar::throwaway(
        EventKind::G1Ergonomics,
        r"\s*%ts%\[G1Ergonomics \([^()]+\) .*",
    ),
];
