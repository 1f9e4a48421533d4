//! Collection trigger vocabulary.

use std::fmt;

use serde::Serialize;

/// Why a collection ran, as printed in parentheses by the JVM.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    AllocationFailure,
    SystemGc,
    MetadataGcThreshold,
    MetadataGcClearSoftReferences,
    LastDitchCollection,
    Ergonomics,
    GcLocker,
    HeapInspection,
    HeapDump,
    JvmtiForceGc,
    DiagnosticCommand,
    AllocationProfiler,
    UpdateAllocationContextStats,
    CmsInitialMark,
    CmsFinalRemark,
    ConcurrentModeFailure,
    ConcurrentModeInterrupted,
    PromotionFailed,
    G1EvacuationPause,
    G1HumongousAllocation,
    G1CompactionPause,
    G1PreventiveCollection,
    G1PeriodicCollection,
    ToSpaceExhausted,
    ToSpaceOverflow,
    ClassUnloading,
    WhiteBoxInitiated,
    /// Text present but not in the vocabulary.
    Unknown,
    /// No trigger on the line.
    #[default]
    None,
}

impl Trigger {
    /// Exact-text lookup. Unmapped text is [`Trigger::Unknown`].
    pub fn from_text(text: &str) -> Self {
        match text.trim() {
            "" => Trigger::None,
            "Allocation Failure" => Trigger::AllocationFailure,
            "System.gc()" | "System" => Trigger::SystemGc,
            "Metadata GC Threshold" => Trigger::MetadataGcThreshold,
            "Metadata GC Clear Soft References" => Trigger::MetadataGcClearSoftReferences,
            "Last ditch collection" => Trigger::LastDitchCollection,
            "Ergonomics" => Trigger::Ergonomics,
            "GCLocker Initiated GC" => Trigger::GcLocker,
            "Heap Inspection Initiated GC" => Trigger::HeapInspection,
            "Heap Dump Initiated GC" => Trigger::HeapDump,
            "JvmtiEnv ForceGarbageCollection" => Trigger::JvmtiForceGc,
            "Diagnostic Command" => Trigger::DiagnosticCommand,
            "Allocation Profiler" => Trigger::AllocationProfiler,
            "Update Allocation Context Stats" => Trigger::UpdateAllocationContextStats,
            "CMS Initial Mark" => Trigger::CmsInitialMark,
            "CMS Final Remark" => Trigger::CmsFinalRemark,
            "concurrent mode failure" => Trigger::ConcurrentModeFailure,
            "concurrent mode interrupted" => Trigger::ConcurrentModeInterrupted,
            "promotion failed" => Trigger::PromotionFailed,
            "G1 Evacuation Pause" => Trigger::G1EvacuationPause,
            "G1 Humongous Allocation" => Trigger::G1HumongousAllocation,
            "G1 Compaction Pause" => Trigger::G1CompactionPause,
            "G1 Preventive Collection" => Trigger::G1PreventiveCollection,
            "G1 Periodic Collection" => Trigger::G1PeriodicCollection,
            "to-space exhausted" | "To-space exhausted" => Trigger::ToSpaceExhausted,
            "to-space overflow" => Trigger::ToSpaceOverflow,
            "Class Unloading" => Trigger::ClassUnloading,
            "WhiteBox Initiated Young GC" | "WhiteBox Initiated Concurrent Mark"
            | "WhiteBox Initiated Run to Breakpoint" => Trigger::WhiteBoxInitiated,
            _ => Trigger::Unknown,
        }
    }

    /// Resolves a line's trigger from its captured candidates in match order.
    ///
    /// The last non-empty candidate wins: a later trigger on the line
    /// (`promotion failed`, `concurrent mode failure`, `to-space exhausted`)
    /// describes what the collection ended up doing.
    pub fn resolve<'a, I>(candidates: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        candidates
            .into_iter()
            .filter(|text| !text.trim().is_empty())
            .last()
            .map(Trigger::from_text)
            .unwrap_or(Trigger::None)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Trigger::AllocationFailure => "Allocation Failure",
            Trigger::SystemGc => "System.gc()",
            Trigger::MetadataGcThreshold => "Metadata GC Threshold",
            Trigger::MetadataGcClearSoftReferences => "Metadata GC Clear Soft References",
            Trigger::LastDitchCollection => "Last ditch collection",
            Trigger::Ergonomics => "Ergonomics",
            Trigger::GcLocker => "GCLocker Initiated GC",
            Trigger::HeapInspection => "Heap Inspection Initiated GC",
            Trigger::HeapDump => "Heap Dump Initiated GC",
            Trigger::JvmtiForceGc => "JvmtiEnv ForceGarbageCollection",
            Trigger::DiagnosticCommand => "Diagnostic Command",
            Trigger::AllocationProfiler => "Allocation Profiler",
            Trigger::UpdateAllocationContextStats => "Update Allocation Context Stats",
            Trigger::CmsInitialMark => "CMS Initial Mark",
            Trigger::CmsFinalRemark => "CMS Final Remark",
            Trigger::ConcurrentModeFailure => "concurrent mode failure",
            Trigger::ConcurrentModeInterrupted => "concurrent mode interrupted",
            Trigger::PromotionFailed => "promotion failed",
            Trigger::G1EvacuationPause => "G1 Evacuation Pause",
            Trigger::G1HumongousAllocation => "G1 Humongous Allocation",
            Trigger::G1CompactionPause => "G1 Compaction Pause",
            Trigger::G1PreventiveCollection => "G1 Preventive Collection",
            Trigger::G1PeriodicCollection => "G1 Periodic Collection",
            Trigger::ToSpaceExhausted => "to-space exhausted",
            Trigger::ToSpaceOverflow => "to-space overflow",
            Trigger::ClassUnloading => "Class Unloading",
            Trigger::WhiteBoxInitiated => "WhiteBox Initiated",
            Trigger::Unknown => "unknown",
            Trigger::None => "none",
        }
    }

    /// True for triggers that mean the collector fell back to a slower path.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Trigger::ConcurrentModeFailure
                | Trigger::ConcurrentModeInterrupted
                | Trigger::PromotionFailed
                | Trigger::ToSpaceExhausted
                | Trigger::ToSpaceOverflow
                | Trigger::LastDitchCollection
        )
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
