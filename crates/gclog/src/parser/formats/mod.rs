pub mod cms;
pub mod g1;
pub mod generic;
pub mod parallel;
pub mod serial;
pub mod shenandoah;
pub mod throwaway;

use super::grammar::Grammar;

/// Grammar families in registry priority order.
///
/// Order matters! Collector-specific families come before the generic
/// shapes they are supersets of, and throwaway shapes come last.
pub const FAMILIES: &[(&str, &[Grammar])] = &[
    ("g1", g1::GRAMMARS),
    ("shenandoah", shenandoah::GRAMMARS),
    ("cms", cms::GRAMMARS),
    ("parallel", parallel::GRAMMARS),
    ("serial", serial::GRAMMARS),
    ("generic", generic::GRAMMARS),
    ("throwaway", throwaway::GRAMMARS),
];

/// Every grammar in priority order.
pub fn all() -> impl Iterator<Item = &'static Grammar> {
    FAMILIES.iter().flat_map(|(_, grammars)| grammars.iter())
}
