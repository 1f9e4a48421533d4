//! GC log line classification and field extraction.
//!
//! # Architecture
//!
//! - `units.rs`: size and duration normalization
//! - `decorator.rs`: leading timestamp resolution
//! - `trigger.rs`: trigger text to [`Trigger`]
//! - `times.rs`: `[Times: ...]` data and parallelism
//! - `grammar.rs`: `%token%` templates and compilation
//! - `formats/`: per-collector grammar tables
//! - `registry.rs`: ordered first-full-match classifier
//! - `extract.rs`: named captures to typed [`Event`]
//! - `traits.rs`: event sinks
//! - `metrics.rs`: line and classification counters

pub mod decorator;
pub mod extract;
pub mod formats;
pub mod grammar;
pub mod metrics;
pub mod model;
pub mod registry;
pub mod times;
pub mod traits;
pub mod trigger;
pub mod units;

// Re-export commonly used types
pub use decorator::{Decorator, DecoratorStyle};
pub use extract::MatchContext;
pub use metrics::{MetricsSnapshot, ParsingMetrics};
pub use model::{
    Capabilities, CollectorKind, Event, EventKind, LineOrigin, LogicalLine, MemoryBlock, RawLine,
};
pub use registry::Registry;
pub use times::TimesData;
pub use traits::{from_fn, EventSink};
pub use trigger::Trigger;
pub use units::Memory;
