// Classification and field extraction for JVM garbage-collection logs.

// Core infrastructure
pub mod conf;
pub mod parser;

// Line handling
pub mod preprocess;
pub mod pipeline;

pub use conf::{ConfigError, ParserConfig, PreprocessConfig};
pub use parser::{
    from_fn, Capabilities, CollectorKind, Event, EventKind, EventSink, Memory, MemoryBlock,
    MetricsSnapshot, ParsingMetrics, TimesData, Trigger,
};
pub use pipeline::{parse_lines, Pipeline};
