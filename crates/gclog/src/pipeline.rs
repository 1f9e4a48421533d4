//! Line-at-a-time driver: raw lines in, events out, in input order.
//!
//! One [`Pipeline`] covers one log stream. Independent streams run one
//! pipeline each and may share a [`ParsingMetrics`] through an `Arc`.

use std::sync::Arc;
use std::time::Instant;

use crate::conf::{ConfigError, ParserConfig};
use crate::parser::decorator;
use crate::parser::extract::MatchContext;
use crate::parser::metrics::ParsingMetrics;
use crate::parser::model::{Event, LogicalLine, RawLine};
use crate::parser::registry::Registry;
use crate::parser::traits::EventSink;
use crate::preprocess::Preprocessor;

pub struct Pipeline {
    preprocessor: Preprocessor,
    registry: &'static Registry,
    ctx: MatchContext,
    /// Set once the origin is fixed, by config or by the first decorator.
    origin_settled: bool,
    next_line: usize,
    metrics: Arc<ParsingMetrics>,
}

impl Pipeline {
    pub fn new(config: &ParserConfig) -> Result<Self, ConfigError> {
        Self::with_metrics(config, Arc::new(ParsingMetrics::new()))
    }

    pub fn with_metrics(
        config: &ParserConfig,
        metrics: Arc<ParsingMetrics>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let origin = config.jvm_start_datetime()?;

        tracing::debug!(
            collector_hint = ?config.collector_hint,
            jvm_start = ?origin,
            preprocess = config.preprocess.enabled,
            "pipeline: created"
        );

        Ok(Self {
            preprocessor: Preprocessor::with_metrics(&config.preprocess, Arc::clone(&metrics)),
            registry: Registry::global(),
            ctx: MatchContext {
                collector_hint: config.collector_hint,
                origin,
            },
            origin_settled: origin.is_some(),
            next_line: 1,
            metrics,
        })
    }

    /// Feed one raw line. Events completed by it go to `sink`.
    pub fn push<S: EventSink + ?Sized>(&mut self, line: &str, sink: &mut S) {
        let raw = RawLine::new(self.next_line, line);
        self.next_line += 1;
        self.metrics.record_raw_line();

        for logical in self.preprocessor.process(raw) {
            self.classify(logical, sink);
        }
    }

    /// Flush whatever the preprocessor still holds (call at end of input).
    pub fn finish<S: EventSink + ?Sized>(&mut self, sink: &mut S) {
        for logical in self.preprocessor.flush() {
            self.classify(logical, sink);
        }
        tracing::debug!(lines = self.next_line - 1, "pipeline: finished");
    }

    pub fn metrics(&self) -> &Arc<ParsingMetrics> {
        &self.metrics
    }

    fn classify<S: EventSink + ?Sized>(&mut self, line: LogicalLine, sink: &mut S) {
        self.metrics.record_logical_line();
        if !self.origin_settled {
            self.settle_origin(&line);
        }

        let start = Instant::now();
        let event = self.registry.classify(&line, &self.ctx);
        let nanos = u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX);
        self.metrics.record_event(&event, nanos);

        sink.accept(event);
    }

    /// Takes the JVM start implied by the first decorated line.
    fn settle_origin(&mut self, line: &LogicalLine) {
        let Some(resolved) = decorator::resolve(&line.text) else {
            return;
        };
        self.origin_settled = true;
        self.ctx.origin = resolved.decorator.implied_origin();
        if let Some(origin) = self.ctx.origin {
            tracing::debug!(line = line.number, origin = %origin, "pipeline: origin from first datestamp");
        }
    }
}

/// Runs a whole log through a fresh pipeline.
pub fn parse_lines<I, L>(lines: I, config: &ParserConfig) -> Result<Vec<Event>, ConfigError>
where
    I: IntoIterator<Item = L>,
    L: AsRef<str>,
{
    let mut pipeline = Pipeline::new(config)?;
    let mut events: Vec<Event> = Vec::new();
    for line in lines {
        pipeline.push(line.as_ref(), &mut events);
    }
    pipeline.finish(&mut events);
    Ok(events)
}
