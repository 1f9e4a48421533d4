//! Multi-line construct grouper for GC logs.
//!
//! Folds the constructs a JVM splits across physical lines back into one
//! logical line per event:
//! - unified `GC(n)` blocks: the pause start, its per-generation heap lines,
//!   the summary and the cpu line
//! - a CMS pause cut by a concurrent phase that ends in concurrent mode
//!   failure or interruption
//! - an event head split from its tail by a tenuring distribution table
//! - a legacy event waiting for its `[Times: ...]` line, with G1 detail
//!   blocks in between
//!
//! Also drops dump and statistics lines and strips the sub-phase timestamps
//! of remark lines. Lines are never reordered, except that a safepoint
//! record printed into a held event head is emitted as soon as it is seen.
//! A construct that cannot be completed is flushed as the raw lines it
//! absorbed.

use std::borrow::Cow;
use std::sync::Arc;

use crate::conf::PreprocessConfig;
use crate::parser::decorator::{self, DecoratorStyle};
use crate::parser::metrics::ParsingMetrics;
use crate::parser::model::{LineOrigin, LogicalLine, RawLine};
use crate::parser::registry::Registry;

use super::pattern;

enum Step {
    /// The line was absorbed by the pending construct.
    Absorbed,
    /// The line does not continue the pending construct.
    Rejected(RawLine),
}

struct Summary {
    /// Decorator and `GC(n) ` of the summary line.
    prefix: String,
    head: String,
    tail: String,
}

enum LegacyConstruct {
    /// `[CMS` head waiting for ` (concurrent mode failure)`.
    CmsInterleaved,
    /// Event head waiting for its tail after a tenuring table.
    SplitHead,
    /// Complete event waiting for `[Times: ...]` or G1 details.
    Trailer,
}

enum Pending {
    Unified {
        gc_id: u64,
        raw: Vec<RawLine>,
        fragments: Vec<String>,
        summary: Option<Summary>,
    },
    Legacy {
        construct: LegacyConstruct,
        raw: Vec<RawLine>,
        /// Text built so far.
        merged: String,
        /// Detail lines kept for the merge.
        kept: Vec<String>,
        /// Whether any indented detail was seen.
        details: bool,
    },
}

impl Pending {
    fn raw_len(&self) -> usize {
        match self {
            Pending::Unified { raw, .. } | Pending::Legacy { raw, .. } => raw.len(),
        }
    }

    fn into_raw(self) -> Vec<RawLine> {
        match self {
            Pending::Unified { raw, .. } | Pending::Legacy { raw, .. } => raw,
        }
    }
}

pub struct Preprocessor {
    pending: Option<Pending>,
    enabled: bool,
    discard_noise: bool,
    max_block_lines: usize,
    registry: &'static Registry,
    metrics: Arc<ParsingMetrics>,
}

impl Preprocessor {
    pub fn new(config: &PreprocessConfig) -> Self {
        Self::with_metrics(config, Arc::new(ParsingMetrics::new()))
    }

    pub fn with_metrics(config: &PreprocessConfig, metrics: Arc<ParsingMetrics>) -> Self {
        Self {
            pending: None,
            enabled: config.enabled,
            discard_noise: config.discard_noise,
            max_block_lines: config.max_block_lines,
            registry: Registry::global(),
            metrics,
        }
    }

    /// Process one raw line. Returns the logical lines that are complete.
    pub fn process(&mut self, raw: RawLine) -> Vec<LogicalLine> {
        if !self.enabled {
            return vec![LogicalLine::single(raw)];
        }

        let mut out = Vec::new();
        let raw = match self.pending.take() {
            Some(pending) if pending.raw_len() >= self.max_block_lines => {
                tracing::debug!(
                    max_block_lines = self.max_block_lines,
                    "preprocess: block limit reached, flushing"
                );
                self.abandon(pending, &mut out);
                raw
            }
            Some(pending) => match self.continue_pending(pending, raw, &mut out) {
                Step::Absorbed => return out,
                Step::Rejected(raw) => raw,
            },
            None => raw,
        };

        self.begin(raw, &mut out);
        out
    }

    /// Returns true if a construct is waiting for more lines.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Flush the pending construct (call at end of input).
    pub fn flush(&mut self) -> Vec<LogicalLine> {
        let mut out = Vec::new();
        if let Some(pending) = self.pending.take() {
            self.close(pending, &mut out);
        }
        out
    }

    /// Handles a line with nothing pending.
    fn begin(&mut self, raw: RawLine, out: &mut Vec<LogicalLine>) {
        let Some(resolved) = decorator::resolve(&raw.text) else {
            self.single(raw, out);
            return;
        };

        match resolved.style {
            DecoratorStyle::Unified => {
                let rest = resolved.rest(&raw.text);
                let Some((gc_id, body)) = pattern::unified_gc_id(rest) else {
                    self.single(raw, out);
                    return;
                };

                if pattern::is_unified_start(body) {
                    tracing::trace!(line = raw.number, gc_id, "preprocess: unified block start");
                    self.pending = Some(Pending::Unified {
                        gc_id,
                        raw: vec![raw],
                        fragments: Vec::new(),
                        summary: None,
                    });
                } else if let Some(summary) = unified_summary(&raw.text, resolved.prefix_len, gc_id, body) {
                    // Lone summary, held for a following cpu line.
                    self.pending = Some(Pending::Unified {
                        gc_id,
                        raw: vec![raw],
                        fragments: Vec::new(),
                        summary: Some(summary),
                    });
                } else {
                    self.single(raw, out);
                }
            }
            DecoratorStyle::Legacy => {
                if self.discard_noise && self.is_noise(&raw.text) {
                    return;
                }

                if let Some((head, stopped)) = split_stopped_time(&raw) {
                    tracing::trace!(line = raw.number, "preprocess: safepoint record inside event head");
                    self.emit(out, raw.number, stopped, 1, LineOrigin::Single);
                    let merged = head.text.trim_end().to_string();
                    self.hold(LegacyConstruct::SplitHead, vec![head], merged);
                    return;
                }

                let rest = resolved.rest(&raw.text);
                if let Some(at) = pattern::cms_interleaved_phase(&raw.text) {
                    tracing::trace!(line = raw.number, "preprocess: CMS pause cut by concurrent phase");
                    let merged = raw.text[..at].to_string();
                    self.hold(LegacyConstruct::CmsInterleaved, vec![raw], merged);
                } else if pattern::is_split_head(rest) {
                    tracing::trace!(line = raw.number, "preprocess: split event head");
                    let merged = raw.text.trim_end().to_string();
                    self.hold(LegacyConstruct::SplitHead, vec![raw], merged);
                } else {
                    let text = normalize(&raw.text, resolved.prefix_len).into_owned();
                    if pattern::awaits_trailer(&text[resolved.prefix_len..]) {
                        self.hold(LegacyConstruct::Trailer, vec![raw], text);
                    } else {
                        self.emit(out, raw.number, text, 1, LineOrigin::Single);
                    }
                }
            }
        }
    }

    fn continue_pending(
        &mut self,
        pending: Pending,
        raw: RawLine,
        out: &mut Vec<LogicalLine>,
    ) -> Step {
        match pending {
            Pending::Unified {
                gc_id,
                raw: lines,
                fragments,
                summary,
            } => self.continue_unified(gc_id, lines, fragments, summary, raw, out),
            Pending::Legacy {
                construct,
                raw: lines,
                merged,
                kept,
                details,
            } => match construct {
                LegacyConstruct::CmsInterleaved => self.continue_cms(lines, merged, raw, out),
                LegacyConstruct::SplitHead => self.continue_split(lines, merged, raw, out),
                LegacyConstruct::Trailer => self.continue_trailer(lines, merged, kept, details, raw, out),
            },
        }
    }

    fn continue_unified(
        &mut self,
        gc_id: u64,
        mut lines: Vec<RawLine>,
        mut fragments: Vec<String>,
        summary: Option<Summary>,
        raw: RawLine,
        out: &mut Vec<LogicalLine>,
    ) -> Step {
        let same_block = decorator::resolve(&raw.text)
            .filter(|r| r.style == DecoratorStyle::Unified)
            .and_then(|r| {
                let (id, body) = pattern::unified_gc_id(r.rest(&raw.text))?;
                (id == gc_id).then(|| (r.prefix_len, body.to_string()))
            });

        let Some((prefix_len, body)) = same_block else {
            let pending = Pending::Unified {
                gc_id,
                raw: lines,
                fragments,
                summary,
            };
            self.close(pending, out);
            return Step::Rejected(raw);
        };

        match summary {
            None => {
                if pattern::is_unified_fragment(&body) {
                    tracing::trace!(line = raw.number, gc_id, "preprocess: heap fragment");
                    fragments.push(body.trim_end().to_string());
                    lines.push(raw);
                    self.pending = Some(Pending::Unified {
                        gc_id,
                        raw: lines,
                        fragments,
                        summary: None,
                    });
                } else {
                    let summary = unified_summary(&raw.text, prefix_len, gc_id, &body);
                    lines.push(raw);
                    self.pending = Some(Pending::Unified {
                        gc_id,
                        raw: lines,
                        fragments,
                        summary,
                    });
                }
                Step::Absorbed
            }
            Some(summary) => {
                if pattern::is_unified_cpu(&body) {
                    lines.push(raw);
                    self.emit_unified(out, lines, &summary, &fragments, Some(body.trim_end()));
                    Step::Absorbed
                } else {
                    self.emit_unified(out, lines, &summary, &fragments, None);
                    Step::Rejected(raw)
                }
            }
        }
    }

    fn continue_cms(
        &mut self,
        mut lines: Vec<RawLine>,
        merged: String,
        raw: RawLine,
        out: &mut Vec<LogicalLine>,
    ) -> Step {
        if pattern::is_times_only(&raw.text) {
            lines.push(raw);
            self.hold(LegacyConstruct::CmsInterleaved, lines, merged);
            return Step::Absorbed;
        }
        if pattern::is_cms_mode_end(&raw.text) {
            let text = format!("{} {}", merged.trim_end(), raw.text.trim_start());
            lines.push(raw);
            self.hold_or_emit(out, lines, text);
            return Step::Absorbed;
        }
        self.abandon_lines(lines, out);
        Step::Rejected(raw)
    }

    fn continue_split(
        &mut self,
        mut lines: Vec<RawLine>,
        merged: String,
        raw: RawLine,
        out: &mut Vec<LogicalLine>,
    ) -> Step {
        if pattern::is_tenuring(&raw.text) {
            lines.push(raw);
            self.hold(LegacyConstruct::SplitHead, lines, merged);
            return Step::Absorbed;
        }
        if pattern::stopped_time_at(&raw.text) == Some(0) {
            out.push(LogicalLine::single(raw));
            self.hold(LegacyConstruct::SplitHead, lines, merged);
            return Step::Absorbed;
        }

        let tail = raw.text.trim_start();
        let text = if tail.starts_with(':') || tail.starts_with(',') {
            format!("{}{}", merged.trim_end(), tail)
        } else if tail.starts_with('[') {
            format!("{} {}", merged.trim_end(), tail)
        } else {
            self.abandon_lines(lines, out);
            return Step::Rejected(raw);
        };
        lines.push(raw);
        self.hold_or_emit(out, lines, text);
        Step::Absorbed
    }

    fn continue_trailer(
        &mut self,
        mut lines: Vec<RawLine>,
        merged: String,
        mut kept: Vec<String>,
        mut details: bool,
        raw: RawLine,
        out: &mut Vec<LogicalLine>,
    ) -> Step {
        let text = raw.text.as_str();

        if pattern::is_times_only(text) {
            if details && kept.is_empty() {
                lines.push(raw);
                self.abandon_lines(lines, out);
                return Step::Absorbed;
            }
            let joined = format!("{}{} {}", merged.trim_end(), kept.concat(), text.trim());
            lines.push(raw);
            self.emit_block(out, lines, joined);
            return Step::Absorbed;
        }

        let absorbed = if pattern::is_g1_ergonomics(text) {
            if !self.discard_noise {
                // Kept ergonomics lines go out ahead of the event they cut.
                out.push(LogicalLine::single(raw));
                self.pending = Some(Pending::Legacy {
                    construct: LegacyConstruct::Trailer,
                    raw: lines,
                    merged,
                    kept,
                    details,
                });
                return Step::Absorbed;
            }
            true
        } else if pattern::is_detail(text) {
            if pattern::is_eden_detail(text) {
                kept.push(text.trim().to_string());
            }
            details = true;
            true
        } else {
            details && text.starts_with(char::is_whitespace)
        };

        if absorbed {
            lines.push(raw);
            self.pending = Some(Pending::Legacy {
                construct: LegacyConstruct::Trailer,
                raw: lines,
                merged,
                kept,
                details,
            });
            return Step::Absorbed;
        }

        let pending = Pending::Legacy {
            construct: LegacyConstruct::Trailer,
            raw: lines,
            merged,
            kept,
            details,
        };
        self.close(pending, out);
        Step::Rejected(raw)
    }

    /// Emits what a pending construct has when no more lines will come.
    fn close(&mut self, pending: Pending, out: &mut Vec<LogicalLine>) {
        match pending {
            Pending::Unified {
                raw,
                fragments,
                summary: Some(summary),
                ..
            } => self.emit_unified(out, raw, &summary, &fragments, None),
            Pending::Legacy {
                construct: LegacyConstruct::Trailer,
                raw,
                merged,
                kept,
                details,
            } if !details || !kept.is_empty() => {
                let text = format!("{}{}", merged.trim_end(), kept.concat());
                self.emit_block(out, raw, text);
            }
            pending => self.abandon(pending, out),
        }
    }

    fn hold(&mut self, construct: LegacyConstruct, raw: Vec<RawLine>, merged: String) {
        self.pending = Some(Pending::Legacy {
            construct,
            raw,
            merged,
            kept: Vec::new(),
            details: false,
        });
    }

    /// After a merge, waits for a trailer when the result still needs one.
    fn hold_or_emit(&mut self, out: &mut Vec<LogicalLine>, lines: Vec<RawLine>, text: String) {
        let rest_awaits = decorator::resolve(&text)
            .filter(|r| r.style == DecoratorStyle::Legacy)
            .is_some_and(|r| pattern::awaits_trailer(r.rest(&text)));
        if rest_awaits {
            self.hold(LegacyConstruct::Trailer, lines, text);
        } else {
            self.emit_block(out, lines, text);
        }
    }

    fn single(&mut self, raw: RawLine, out: &mut Vec<LogicalLine>) {
        if self.discard_noise && self.is_noise(&raw.text) {
            return;
        }
        out.push(LogicalLine::single(raw));
    }

    fn is_noise(&self, text: &str) -> bool {
        match self.registry.match_noise(text) {
            Some(kind) => {
                tracing::debug!(kind = %kind, "preprocess: discarding noise line");
                self.metrics.record_noise();
                true
            }
            None => false,
        }
    }

    /// Emits a unified block, without its heap fragments when no grammar
    /// accepts the merge with them.
    fn emit_unified(
        &mut self,
        out: &mut Vec<LogicalLine>,
        lines: Vec<RawLine>,
        summary: &Summary,
        fragments: &[String],
        cpu: Option<&str>,
    ) {
        let text = merge_unified(summary, fragments, cpu);
        if fragments.is_empty() || self.registry.recognizes(&text) {
            self.emit_block(out, lines, text);
            return;
        }
        tracing::debug!(
            line = lines.first().map_or(0, |l| l.number),
            fragments = fragments.len(),
            "preprocess: heap fragments not recognized, merging summary only"
        );
        let text = merge_unified(summary, &[], cpu);
        self.emit_block(out, lines, text);
    }

    /// Emits `text` built from `lines`, as merged when more than one.
    fn emit_block(&mut self, out: &mut Vec<LogicalLine>, lines: Vec<RawLine>, text: String) {
        let Some(first) = lines.first() else {
            return;
        };
        let origin = if lines.len() > 1 {
            tracing::debug!(
                line = first.number,
                raw_lines = lines.len(),
                "preprocess: emitting merged construct"
            );
            self.metrics.record_merged();
            LineOrigin::Merged
        } else {
            LineOrigin::Single
        };
        self.emit(out, first.number, text, lines.len(), origin);
    }

    fn emit(
        &mut self,
        out: &mut Vec<LogicalLine>,
        number: usize,
        text: String,
        raw_lines: usize,
        origin: LineOrigin,
    ) {
        out.push(LogicalLine {
            number,
            text,
            raw_lines,
            origin,
        });
    }

    fn abandon(&mut self, pending: Pending, out: &mut Vec<LogicalLine>) {
        self.abandon_lines(pending.into_raw(), out);
    }

    /// Releases the absorbed raw lines unmodified.
    fn abandon_lines(&mut self, lines: Vec<RawLine>, out: &mut Vec<LogicalLine>) {
        if lines.len() == 1 {
            out.extend(lines.into_iter().map(LogicalLine::single));
            return;
        }
        if let Some(first) = lines.first() {
            tracing::debug!(
                line = first.number,
                raw_lines = lines.len(),
                "preprocess: construct abandoned, flushing raw lines"
            );
            self.metrics.record_abandoned();
        }
        out.extend(lines.into_iter().map(|raw| LogicalLine {
            number: raw.number,
            text: raw.text,
            raw_lines: 1,
            origin: LineOrigin::Abandoned,
        }));
    }
}

/// Cuts a safepoint record printed into a split event head off the head.
fn split_stopped_time(raw: &RawLine) -> Option<(RawLine, String)> {
    let at = pattern::stopped_time_at(&raw.text).filter(|&at| at > 0)?;
    let head = &raw.text[..at];
    let resolved = decorator::resolve(head).filter(|r| r.style == DecoratorStyle::Legacy)?;
    if !pattern::is_split_head(resolved.rest(head)) {
        return None;
    }
    Some((RawLine::new(raw.number, head), raw.text[at..].to_string()))
}

fn unified_summary(text: &str, prefix_len: usize, gc_id: u64, body: &str) -> Option<Summary> {
    let (head, tail) = pattern::unified_summary(body)?;
    Some(Summary {
        prefix: format!("{}GC({}) ", &text[..prefix_len], gc_id),
        head: head.to_string(),
        tail: tail.to_string(),
    })
}

fn merge_unified(summary: &Summary, fragments: &[String], cpu: Option<&str>) -> String {
    let mut text = format!("{}{}", summary.prefix, summary.head);
    for fragment in fragments {
        text.push(' ');
        text.push_str(fragment);
    }
    text.push_str(&summary.tail);
    if let Some(cpu) = cpu {
        text.push(' ');
        text.push_str(cpu);
    }
    text
}

/// Strips remark sub-phase timestamps after the decorator.
fn normalize(text: &str, prefix_len: usize) -> Cow<'_, str> {
    match pattern::strip_remark_stamps(&text[prefix_len..]) {
        Cow::Borrowed(_) => Cow::Borrowed(text),
        Cow::Owned(rest) => Cow::Owned(format!("{}{}", &text[..prefix_len], rest)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PreprocessConfig {
        PreprocessConfig::default()
    }

    fn run(pre: &mut Preprocessor, lines: &[&str]) -> Vec<LogicalLine> {
        let mut out = Vec::new();
        for (i, line) in lines.iter().enumerate() {
            out.extend(pre.process(RawLine::new(i + 1, *line)));
        }
        out.extend(pre.flush());
        out
    }

    fn texts(lines: &[LogicalLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn test_plain_lines_pass_through() {
        let mut pre = Preprocessor::new(&config());
        let out = run(
            &mut pre,
            &[
                "1.000: [GC (Allocation Failure)  8192K->4224K(31744K), 0.0070510 secs] [Times: user=0.01 sys=0.00, real=0.01 secs]",
                "2.345: Total time for which application threads were stopped: 0.0001234 seconds",
            ],
        );
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|l| l.origin == LineOrigin::Single));
        assert_eq!(out[1].number, 2);
    }

    #[test]
    fn test_concurrent_mode_failure_becomes_one_line() {
        let mut pre = Preprocessor::new(&config());
        let out = run(
            &mut pre,
            &[
                "44.684: [Full GC (Allocation Failure) 44.684: [CMS44.877: [CMS-concurrent-mark: 1.508/2.428 secs]",
                " [Times: user=3.44 sys=0.49, real=2.43 secs] ",
                " (concurrent mode failure): 1218548K->413373K(1465840K), 1.3656970 secs] 1229657K->413373K(1581168K), [Metaspace: 83932K->83932K(1126400K)], 1.3659420 secs] [Times: user=1.33 sys=0.00, real=1.37 secs]",
            ],
        );
        assert_eq!(out.len(), 1);
        assert_eq!(
            out[0].text,
            "44.684: [Full GC (Allocation Failure) 44.684: [CMS (concurrent mode failure): 1218548K->413373K(1465840K), 1.3656970 secs] 1229657K->413373K(1581168K), [Metaspace: 83932K->83932K(1126400K)], 1.3659420 secs] [Times: user=1.33 sys=0.00, real=1.37 secs]"
        );
        assert_eq!(out[0].origin, LineOrigin::Merged);
        assert_eq!(out[0].raw_lines, 3);
        assert_eq!(out[0].number, 1);
    }

    #[test]
    fn test_split_head_across_tenuring_table() {
        let mut pre = Preprocessor::new(&config());
        let out = run(
            &mut pre,
            &[
                "10.000: [GC (Allocation Failure) 10.000: [ParNew",
                "Desired survivor size 1048576 bytes, new threshold 1 (max 6)",
                "- age   1:     123456 bytes,     123456 total",
                ": 153344K->17024K(153344K), 0.0520000 secs] 300000K->180000K(1000000K), 0.0521000 secs] [Times: user=0.20 sys=0.01, real=0.05 secs]",
            ],
        );
        assert_eq!(
            texts(&out),
            vec!["10.000: [GC (Allocation Failure) 10.000: [ParNew: 153344K->17024K(153344K), 0.0520000 secs] 300000K->180000K(1000000K), 0.0521000 secs] [Times: user=0.20 sys=0.01, real=0.05 secs]"]
        );
    }

    #[test]
    fn test_split_head_with_bracket_tail() {
        let mut pre = Preprocessor::new(&config());
        let out = run(
            &mut pre,
            &[
                "1.000: [GC (Allocation Failure) ",
                "Desired survivor size 1048576 bytes, new threshold 7 (max 15)",
                " [PSYoungGen: 33280K->5118K(38400K)] 33280K->28081K(125952K), 0.0244780 secs] [Times: user=0.07 sys=0.01, real=0.02 secs]",
            ],
        );
        assert_eq!(
            texts(&out),
            vec!["1.000: [GC (Allocation Failure) [PSYoungGen: 33280K->5118K(38400K)] 33280K->28081K(125952K), 0.0244780 secs] [Times: user=0.07 sys=0.01, real=0.02 secs]"]
        );
    }

    #[test]
    fn test_g1_details_block() {
        let mut pre = Preprocessor::new(&config());
        let out = run(
            &mut pre,
            &[
                "0.500: [GC pause (G1 Evacuation Pause) (young), 0.0100000 secs]",
                "   [Parallel Time: 8.0 ms, GC Workers: 4]",
                "      [GC Worker Start (ms): Min: 500.1, Avg: 500.1, Max: 500.2, Diff: 0.1]",
                "   [Code Root Fixup: 0.0 ms]",
                "   [Eden: 24.0M(24.0M)->0.0B(13.0M) Survivors: 0.0B->3072.0K Heap: 24.0M(256.0M)->4096.0K(256.0M)]",
                " [Times: user=0.03 sys=0.01, real=0.01 secs] ",
                "1.000: [GC cleanup 23M->23M(256M), 0.0003000 secs] [Times: user=0.00 sys=0.00, real=0.00 secs]",
            ],
        );
        assert_eq!(
            texts(&out),
            vec![
                "0.500: [GC pause (G1 Evacuation Pause) (young), 0.0100000 secs][Eden: 24.0M(24.0M)->0.0B(13.0M) Survivors: 0.0B->3072.0K Heap: 24.0M(256.0M)->4096.0K(256.0M)] [Times: user=0.03 sys=0.01, real=0.01 secs]",
                "1.000: [GC cleanup 23M->23M(256M), 0.0003000 secs] [Times: user=0.00 sys=0.00, real=0.00 secs]",
            ]
        );
        assert_eq!(out[0].raw_lines, 6);
        assert_eq!(out[1].number, 7);
    }

    #[test]
    fn test_held_line_without_trailer_is_released_in_order() {
        let mut pre = Preprocessor::new(&config());
        let first = pre.process(RawLine::new(1, "1.234: [GC pause (G1 Evacuation Pause) (young) 24M->4096K(256M), 0.0047930 secs]"));
        assert!(first.is_empty());
        assert!(pre.has_pending());

        let next = pre.process(RawLine::new(2, "1.600: [GC cleanup 23M->23M(256M), 0.0003000 secs]"));
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].number, 1);
        assert_eq!(next[0].origin, LineOrigin::Single);

        let rest = pre.flush();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].number, 2);
        assert!(!pre.has_pending());
    }

    #[test]
    fn test_unified_block_merges_fragments_and_cpu() {
        let mut pre = Preprocessor::new(&config());
        let out = run(
            &mut pre,
            &[
                "[0.075s][info][gc,start     ] GC(2) Pause Young (Allocation Failure)",
                "[0.075s][info][gc,heap      ] GC(2) DefNew: 1022K->127K(1152K)",
                "[0.075s][info][gc,heap      ] GC(2) Tenured: 1000K->1200K(2000K)",
                "[0.075s][info][gc,metaspace ] GC(2) Metaspace: 3000K->3000K(1056768K)",
                "[0.075s][info][gc           ] GC(2) Pause Young (Allocation Failure) 2M->1M(3M) 1.664ms",
                "[0.075s][info][gc,cpu       ] GC(2) User=0.01s Sys=0.00s Real=0.00s",
            ],
        );
        assert_eq!(
            texts(&out),
            vec!["[0.075s][info][gc           ] GC(2) Pause Young (Allocation Failure) DefNew: 1022K->127K(1152K) Tenured: 1000K->1200K(2000K) Metaspace: 3000K->3000K(1056768K) 2M->1M(3M) 1.664ms User=0.01s Sys=0.00s Real=0.00s"]
        );
        assert_eq!(out[0].raw_lines, 6);
    }

    #[test]
    fn test_unified_block_drops_phase_lines() {
        let mut pre = Preprocessor::new(&config());
        let out = run(
            &mut pre,
            &[
                "[0.012s][info][gc,start    ] GC(0) Pause Young (Normal) (G1 Evacuation Pause)",
                "[0.012s][info][gc,task     ] GC(0) Using 2 workers of 4 for evacuation",
                "[0.015s][info][gc,heap     ] GC(0) Eden regions: 1->0(2)",
                "[0.015s][info][gc,heap     ] GC(0) Survivor regions: 0->1(1)",
                "[0.015s][info][gc          ] GC(0) Pause Young (Normal) (G1 Evacuation Pause) 24M->4M(256M) 3.456ms",
                "[0.020s][info][gc          ] GC(1) Pause Young (Normal) (G1 Evacuation Pause) 25M->5M(256M) 2.000ms",
            ],
        );
        assert_eq!(
            texts(&out),
            vec![
                "[0.015s][info][gc          ] GC(0) Pause Young (Normal) (G1 Evacuation Pause) Eden regions: 1->0(2) Survivor regions: 0->1(1) 24M->4M(256M) 3.456ms",
                "[0.020s][info][gc          ] GC(1) Pause Young (Normal) (G1 Evacuation Pause) 25M->5M(256M) 2.000ms",
            ]
        );
        assert_eq!(out[1].origin, LineOrigin::Single);
    }

    #[test]
    fn test_unfinished_unified_block_is_flushed_unmodified() {
        let mut pre = Preprocessor::new(&config());
        let lines = [
            "[0.075s][info][gc,start     ] GC(2) Pause Young (Allocation Failure)",
            "[0.075s][info][gc,heap      ] GC(2) DefNew: 1022K->127K(1152K)",
        ];
        let out = run(&mut pre, &lines);
        assert_eq!(texts(&out), lines.to_vec());
        assert!(out.iter().all(|l| l.origin == LineOrigin::Abandoned));
        assert_eq!(pre.metrics.snapshot().abandoned_blocks, 1);
    }

    #[test]
    fn test_interrupted_construct_is_flushed_before_next_line() {
        let mut pre = Preprocessor::new(&config());
        let out = run(
            &mut pre,
            &[
                "10.000: [GC (Allocation Failure) 10.000: [ParNew",
                "11.000: [GC cleanup 23M->23M(256M), 0.0003000 secs] [Times: user=0.00 sys=0.00, real=0.00 secs]",
            ],
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].text, "10.000: [GC (Allocation Failure) 10.000: [ParNew");
        assert_eq!(out[0].origin, LineOrigin::Single);
        assert_eq!(out[1].number, 2);
    }

    #[test]
    fn test_noise_is_discarded() {
        let mut pre = Preprocessor::new(&config());
        let out = run(
            &mut pre,
            &[
                "{Heap before GC invocations=1 (full 0):",
                " par new generation   total 153344K, used 153344K [0x00000000c0000000, 0x00000000ca660000, 0x00000000ca660000)",
                "}",
                "Desired survivor size 1048576 bytes, new threshold 7 (max 15)",
                "1.600: [GC cleanup 23M->23M(256M), 0.0003000 secs] [Times: user=0.00 sys=0.00, real=0.00 secs]",
            ],
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].number, 5);
        assert_eq!(pre.metrics.snapshot().noise_discarded, 4);
    }

    #[test]
    fn test_noise_kept_when_configured() {
        let mut pre = Preprocessor::new(&PreprocessConfig {
            discard_noise: false,
            ..config()
        });
        let out = run(&mut pre, &["{Heap before GC invocations=1 (full 0):", "}"]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_disabled_passes_every_line() {
        let mut pre = Preprocessor::new(&PreprocessConfig {
            enabled: false,
            ..config()
        });
        let lines = [
            "10.000: [GC (Allocation Failure) 10.000: [ParNew",
            "Desired survivor size 1048576 bytes, new threshold 1 (max 6)",
        ];
        let out = run(&mut pre, &lines);
        assert_eq!(texts(&out), lines.to_vec());
        assert!(!pre.has_pending());
    }

    #[test]
    fn test_block_limit_abandons_construct() {
        let mut pre = Preprocessor::new(&PreprocessConfig {
            max_block_lines: 2,
            ..config()
        });
        let out = run(
            &mut pre,
            &[
                "10.000: [GC (Allocation Failure) 10.000: [ParNew",
                "Desired survivor size 1048576 bytes, new threshold 1 (max 6)",
                "- age   1:     123456 bytes,     123456 total",
            ],
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].origin, LineOrigin::Abandoned);
        assert_eq!(out[1].number, 2);
    }

    #[test]
    fn test_remark_stamps_are_stripped() {
        let mut pre = Preprocessor::new(&config());
        let out = run(
            &mut pre,
            &["1.500: [GC remark 1.500: [Finalize Marking, 0.0001070 secs] 1.500: [GC ref-proc, 0.0000710 secs] 1.501: [Unloading, 0.0012850 secs], 0.0024750 secs] [Times: user=0.01 sys=0.00, real=0.00 secs]"],
        );
        assert_eq!(
            texts(&out),
            vec!["1.500: [GC remark [Finalize Marking, 0.0001070 secs] [GC ref-proc, 0.0000710 secs] [Unloading, 0.0012850 secs], 0.0024750 secs] [Times: user=0.01 sys=0.00, real=0.00 secs]"]
        );
    }

    #[test]
    fn test_output_is_idempotent() {
        let input = [
            "44.684: [Full GC (Allocation Failure) 44.684: [CMS44.877: [CMS-concurrent-mark: 1.508/2.428 secs]",
            " [Times: user=3.44 sys=0.49, real=2.43 secs] ",
            " (concurrent mode failure): 1218548K->413373K(1465840K), 1.3656970 secs] 1229657K->413373K(1581168K), [Metaspace: 83932K->83932K(1126400K)], 1.3659420 secs] [Times: user=1.33 sys=0.00, real=1.37 secs]",
            "0.500: [GC pause (G1 Evacuation Pause) (young), 0.0100000 secs]",
            "   [Eden: 24.0M(24.0M)->0.0B(13.0M) Survivors: 0.0B->3072.0K Heap: 24.0M(256.0M)->4096.0K(256.0M)]",
            " [Times: user=0.03 sys=0.01, real=0.01 secs] ",
            "1.234: [GC pause (G1 Evacuation Pause) (young) 24M->4096K(256M), 0.0047930 secs]",
            "[0.075s][info][gc,start     ] GC(2) Pause Young (Allocation Failure)",
            "[0.075s][info][gc,heap      ] GC(2) DefNew: 1022K->127K(1152K)",
            "[0.075s][info][gc           ] GC(2) Pause Young (Allocation Failure) 2M->1M(3M) 1.664ms",
            "1.500: [GC remark 1.500: [Finalize Marking, 0.0001070 secs], 0.0024750 secs]",
        ];
        let once = run(&mut Preprocessor::new(&config()), &input);
        let once_texts = texts(&once);
        let twice = run(&mut Preprocessor::new(&config()), &once_texts);
        assert_eq!(texts(&twice), once_texts);
    }

    #[test]
    fn test_unrecognized_fragments_are_dropped_from_merge() {
        let mut pre = Preprocessor::new(&config());
        let out = run(
            &mut pre,
            &[
                "[0.075s][info][gc,start     ] GC(2) Pause Young (Allocation Failure)",
                "[0.075s][info][gc,heap      ] GC(2) DefNew: 1022K->127K(1152K)",
                "[0.075s][info][gc           ] GC(2) Pause Young (Allocation Failure) 2M->1M(3M) 1.664ms",
            ],
        );
        assert_eq!(
            texts(&out),
            vec!["[0.075s][info][gc           ] GC(2) Pause Young (Allocation Failure) 2M->1M(3M) 1.664ms"]
        );
        assert_eq!(out[0].raw_lines, 3);
        assert_eq!(out[0].origin, LineOrigin::Merged);
    }

    #[test]
    fn test_jdk17_heap_lines_are_merged() {
        let mut pre = Preprocessor::new(&config());
        let out = run(
            &mut pre,
            &[
                "[0.075s][info][gc,start    ] GC(0) Pause Young (Allocation Failure)",
                "[0.076s][info][gc,heap     ] GC(0) DefNew: 1022K(1152K)->127K(1152K) Eden: 1022K(1024K)->0K(1024K) From: 0K(128K)->127K(128K)",
                "[0.076s][info][gc,heap     ] GC(0) Tenured: 0K(768K)->500K(768K)",
                "[0.076s][info][gc          ] GC(0) Pause Young (Allocation Failure) 1M->0M(1M) 1.664ms",
            ],
        );
        assert_eq!(
            texts(&out),
            vec!["[0.076s][info][gc          ] GC(0) Pause Young (Allocation Failure) DefNew: 1022K(1152K)->127K(1152K) Eden: 1022K(1024K)->0K(1024K) From: 0K(128K)->127K(128K) Tenured: 0K(768K)->500K(768K) 1M->0M(1M) 1.664ms"]
        );
    }

    #[test]
    fn test_stopped_time_cut_from_split_head() {
        let mut pre = Preprocessor::new(&config());
        let out = run(
            &mut pre,
            &[
                "1.234: [GC (Allocation Failure) 1.235: [ParNew1.240: Total time for which application threads were stopped: 0.0001234 seconds, Stopping threads took: 0.0000100 seconds",
                ": 153344K->17024K(153344K), 0.0520000 secs] 300000K->180000K(1000000K), 0.0521000 secs] [Times: user=0.20 sys=0.01, real=0.05 secs]",
            ],
        );
        assert_eq!(
            texts(&out),
            vec![
                "1.240: Total time for which application threads were stopped: 0.0001234 seconds, Stopping threads took: 0.0000100 seconds",
                "1.234: [GC (Allocation Failure) 1.235: [ParNew: 153344K->17024K(153344K), 0.0520000 secs] 300000K->180000K(1000000K), 0.0521000 secs] [Times: user=0.20 sys=0.01, real=0.05 secs]",
            ]
        );
        assert_eq!(out[0].number, 1);
        assert_eq!(out[1].raw_lines, 2);
        assert_eq!(out[1].origin, LineOrigin::Merged);
    }

    #[test]
    fn test_stopped_time_line_inside_split_head() {
        let mut pre = Preprocessor::new(&config());
        let out = run(
            &mut pre,
            &[
                "10.000: [GC (Allocation Failure) 10.000: [ParNew",
                "10.010: Total time for which application threads were stopped: 0.0001234 seconds",
                ": 153344K->17024K(153344K), 0.0520000 secs] 300000K->180000K(1000000K), 0.0521000 secs] [Times: user=0.20 sys=0.01, real=0.05 secs]",
            ],
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].number, 2);
        assert_eq!(out[0].origin, LineOrigin::Single);
        assert_eq!(out[1].number, 1);
        assert_eq!(out[1].raw_lines, 2);
        assert!(out[1].text.starts_with("10.000: [GC (Allocation Failure) 10.000: [ParNew: 153344K"));
    }

    #[test]
    fn test_g1_ergonomics_follows_noise_setting() {
        let lines = [
            "1.234: [GC pause (G1 Evacuation Pause) (young) 24M->4096K(256M), 0.0047930 secs]",
            " 1.240: [G1Ergonomics (Concurrent Cycles) request concurrent cycle initiation, reason: occupancy higher than threshold]",
            " [Times: user=0.03 sys=0.01, real=0.01 secs]",
        ];
        let merged = "1.234: [GC pause (G1 Evacuation Pause) (young) 24M->4096K(256M), 0.0047930 secs] [Times: user=0.03 sys=0.01, real=0.01 secs]";

        let out = run(&mut Preprocessor::new(&config()), &lines);
        assert_eq!(texts(&out), vec![merged]);
        assert_eq!(out[0].raw_lines, 3);

        let mut pre = Preprocessor::new(&PreprocessConfig {
            discard_noise: false,
            ..config()
        });
        let out = run(&mut pre, &lines);
        assert_eq!(texts(&out), vec![lines[1], merged]);
        assert_eq!(out[1].raw_lines, 2);
    }
}
