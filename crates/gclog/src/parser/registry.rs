//! Ordered grammar table and the first-full-match classifier.
//!
//! Every logical line is tried against the grammars in the order declared
//! by [`super::formats::FAMILIES`]. The first grammar that matches the whole
//! subject wins. A line no grammar matches becomes an `Unrecognized` event.

use std::sync::LazyLock;

use super::decorator::{self, DecoratorStyle, Resolved};
use super::extract::{self, MatchContext};
use super::formats;
use super::grammar::{CompiledGrammar, GrammarError, Prefix};
use super::model::{Event, EventKind, LogicalLine};

static REGISTRY: LazyLock<Registry> =
    LazyLock::new(|| Registry::builtin().expect("built-in grammar table must compile"));

#[derive(Debug)]
pub struct Registry {
    entries: Vec<CompiledGrammar>,
}

impl Registry {
    /// Compiles the built-in grammar table.
    pub fn builtin() -> Result<Self, GrammarError> {
        let entries = formats::all()
            .map(|grammar| CompiledGrammar::compile(*grammar))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    /// The process-wide registry, compiled on first use.
    pub fn global() -> &'static Registry {
        &REGISTRY
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Event kinds in priority order, one per grammar.
    pub fn kinds(&self) -> impl Iterator<Item = EventKind> + '_ {
        self.entries.iter().map(|entry| entry.grammar.kind)
    }

    /// Every kind whose grammar matches `text`, in priority order.
    ///
    /// The first element is the kind [`Registry::classify`] commits to.
    pub fn candidates(&self, text: &str) -> Vec<EventKind> {
        let resolved = decorator::resolve(text);
        self.entries
            .iter()
            .filter(|entry| {
                subject(entry.grammar.prefix, text, resolved.as_ref())
                    .is_some_and(|s| entry.regex.is_match(s))
            })
            .map(|entry| entry.grammar.kind)
            .collect()
    }

    /// Whether any grammar matches `text`.
    pub fn recognizes(&self, text: &str) -> bool {
        let resolved = decorator::resolve(text);
        self.entries.iter().any(|entry| {
            subject(entry.grammar.prefix, text, resolved.as_ref())
                .is_some_and(|s| entry.regex.is_match(s))
        })
    }

    /// Classifies one logical line. Always yields exactly one event.
    pub fn classify(&self, line: &LogicalLine, ctx: &MatchContext) -> Event {
        let text = line.text.as_str();
        let resolved = decorator::resolve(text);

        for entry in &self.entries {
            let Some(subject) = subject(entry.grammar.prefix, text, resolved.as_ref()) else {
                continue;
            };
            let Some(caps) = entry.regex.captures(subject) else {
                continue;
            };

            return match extract::extract(entry, &caps, resolved.as_ref(), line, ctx) {
                Ok(event) => {
                    tracing::trace!(
                        line = line.number,
                        kind = %event.kind,
                        collector = %event.collector,
                        "matched grammar"
                    );
                    event
                }
                Err(err) => {
                    tracing::error!(line = line.number, error = %err, "grammar capture mismatch");
                    debug_assert!(false, "grammar capture mismatch: {err}");
                    Event::unrecognized(line)
                }
            };
        }

        tracing::debug!(line = line.number, "unrecognized line");
        Event::unrecognized(line)
    }

    /// Noise kind of `text` when it is a dump, histogram or statistics line.
    pub fn match_noise(&self, text: &str) -> Option<EventKind> {
        let resolved = decorator::resolve(text);
        self.entries
            .iter()
            .filter(|entry| entry.grammar.kind.is_noise())
            .find(|entry| {
                subject(entry.grammar.prefix, text, resolved.as_ref())
                    .is_some_and(|s| entry.regex.is_match(s))
            })
            .map(|entry| entry.grammar.kind)
    }
}

/// The part of `text` a grammar with `prefix` is matched against.
fn subject<'a>(prefix: Prefix, text: &'a str, resolved: Option<&Resolved>) -> Option<&'a str> {
    match (prefix, resolved) {
        (Prefix::Legacy, Some(r)) if r.style == DecoratorStyle::Legacy => Some(r.rest(text)),
        (Prefix::Unified, Some(r)) if r.style == DecoratorStyle::Unified => Some(r.rest(text)),
        (Prefix::Any, Some(r)) => Some(r.rest(text)),
        (Prefix::Any, None) => Some(text),
        _ => None,
    }
}
