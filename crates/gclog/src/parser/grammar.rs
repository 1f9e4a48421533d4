//! Grammar declarations and template expansion.
//!
//! Grammars are written as regex templates with `%token%` placeholders for
//! the sub-clauses every collector shares (sizes, durations, timing blocks,
//! triggers). Tokens expand to named captures, so the extractor reads
//! fields by name rather than by group position.
//!
//! | token        | expands to                                                   |
//! |--------------|--------------------------------------------------------------|
//! | `%ts%`       | optional embedded `DATE: UPTIME: ` decorator                 |
//! | `%trg%`      | optional ` (trigger)` capturing `trigger`                     |
//! | `%mem:R%`    | `before->after(capacity)` as `R_before`, `R_after`, `R_cap`   |
//! | `%mem%`      | the same shape without captures                              |
//! | `%gen:R%`    | unified generation, `%mem:R%` or the JDK 17 `before(c)->after(c)` with its `Eden:`/`From:` parts |
//! | `%occ:R%`    | `used(capacity)` as `R_used`, `R_cap`                         |
//! | `%yg%`       | CMS remark young occupancy `N K (N K)`                       |
//! | `%secs%`     | `N.N secs` capturing `dur_secs`; `%s%` without capture        |
//! | `%dsecs%`    | the bare `N.N` of `%secs%`                                   |
//! | `%ms%`       | `N.Nms` capturing `dur_ms`; `%m%` without capture             |
//! | `%ns%`       | `N ns` capturing `dur_ns`                                     |
//! | `%perm%`     | legacy `[Metaspace: ...]`/`[PSPermGen: ...]` as `class_*`     |
//! | `%meta%`     | unified `Metaspace: ...` as `class_*`                         |
//! | `%times%`    | optional legacy `[Times: ...]`                                |
//! | `%utimes%`   | optional unified `User=.. Sys=.. Real=..`                     |
//! | `%gcid%`     | `GC(n) ` capturing `gc_id`                                    |
//! | `%g1heap%`   | G1 details `[Eden: ... Survivors: ... Heap: ...]`             |
//! | `%regions%`  | unified G1 region transitions, no captures                   |
//! | `%refs%`     | `-XX:+PrintReferenceGC` blocks, no captures                  |
//! | `%phases%`   | remark sub-phases `[name, N secs]`, one nesting level        |

use regex::Regex;
use thiserror::Error;

use super::decorator::{DATESTAMP, UPTIME};
use super::model::{CollectorKind, EventKind};

/// A size with unit, `1024K`, `0B`, `1.5M`, `3072.0K`.
pub(crate) const SIZE: &str = r"\d+(?:[.,]\d+)?[BKMG]";

/// A signed decimal whose integer part always fits the µs scale.
const DECIMAL: &str = r"-?\d{1,12}[.,]\d+";

/// An unsigned integer that always fits `i64`.
const COUNT: &str = r"\d{1,18}";

/// Which decorator a grammar expects in front of its body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prefix {
    /// Matched against the rest after a legacy decorator.
    Legacy,
    /// Matched against the rest after a unified decorator.
    Unified,
    /// Matched against the rest after any decorator, or the whole line
    /// when none resolves.
    Any,
}

/// Whether the decorator time marks the start or the end of the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clock {
    Start,
    End,
}

/// Regions computed from other captured regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Derive {
    None,
    /// old = combined - young
    OldFromCombined,
    /// young = combined - old
    YoungFromCombined,
    /// young = eden + survivors, old = combined - young
    G1Details,
}

/// One event shape in the registry.
#[derive(Debug, Clone, Copy)]
pub struct Grammar {
    pub kind: EventKind,
    pub collector: CollectorKind,
    pub prefix: Prefix,
    pub clock: Clock,
    pub derive: Derive,
    pub pattern: &'static str,
}

impl Grammar {
    pub const fn legacy(kind: EventKind, collector: CollectorKind, pattern: &'static str) -> Self {
        Self {
            kind,
            collector,
            prefix: Prefix::Legacy,
            clock: Clock::Start,
            derive: Derive::None,
            pattern,
        }
    }

    pub const fn unified(kind: EventKind, collector: CollectorKind, pattern: &'static str) -> Self {
        Self {
            kind,
            collector,
            prefix: Prefix::Unified,
            clock: Clock::End,
            derive: Derive::None,
            pattern,
        }
    }

    pub const fn throwaway(kind: EventKind, pattern: &'static str) -> Self {
        Self {
            kind,
            collector: CollectorKind::Unknown,
            prefix: Prefix::Any,
            clock: Clock::Start,
            derive: Derive::None,
            pattern,
        }
    }

    pub const fn derive(mut self, derive: Derive) -> Self {
        self.derive = derive;
        self
    }

    pub const fn clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub const fn prefix(mut self, prefix: Prefix) -> Self {
        self.prefix = prefix;
        self
    }
}

#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("{kind}: unknown template token '%{token}%'")]
    UnknownToken { kind: EventKind, token: String },

    #[error("{kind}: unterminated template token")]
    Unterminated { kind: EventKind },

    #[error("{kind}: invalid expanded regex: {source}")]
    Regex {
        kind: EventKind,
        #[source]
        source: regex::Error,
    },
}

/// A grammar with its anchored, compiled regex.
#[derive(Debug)]
pub struct CompiledGrammar {
    pub grammar: Grammar,
    pub regex: Regex,
    /// `trigger*` capture names in pattern order.
    pub trigger_groups: Vec<String>,
}

impl CompiledGrammar {
    /// Expands and compiles `grammar`, anchored to match the whole subject
    /// (trailing whitespace allowed).
    pub fn compile(grammar: Grammar) -> Result<Self, GrammarError> {
        let body = expand(grammar.kind, grammar.pattern)?;
        let anchored = format!(r"^(?:{})\s*$", body);
        let regex = Regex::new(&anchored).map_err(|source| GrammarError::Regex {
            kind: grammar.kind,
            source,
        })?;
        let trigger_groups = regex
            .capture_names()
            .flatten()
            .filter(|name| name.starts_with("trigger"))
            .map(str::to_string)
            .collect();
        Ok(Self {
            grammar,
            regex,
            trigger_groups,
        })
    }
}

/// Replaces every `%token%` in `template` with its regex.
pub fn expand(kind: EventKind, template: &str) -> Result<String, GrammarError> {
    let mut out = String::with_capacity(template.len() * 3);
    let mut rest = template;

    while let Some(start) = rest.find('%') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after
            .find('%')
            .ok_or(GrammarError::Unterminated { kind })?;
        let token = &after[..end];
        let expanded = expand_token(token).ok_or_else(|| GrammarError::UnknownToken {
            kind,
            token: token.to_string(),
        })?;
        out.push_str(&expanded);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

fn expand_token(token: &str) -> Option<String> {
    let (name, region) = match token.split_once(':') {
        Some((name, region)) => (name, Some(region)),
        None => (token, None),
    };

    let expanded = match (name, region) {
        ("ts", None) => format!(r"(?:{DATESTAMP}: )?(?:{UPTIME}: )?"),
        ("trg", None) => r"(?: \((?P<trigger>[^()]+(?:\(\))?)\))?".to_string(),
        ("mem", None) => format!(r"{SIZE}->{SIZE}\({SIZE}\)"),
        ("mem", Some(r)) => format!(
            r"(?P<{r}_before>{SIZE})->(?P<{r}_after>{SIZE})\((?P<{r}_cap>{SIZE})\)"
        ),
        ("occ", Some(r)) => format!(r"(?P<{r}_used>{SIZE})\((?P<{r}_cap>{SIZE})\)"),
        ("yg", None) => r"(?P<young_used>\d+ ?K) \((?P<young_cap>\d+ ?K)\)".to_string(),
        ("gen", Some(r)) => format!(
            r"(?P<{r}_before>{SIZE})(?:\({SIZE}\))?->(?P<{r}_after>{SIZE})\((?P<{r}_cap>{SIZE})\)(?: (?:Eden|From|To): {SIZE}(?:\({SIZE}\))?->{SIZE}\({SIZE}\))*"
        ),
        ("dsecs", None) => format!(r"(?P<dur_secs>{DECIMAL})"),
        ("secs", None) => format!(r"(?P<dur_secs>{DECIMAL}) secs"),
        ("s", None) => format!(r"{DECIMAL} secs"),
        ("ms", None) => r"(?P<dur_ms>-?\d{1,12}(?:[.,]\d+)?) ?ms".to_string(),
        ("m", None) => r"-?\d+(?:[.,]\d+)? ?ms".to_string(),
        ("ns", None) => format!(r"(?P<dur_ns>{COUNT}) ?ns"),
        ("perm", None) => format!(
            r"\[(?:Metaspace|PSPermGen|CMS Perm ?|Perm ?|PS Perm ?): {}\]",
            expand_token("mem:class")?
        ),
        ("meta", None) => format!(
            r"Metaspace: (?P<class_before>{SIZE})(?:\({SIZE}\))?->(?P<class_after>{SIZE})\((?P<class_cap>{SIZE})\)(?: NonClass: \S+ Class: \S+)?"
        ),
        ("times", None) => format!(
            r"(?: ?\[Times: user=(?P<user>{DECIMAL}) sys=(?P<sys>{DECIMAL}),? real=(?P<real>{DECIMAL}) secs\])?"
        ),
        ("utimes", None) => r"(?: User=(?P<user>\d{1,12}[.,]\d+)s Sys=(?P<sys>\d{1,12}[.,]\d+)s Real=(?P<real>\d{1,12}[.,]\d+)s)?".to_string(),
        ("gcid", None) => format!(r"GC\((?P<gc_id>{COUNT})\) "),
        ("refs", None) => format!(
            r"(?:{}\[(?:(?:Soft|Weak|Final|Phantom)Reference|JNI Weak Reference)(?:, \d+ refs)*, {DECIMAL} secs\])*",
            expand_token("ts")?
        ),
        ("phases", None) => format!(
            r"(?: ?{}\[[^\[\]]+(?:\[[^\[\]]*\][^\[\]]*)*\])*",
            expand_token("ts")?
        ),
        ("g1heap", None) => format!(
            r"\[Eden: (?P<eden_before>{SIZE})\({SIZE}\)->(?P<eden_after>{SIZE})\((?P<eden_cap>{SIZE})\) Survivors: (?P<surv_before>{SIZE})->(?P<surv_after>{SIZE}) Heap: (?P<combined_before>{SIZE})\({SIZE}\)->(?P<combined_after>{SIZE})\((?P<combined_cap>{SIZE})\)\]"
        ),
        ("regions", None) => {
            r"(?: (?:Eden|Survivor|Old|Archive|Humongous) regions: \d+->\d+(?:\(\d+\))?)+".to_string()
        }
        _ => return None,
    };
    Some(expanded)
}
