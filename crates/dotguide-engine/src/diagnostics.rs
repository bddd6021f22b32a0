//! # Diagnostics
//!
//! Every problem found in a guide is reported as a [`Diagnostic`], never as a
//! Rust error. Components push into a [`Reporter`] while the pass runs; the
//! reporter keeps discovery order and normalizes line references into
//! `[start, end]` pairs when the pass is finished.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How bad a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The guide would fail to send or is structurally invalid.
    Error,
    /// The guide sends, but the result is degraded.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// The 1-based source lines a diagnostic points at, before normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lines {
    /// A single line, typically the directive that raised the problem.
    At(usize),
    /// An inclusive range, used for problems with a whole message.
    Span(usize, usize),
}

impl Lines {
    /// Normalized `[start, end]` form.
    pub fn range(self) -> [usize; 2] {
        match self {
            Lines::At(line) => [line, line],
            Lines::Span(start, end) => [start, end],
        }
    }
}

impl From<usize> for Lines {
    fn from(line: usize) -> Self {
        Lines::At(line)
    }
}

/// A reported problem, line-addressed for the editing surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Inclusive 1-based `[start, end]` line range.
    pub line: [usize; 2],
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn start_line(&self) -> usize {
        self.line[0]
    }

    pub fn end_line(&self) -> usize {
        self.line[1]
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [start, end] = self.line;
        if start == end {
            write!(f, "{start}: {}: {}", self.severity, self.message)
        } else {
            write!(f, "{start}-{end}: {}: {}", self.severity, self.message)
        }
    }
}

/// Exact position of a JSON syntax error inside a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonMarker {
    /// 1-based document line.
    pub line: usize,
    /// 1-based column reported by the JSON parser.
    pub column: usize,
    pub message: String,
}

#[derive(Debug)]
struct Pending {
    lines: Lines,
    severity: Severity,
    message: String,
}

/// Append-only diagnostic collector for one analysis pass.
#[derive(Debug, Default)]
pub struct Reporter {
    pending: Vec<Pending>,
    markers: Vec<JsonMarker>,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, lines: impl Into<Lines>, message: impl Into<String>) {
        self.push(lines.into(), Severity::Error, message.into());
    }

    pub fn warning(&mut self, lines: impl Into<Lines>, message: impl Into<String>) {
        self.push(lines.into(), Severity::Warning, message.into());
    }

    pub fn mark_json(&mut self, marker: JsonMarker) {
        self.markers.push(marker);
    }

    /// Takes the JSON syntax markers collected so far.
    pub fn take_markers(&mut self) -> Vec<JsonMarker> {
        std::mem::take(&mut self.markers)
    }

    /// Normalizes every collected entry to a `[start, end]` pair, in discovery order.
    pub fn finish(self) -> Vec<Diagnostic> {
        self.pending
            .into_iter()
            .map(|p| Diagnostic {
                line: p.lines.range(),
                severity: p.severity,
                message: p.message,
            })
            .collect()
    }

    fn push(&mut self, lines: Lines, severity: Severity, message: String) {
        self.pending.push(Pending {
            lines,
            severity,
            message,
        });
    }
}
