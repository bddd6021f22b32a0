//! # Analysis
//!
//! One full, synchronous pass over a guide document.
//!
//! ## Phases
//!
//! 1. **Segmentation**: every line is classified and fed to the
//!    [`Segmenter`], which dispatches directives to the command interpreter as
//!    it goes.
//! 2. **Post-processing**: closed blocks are finalized into [`Message`]s.
//! 3. **Reporting**: collected diagnostics are normalized, in discovery order.
//!
//! The analyzer holds no state between runs; only the schema, which is
//! read-only, is shared.

use serde::Serialize;

use crate::commands::CommandInterpreter;
use crate::diagnostics::{Diagnostic, JsonMarker, Reporter, Severity};
use crate::document::Document;
use crate::limits::Limits;
use crate::postprocess::{self, Message};
use crate::schema::{JsonSchema, SchemaValidator};
use crate::segment::Segmenter;

/// Everything one pass produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Analysis {
    pub messages: Vec<Message>,
    pub diagnostics: Vec<Diagnostic>,
    /// Exact positions of JSON syntax errors in payload bodies.
    pub json_markers: Vec<JsonMarker>,
    pub line_count: usize,
}

impl Analysis {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

/// Runs analysis passes with a fixed schema and set of limits.
pub struct Analyzer<'a> {
    schema: &'a dyn SchemaValidator,
    limits: Limits,
}

impl<'a> Analyzer<'a> {
    pub fn new(schema: &'a dyn SchemaValidator, limits: Limits) -> Self {
        Self { schema, limits }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn run(&self, text: &str) -> Analysis {
        let document = Document::new(text);
        let mut reporter = Reporter::new();

        let interpreter = CommandInterpreter::new(&document, self.schema, &self.limits);
        let mut segmenter = Segmenter::new(interpreter);
        for (index, line) in document.lines().iter().enumerate() {
            segmenter.push(index, line, &mut reporter);
        }
        let segmented = segmenter.finish(document.line_count());

        let messages = postprocess::finalize(
            segmented.blocks,
            &segmented.tags,
            &self.limits,
            &mut reporter,
        );
        let json_markers = reporter.take_markers();
        let diagnostics = reporter.finish();

        log::debug!(
            "analyzed {} lines: {} messages, {} diagnostics",
            document.line_count(),
            messages.len(),
            diagnostics.len()
        );

        Analysis {
            messages,
            diagnostics,
            json_markers,
            line_count: document.line_count(),
        }
    }

    /// Diagnostics only.
    pub fn analyze(&self, text: &str) -> Vec<Diagnostic> {
        self.run(text).diagnostics
    }
}

impl Default for Analyzer<'static> {
    fn default() -> Self {
        Self::new(JsonSchema::discord_embed(), Limits::default())
    }
}

/// Diagnostics for `text` with the bundled embed schema and Discord's limits.
pub fn analyze(text: &str) -> Vec<Diagnostic> {
    Analyzer::default().analyze(text)
}
