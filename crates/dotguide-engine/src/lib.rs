//! # dotguide engine
//!
//! Lints guide documents: plain text where lines starting with `.` are
//! directives that split the text into Discord messages and attach
//! behaviour to them. See [`analysis`] for how one pass is put together.

pub mod analysis;
pub mod commands;
pub mod diagnostics;
pub mod document;
pub mod io;
pub mod limits;
pub mod locate;
pub mod models;
pub mod postprocess;
pub mod schema;
pub mod segment;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use analysis::{Analysis, Analyzer, analyze};
pub use commands::{Command, CommandSyntaxError};
pub use diagnostics::{Diagnostic, JsonMarker, Severity};
pub use io::*;
pub use limits::Limits;
pub use models::GuideFile;
pub use postprocess::Message;
pub use schema::{JsonSchema, SchemaError, SchemaValidator, Violation};
pub use segment::{LineKind, Mode, classify};
