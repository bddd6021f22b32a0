//! # Command Interpreter
//!
//! Validates one directive against the block it attaches to. The two
//! JSON-bearing directives (`embed`, `componentsV2`) parse the block body and
//! hand the payload to their validators in `embed` and `components`.

pub mod components;
pub mod embed;

use std::borrow::Cow;

use serde_json::Value;
use thiserror::Error;

use crate::diagnostics::{JsonMarker, Reporter};
use crate::document::Document;
use crate::limits::Limits;
use crate::schema::SchemaValidator;
use crate::segment::{MessageBlock, TagRegistry};

/// Why a directive line could not be split into name and parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CommandSyntaxError {
    #[error("Command must contain colon")]
    MissingColon,
    #[error("Command must not have trailing whitespace after the colon and before the content")]
    SpaceAfterColon,
}

/// One directive, split at its first colon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command<'a> {
    pub name: &'a str,
    pub param: &'a str,
    /// 1-based line of the directive.
    pub line: usize,
}

impl<'a> Command<'a> {
    /// Parses the text after a directive's leading dot.
    ///
    /// Parameter-less directives still need the colon (`.pin:`), and the
    /// parameter must not start with a space.
    pub fn parse(body: &'a str, line: usize) -> Result<Self, CommandSyntaxError> {
        let colon = body.find(':').ok_or(CommandSyntaxError::MissingColon)?;
        if body[colon + 1..].starts_with(' ') {
            return Err(CommandSyntaxError::SpaceAfterColon);
        }

        let (name, param) = body
            .trim()
            .split_once(':')
            .ok_or(CommandSyntaxError::MissingColon)?;

        Ok(Self { name, param, line })
    }
}

/// The directives the language knows. Names are case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Img,
    File,
    Tag,
    Pin,
    Embed,
    ComponentsV2,
    React,
}

impl Directive {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "img" => Some(Directive::Img),
            "file" => Some(Directive::File),
            "tag" => Some(Directive::Tag),
            "pin" => Some(Directive::Pin),
            "embed" => Some(Directive::Embed),
            "componentsV2" => Some(Directive::ComponentsV2),
            "react" => Some(Directive::React),
            _ => None,
        }
    }
}

/// Which JSON-bearing directive a payload belongs to; only changes wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PayloadKind {
    Embed,
    ComponentsV2,
}

impl PayloadKind {
    fn param_error(self) -> &'static str {
        match self {
            PayloadKind::Embed => "Embed parameter must either be json or empty",
            PayloadKind::ComponentsV2 => "ComponentsV2 parameter must either be json or empty",
        }
    }

    fn parse_error(self) -> &'static str {
        match self {
            PayloadKind::Embed => "JSON embed object is invalid",
            PayloadKind::ComponentsV2 => "JSON componentsV2 object is invalid",
        }
    }
}

/// Applies directives to the block being built.
///
/// Diagnostics carry the directive's own line unless a payload validator can
/// point somewhere more specific.
pub struct CommandInterpreter<'a> {
    document: &'a Document<'a>,
    schema: &'a dyn SchemaValidator,
    limits: &'a Limits,
}

impl<'a> CommandInterpreter<'a> {
    pub fn new(
        document: &'a Document<'a>,
        schema: &'a dyn SchemaValidator,
        limits: &'a Limits,
    ) -> Self {
        Self {
            document,
            schema,
            limits,
        }
    }

    pub fn execute(
        &self,
        command: &Command<'_>,
        block: &mut MessageBlock,
        tags: &mut TagRegistry,
        reporter: &mut Reporter,
    ) {
        log::trace!(
            "line {}: .{}:{}",
            command.line,
            command.name,
            command.param
        );

        match Directive::from_name(command.name) {
            Some(Directive::Img | Directive::File) => attach(command, block, reporter),
            Some(Directive::Tag) => tag(command, block, tags, reporter),
            Some(Directive::Pin) => {
                if !matches!(command.param, "delete" | "") {
                    reporter.error(command.line, "Pin parameter must either be delete or empty");
                }
            }
            Some(Directive::Embed) => {
                if let Some(json) = self.payload(PayloadKind::Embed, command, block, reporter) {
                    embed::check(self.document, self.schema, command, block, json, reporter);
                }
            }
            Some(Directive::ComponentsV2) => {
                if let Some(json) =
                    self.payload(PayloadKind::ComponentsV2, command, block, reporter)
                {
                    components::check(self.limits, command, block, json, reporter);
                }
            }
            Some(Directive::React) => {}
            None => reporter.error(command.line, "No such command"),
        }
    }

    /// Parses the block body as JSON when the parameter is `json`.
    ///
    /// Any other non-empty parameter, and a body that is not JSON, discard the
    /// body so the rest of the pass does not report follow-on problems.
    fn payload(
        &self,
        kind: PayloadKind,
        command: &Command<'_>,
        block: &mut MessageBlock,
        reporter: &mut Reporter,
    ) -> Option<Value> {
        match command.param {
            "json" => match parse_json(&block.text) {
                Ok(json) => Some(json),
                Err(e) => {
                    if let Some(marker) = json_marker(block, &e) {
                        reporter.mark_json(marker);
                    }
                    block.discard_text();
                    reporter.error(command.line, kind.parse_error());
                    None
                }
            },
            "" => None,
            _ => {
                block.discard_text();
                reporter.error(command.line, kind.param_error());
                None
            }
        }
    }
}

fn attach(command: &Command<'_>, block: &mut MessageBlock, reporter: &mut Reporter) {
    if !command.param.contains("http://") && !command.param.contains("https://") {
        reporter.error(command.line, "Invalid attachment URL");
    }
    if block.attachment {
        reporter.error(command.line, "Message already contains attachment");
    }
    block.attachment = true;
}

fn tag(
    command: &Command<'_>,
    block: &mut MessageBlock,
    tags: &mut TagRegistry,
    reporter: &mut Reporter,
) {
    if block.tag.is_some() {
        reporter.error(command.line, "Message already tagged");
    }

    if tags.insert(command.param) {
        block.tag = Some(command.param.to_string());
    } else {
        reporter.error(command.line, "Tag already defined");
    }
}

/// Parses a JSON body.
///
/// Unpaired UTF-16 surrogate escapes cannot live in a Rust string, so they are
/// read as `\ufffd`. The escape keeps its width, so parser columns still line
/// up with the document.
fn parse_json(text: &str) -> serde_json::Result<Value> {
    match replace_lone_surrogates(text) {
        Cow::Borrowed(text) => serde_json::from_str(text),
        Cow::Owned(text) => serde_json::from_str(&text),
    }
}

fn replace_lone_surrogates(text: &str) -> Cow<'_, str> {
    const HIGH: std::ops::Range<u16> = 0xD800..0xDC00;
    const LOW: std::ops::Range<u16> = 0xDC00..0xE000;

    let bytes = text.as_bytes();
    let mut out: Option<String> = None;
    let mut copied = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'\\' {
            i += 1;
            continue;
        }
        let Some(unit) = unicode_escape(bytes, i) else {
            // Any other escape, including `\\`.
            i += 2;
            continue;
        };
        if HIGH.contains(&unit) {
            if unicode_escape(bytes, i + 6).is_some_and(|next| LOW.contains(&next)) {
                i += 12;
                continue;
            }
        } else if !LOW.contains(&unit) {
            i += 6;
            continue;
        }

        let out = out.get_or_insert_with(|| String::with_capacity(text.len()));
        out.push_str(&text[copied..i]);
        out.push_str("\\ufffd");
        i += 6;
        copied = i;
    }

    match out {
        Some(mut out) => {
            out.push_str(&text[copied..]);
            Cow::Owned(out)
        }
        None => Cow::Borrowed(text),
    }
}

/// The code unit of a `\uXXXX` escape starting at byte `at`.
fn unicode_escape(bytes: &[u8], at: usize) -> Option<u16> {
    let escape = bytes.get(at..at + 6)?;
    if !escape.starts_with(b"\\u") || !escape[2..].iter().all(u8::is_ascii_hexdigit) {
        return None;
    }
    let hex = std::str::from_utf8(&escape[2..]).ok()?;
    u16::from_str_radix(hex, 16).ok()
}

/// Maps a parse error inside an untouched body back onto the document.
///
/// Body line 1 is the synthetic empty line; body line `k` is document line
/// `first_line + k - 2`.
fn json_marker(block: &MessageBlock, error: &serde_json::Error) -> Option<JsonMarker> {
    if block.rewritten || block.text.is_empty() {
        return None;
    }
    let body_line = error.line().max(2);
    Some(JsonMarker {
        line: block.first_line + body_line - 2,
        column: error.column(),
        message: error.to_string(),
    })
}

/// JavaScript-style truthiness, which the payload rules are phrased in.
pub(crate) fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

/// Missing, falsy, or a string that trims to nothing.
pub(crate) fn blank(value: Option<&Value>) -> bool {
    match value {
        Some(Value::String(s)) => s.trim().is_empty(),
        other => !truthy(other),
    }
}

/// Removes and returns a payload's top-level `content` as message text.
pub(crate) fn take_content(json: &mut Value) -> String {
    let content = json.as_object_mut().and_then(|map| map.remove("content"));
    match content {
        Some(Value::String(s)) => s,
        Some(scalar @ (Value::Bool(_) | Value::Number(_))) if truthy(Some(&scalar)) => {
            scalar.to_string()
        }
        _ => String::new(),
    }
}
