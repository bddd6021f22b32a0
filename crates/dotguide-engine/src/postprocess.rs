//! # Message Post-Processing
//!
//! Runs once over the closed blocks after segmentation:
//!
//! 1. warn about back-references to tags no `.tag:` directive declared
//! 2. strip the synthetic leading newline and substitute link markers
//! 3. pad with zero-width spaces where the platform would trim the text
//! 4. enforce the message length cap

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::diagnostics::{Lines, Reporter};
use crate::limits::Limits;
use crate::segment::{MessageBlock, TagRegistry};

/// Inserted where the platform would otherwise trim meaningful whitespace.
pub const ZERO_WIDTH_SPACE: char = '\u{200b}';

/// Stand-in for a message link; real ids only exist once messages are sent.
pub const PLACEHOLDER_LINK: &str = "https://discordapp.com/channels/00000000000000000000/00000000000000000000/00000000000000000000";

/// A finished outgoing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Text as it would be sent.
    pub text: String,
    pub first_line: usize,
    pub last_line: usize,
    pub attachment: bool,
    pub tag: Option<String>,
}

impl Message {
    /// Inclusive 1-based source range.
    pub fn lines(&self) -> [usize; 2] {
        [self.first_line, self.last_line]
    }
}

fn back_reference_regex() -> &'static Regex {
    static BACK_REFERENCE: OnceLock<Regex> = OnceLock::new();
    BACK_REFERENCE
        .get_or_init(|| Regex::new(r"(?mR)_[a-zA-Z0-9]*$").expect("Invalid back-reference regex"))
}

fn link_marker_regex() -> &'static Regex {
    static LINK_MARKER: OnceLock<Regex> = OnceLock::new();
    LINK_MARKER
        .get_or_init(|| Regex::new(r"\$linkmsg_([^\r\n]*?)\$").expect("Invalid link marker regex"))
}

/// Turns closed blocks into messages, reporting problems along the way.
pub fn finalize(
    blocks: Vec<MessageBlock>,
    tags: &TagRegistry,
    limits: &Limits,
    reporter: &mut Reporter,
) -> Vec<Message> {
    blocks
        .into_iter()
        .map(|block| finalize_block(block, tags, limits, reporter))
        .collect()
}

fn finalize_block(
    block: MessageBlock,
    tags: &TagRegistry,
    limits: &Limits,
    reporter: &mut Reporter,
) -> Message {
    let first_line = block.first_line;
    let last_line = block.last_line.unwrap_or(first_line);
    let span = Lines::Span(first_line, last_line);

    for keyword in back_references(&block.text) {
        if !tags.contains(keyword) {
            reporter.warning(
                span,
                format!(
                    "Message uses \"$linkmsg_{keyword}$\" without {keyword} being defined in a .tag: command"
                ),
            );
        }
    }

    let text = pad(&replace_links(
        block.text.strip_prefix('\n').unwrap_or(&block.text),
    ));

    if utf16_len(&text) > limits.message_length {
        reporter.error(
            span,
            format!(
                "Message text exceeds {} characters",
                limits.message_length
            ),
        );
    }

    log::trace!(
        "message {first_line}-{last_line}: {} UTF-16 units",
        utf16_len(&text)
    );

    Message {
        text,
        first_line,
        last_line,
        attachment: block.attachment,
        tag: block.tag,
    }
}

/// Tag names referenced at line ends: the match minus its first and last
/// character.
fn back_references(text: &str) -> impl Iterator<Item = &str> {
    back_reference_regex().find_iter(text).map(|m| {
        let matched = m.as_str();
        matched
            .get(1..matched.len().saturating_sub(1).max(1))
            .unwrap_or_default()
    })
}

fn replace_links(text: &str) -> String {
    link_marker_regex()
        .replace_all(text, PLACEHOLDER_LINK)
        .into_owned()
}

fn pad(text: &str) -> String {
    if text.is_empty() {
        return ZERO_WIDTH_SPACE.to_string();
    }

    let mut padded = String::with_capacity(text.len() + 6);
    if text.starts_with([' ', '\n']) {
        padded.push(ZERO_WIDTH_SPACE);
    }
    padded.push_str(text);
    if text.ends_with('\n') {
        padded.push(ZERO_WIDTH_SPACE);
    }
    padded
}

/// Length as the platform counts it.
fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Severity;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn block(body: &str, first_line: usize, last_line: usize) -> MessageBlock {
        let mut block = MessageBlock::starting_at(first_line);
        for line in body.split('\n') {
            block.append_line(line);
        }
        block.last_line = Some(last_line);
        block
    }

    fn run(blocks: Vec<MessageBlock>, tags: &TagRegistry) -> (Vec<Message>, Vec<crate::Diagnostic>) {
        let mut reporter = Reporter::new();
        let messages = finalize(blocks, tags, &Limits::default(), &mut reporter);
        (messages, reporter.finish())
    }

    #[rstest]
    #[case("hello", "hello")]
    #[case(" indented", "\u{200b} indented")]
    #[case("trailing\n", "trailing\n\u{200b}")]
    #[case("\nboth\n", "\u{200b}\nboth\n\u{200b}")]
    #[case("\ttab", "\ttab")]
    fn padding(#[case] body: &str, #[case] expected: &str) {
        let (messages, _) = run(vec![block(body, 1, 1)], &TagRegistry::new());
        assert_eq!(messages[0].text, expected);
    }

    #[test]
    fn empty_block_becomes_zero_width_space() {
        let mut empty = MessageBlock::starting_at(1);
        empty.last_line = Some(0);
        let (messages, diagnostics) = run(vec![empty], &TagRegistry::new());

        assert_eq!(messages[0].text, "\u{200b}");
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn link_markers_are_replaced() {
        let (messages, _) = run(
            vec![block("see $linkmsg_intro$ and $linkmsg_boss$.", 1, 1)],
            &TagRegistry::new(),
        );
        assert_eq!(
            messages[0].text,
            format!("see {PLACEHOLDER_LINK} and {PLACEHOLDER_LINK}.")
        );
    }

    #[test]
    fn undefined_back_reference_warns_over_the_block() {
        let (_, diagnostics) = run(vec![block("intro\nsee phase_two", 3, 4)], &TagRegistry::new());

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].line, [3, 4]);
        assert_eq!(diagnostics[0].severity, Severity::Warning);
        assert_eq!(
            diagnostics[0].message,
            "Message uses \"$linkmsg_tw$\" without tw being defined in a .tag: command"
        );
    }

    #[test]
    fn declared_back_reference_is_quiet() {
        let mut tags = TagRegistry::new();
        tags.insert("tw");
        let (_, diagnostics) = run(vec![block("see phase_two", 1, 1)], &tags);
        assert!(diagnostics.is_empty());
    }

    #[rstest]
    #[case("snake_case_\nnext", vec![""])]
    #[case("a_b\nc_de", vec!["", "d"])]
    #[case("no underscore", vec![])]
    #[case("_x in the middle", vec![])]
    fn back_reference_names(#[case] text: &str, #[case] expected: Vec<&str>) {
        assert_eq!(back_references(text).collect::<Vec<_>>(), expected);
    }

    #[test]
    fn length_is_counted_in_utf16_units() {
        let limit = Limits::default().message_length;
        // Each emoji is two UTF-16 units.
        let at_limit = "😀".repeat(limit / 2);
        let over_limit = format!("{at_limit}x");

        let (_, diagnostics) = run(
            vec![block(&at_limit, 1, 1), block(&over_limit, 3, 5)],
            &TagRegistry::new(),
        );

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].line, [3, 5]);
        assert_eq!(diagnostics[0].message, "Message text exceeds 2000 characters");
    }

    #[test]
    fn block_metadata_is_carried_over() {
        let mut tagged = block("body", 2, 2);
        tagged.tag = Some("intro".to_string());
        tagged.attachment = true;

        let (messages, _) = run(vec![tagged], &TagRegistry::new());

        assert_eq!(
            messages[0],
            Message {
                text: "body".to_string(),
                first_line: 2,
                last_line: 2,
                attachment: true,
                tag: Some("intro".to_string()),
            }
        );
        assert_eq!(messages[0].lines(), [2, 2]);
    }
}
