use crate::commands::{Command, CommandInterpreter};
use crate::diagnostics::Reporter;

use super::{
    classify::{LineKind, classify},
    types::{MessageBlock, Mode, TagRegistry},
};

/// Output of a finished segmentation pass.
#[derive(Debug)]
pub struct Segmented {
    /// Closed blocks in document order; every `last_line` is set.
    pub blocks: Vec<MessageBlock>,
    /// Every tag declared in the document.
    pub tags: TagRegistry,
}

/// Two-mode state machine turning classified lines into message blocks.
///
/// Directives attach to the block whose content precedes them. A directive
/// run followed by more content starts a new block; a separator line starts
/// one explicitly.
pub struct Segmenter<'a> {
    interpreter: CommandInterpreter<'a>,
    mode: Mode,
    current: MessageBlock,
    out: Vec<MessageBlock>,
    tags: TagRegistry,
}

impl<'a> Segmenter<'a> {
    pub fn new(interpreter: CommandInterpreter<'a>) -> Self {
        Self {
            interpreter,
            mode: Mode::Content,
            current: MessageBlock::starting_at(1),
            out: vec![],
            tags: TagRegistry::new(),
        }
    }

    #[cfg(test)]
    fn mode(&self) -> Mode {
        self.mode
    }

    /// Feeds the line at 0-based `index`.
    pub fn push(&mut self, index: usize, line: &str, reporter: &mut Reporter) {
        match classify(line) {
            LineKind::Separator => self.separate(index),
            LineKind::Directive(body) => self.directive(index, body, reporter),
            LineKind::EscapedContent(text) | LineKind::Content(text) => self.content(index, text),
        }
    }

    pub fn finish(mut self, line_count: usize) -> Segmented {
        // EOF flush
        self.current.last_line.get_or_insert(line_count);
        self.out.push(self.current);
        Segmented {
            blocks: self.out,
            tags: self.tags,
        }
    }

    fn separate(&mut self, index: usize) {
        if self.mode == Mode::Content && self.current.is_blank() {
            // Nothing since the last break: no message to send.
            self.current = MessageBlock::starting_at(index + 2);
            return;
        }
        self.current.last_line.get_or_insert(index);
        self.start_block(index + 2);
    }

    fn directive(&mut self, index: usize, body: &str, reporter: &mut Reporter) {
        if self.mode == Mode::Content {
            self.current.last_line = Some(index);
            self.mode = Mode::Directive;
        }

        match Command::parse(body, index + 1) {
            Ok(command) => {
                self.interpreter
                    .execute(&command, &mut self.current, &mut self.tags, reporter)
            }
            Err(e) => reporter.error(index + 1, e.to_string()),
        }
    }

    fn content(&mut self, index: usize, text: &str) {
        if self.mode == Mode::Directive {
            self.start_block(index + 1);
        }
        self.current.append_line(text);
    }

    fn start_block(&mut self, first_line: usize) {
        let finished = std::mem::replace(&mut self.current, MessageBlock::starting_at(first_line));
        self.out.push(finished);
        self.mode = Mode::Content;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::limits::Limits;
    use crate::schema::JsonSchema;
    use pretty_assertions::assert_eq;

    fn segment(text: &str) -> (Segmented, Vec<crate::Diagnostic>) {
        let document = Document::new(text);
        let limits = Limits::default();
        let interpreter =
            CommandInterpreter::new(&document, JsonSchema::discord_embed(), &limits);
        let mut segmenter = Segmenter::new(interpreter);
        let mut reporter = Reporter::new();
        for (index, line) in document.lines().iter().enumerate() {
            segmenter.push(index, line, &mut reporter);
        }
        (segmenter.finish(document.line_count()), reporter.finish())
    }

    fn spans(segmented: &Segmented) -> Vec<(usize, Option<usize>, &str)> {
        segmented
            .blocks
            .iter()
            .map(|b| (b.first_line, b.last_line, b.text.as_str()))
            .collect()
    }

    #[test]
    fn plain_text_is_one_block() {
        let (segmented, diagnostics) = segment("one\ntwo\nthree");
        assert_eq!(spans(&segmented), vec![(1, Some(3), "\none\ntwo\nthree")]);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn separator_splits_blocks() {
        let (segmented, _) = segment(".\nhello\n.\nworld\n");
        assert_eq!(
            spans(&segmented),
            vec![(2, Some(2), "\nhello"), (4, Some(5), "\nworld\n")]
        );
    }

    #[test]
    fn repeated_separators_do_not_make_empty_blocks() {
        let (segmented, _) = segment("a\n.\n.\n.\nb");
        assert_eq!(
            spans(&segmented),
            vec![(1, Some(1), "\na"), (5, Some(5), "\nb")]
        );
    }

    #[test]
    fn directives_on_an_empty_block_keep_it() {
        let (segmented, _) = segment(".pin:\n.\nb");
        assert_eq!(
            spans(&segmented),
            vec![(1, Some(0), ""), (3, Some(3), "\nb")]
        );
    }

    #[test]
    fn directive_run_then_content_starts_a_new_block() {
        let (segmented, diagnostics) = segment("first\n.tag:a\n.pin:\nsecond");
        assert_eq!(
            spans(&segmented),
            vec![(1, Some(1), "\nfirst"), (4, Some(4), "\nsecond")]
        );
        assert_eq!(segmented.blocks[0].tag.as_deref(), Some("a"));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn escaped_dot_is_content() {
        let (segmented, _) = segment("..\n...more");
        assert_eq!(spans(&segmented), vec![(1, Some(2), "\n.\n..more")]);
    }

    #[test]
    fn separator_after_directives_keeps_closed_range() {
        let (segmented, _) = segment("body\n.pin:\n.\nnext");
        assert_eq!(
            spans(&segmented),
            vec![(1, Some(1), "\nbody"), (4, Some(4), "\nnext")]
        );
    }

    #[test]
    fn mode_follows_the_last_line() {
        let document = Document::new("");
        let limits = Limits::default();
        let interpreter =
            CommandInterpreter::new(&document, JsonSchema::discord_embed(), &limits);
        let mut segmenter = Segmenter::new(interpreter);
        let mut reporter = Reporter::new();

        segmenter.push(0, "text", &mut reporter);
        assert_eq!(segmenter.mode(), Mode::Content);
        segmenter.push(1, ".pin:", &mut reporter);
        assert_eq!(segmenter.mode(), Mode::Directive);
        segmenter.push(2, ".", &mut reporter);
        assert_eq!(segmenter.mode(), Mode::Content);
    }

    #[test]
    fn malformed_directive_is_reported_on_its_line() {
        let (_, diagnostics) = segment("text\n.pin");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].line, [2, 2]);
        assert_eq!(diagnostics[0].message, "Command must contain colon");
    }
}
