use std::collections::HashSet;

/// Which kind of line the segmenter saw last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Accumulating message body lines.
    #[default]
    Content,
    /// Inside a run of directives attached to the block before it.
    Directive,
}

/// One outgoing message while it is being built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBlock {
    /// Accumulated body. Every appended line is prefixed with `\n`; the
    /// post-processor strips that first synthetic newline.
    pub text: String,
    /// 1-based line the block starts on.
    pub first_line: usize,
    /// 1-based last line of the block's body, fixed when the block closes.
    pub last_line: Option<usize>,
    /// Whether an `img`/`file` directive attached something.
    pub attachment: bool,
    /// Tag declared for this block with `tag`.
    pub tag: Option<String>,
    /// Set once a directive discards or replaces `text`, after which the body
    /// no longer maps line-for-line onto the source.
    pub rewritten: bool,
}

impl MessageBlock {
    pub fn starting_at(first_line: usize) -> Self {
        Self {
            text: String::new(),
            first_line,
            last_line: None,
            attachment: false,
            tag: None,
            rewritten: false,
        }
    }

    /// No body lines and nothing attached.
    pub fn is_blank(&self) -> bool {
        self.text.is_empty() && !self.attachment && self.tag.is_none()
    }

    pub fn append_line(&mut self, line: &str) {
        self.text.push('\n');
        self.text.push_str(line);
    }

    /// Drops the body so later checks do not report follow-on problems.
    pub fn discard_text(&mut self) {
        self.text.clear();
        self.rewritten = true;
    }

    /// Replaces the body with content extracted from a JSON payload.
    pub fn replace_text(&mut self, content: &str) {
        self.text.clear();
        if !content.is_empty() {
            self.text.push('\n');
            self.text.push_str(content);
        }
        self.rewritten = true;
    }
}

/// Tags declared anywhere in the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagRegistry {
    tags: HashSet<String>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Registers `tag`. Returns `false` if it was already declared.
    pub fn insert(&mut self, tag: &str) -> bool {
        self.tags.insert(tag.to_string())
    }
}
