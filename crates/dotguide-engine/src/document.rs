/// A guide's full text viewed as lines.
///
/// Lines are split on `\n` only, so a trailing newline yields a final empty
/// line and the empty string is a single empty line. Line numbers handed out
/// by this type are 1-based.
#[derive(Debug, Clone)]
pub struct Document<'a> {
    text: &'a str,
    lines: Vec<&'a str>,
}

impl<'a> Document<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            lines: text.split('\n').collect(),
        }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn lines(&self) -> &[&'a str] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// 1-based number of the first line matching `pred`.
    pub fn find_line(&self, mut pred: impl FnMut(&str) -> bool) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| pred(line))
            .map(|index| index + 1)
    }
}
