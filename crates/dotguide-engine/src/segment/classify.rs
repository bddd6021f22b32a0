/// What a single raw line is, using only local facts.
///
/// This is phase 1 of segmentation: each line is classified independently of
/// the lines around it. The [`Segmenter`](super::Segmenter) owns the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// `.name:param`. Holds the text after the leading dot.
    Directive(&'a str),
    /// `..text`. Holds the line with exactly one dot removed.
    EscapedContent(&'a str),
    /// A dot followed by nothing but whitespace.
    Separator,
    /// Anything that does not start with a dot.
    Content(&'a str),
}

impl<'a> LineKind<'a> {
    /// The text to append to the message body, if this line contributes one.
    pub fn content(self) -> Option<&'a str> {
        match self {
            LineKind::EscapedContent(text) | LineKind::Content(text) => Some(text),
            LineKind::Directive(_) | LineKind::Separator => None,
        }
    }
}

/// Classifies one line. Pure; never looks at neighbouring lines.
pub fn classify(line: &str) -> LineKind<'_> {
    let Some(rest) = line.strip_prefix('.') else {
        return LineKind::Content(line);
    };

    if rest.trim().is_empty() {
        LineKind::Separator
    } else if rest.starts_with('.') {
        LineKind::EscapedContent(rest)
    } else {
        LineKind::Directive(rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("hello", LineKind::Content("hello"))]
    #[case("", LineKind::Content(""))]
    #[case(" .tag:x", LineKind::Content(" .tag:x"))]
    #[case(".", LineKind::Separator)]
    #[case(".   ", LineKind::Separator)]
    #[case("..", LineKind::EscapedContent("."))]
    #[case("...and more", LineKind::EscapedContent("..and more"))]
    #[case(".tag:intro", LineKind::Directive("tag:intro"))]
    #[case(".pin", LineKind::Directive("pin"))]
    #[case(". tag:x", LineKind::Directive(" tag:x"))]
    fn classifies_lines(#[case] line: &str, #[case] expected: LineKind<'_>) {
        assert_eq!(classify(line), expected);
    }

    #[test]
    fn only_content_kinds_carry_text() {
        assert_eq!(classify("..x").content(), Some(".x"));
        assert_eq!(classify("x").content(), Some("x"));
        assert_eq!(classify(".x:y").content(), None);
        assert_eq!(classify(".").content(), None);
    }
}
