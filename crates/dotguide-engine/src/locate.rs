//! # Source Line Recovery
//!
//! Schema violations only carry JSON paths, so the line they are reported on
//! is a best-effort guess: point the author at a plausible line, not an exact
//! one. Each strategy is tried in [`Strategy::ORDER`]; the first hit wins and
//! callers fall back to the directive's own line.

use regex::Regex;

use crate::document::Document;
use crate::schema::Violation;

/// One way of guessing the line a violation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// First line with `"<last path segment>":`.
    PathKey,
    /// First line with `"<unrecognized property>":`.
    AdditionalPropertyKey,
    /// First line containing the quoted property name anywhere.
    QuotedName,
}

impl Strategy {
    pub const ORDER: [Strategy; 3] = [
        Strategy::PathKey,
        Strategy::AdditionalPropertyKey,
        Strategy::QuotedName,
    ];

    pub fn locate(self, document: &Document<'_>, violation: &Violation) -> Option<usize> {
        match self {
            Strategy::PathKey => {
                let last = violation.path.split('/').rfind(|s| !s.is_empty())?;
                find_key(document, last)
            }
            Strategy::AdditionalPropertyKey => {
                find_key(document, violation.additional_property()?)
            }
            Strategy::QuotedName => {
                let quoted = format!("\"{}\"", property_name(violation)?);
                document.find_line(|line| line.contains(&quoted))
            }
        }
    }
}

/// Best guess at the 1-based line `violation` refers to.
pub fn recover_line(document: &Document<'_>, violation: &Violation) -> Option<usize> {
    property_name(violation)?;
    Strategy::ORDER
        .iter()
        .find_map(|strategy| strategy.locate(document, violation))
}

/// First line mentioning `"<property>"` next to an empty string literal.
pub fn locate_empty_property(document: &Document<'_>, property: &str) -> Option<usize> {
    let quoted = format!("\"{property}\"");
    document.find_line(|line| line.contains(&quoted) && line.contains("\"\""))
}

/// The name a violation is about: the unrecognized property, or the path
/// without its leading slash. Root-level violations have none.
fn property_name(violation: &Violation) -> Option<&str> {
    let name = match violation.additional_property() {
        Some(property) => property,
        None => violation
            .path
            .strip_prefix('/')
            .unwrap_or(&violation.path),
    };
    (!name.is_empty()).then_some(name)
}

fn find_key(document: &Document<'_>, key: &str) -> Option<usize> {
    let pattern = Regex::new(&format!(r#""{}"\s*:"#, regex::escape(key))).ok()?;
    document.find_line(|line| pattern.is_match(line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{Map, json};

    const GUIDE: &str = r#"Intro text
{
  "title": "Boss guide",
  "colour": 5,
  "fields": [
    {"name": "", "value": "x"},
    { "name": "Phase 2",
      "value": "" }
  ]
}
.embed:json"#;

    fn violation(path: &str, keyword: &str) -> Violation {
        Violation {
            path: path.to_string(),
            keyword: keyword.to_string(),
            message: "must be string".to_string(),
            params: Map::new(),
        }
    }

    fn unrecognized(path: &str, property: &str) -> Violation {
        let mut params = Map::new();
        params.insert("additionalProperty".to_string(), json!(property));
        Violation {
            params,
            ..violation(path, "additionalProperties")
        }
    }

    #[test]
    fn path_key_uses_the_last_segment() {
        let doc = Document::new(GUIDE);
        let v = violation("/fields/1/value", "type");
        assert_eq!(Strategy::PathKey.locate(&doc, &v), Some(6));
    }

    #[test]
    fn path_key_needs_a_path() {
        let doc = Document::new(GUIDE);
        assert_eq!(Strategy::PathKey.locate(&doc, &violation("", "type")), None);
    }

    #[test]
    fn additional_property_key() {
        let doc = Document::new(GUIDE);
        let v = unrecognized("", "colour");
        assert_eq!(Strategy::PathKey.locate(&doc, &v), None);
        assert_eq!(Strategy::AdditionalPropertyKey.locate(&doc, &v), Some(4));
        assert_eq!(recover_line(&doc, &v), Some(4));
    }

    #[test]
    fn quoted_name_is_a_loose_search() {
        let doc = Document::new("x\n  \"title\"\n");
        let v = violation("/title", "maxLength");
        assert_eq!(Strategy::PathKey.locate(&doc, &v), None);
        assert_eq!(Strategy::QuotedName.locate(&doc, &v), Some(2));
    }

    #[test]
    fn root_violations_are_not_located() {
        let doc = Document::new(GUIDE);
        assert_eq!(recover_line(&doc, &violation("", "type")), None);
    }

    #[test]
    fn keys_are_matched_literally() {
        let doc = Document::new("{\"axb\": 1}\n{\"a.b\": 1}");
        let v = violation("/a.b", "type");
        assert_eq!(recover_line(&doc, &v), Some(2));
    }

    #[test]
    fn empty_property_search() {
        let doc = Document::new(GUIDE);
        assert_eq!(locate_empty_property(&doc, "name"), Some(6));
        // Any empty literal on the line counts, so line 6 wins for "value" too.
        assert_eq!(locate_empty_property(&doc, "value"), Some(6));
        assert_eq!(locate_empty_property(&doc, "title"), None);
    }
}
