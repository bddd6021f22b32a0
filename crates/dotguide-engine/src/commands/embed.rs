use serde_json::Value;

use crate::diagnostics::Reporter;
use crate::document::Document;
use crate::locate::{locate_empty_property, recover_line};
use crate::schema::{SchemaValidator, Violation};
use crate::segment::MessageBlock;

use super::{Command, take_content, truthy};

/// Checks a parsed `.embed:json` payload.
///
/// `content` becomes the message text. The embed object is `embeds[0]`, else
/// `embed`, else the payload itself.
pub fn check(
    document: &Document<'_>,
    schema: &dyn SchemaValidator,
    command: &Command<'_>,
    block: &mut MessageBlock,
    mut json: Value,
    reporter: &mut Reporter,
) {
    let content = take_content(&mut json);
    block.replace_text(&content);

    let embed = select_embed(&json);
    check_fields(document, command, embed, reporter);

    for violation in schema.validate(embed) {
        let line = recover_line(document, &violation).unwrap_or(command.line);
        reporter.error(line, describe(&violation));
    }
}

fn select_embed(json: &Value) -> &Value {
    if truthy(json.get("embeds")) {
        json.get("embeds")
            .and_then(|embeds| embeds.get(0))
            .unwrap_or(&Value::Null)
    } else if truthy(json.get("embed")) {
        &json["embed"]
    } else {
        json
    }
}

fn check_fields(
    document: &Document<'_>,
    command: &Command<'_>,
    embed: &Value,
    reporter: &mut Reporter,
) {
    let Some(fields) = embed.get("fields").and_then(Value::as_array) else {
        return;
    };

    for field in fields {
        for property in ["name", "value"] {
            let empty = field
                .get(property)
                .and_then(Value::as_str)
                .is_some_and(|s| s.trim().is_empty());
            if empty {
                let line = locate_empty_property(document, property).unwrap_or(command.line);
                reporter.error(
                    line,
                    format!("JSON embed object is invalid: \"{property}\" is empty in an embed field"),
                );
            }
        }
    }
}

fn describe(violation: &Violation) -> String {
    match violation.additional_property() {
        Some(property) => format!("Unrecognized property '{property}'"),
        None => format!(
            "'{}' {}",
            violation.path.get(1..).unwrap_or_default(),
            violation.message
        ),
    }
}
