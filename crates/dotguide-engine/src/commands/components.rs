use serde_json::Value;

use crate::diagnostics::Reporter;
use crate::limits::Limits;
use crate::segment::MessageBlock;

use super::{Command, blank, take_content, truthy};

/// Component kinds the structural rules care about, by platform type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    ActionRow,
    Button,
    StringSelect,
    Section,
    TextDisplay,
    Thumbnail,
    MediaGallery,
    File,
    Spacer,
    Container,
}

impl ComponentKind {
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(ComponentKind::ActionRow),
            2 => Some(ComponentKind::Button),
            3 => Some(ComponentKind::StringSelect),
            9 => Some(ComponentKind::Section),
            10 => Some(ComponentKind::TextDisplay),
            11 => Some(ComponentKind::Thumbnail),
            12 => Some(ComponentKind::MediaGallery),
            13 => Some(ComponentKind::File),
            14 => Some(ComponentKind::Spacer),
            17 => Some(ComponentKind::Container),
            _ => None,
        }
    }

    pub fn code(self) -> u64 {
        match self {
            ComponentKind::ActionRow => 1,
            ComponentKind::Button => 2,
            ComponentKind::StringSelect => 3,
            ComponentKind::Section => 9,
            ComponentKind::TextDisplay => 10,
            ComponentKind::Thumbnail => 11,
            ComponentKind::MediaGallery => 12,
            ComponentKind::File => 13,
            ComponentKind::Spacer => 14,
            ComponentKind::Container => 17,
        }
    }

    /// Kind of a component object, from its numeric `type`.
    pub fn of(component: &Value) -> Option<Self> {
        let code = component.get("type")?;
        let code = code
            .as_u64()
            .or_else(|| code.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64))?;
        Self::from_code(code)
    }
}

/// Checks a parsed `.componentsV2:json` payload against platform limits.
///
/// Every diagnostic is attached to the directive line. Rejections are errors;
/// things the platform accepts but renders badly are warnings.
pub fn check(
    limits: &Limits,
    command: &Command<'_>,
    block: &mut MessageBlock,
    mut json: Value,
    reporter: &mut Reporter,
) {
    let line = command.line;

    if ComponentKind::of(&json) != Some(ComponentKind::Container) {
        reporter.error(
            line,
            format!(
                "ComponentsV2 must have type: {}",
                ComponentKind::Container.code()
            ),
        );
    }

    let components = json.get("components").and_then(Value::as_array);

    if let Some(components) = components {
        let total = count_components(components);
        if total > limits.components_per_message {
            reporter.error(
                line,
                format!(
                    "ComponentsV2 exceeds Discord's {} component limit per message (found {total} components)",
                    limits.components_per_message
                ),
            );
        }
        check_containers(limits, line, components, reporter);
    }

    match components {
        None => reporter.error(line, "ComponentsV2 must have a components array"),
        Some(components) => {
            for (index, component) in components.iter().enumerate() {
                check_component(limits, line, index + 1, component, reporter);
            }
        }
    }

    let content = take_content(&mut json);
    block.replace_text(&content);
}

/// Every component in the tree below the root, nested ones included.
fn count_components(components: &[Value]) -> usize {
    components
        .iter()
        .map(|component| {
            let nested = children(component).map_or(0, count_components);
            let accessory = usize::from(component.get("accessory").is_some_and(Value::is_object));
            1 + nested + accessory
        })
        .sum()
}

fn children(component: &Value) -> Option<&[Value]> {
    component
        .get("components")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
}

/// Count limits on action rows, their children, select menus and sections.
fn check_containers(limits: &Limits, line: usize, components: &[Value], reporter: &mut Reporter) {
    let mut action_rows = 0;

    for (index, component) in components.iter().enumerate() {
        let position = index + 1;
        match ComponentKind::of(component) {
            Some(ComponentKind::ActionRow) => {
                action_rows += 1;
                if action_rows > limits.action_rows {
                    reporter.error(
                        line,
                        format!(
                            "Too many Action Rows (type 1): Discord allows maximum {} action rows per message (found {action_rows})",
                            limits.action_rows
                        ),
                    );
                }

                let Some(row) = children(component) else {
                    continue;
                };
                if row.len() > limits.action_row_children {
                    reporter.error(
                        line,
                        format!(
                            "Action Row {position} exceeds component limit: Discord allows maximum {} components per action row (found {})",
                            limits.action_row_children,
                            row.len()
                        ),
                    );
                }
                for child in row {
                    if ComponentKind::of(child) != Some(ComponentKind::StringSelect) {
                        continue;
                    }
                    let options = child.get("options").and_then(Value::as_array);
                    if let Some(options) = options
                        && options.len() > limits.select_options
                    {
                        reporter.error(
                            line,
                            format!(
                                "Select Menu in Action Row {position} exceeds options limit: Discord allows maximum {} options per select menu (found {})",
                                limits.select_options,
                                options.len()
                            ),
                        );
                    }
                }
            }
            Some(ComponentKind::Section) => {
                if let Some(section) = children(component)
                    && section.len() > limits.section_children
                {
                    reporter.error(
                        line,
                        format!(
                            "Section component (type 9) at index {position} exceeds limit: Discord allows maximum {} components per section (found {})",
                            limits.section_children,
                            section.len()
                        ),
                    );
                }
            }
            _ => {}
        }
    }
}

/// Per-component requirements: a type, non-blank text, gallery media, spacing.
fn check_component(
    limits: &Limits,
    line: usize,
    position: usize,
    component: &Value,
    reporter: &mut Reporter,
) {
    if !truthy(component.get("type")) {
        reporter.error(
            line,
            format!("Component {position} is missing required type property"),
        );
    }

    match ComponentKind::of(component) {
        Some(ComponentKind::Section) => {
            for (index, text) in children(component).unwrap_or_default().iter().enumerate() {
                if ComponentKind::of(text) == Some(ComponentKind::TextDisplay)
                    && blank(text.get("content"))
                {
                    reporter.warning(
                        line,
                        format!(
                            "Component {position} text block {} has empty content",
                            index + 1
                        ),
                    );
                }
            }
        }
        Some(ComponentKind::TextDisplay) => {
            if blank(component.get("content")) {
                reporter.warning(
                    line,
                    format!("Component {position} (type 10) has empty content"),
                );
            }
        }
        Some(ComponentKind::MediaGallery) => {
            let items = component
                .get("items")
                .and_then(Value::as_array)
                .filter(|items| !items.is_empty());
            let Some(items) = items else {
                reporter.warning(
                    line,
                    format!(
                        "Component {position} (type 12) should have items array with at least one item"
                    ),
                );
                return;
            };
            for (index, item) in items.iter().enumerate() {
                let url = item.get("media").and_then(|media| media.get("url"));
                if !truthy(url) {
                    reporter.warning(
                        line,
                        format!("Component {position} item {} is missing media.url", index + 1),
                    );
                }
            }
        }
        Some(ComponentKind::Spacer) => {
            if !spacing_ok(limits, component.get("spacing")) {
                reporter.warning(
                    line,
                    format!(
                        "Component {position} spacing should be between {}-{}",
                        limits.spacing_min, limits.spacing_max
                    ),
                );
            }
        }
        _ => {}
    }
}

fn spacing_ok(limits: &Limits, spacing: Option<&Value>) -> bool {
    if !truthy(spacing) {
        return false;
    }
    match spacing.and_then(Value::as_f64) {
        Some(n) => n >= limits.spacing_min as f64 && n <= limits.spacing_max as f64,
        // Non-numeric spacing is left to the platform.
        None => true,
    }
}
